use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use farelink_core::provider::FlightProvider;
use farelink_core::seatmap::SeatMapClient;
use farelink_mcp::{server, AppState};
use farelink_providers::{AmadeusClient, Config, RazorpayClient, SerpApiClient};
use farelink_search::Aggregator;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // stdout carries the protocol; all diagnostics go to stderr.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "farelink_mcp=debug,farelink_search=debug,farelink_providers=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::load().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    // Registration order fixes the merge order: Amadeus before SerpApi.
    let mut providers: Vec<Arc<dyn FlightProvider>> = Vec::new();
    let mut seat_maps: Option<Arc<dyn SeatMapClient>> = None;

    if let Some(amadeus_config) = &config.amadeus {
        let amadeus = Arc::new(AmadeusClient::new(amadeus_config));
        seat_maps = Some(amadeus.clone());
        providers.push(amadeus);
        tracing::info!("Amadeus provider configured");
    } else {
        tracing::warn!("Amadeus credentials missing; provider disabled");
    }

    if let Some(serpapi_config) = &config.serpapi {
        providers.push(Arc::new(SerpApiClient::new(serpapi_config)));
        tracing::info!("SerpApi provider configured");
    } else {
        tracing::warn!("SerpApi credentials missing; provider disabled");
    }

    let aggregator = Aggregator::new(
        providers,
        Duration::from_secs(config.search.provider_timeout_secs),
    );
    tracing::info!(
        providers = ?aggregator.available_providers(),
        "flight provider registry built"
    );

    let state = AppState {
        aggregator,
        seat_maps,
        payments: Arc::new(RazorpayClient::new(config.razorpay.as_ref())),
    };

    server::run(Arc::new(state)).await
}
