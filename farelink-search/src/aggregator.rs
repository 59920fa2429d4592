use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use farelink_core::offer::FlightOffer;
use farelink_core::provider::{FlightProvider, ProviderId};
use farelink_core::search::SearchRequest;

use crate::SearchError;

/// Which providers a search should fan out to. `All` means every provider
/// that was configured at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderSelector {
    One(ProviderId),
    All,
}

impl ProviderSelector {
    /// Parse the wire value of the `provider` parameter. Absent defaults to
    /// querying everything available.
    pub fn parse(value: Option<&str>) -> Option<Self> {
        match value {
            None | Some("both") => Some(ProviderSelector::All),
            Some("amadeus") => Some(ProviderSelector::One(ProviderId::Amadeus)),
            Some("serpapi") => Some(ProviderSelector::One(ProviderId::Serpapi)),
            Some(_) => None,
        }
    }

    fn matches(&self, id: ProviderId) -> bool {
        match self {
            ProviderSelector::All => true,
            ProviderSelector::One(selected) => *selected == id,
        }
    }
}

/// One provider's failed call, attached to the aggregate result as data
/// rather than aborting the whole search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderFailure {
    pub provider: ProviderId,
    pub message: String,
}

/// Merged outcome of a fan-out: offers concatenated in provider-invocation
/// order (never re-sorted), plus any failures that occurred alongside them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatedSearch {
    pub offers: Vec<FlightOffer>,
    pub failures: Vec<ProviderFailure>,
}

/// Fans a search request out across the configured providers concurrently
/// and merges offers and failures independently.
pub struct Aggregator {
    /// Registration order is invocation order and therefore merge order.
    providers: Vec<Arc<dyn FlightProvider>>,
    provider_timeout: Duration,
}

impl Aggregator {
    pub fn new(providers: Vec<Arc<dyn FlightProvider>>, provider_timeout: Duration) -> Self {
        Self {
            providers,
            provider_timeout,
        }
    }

    pub fn available_providers(&self) -> Vec<ProviderId> {
        self.providers.iter().map(|p| p.id()).collect()
    }

    /// Run the search against every selected provider. Selecting a provider
    /// that was never configured is silent; only attempted calls can fail.
    pub async fn search(
        &self,
        request: &SearchRequest,
        selector: ProviderSelector,
    ) -> Result<AggregatedSearch, SearchError> {
        let selected: Vec<Arc<dyn FlightProvider>> = self
            .providers
            .iter()
            .filter(|p| selector.matches(p.id()))
            .cloned()
            .collect();

        if selected.is_empty() {
            return Err(SearchError::NoProvidersConfigured);
        }

        debug!(
            providers = ?selected.iter().map(|p| p.id()).collect::<Vec<_>>(),
            "fanning search out"
        );

        // One future per provider, each bounded by its own timeout so a hung
        // upstream delays only this invocation, and joined without
        // short-circuiting so every branch's outcome is captured.
        let calls = selected.iter().map(|provider| {
            let provider = Arc::clone(provider);
            let timeout = self.provider_timeout;
            async move {
                let id = provider.id();
                match tokio::time::timeout(timeout, provider.search(request)).await {
                    Ok(Ok(offers)) => Ok(offers),
                    Ok(Err(err)) => Err(ProviderFailure {
                        provider: id,
                        message: err.message,
                    }),
                    Err(_) => Err(ProviderFailure {
                        provider: id,
                        message: format!("timed out after {}s", timeout.as_secs()),
                    }),
                }
            }
        });

        let mut offers = Vec::new();
        let mut failures = Vec::new();
        // join_all preserves invocation order, which keeps the merged list
        // deterministic regardless of which provider answered first.
        for outcome in join_all(calls).await {
            match outcome {
                Ok(provider_offers) => offers.extend(provider_offers),
                Err(failure) => {
                    warn!(provider = %failure.provider, error = %failure.message, "provider search failed");
                    failures.push(failure);
                }
            }
        }

        if offers.is_empty() && !failures.is_empty() {
            return Err(SearchError::AllProvidersFailed(failures));
        }

        // Empty offers with zero failures is a legitimate empty result, not
        // a failure.
        Ok(AggregatedSearch { offers, failures })
    }
}
