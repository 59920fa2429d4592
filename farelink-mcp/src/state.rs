use std::sync::Arc;

use farelink_core::payment::PaymentLinkClient;
use farelink_core::seatmap::SeatMapClient;
use farelink_search::Aggregator;

/// Everything a tool invocation needs, constructed once in `main` and shared
/// read-only across concurrent invocations.
pub struct AppState {
    pub aggregator: Aggregator,
    /// Present only when the Amadeus credential pair is configured; seat
    /// maps have no fallback provider.
    pub seat_maps: Option<Arc<dyn SeatMapClient>>,
    pub payments: Arc<dyn PaymentLinkClient>,
}
