use async_trait::async_trait;
use serde_json::Value;

use crate::offer::FlightOffer;

/// Seat-layout retrieval for a previously-returned offer. Only the Amadeus
/// collaborator implements this; there is no fallback provider.
#[async_trait]
pub trait SeatMapClient: Send + Sync {
    async fn seat_map(
        &self,
        offer: &FlightOffer,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>>;
}
