use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::offer::FlightOffer;
use crate::search::SearchRequest;

/// Identifies which upstream provider produced an offer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Amadeus,
    Serpapi,
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderId::Amadeus => write!(f, "Amadeus"),
            ProviderId::Serpapi => write!(f, "SerpApi"),
        }
    }
}

/// A single provider call failed (network, auth, rate limit, malformed
/// upstream payload). Normalization gaps never produce this error; adapters
/// degrade individual fields to the sentinel instead.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{provider} Error: {message}")]
pub struct UpstreamError {
    pub provider: ProviderId,
    pub message: String,
}

impl UpstreamError {
    pub fn new(provider: ProviderId, message: impl Into<String>) -> Self {
        Self {
            provider,
            message: message.into(),
        }
    }
}

/// One implementation per upstream flight-search provider. Adding a provider
/// means implementing this trait; the aggregator never branches on identity.
#[async_trait]
pub trait FlightProvider: Send + Sync {
    fn id(&self) -> ProviderId;

    /// Run a flight search against the upstream provider and normalize the
    /// result into the common offer model.
    async fn search(&self, request: &SearchRequest) -> Result<Vec<FlightOffer>, UpstreamError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_id_serde_is_lowercase() {
        assert_eq!(
            serde_json::to_string(&ProviderId::Amadeus).unwrap(),
            "\"amadeus\""
        );
        let parsed: ProviderId = serde_json::from_str("\"serpapi\"").unwrap();
        assert_eq!(parsed, ProviderId::Serpapi);
    }

    #[test]
    fn test_upstream_error_display() {
        let err = UpstreamError::new(ProviderId::Amadeus, "rate limit exceeded");
        assert_eq!(err.to_string(), "Amadeus Error: rate limit exceeded");
    }
}
