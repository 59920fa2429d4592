pub mod aggregator;

pub use aggregator::{AggregatedSearch, Aggregator, ProviderFailure, ProviderSelector};

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// No provider is both selected and available. Raised before any network
    /// call is attempted.
    #[error("No active flight providers configured. Please set API credentials.")]
    NoProvidersConfigured,

    /// Every selected provider was called and failed; the merged offer list
    /// is empty. Carries each provider's error text.
    #[error("Search failed:\n{}", failure_lines(.0))]
    AllProvidersFailed(Vec<aggregator::ProviderFailure>),
}

fn failure_lines(failures: &[aggregator::ProviderFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{} Error: {}", f.provider, f.message))
        .collect::<Vec<_>>()
        .join("\n")
}
