use serde::{Deserialize, Serialize};

use crate::provider::ProviderId;

/// Sentinel used when an upstream payload is missing a field. Adapters fill
/// the gap instead of failing the whole offer.
pub const NOT_AVAILABLE: &str = "N/A";

/// A normalized flight offer, provider-agnostic. Wire format is camelCase
/// JSON so offers returned by `search_flights` can be handed back verbatim
/// to `get_seat_map`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FlightOffer {
    pub source: ProviderId,
    /// Opaque identifier; uniqueness is scoped to the source provider.
    pub id: String,
    pub price: Price,
    pub itineraries: Vec<Itinerary>,
    /// Main carrier name or code for display.
    pub airline: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Price {
    pub currency: String,
    /// Decimal string as reported upstream; kept as text to avoid float
    /// rounding on money.
    pub total: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Itinerary {
    /// Provider-native duration string, preserved as-is and never reparsed.
    pub duration: String,
    pub segments: Vec<Segment>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub departure: SegmentEndpoint,
    pub arrival: SegmentEndpoint,
    pub carrier_code: String,
    pub number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SegmentEndpoint {
    pub iata_code: String,
    /// Timestamp string as reported upstream (format varies by provider).
    pub at: String,
}

/// Normalization helper shared by adapters: take what the provider gave us,
/// fall back to the sentinel otherwise.
pub fn or_na(value: Option<String>) -> String {
    value.unwrap_or_else(|| NOT_AVAILABLE.to_string())
}
