use async_trait::async_trait;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Deserialize;

use farelink_core::offer::{
    or_na, FlightOffer, Itinerary, Price, Segment, SegmentEndpoint, NOT_AVAILABLE,
};
use farelink_core::provider::{FlightProvider, ProviderId, UpstreamError};
use farelink_core::search::SearchRequest;

use crate::app_config::SerpApiConfig;

/// SerpApi (Google Flights engine) client. The upstream shape carries no
/// stable per-offer identifier, so ids are synthesized per response — the
/// same search yields different ids on every call. Known limitation.
pub struct SerpApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl SerpApiClient {
    pub fn new(config: &SerpApiConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        }
    }

    fn upstream_error(&self, message: impl Into<String>) -> UpstreamError {
        UpstreamError::new(ProviderId::Serpapi, message)
    }
}

#[async_trait]
impl FlightProvider for SerpApiClient {
    fn id(&self) -> ProviderId {
        ProviderId::Serpapi
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<FlightOffer>, UpstreamError> {
        let mut query: Vec<(&str, String)> = vec![
            ("engine", "google_flights".to_string()),
            ("api_key", self.api_key.clone()),
            ("departure_id", request.origin.clone()),
            ("arrival_id", request.destination.clone()),
            (
                "outbound_date",
                request.departure_date.format("%Y-%m-%d").to_string(),
            ),
            ("currency", request.currency.clone()),
            ("adults", request.adults.to_string()),
            ("hl", "en".to_string()),
        ];
        match request.return_date {
            // 1 = round trip, 2 = one way
            Some(return_date) => {
                query.push(("return_date", return_date.format("%Y-%m-%d").to_string()));
                query.push(("type", "1".to_string()));
            }
            None => query.push(("type", "2".to_string())),
        }

        let response = self
            .http
            .get(format!("{}/search.json", self.base_url))
            .query(&query)
            .send()
            .await
            .map_err(|e| self.upstream_error(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(self.upstream_error(format!("search failed ({}): {}", status, body)));
        }

        let payload: SerpApiResponse = response
            .json()
            .await
            .map_err(|e| self.upstream_error(format!("malformed search response: {}", e)))?;

        // No best_flights key means the engine found nothing; that is an
        // empty success, not a failure.
        Ok(payload
            .best_flights
            .unwrap_or_default()
            .into_iter()
            .map(|flight| map_offer(flight, &request.currency))
            .collect())
    }
}

// ============================================================================
// Raw response shapes (best-effort; Google Flights payloads vary)
// ============================================================================

#[derive(Debug, Deserialize)]
struct SerpApiResponse {
    best_flights: Option<Vec<RawBestFlight>>,
}

#[derive(Debug, Deserialize)]
struct RawBestFlight {
    #[serde(default)]
    flights: Vec<RawLeg>,
    price: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RawLeg {
    departure_airport: Option<RawAirport>,
    arrival_airport: Option<RawAirport>,
    duration: Option<serde_json::Value>,
    airline: Option<String>,
    flight_number: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawAirport {
    id: Option<String>,
    time: Option<String>,
}

/// Synthesized offer id: provider tag plus nine random alphanumerics.
fn synthesize_id() -> String {
    let token: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(9)
        .map(|c| (c as char).to_ascii_lowercase())
        .collect();
    format!("serpapi_{}", token)
}

/// Numbers arrive as integers, strings or not at all; render whatever is
/// there as a decimal string.
fn value_to_string(value: Option<serde_json::Value>) -> String {
    match value {
        Some(serde_json::Value::String(s)) => s,
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Map one "best flight" into the common model: exactly one segment per leg
/// (multi-stop legs are not decomposed further), currency as requested.
fn map_offer(flight: RawBestFlight, currency: &str) -> FlightOffer {
    let airline = flight
        .flights
        .first()
        .and_then(|leg| leg.airline.clone())
        .unwrap_or_else(|| "Unknown".to_string());

    FlightOffer {
        source: ProviderId::Serpapi,
        id: synthesize_id(),
        price: Price {
            currency: currency.to_string(),
            total: value_to_string(flight.price),
        },
        itineraries: flight.flights.into_iter().map(map_leg).collect(),
        airline,
    }
}

fn map_leg(leg: RawLeg) -> Itinerary {
    let departure = leg.departure_airport.unwrap_or(RawAirport {
        id: None,
        time: None,
    });
    let arrival = leg.arrival_airport.unwrap_or(RawAirport {
        id: None,
        time: None,
    });
    Itinerary {
        duration: value_to_string(leg.duration),
        segments: vec![Segment {
            departure: SegmentEndpoint {
                iata_code: or_na(departure.id),
                at: or_na(departure.time),
            },
            arrival: SegmentEndpoint {
                iata_code: or_na(arrival.id),
                at: or_na(arrival.time),
            },
            carrier_code: or_na(leg.airline),
            number: or_na(leg.flight_number),
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_flight(json: serde_json::Value) -> RawBestFlight {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_map_offer_two_leg_round_trip() {
        let flight = raw_flight(serde_json::json!({
            "flights": [
                {
                    "departure_airport": {"id": "LHR", "time": "2025-12-25 09:15"},
                    "arrival_airport": {"id": "JFK", "time": "2025-12-25 12:40"},
                    "duration": 505,
                    "airline": "British Airways",
                    "flight_number": "BA 117"
                },
                {
                    "departure_airport": {"id": "JFK", "time": "2026-01-05 18:30"},
                    "arrival_airport": {"id": "LHR", "time": "2026-01-06 06:25"},
                    "duration": 415,
                    "airline": "British Airways",
                    "flight_number": "BA 112"
                }
            ],
            "price": 68320
        }));

        let offer = map_offer(flight, "INR");
        assert_eq!(offer.source, ProviderId::Serpapi);
        assert!(offer.id.starts_with("serpapi_"));
        assert_eq!(offer.price.currency, "INR");
        assert_eq!(offer.price.total, "68320");
        assert_eq!(offer.airline, "British Airways");
        // One segment per leg, never decomposed further
        assert_eq!(offer.itineraries.len(), 2);
        assert_eq!(offer.itineraries[0].segments.len(), 1);
        assert_eq!(offer.itineraries[0].duration, "505");
        assert_eq!(
            offer.itineraries[1].segments[0].departure.iata_code,
            "JFK"
        );
    }

    #[test]
    fn test_missing_fields_degrade_to_sentinel() {
        let flight = raw_flight(serde_json::json!({
            "flights": [{"departure_airport": {"id": "LHR"}}]
        }));

        let offer = map_offer(flight, "USD");
        assert_eq!(offer.price.total, NOT_AVAILABLE);
        assert_eq!(offer.price.currency, "USD");
        assert_eq!(offer.airline, "Unknown");
        let segment = &offer.itineraries[0].segments[0];
        assert_eq!(segment.departure.iata_code, "LHR");
        assert_eq!(segment.departure.at, NOT_AVAILABLE);
        assert_eq!(segment.arrival.iata_code, NOT_AVAILABLE);
        assert_eq!(segment.carrier_code, NOT_AVAILABLE);
        assert_eq!(segment.number, NOT_AVAILABLE);
    }

    #[test]
    fn test_synthesized_ids_are_prefixed_and_ephemeral() {
        let a = synthesize_id();
        let b = synthesize_id();
        assert!(a.starts_with("serpapi_"));
        assert_eq!(a.len(), "serpapi_".len() + 9);
        // Randomized per response; collisions are astronomically unlikely
        assert_ne!(a, b);
    }
}
