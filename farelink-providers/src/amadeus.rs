use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, error};

use farelink_core::offer::{
    or_na, FlightOffer, Itinerary, Price, Segment, SegmentEndpoint, NOT_AVAILABLE,
};
use farelink_core::provider::{FlightProvider, ProviderId, UpstreamError};
use farelink_core::search::SearchRequest;
use farelink_core::seatmap::SeatMapClient;

use crate::app_config::AmadeusConfig;

/// Refresh the OAuth token this long before it actually expires.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Amadeus Self-Service API client: flight-offer search plus seat maps.
/// Constructed once at startup when a credential pair is configured.
pub struct AmadeusClient {
    http: reqwest::Client,
    base_url: String,
    client_id: String,
    client_secret: String,
    /// Cached OAuth2 client-credentials token. The only interior mutability
    /// in the provider layer, guarded for concurrent invocations.
    token: Mutex<Option<CachedToken>>,
}

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

impl AmadeusClient {
    pub fn new(config: &AmadeusConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            token: Mutex::new(None),
        }
    }

    fn upstream_error(&self, message: impl Into<String>) -> UpstreamError {
        UpstreamError::new(ProviderId::Amadeus, message)
    }

    /// Fetch or reuse the OAuth2 access token.
    async fn access_token(&self) -> Result<String, UpstreamError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.expires_at > Instant::now() {
                return Ok(token.access_token.clone());
            }
        }

        debug!("requesting new Amadeus access token");
        let response = self
            .http
            .post(format!("{}/v1/security/oauth2/token", self.base_url))
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|e| self.upstream_error(format!("token request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(self.upstream_error(format!("token request failed ({}): {}", status, body)));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| self.upstream_error(format!("malformed token response: {}", e)))?;

        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(TOKEN_EXPIRY_MARGIN);
        let access_token = token.access_token.clone();
        *cached = Some(CachedToken {
            access_token: token.access_token,
            expires_at: Instant::now() + lifetime,
        });
        Ok(access_token)
    }
}

#[async_trait]
impl FlightProvider for AmadeusClient {
    fn id(&self) -> ProviderId {
        ProviderId::Amadeus
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<FlightOffer>, UpstreamError> {
        let token = self.access_token().await?;

        let mut query: Vec<(&str, String)> = vec![
            ("originLocationCode", request.origin.clone()),
            ("destinationLocationCode", request.destination.clone()),
            (
                "departureDate",
                request.departure_date.format("%Y-%m-%d").to_string(),
            ),
            ("adults", request.adults.to_string()),
            ("currencyCode", request.currency.clone()),
        ];
        if let Some(return_date) = request.return_date {
            query.push(("returnDate", return_date.format("%Y-%m-%d").to_string()));
        }
        if let Some(max_price) = request.max_price {
            // Amadeus only accepts a whole-number bound; fractional values
            // are floored.
            query.push(("maxPrice", (max_price as i64).to_string()));
        }

        let response = self
            .http
            .get(format!("{}/v2/shopping/flight-offers", self.base_url))
            .bearer_auth(&token)
            .query(&query)
            .send()
            .await
            .map_err(|e| self.upstream_error(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(self.upstream_error(format!("search failed ({}): {}", status, body)));
        }

        let payload: OffersResponse = response
            .json()
            .await
            .map_err(|e| self.upstream_error(format!("malformed search response: {}", e)))?;

        Ok(payload.data.into_iter().map(map_offer).collect())
    }
}

#[async_trait]
impl SeatMapClient for AmadeusClient {
    async fn seat_map(
        &self,
        offer: &FlightOffer,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let token = self.access_token().await?;

        let response = self
            .http
            .post(format!("{}/v1/shopping/seatmaps", self.base_url))
            .bearer_auth(&token)
            .json(&json!({ "data": [offer] }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(%status, %body, "Amadeus seat-map call failed");
            return Err("Seat map data unavailable from airline.".into());
        }

        let payload: Value = response.json().await?;
        Ok(payload.get("data").cloned().unwrap_or(Value::Null))
    }
}

// ============================================================================
// Raw response shapes (only what normalization needs)
// ============================================================================

#[derive(Debug, Deserialize)]
struct OffersResponse {
    #[serde(default)]
    data: Vec<RawOffer>,
}

#[derive(Debug, Deserialize)]
struct RawOffer {
    id: Option<String>,
    price: Option<RawPrice>,
    #[serde(default)]
    itineraries: Vec<RawItinerary>,
    #[serde(default, rename = "validatingAirlineCodes")]
    validating_airline_codes: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawPrice {
    currency: Option<String>,
    total: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawItinerary {
    duration: Option<String>,
    #[serde(default)]
    segments: Vec<RawSegment>,
}

#[derive(Debug, Deserialize)]
struct RawSegment {
    departure: Option<RawEndpoint>,
    arrival: Option<RawEndpoint>,
    #[serde(rename = "carrierCode")]
    carrier_code: Option<String>,
    number: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawEndpoint {
    #[serde(rename = "iataCode")]
    iata_code: Option<String>,
    at: Option<String>,
}

/// Map one raw Amadeus offer 1:1 into the common model. Missing fields
/// degrade to the sentinel; this function never fails.
fn map_offer(raw: RawOffer) -> FlightOffer {
    let price = raw.price.unwrap_or(RawPrice {
        currency: None,
        total: None,
    });
    FlightOffer {
        source: ProviderId::Amadeus,
        id: or_na(raw.id),
        price: Price {
            currency: or_na(price.currency),
            total: or_na(price.total),
        },
        itineraries: raw.itineraries.into_iter().map(map_itinerary).collect(),
        airline: raw
            .validating_airline_codes
            .into_iter()
            .next()
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
    }
}

fn map_itinerary(raw: RawItinerary) -> Itinerary {
    Itinerary {
        duration: or_na(raw.duration),
        segments: raw.segments.into_iter().map(map_segment).collect(),
    }
}

fn map_segment(raw: RawSegment) -> Segment {
    Segment {
        departure: map_endpoint(raw.departure),
        arrival: map_endpoint(raw.arrival),
        carrier_code: or_na(raw.carrier_code),
        number: or_na(raw.number),
    }
}

fn map_endpoint(raw: Option<RawEndpoint>) -> SegmentEndpoint {
    let endpoint = raw.unwrap_or(RawEndpoint {
        iata_code: None,
        at: None,
    });
    SegmentEndpoint {
        iata_code: or_na(endpoint.iata_code),
        at: or_na(endpoint.at),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_offer_full_payload() {
        let raw: RawOffer = serde_json::from_value(serde_json::json!({
            "id": "1",
            "price": {"currency": "INR", "total": "25400.00"},
            "itineraries": [{
                "duration": "PT8H25M",
                "segments": [{
                    "departure": {"iataCode": "LHR", "at": "2025-12-25T09:15:00"},
                    "arrival": {"iataCode": "JFK", "at": "2025-12-25T12:40:00"},
                    "carrierCode": "BA",
                    "number": "117"
                }]
            }],
            "validatingAirlineCodes": ["BA", "AA"]
        }))
        .unwrap();

        let offer = map_offer(raw);
        assert_eq!(offer.source, ProviderId::Amadeus);
        assert_eq!(offer.id, "1");
        assert_eq!(offer.price.total, "25400.00");
        assert_eq!(offer.airline, "BA");
        assert_eq!(offer.itineraries[0].segments[0].departure.iata_code, "LHR");
        assert_eq!(offer.itineraries[0].segments[0].number, "117");
    }

    #[test]
    fn test_missing_fields_degrade_to_sentinel() {
        let raw: RawOffer = serde_json::from_value(serde_json::json!({
            "itineraries": [{
                "segments": [{
                    "departure": {"iataCode": "LHR"}
                }]
            }]
        }))
        .unwrap();

        let offer = map_offer(raw);
        assert_eq!(offer.id, NOT_AVAILABLE);
        assert_eq!(offer.price.currency, NOT_AVAILABLE);
        assert_eq!(offer.airline, NOT_AVAILABLE);
        let segment = &offer.itineraries[0].segments[0];
        assert_eq!(segment.departure.iata_code, "LHR");
        assert_eq!(segment.departure.at, NOT_AVAILABLE);
        assert_eq!(segment.arrival.iata_code, NOT_AVAILABLE);
        assert_eq!(segment.number, NOT_AVAILABLE);
    }
}
