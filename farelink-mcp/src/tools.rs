use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use farelink_core::offer::FlightOffer;
use farelink_core::payment::{PaymentCustomer, PaymentLinkRequest};
use farelink_core::search::SearchRequest;
use farelink_search::ProviderSelector;

use crate::protocol::ToolCallResult;
use crate::state::AppState;

/// Behavioral instruction attached to every seat-map failure. This text is
/// part of the contract with the calling agent: without it, downstream
/// agents have been observed inventing seat numbers when real data is
/// missing.
pub const SEAT_MAP_GUARDRAIL: &str = "Do NOT generate or invent seat numbers. Tell the user: \
\"Real-time seat map is not available for this flight.\" and ask for their \
seating preference (Window/Aisle) instead.";

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// Tool name outside the enumerated set. Fatal for this invocation only.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
}

/// Static tool catalog served on `tools/list`.
pub fn catalog() -> Value {
    json!([
        {
            "name": "search_flights",
            "description": "Search for flight deals using Amadeus and/or SerpApi (Google Flights). Returns a list of flight offers.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "origin": {
                        "type": "string",
                        "description": "IATA code of the origin airport (e.g., 'LHR')"
                    },
                    "destination": {
                        "type": "string",
                        "description": "IATA code of the destination airport (e.g., 'JFK')"
                    },
                    "departureDate": {
                        "type": "string",
                        "description": "Departure date in YYYY-MM-DD format"
                    },
                    "returnDate": {
                        "type": "string",
                        "description": "Return date in YYYY-MM-DD format (optional)"
                    },
                    "adults": {
                        "type": "number",
                        "description": "Number of adult passengers (default 1)"
                    },
                    "currency": {
                        "type": "string",
                        "description": "Currency code (default INR)"
                    },
                    "maxPrice": {
                        "type": "number",
                        "description": "Maximum price filter"
                    },
                    "provider": {
                        "type": "string",
                        "enum": ["amadeus", "serpapi", "both"],
                        "description": "Specific provider to use (default 'both' if available)"
                    }
                },
                "required": ["origin", "destination", "departureDate"]
            }
        },
        {
            "name": "get_price_alerts",
            "description": "Get simulated price alerts for a route.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "origin": { "type": "string" },
                    "destination": { "type": "string" }
                },
                "required": ["origin", "destination"]
            }
        },
        {
            "name": "get_seat_map",
            "description": "MANDATORY: Call this tool to retrieve and display the actual seat map. Do NOT ask for generic preferences (window/aisle) without showing the map first. IMPORTANT: If this tool returns 'Seat map not available', tell the user exactly that. Do NOT make up seat numbers if you don't see them in the tool output.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "flightOffer": {
                        "type": "string",
                        "description": "The full flight offer object as a JSON string (returned from search_flights)"
                    }
                },
                "required": ["flightOffer"]
            }
        },
        {
            "name": "create_payment_link",
            "description": "Create a payment link for a flight booking. MANDATORY PREREQUISITE: You MUST have already called `get_seat_map` and shown the seats to the user. Do NOT call this tool if you haven't shown the seat map. Confirm the customer's name, email and contact number with the user BEFORE calling this tool.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "amount": { "type": "number", "description": "Amount in major currency unit (e.g., 100 for 100 INR)" },
                    "currency": { "type": "string", "description": "Currency code (e.g., INR)" },
                    "description": { "type": "string", "description": "Description of the payment" },
                    "name": { "type": "string", "description": "Customer name" },
                    "email": { "type": "string", "description": "Customer email" },
                    "contact": { "type": "string", "description": "Customer contact number" }
                },
                "required": ["amount", "currency", "description", "name", "email", "contact"]
            }
        }
    ])
}

/// Route one named tool invocation to its handler. Handler failures become
/// error-tagged results; only an unknown tool name escapes as an error.
pub async fn dispatch(
    state: &AppState,
    name: &str,
    arguments: &Value,
) -> Result<ToolCallResult, DispatchError> {
    info!(tool = name, "dispatching tool call");
    match name {
        "search_flights" => Ok(search_flights(state, arguments).await),
        "get_price_alerts" => Ok(get_price_alerts(arguments)),
        "get_seat_map" => Ok(get_seat_map(state, arguments).await),
        "create_payment_link" => Ok(create_payment_link(state, arguments).await),
        other => Err(DispatchError::UnknownTool(other.to_string())),
    }
}

// ============================================================================
// search_flights
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchFlightsArgs {
    origin: String,
    destination: String,
    departure_date: String,
    return_date: Option<String>,
    adults: Option<u32>,
    currency: Option<String>,
    max_price: Option<f64>,
    provider: Option<String>,
}

async fn search_flights(state: &AppState, arguments: &Value) -> ToolCallResult {
    let args: SearchFlightsArgs = match serde_json::from_value(arguments.clone()) {
        Ok(args) => args,
        Err(e) => return ToolCallResult::error(format!("Invalid search_flights arguments: {}", e)),
    };

    let departure_date = match parse_date(&args.departure_date) {
        Ok(date) => date,
        Err(msg) => return ToolCallResult::error(msg),
    };
    let return_date = match args.return_date.as_deref().map(parse_date).transpose() {
        Ok(date) => date,
        Err(msg) => return ToolCallResult::error(msg),
    };

    let selector = match ProviderSelector::parse(args.provider.as_deref()) {
        Some(selector) => selector,
        None => {
            return ToolCallResult::error(format!(
                "Unknown provider '{}'. Expected 'amadeus', 'serpapi' or 'both'.",
                args.provider.unwrap_or_default()
            ))
        }
    };

    let request = SearchRequest {
        origin: args.origin.to_ascii_uppercase(),
        destination: args.destination.to_ascii_uppercase(),
        departure_date,
        return_date,
        adults: args.adults.unwrap_or(1),
        currency: args.currency.unwrap_or_else(|| "INR".to_string()),
        max_price: args.max_price,
    };
    if let Err(e) = request.validate() {
        return ToolCallResult::error(e.to_string());
    }

    match state.aggregator.search(&request, selector).await {
        Ok(result) => match serde_json::to_string_pretty(&result.offers) {
            Ok(payload) => ToolCallResult::text(payload),
            Err(e) => ToolCallResult::error(format!("Failed to serialize offers: {}", e)),
        },
        // NoProvidersConfigured and AllProvidersFailed both carry their full
        // message in Display
        Err(err) => ToolCallResult::error(err.to_string()),
    }
}

fn parse_date(value: &str) -> Result<chrono::NaiveDate, String> {
    chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| format!("'{}' is not a valid date (expected YYYY-MM-DD)", value))
}

// ============================================================================
// get_price_alerts
// ============================================================================

#[derive(Debug, Deserialize)]
struct PriceAlertArgs {
    origin: String,
    destination: String,
}

/// Stateless stub: acknowledges the subscription without persisting
/// anything.
fn get_price_alerts(arguments: &Value) -> ToolCallResult {
    let args: PriceAlertArgs = match serde_json::from_value(arguments.clone()) {
        Ok(args) => args,
        Err(e) => {
            return ToolCallResult::error(format!("Invalid get_price_alerts arguments: {}", e))
        }
    };

    let payload = json!({
        "message": "Price alert subscription created (Simulated)",
        "route": format!("{} -> {}", args.origin, args.destination),
        "status": "active",
    });
    ToolCallResult::text(serde_json::to_string_pretty(&payload).unwrap_or_default())
}

// ============================================================================
// get_seat_map
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeatMapArgs {
    flight_offer: String,
}

fn seat_map_guardrail(error: &str) -> ToolCallResult {
    let payload = json!({
        "message": "Real-time seat map is not available for this flight.",
        "error": error,
        "instruction": SEAT_MAP_GUARDRAIL,
    });
    ToolCallResult::error(serde_json::to_string_pretty(&payload).unwrap_or_default())
}

async fn get_seat_map(state: &AppState, arguments: &Value) -> ToolCallResult {
    let args: SeatMapArgs = match serde_json::from_value(arguments.clone()) {
        Ok(args) => args,
        Err(e) => return ToolCallResult::error(format!("Invalid get_seat_map arguments: {}", e)),
    };

    let offer: FlightOffer = match serde_json::from_str(&args.flight_offer) {
        Ok(offer) => offer,
        Err(e) => return seat_map_guardrail(&format!("flightOffer is not valid JSON: {}", e)),
    };

    let Some(seat_maps) = state.seat_maps.as_ref() else {
        return ToolCallResult::error("Amadeus client not initialized.");
    };

    match seat_maps.seat_map(&offer).await {
        Ok(data) => match serde_json::to_string_pretty(&data) {
            Ok(payload) => ToolCallResult::text(payload),
            Err(e) => seat_map_guardrail(&e.to_string()),
        },
        Err(e) => seat_map_guardrail(&e.to_string()),
    }
}

// ============================================================================
// create_payment_link
// ============================================================================

#[derive(Debug, Deserialize)]
struct PaymentLinkArgs {
    amount: f64,
    currency: String,
    description: String,
    name: String,
    email: String,
    contact: String,
}

async fn create_payment_link(state: &AppState, arguments: &Value) -> ToolCallResult {
    let args: PaymentLinkArgs = match serde_json::from_value(arguments.clone()) {
        Ok(args) => args,
        Err(e) => {
            return ToolCallResult::error(format!("Invalid create_payment_link arguments: {}", e))
        }
    };

    let request = PaymentLinkRequest {
        amount: args.amount,
        currency: args.currency,
        description: args.description,
        customer: PaymentCustomer {
            name: args.name,
            email: args.email,
            contact: args.contact,
        },
    };

    // Payment creation has side effects upstream; a failure is surfaced,
    // never retried.
    match state.payments.create_payment_link(&request).await {
        Ok(link) => match serde_json::to_string_pretty(&link) {
            Ok(payload) => ToolCallResult::text(payload),
            Err(e) => ToolCallResult::error(format!("Error creating payment link: {}", e)),
        },
        Err(e) => ToolCallResult::error(format!("Error creating payment link: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_lists_every_operation() {
        let tools = catalog();
        let names: Vec<&str> = tools
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert_eq!(
            names,
            vec![
                "search_flights",
                "get_price_alerts",
                "get_seat_map",
                "create_payment_link"
            ]
        );
    }

    #[test]
    fn test_price_alerts_echoes_route() {
        let result = get_price_alerts(&json!({"origin": "LHR", "destination": "JFK"}));
        assert!(!result.is_error);
        let payload: Value = serde_json::from_str(result.first_text()).unwrap();
        assert_eq!(payload["route"], "LHR -> JFK");
        assert_eq!(payload["status"], "active");
    }

    #[test]
    fn test_price_alerts_requires_route() {
        let result = get_price_alerts(&json!({"origin": "LHR"}));
        assert!(result.is_error);
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert!(parse_date("2025-12-25").is_ok());
        assert!(parse_date("25/12/2025").is_err());
        assert!(parse_date("tomorrow").is_err());
    }
}
