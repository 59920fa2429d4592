use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult};

/// A normalized flight-search request. Built once per invocation and shared
/// read-only with every selected provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub origin: String,
    pub destination: String,
    pub departure_date: NaiveDate,
    /// Absent means one-way.
    pub return_date: Option<NaiveDate>,
    pub adults: u32,
    pub currency: String,
    pub max_price: Option<f64>,
}

impl SearchRequest {
    /// Eager validation before any provider is contacted: IATA codes must be
    /// three ASCII letters, the route must not be a loop, and a return date
    /// must not precede departure.
    pub fn validate(&self) -> CoreResult<()> {
        validate_iata(&self.origin)?;
        validate_iata(&self.destination)?;

        if self.origin.eq_ignore_ascii_case(&self.destination) {
            return Err(CoreError::ValidationError(format!(
                "origin and destination are both '{}'",
                self.origin
            )));
        }
        if self.adults == 0 {
            return Err(CoreError::ValidationError(
                "adults must be at least 1".to_string(),
            ));
        }
        if let Some(return_date) = self.return_date {
            if return_date < self.departure_date {
                return Err(CoreError::ValidationError(format!(
                    "return date {} is before departure date {}",
                    return_date, self.departure_date
                )));
            }
        }
        Ok(())
    }
}

fn validate_iata(code: &str) -> CoreResult<()> {
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(())
    } else {
        Err(CoreError::ValidationError(format!(
            "'{}' is not a valid IATA airport code",
            code
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> SearchRequest {
        SearchRequest {
            origin: "LHR".to_string(),
            destination: "JFK".to_string(),
            departure_date: NaiveDate::from_ymd_opt(2025, 12, 25).unwrap(),
            return_date: None,
            adults: 1,
            currency: "INR".to_string(),
            max_price: None,
        }
    }

    #[test]
    fn test_valid_request() {
        assert!(request().validate().is_ok());
    }

    #[test]
    fn test_same_origin_and_destination_rejected() {
        let mut req = request();
        req.destination = "lhr".to_string();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_bad_iata_code_rejected() {
        let mut req = request();
        req.origin = "LOND".to_string();
        assert!(req.validate().is_err());

        req.origin = "L1R".to_string();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_return_before_departure_rejected() {
        let mut req = request();
        req.return_date = NaiveDate::from_ymd_opt(2025, 12, 24);
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_round_trip_request_accepted() {
        let mut req = request();
        req.return_date = NaiveDate::from_ymd_opt(2026, 1, 5);
        assert!(req.validate().is_ok());
    }
}
