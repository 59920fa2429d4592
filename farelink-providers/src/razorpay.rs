use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, warn};

use farelink_core::payment::{PaymentCustomer, PaymentLink, PaymentLinkClient, PaymentLinkRequest};

use crate::app_config::RazorpayConfig;

/// Where Razorpay redirects the payer after completion.
const CALLBACK_URL: &str = "https://google.com";

/// Razorpay payment-link client. Always constructed: with no credentials
/// configured it falls back to inert placeholders so startup succeeds and
/// individual calls fail gracefully instead.
pub struct RazorpayClient {
    http: reqwest::Client,
    base_url: String,
    key_id: String,
    key_secret: String,
}

impl RazorpayClient {
    pub fn new(config: Option<&RazorpayConfig>) -> Self {
        let (base_url, key_id, key_secret) = match config {
            Some(cfg) => (
                cfg.base_url.clone(),
                cfg.key_id.clone(),
                cfg.key_secret.clone(),
            ),
            None => {
                warn!("Razorpay API keys not configured; payment-link creation will fail at call time");
                (
                    "https://api.razorpay.com".to_string(),
                    "dummy".to_string(),
                    "dummy".to_string(),
                )
            }
        };
        Self {
            http: reqwest::Client::new(),
            base_url,
            key_id,
            key_secret,
        }
    }
}

#[derive(Debug, Serialize)]
struct CreateLinkBody {
    /// Minor currency units (major amount times 100).
    amount: i64,
    currency: String,
    accept_partial: bool,
    description: String,
    customer: PaymentCustomer,
    notify: Notify,
    reminder_enable: bool,
    callback_url: String,
    callback_method: String,
}

#[derive(Debug, Serialize)]
struct Notify {
    sms: bool,
    email: bool,
}

#[derive(Debug, Deserialize)]
struct CreateLinkResponse {
    id: String,
    short_url: String,
    amount: i64,
    currency: String,
    status: String,
    description: Option<String>,
}

/// Razorpay takes amounts in the smallest currency unit (e.g. paise).
fn to_minor_units(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

fn build_body(request: &PaymentLinkRequest) -> CreateLinkBody {
    CreateLinkBody {
        amount: to_minor_units(request.amount),
        currency: request.currency.clone(),
        accept_partial: false,
        description: request.description.clone(),
        customer: request.customer.clone(),
        notify: Notify {
            sms: true,
            email: true,
        },
        reminder_enable: true,
        callback_url: CALLBACK_URL.to_string(),
        callback_method: "get".to_string(),
    }
}

#[async_trait]
impl PaymentLinkClient for RazorpayClient {
    async fn create_payment_link(
        &self,
        request: &PaymentLinkRequest,
    ) -> Result<PaymentLink, Box<dyn std::error::Error + Send + Sync>> {
        let body = build_body(request);

        let response = self
            .http
            .post(format!("{}/v1/payment_links", self.base_url))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let payload: serde_json::Value = response.json().await.unwrap_or(json!({}));
            let description = payload["error"]["description"]
                .as_str()
                .unwrap_or("payment link creation failed")
                .to_string();
            error!(%status, %description, "Razorpay payment-link call failed");
            return Err(description.into());
        }

        let created: CreateLinkResponse = response.json().await?;
        Ok(PaymentLink {
            id: created.id,
            short_url: created.short_url,
            amount: created.amount,
            currency: created.currency,
            status: created.status,
            description: created.description,
        })
    }
}
