use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentCustomer {
    pub name: String,
    pub email: String,
    pub contact: String,
}

/// What the dispatcher asks the payment collaborator to create. Amount is in
/// the major currency unit; the collaborator converts to minor units.
#[derive(Debug, Clone)]
pub struct PaymentLinkRequest {
    pub amount: f64,
    pub currency: String,
    pub description: String,
    pub customer: PaymentCustomer,
}

/// The created payment-link record as returned by the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentLink {
    pub id: String,
    pub short_url: String,
    /// Minor currency units (e.g. paise).
    pub amount: i64,
    pub currency: String,
    pub status: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[async_trait]
pub trait PaymentLinkClient: Send + Sync {
    /// Create a payment link with the gateway. Not safe to retry blindly;
    /// callers surface the failure instead.
    async fn create_payment_link(
        &self,
        request: &PaymentLinkRequest,
    ) -> Result<PaymentLink, Box<dyn std::error::Error + Send + Sync>>;
}
