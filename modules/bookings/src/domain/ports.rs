use async_trait::async_trait;
use std::collections::BTreeMap;

/// Order to be paid through the hosted checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    /// Minor units.
    pub amount: i64,
    pub currency: String,
    pub receipt: String,
    pub notes: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GatewayPayment {
    pub id: String,
    pub order_id: Option<String>,
    /// Major units.
    pub amount: f64,
    pub currency: String,
    pub status: String,
    pub method: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GatewayRefund {
    pub id: String,
    pub payment_id: String,
    pub amount: f64,
    pub status: String,
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("gateway request failed: {0}")]
    Transport(String),
    #[error("gateway rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("unexpected gateway response: {0}")]
    Decode(String),
}

/// Hosted payment provider.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Public key handed to the browser checkout.
    fn key_id(&self) -> &str;

    async fn create_order(&self, req: OrderRequest) -> Result<GatewayOrder, GatewayError>;

    async fn fetch_payment(&self, payment_id: &str) -> Result<GatewayPayment, GatewayError>;

    /// Full refund when `amount` is `None`.
    async fn refund(
        &self,
        payment_id: &str,
        amount: Option<f64>,
    ) -> Result<GatewayRefund, GatewayError>;

    /// Checkout callback signature over `order_id|payment_id`.
    fn verify_payment_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool;

    /// Webhook signature over the raw request body.
    fn verify_webhook_signature(&self, body: &[u8], signature: &str) -> bool;
}
