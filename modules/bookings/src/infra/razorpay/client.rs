use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use modkit::TracedClient;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::RazorpayConfig;
use crate::domain::ports::{
    GatewayError, GatewayOrder, GatewayPayment, GatewayRefund, OrderRequest, PaymentGateway,
};
use crate::domain::pricing::{from_minor_units, to_minor_units};
use crate::infra::razorpay::signature;

pub struct RazorpayGateway {
    http: TracedClient,
    base_url: String,
    key_id: String,
    key_secret: String,
    webhook_secret: String,
}

#[derive(Serialize)]
struct CreateOrderBody<'a> {
    amount: i64,
    currency: &'a str,
    receipt: &'a str,
    notes: &'a BTreeMap<String, String>,
    payment_capture: u8,
}

#[derive(Deserialize)]
struct OrderBody {
    id: String,
    amount: i64,
    currency: String,
}

#[derive(Deserialize)]
struct PaymentBody {
    id: String,
    #[serde(default)]
    order_id: Option<String>,
    amount: i64,
    currency: String,
    status: String,
    #[serde(default)]
    method: Option<String>,
}

#[derive(Deserialize)]
struct RefundBody {
    id: String,
    payment_id: String,
    amount: i64,
    status: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    description: String,
}

impl RazorpayGateway {
    pub fn new(cfg: &RazorpayConfig) -> anyhow::Result<Self> {
        let inner = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;
        if cfg.key_id.is_empty() || cfg.key_secret.is_empty() {
            tracing::warn!("razorpay credentials not configured; checkout will be rejected");
        }
        Ok(Self {
            http: TracedClient::new(inner),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            key_id: cfg.key_id.clone(),
            key_secret: cfg.key_secret.clone(),
            webhook_secret: cfg
                .webhook_secret
                .clone()
                .unwrap_or_else(|| cfg.key_secret.clone()),
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<T, GatewayError> {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self
            .http
            .request(method, &url)
            .basic_auth(&self.key_id, Some(&self.key_secret));
        if let Some(body) = body {
            builder = builder.json(&body);
        }
        let req = builder
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        let resp = self
            .http
            .execute(req)
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = resp.status();
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&bytes)
                .map(|b| b.error.description)
                .unwrap_or_else(|_| String::from_utf8_lossy(&bytes).into_owned());
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                message,
            });
        }
        serde_json::from_slice(&bytes).map_err(|e| GatewayError::Decode(e.to_string()))
    }
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    fn key_id(&self) -> &str {
        &self.key_id
    }

    async fn create_order(&self, req: OrderRequest) -> Result<GatewayOrder, GatewayError> {
        let body = serde_json::to_value(CreateOrderBody {
            amount: req.amount,
            currency: &req.currency,
            receipt: &req.receipt,
            notes: &req.notes,
            payment_capture: 1,
        })
        .map_err(|e| GatewayError::Decode(e.to_string()))?;
        let order: OrderBody = self.call(Method::POST, "/v1/orders", Some(body)).await?;
        tracing::debug!(order_id = %order.id, amount = order.amount, "order created");
        Ok(GatewayOrder {
            id: order.id,
            amount: order.amount,
            currency: order.currency,
        })
    }

    async fn fetch_payment(&self, payment_id: &str) -> Result<GatewayPayment, GatewayError> {
        let p: PaymentBody = self
            .call(Method::GET, &format!("/v1/payments/{payment_id}"), None)
            .await?;
        Ok(GatewayPayment {
            id: p.id,
            order_id: p.order_id,
            amount: from_minor_units(p.amount),
            currency: p.currency,
            status: p.status,
            method: p.method,
        })
    }

    async fn refund(
        &self,
        payment_id: &str,
        amount: Option<f64>,
    ) -> Result<GatewayRefund, GatewayError> {
        let body = match amount {
            Some(a) => json!({ "amount": to_minor_units(a) }),
            None => json!({}),
        };
        let r: RefundBody = self
            .call(
                Method::POST,
                &format!("/v1/payments/{payment_id}/refund"),
                Some(body),
            )
            .await?;
        Ok(GatewayRefund {
            id: r.id,
            payment_id: r.payment_id,
            amount: from_minor_units(r.amount),
            status: r.status,
        })
    }

    fn verify_payment_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool {
        let payload = signature::checkout_payload(order_id, payment_id);
        signature::verify(&self.key_secret, payload.as_bytes(), signature)
    }

    fn verify_webhook_signature(&self, body: &[u8], signature: &str) -> bool {
        signature::verify(&self.webhook_secret, body, signature)
    }
}
