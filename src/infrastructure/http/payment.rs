//! Payment hand-off for `402 Payment Required` responses.
//!
//! The client does not speak any payment protocol itself. It passes the
//! server's requirements to a [`PaymentProvider`] and sends back whatever
//! header value the provider produces.

use crate::domain::error::MemctlResult;
use async_trait::async_trait;
use base64::Engine;
use serde_json::{json, Value};

/// Produces the `X-PAYMENT` header for a payment challenge
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    async fn authorize(&self, requirements: &Value) -> MemctlResult<String>;
}

/// Pays with a pre-issued token from the config file or environment
pub struct TokenPayment {
    token: String,
}

impl TokenPayment {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl PaymentProvider for TokenPayment {
    async fn authorize(&self, requirements: &Value) -> MemctlResult<String> {
        // Servers list acceptable schemes under `accepts`; answer the first.
        let accepted = requirements
            .get("accepts")
            .and_then(|accepts| accepts.get(0))
            .cloned()
            .unwrap_or(Value::Null);

        let envelope = json!({
            "token": self.token,
            "requirements": accepted,
        });
        Ok(base64::engine::general_purpose::STANDARD.encode(serde_json::to_vec(&envelope)?))
    }
}
