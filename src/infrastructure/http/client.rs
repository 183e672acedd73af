use crate::domain::{
    config::{ApiConfig, PaymentConfig},
    error::{MemctlError, MemctlResult},
};
use crate::infrastructure::http::payment::{PaymentProvider, TokenPayment};
use reqwest::{Method, StatusCode, Url};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

pub const PAYMENT_HEADER: &str = "X-PAYMENT";
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Query string pairs
pub type Query<'a> = [(&'a str, String)];

/// Client for the memory service REST API
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: Option<String>,
    timeout: Duration,
    payment: Option<Arc<dyn PaymentProvider>>,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> MemctlResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| MemctlError::config(format!("Invalid API URL '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(MemctlError::config(format!("Invalid API URL '{}'", base_url)));
        }

        let http = reqwest::Client::builder()
            .user_agent(concat!("memctl/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url,
            api_key: None,
            timeout,
            payment: None,
        })
    }

    /// Build a client from the `[api]` and `[payment]` config sections
    pub fn from_config(api: &ApiConfig, payment: &PaymentConfig) -> MemctlResult<Self> {
        let mut client = Self::new(&api.url, Duration::from_millis(api.timeout_ms))?;
        if let Some(key) = &api.key {
            client = client.with_api_key(key.clone());
        }
        if let Some(token) = &payment.token {
            client = client.with_payment(Arc::new(TokenPayment::new(token.clone())));
        }
        Ok(client)
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_payment(mut self, provider: Arc<dyn PaymentProvider>) -> Self {
        self.payment = Some(provider);
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn get(&self, segments: &[&str], query: &Query<'_>) -> MemctlResult<Value> {
        self.request(Method::GET, segments, query, None).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, segments: &[&str], body: &B) -> MemctlResult<Value> {
        let body = serde_json::to_value(body)?;
        self.request(Method::POST, segments, &[], Some(body)).await
    }

    pub async fn patch<B: Serialize + ?Sized>(&self, segments: &[&str], body: &B) -> MemctlResult<Value> {
        let body = serde_json::to_value(body)?;
        self.request(Method::PATCH, segments, &[], Some(body)).await
    }

    pub async fn delete(&self, segments: &[&str]) -> MemctlResult<Value> {
        self.request(Method::DELETE, segments, &[], None).await
    }

    /// Send a request; a `402` is answered through the payment provider and
    /// retried exactly once.
    pub async fn request(
        &self,
        method: Method,
        segments: &[&str],
        query: &Query<'_>,
        body: Option<Value>,
    ) -> MemctlResult<Value> {
        let url = self.endpoint(segments)?;
        let (status, bytes) = self.send(&method, &url, query, body.as_ref(), None).await?;

        if status != StatusCode::PAYMENT_REQUIRED {
            return into_value(status, &bytes);
        }

        let Some(provider) = &self.payment else {
            return Err(MemctlError::PaymentRequired(error_message(status, &bytes)));
        };

        info!("Payment required for {} {}, retrying with payment", method, url.path());
        let requirements = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        let header = provider.authorize(&requirements).await?;

        let (status, bytes) = self
            .send(&method, &url, query, body.as_ref(), Some(&header))
            .await?;
        if status == StatusCode::PAYMENT_REQUIRED {
            return Err(MemctlError::PaymentRequired(error_message(status, &bytes)));
        }
        into_value(status, &bytes)
    }

    /// `base_url` + percent-encoded path segments
    pub fn endpoint(&self, segments: &[&str]) -> MemctlResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| MemctlError::config(format!("Invalid API URL '{}'", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(
        &self,
        method: &Method,
        url: &Url,
        query: &Query<'_>,
        body: Option<&Value>,
        payment: Option<&str>,
    ) -> MemctlResult<(StatusCode, Vec<u8>)> {
        let request_id = Uuid::new_v4().to_string();
        let mut request = self
            .http
            .request(method.clone(), url.clone())
            .header(REQUEST_ID_HEADER, &request_id);

        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        if let Some(payment) = payment {
            request = request.header(PAYMENT_HEADER, payment);
        }

        debug!("{} {} (request {})", method, url, request_id);

        // Dropping the future on timeout cancels the in-flight call.
        let exchange = async {
            let response = request.send().await?;
            let status = response.status();
            let bytes = response.bytes().await?;
            Ok::<_, reqwest::Error>((status, bytes.to_vec()))
        };
        let (status, bytes) = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| MemctlError::Timeout(self.timeout))??;

        debug!("{} {} -> {}", method, url.path(), status);
        Ok((status, bytes))
    }
}

/// Map a finished exchange to a JSON value or an error
fn into_value(status: StatusCode, bytes: &[u8]) -> MemctlResult<Value> {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(MemctlError::Unauthorized(error_message(status, bytes)));
    }
    if !status.is_success() {
        return Err(MemctlError::Api {
            status: status.as_u16(),
            message: error_message(status, bytes),
        });
    }

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned())))
}

/// Best human-readable message from an error body
fn error_message(status: StatusCode, bytes: &[u8]) -> String {
    if let Ok(body) = serde_json::from_slice::<Value>(bytes) {
        for key in ["error", "message"] {
            match body.get(key) {
                Some(Value::String(message)) => return message.clone(),
                Some(Value::Object(inner)) => {
                    if let Some(Value::String(message)) = inner.get("message") {
                        return message.clone();
                    }
                }
                _ => {}
            }
        }
    }

    let text = String::from_utf8_lossy(bytes);
    let text = text.trim();
    if !text.is_empty() {
        return text.to_string();
    }
    status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string()
}
