use serde::{Deserialize, Serialize};

/// memctl configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemctlConfig {
    /// Remote API settings
    #[serde(default)]
    pub api: ApiConfig,
    /// Defaults applied to parsed arguments
    #[serde(default)]
    pub defaults: DefaultsConfig,
    /// Logging settings
    #[serde(default)]
    pub log: LogConfig,
    /// Payment settings
    #[serde(default)]
    pub payment: PaymentConfig,
}

/// Remote API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the memory service
    #[serde(default = "default_api_url")]
    pub url: String,
    /// API key sent as a bearer token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Request timeout in milliseconds
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,
}

/// Defaults for command flags
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Payment settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentConfig {
    /// Pre-issued payment token handed over on `402` responses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

// Default value functions
fn default_api_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_timeout() -> u64 {
    30_000
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: default_api_url(),
            key: None,
            timeout_ms: default_timeout(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl MemctlConfig {
    /// Overlay `other` on top of `self`; set values in `other` win.
    pub fn merge(mut self, other: MemctlConfig) -> Self {
        let defaults_api = ApiConfig::default();
        if other.api.url != defaults_api.url {
            self.api.url = other.api.url;
        }
        if other.api.key.is_some() {
            self.api.key = other.api.key;
        }
        if other.api.timeout_ms != defaults_api.timeout_ms {
            self.api.timeout_ms = other.api.timeout_ms;
        }
        if other.defaults.namespace.is_some() {
            self.defaults.namespace = other.defaults.namespace;
        }
        if other.defaults.format.is_some() {
            self.defaults.format = other.defaults.format;
        }
        if other.defaults.limit.is_some() {
            self.defaults.limit = other.defaults.limit;
        }
        if other.log.level != default_log_level() {
            self.log.level = other.log.level;
        }
        if other.payment.token.is_some() {
            self.payment.token = other.payment.token;
        }
        self
    }

    /// Apply `MEMCTL_*` environment overrides.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    pub(crate) fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("MEMCTL_API_URL").filter(|v| !v.is_empty()) {
            self.api.url = url;
        }
        if let Some(key) = lookup("MEMCTL_API_KEY").filter(|v| !v.is_empty()) {
            self.api.key = Some(key);
        }
        if let Some(token) = lookup("MEMCTL_PAYMENT_TOKEN").filter(|v| !v.is_empty()) {
            self.payment.token = Some(token);
        }
    }
}
