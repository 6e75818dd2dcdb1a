use std::time::Duration;
use url::Url;

use crate::models::{Credentials, LastPaymentMethod};

/// Production endpoint of the City of Toronto water account service.
pub const DEFAULT_BASE_URL: &str = "https://secure.toronto.ca/cc_api/svcaccount_v1/WaterAccount";

/// Per-request timeout applied when none is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for [`crate::client::WaterApiClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: Url,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    /// Builds a config for an arbitrary base URL (e.g. a test server).
    pub fn with_base_url(base_url: &str) -> anyhow::Result<Self> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            ..Self::default()
        })
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// URL of a single endpoint below the base path.
    pub fn endpoint(&self, name: &str) -> String {
        format!("{}/{}", self.base_url.as_str().trim_end_matches('/'), name)
    }

    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let base_url = match std::env::var("MYWATER_BASE_URL") {
            Ok(url) if !url.trim().is_empty() => parse_base_url(url.trim())?,
            _ => parse_base_url(DEFAULT_BASE_URL)?,
        };

        let timeout_secs = match std::env::var("MYWATER_TIMEOUT_SECS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| {
                    anyhow::anyhow!("MYWATER_TIMEOUT_SECS must be a positive number of seconds")
                })?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        let config = Self {
            base_url,
            timeout: Duration::from_secs(timeout_secs),
        };

        tracing::info!("Client configuration loaded successfully");
        tracing::debug!("MyWater base URL: {}", config.base_url);
        tracing::debug!("Request timeout: {}s", timeout_secs);

        Ok(config)
    }
}

fn parse_base_url(raw: &str) -> anyhow::Result<Url> {
    let url = Url::parse(raw).map_err(|e| anyhow::anyhow!("Invalid base URL {}: {}", raw, e))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        anyhow::bail!("Base URL must start with http:// or https://");
    }
    Ok(url)
}

impl Credentials {
    /// Reads the account credentials from the environment (and `.env`).
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let last_payment_method: LastPaymentMethod = required_var("MYWATER_LAST_PAYMENT_METHOD")?
            .parse()
            .map_err(|e| anyhow::anyhow!("MYWATER_LAST_PAYMENT_METHOD: {}", e))?;

        let credentials = Credentials::new(
            required_var("MYWATER_ACCOUNT_NUMBER")?,
            required_var("MYWATER_CLIENT_NUMBER")?,
            required_var("MYWATER_LAST_NAME")?,
            required_var("MYWATER_POSTAL_CODE")?,
            last_payment_method,
        );

        // Never log the last name or postal code.
        tracing::debug!("Credentials loaded for account {}", credentials.account_number_full());
        Ok(credentials)
    }
}

fn required_var(name: &str) -> anyhow::Result<String> {
    std::env::var(name)
        .map_err(|_| anyhow::anyhow!("{} environment variable required", name))
        .and_then(|value| {
            if value.trim().is_empty() {
                anyhow::bail!("{} cannot be empty", name);
            }
            Ok(value.trim().to_string())
        })
}
