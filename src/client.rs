use crate::config::ClientConfig;
use crate::errors::ClientError;
use crate::models::{AccountDetails, Credentials, Premise, RefToken};
use crate::wire_models::{
    AccountDetailsResponse, OperationDescriptor, ValidateRequest, ValidateResponse,
};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Response, StatusCode};
use serde_json::Value;

/// Which side of the API a failing status belongs to.
#[derive(Debug, Clone, Copy)]
enum Step {
    Validate,
    Fetch,
}

/// Client for the MyWater Toronto account endpoints.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Clone)]
pub struct WaterApiClient {
    client: reqwest::Client,
    config: ClientConfig,
}

impl WaterApiClient {
    /// Creates a client with its own connection pool.
    ///
    /// # Arguments
    ///
    /// * `config` - Base URL and per-request timeout.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Creates a client on top of a caller-supplied `reqwest::Client`, so several
    /// accounts can share one pool. The configured timeout is still applied per
    /// request.
    pub fn with_http_client(client: reqwest::Client, config: ClientConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Validates the credentials and obtains a reference token.
    ///
    /// # Returns
    ///
    /// * `Result<RefToken, ClientError>` - The token, or `ValidationFailed`
    ///   carrying the HTTP status and server message.
    pub async fn validate(&self, credentials: &Credentials) -> Result<RefToken, ClientError> {
        let url = self.config.endpoint("validate");
        let payload = ValidateRequest {
            api_op: "VALIDATE",
            account_number: credentials.account_number_full(),
            last_name: credentials.last_name(),
            postal_code: credentials.postal_code(),
            last_payment_method: credentials.last_payment_method().code(),
        };

        tracing::info!(
            "Validating account {}",
            credentials.account_number_full()
        );
        tracing::debug!(
            "Validate payload: ACCOUNT_NUMBER={} LAST_NAME=[REDACTED] POSTAL_CODE=[REDACTED] LAST_PAYMENT_METHOD={}",
            payload.account_number,
            payload.last_payment_method
        );

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .timeout(self.config.timeout)
            .json(&payload)
            .send()
            .await?;

        let body = read_success_body(response, Step::Validate).await?;
        tracing::debug!("Validate response received ({} bytes)", body.len());

        let parsed: ValidateResponse = serde_json::from_str(&body).map_err(|e| {
            ClientError::Parse(format!("Failed to parse validate response: {}", e))
        })?;

        tracing::info!(
            "✓ Account {} validated",
            credentials.account_number_full()
        );
        Ok(RefToken::new(parsed.validate_response.ref_token))
    }

    /// Fetches account, premise and meter metadata.
    ///
    /// # Arguments
    ///
    /// * `token` - Reference token from [`WaterApiClient::validate`].
    /// * `account_number_full` - `accountNumber-clientNumber`.
    pub async fn account_details(
        &self,
        token: &RefToken,
        account_number_full: &str,
    ) -> Result<AccountDetails, ClientError> {
        tracing::info!("Fetching account details for {}", account_number_full);

        let body = self
            .fetch("accountdetails", "ACCOUNTDETAILS", token, account_number_full)
            .await?;
        tracing::debug!("Account details response: {}", body);

        let parsed: AccountDetailsResponse = serde_json::from_str(&body).map_err(|e| {
            ClientError::Parse(format!("Failed to parse account details response: {}", e))
        })?;

        let premises = parsed
            .premise_list
            .into_iter()
            .map(Premise::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let meter_count: usize = premises.iter().map(|p| p.meters().len()).sum();
        tracing::info!(
            "✓ Account {} has {} premise(s) and {} meter(s)",
            account_number_full,
            premises.len(),
            meter_count
        );

        Ok(AccountDetails {
            account: parsed.account,
            account_type: parsed.account_type,
            premises,
        })
    }

    /// Fetches consumption data. The response shape is undocumented, so the
    /// body is passed through: JSON bodies are returned parsed, any other body
    /// as `Value::String`, and an empty body as `Value::Null`.
    pub async fn consumption(
        &self,
        token: &RefToken,
        account_number_full: &str,
    ) -> Result<Value, ClientError> {
        tracing::info!("Fetching consumption for {}", account_number_full);

        let body = self
            .fetch("consumption", "CONSUMPTION", token, account_number_full)
            .await?;
        tracing::debug!("Consumption response: {}", body);

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        match serde_json::from_str::<Value>(&body) {
            Ok(json) => Ok(json),
            Err(_) => Ok(Value::String(body)),
        }
    }

    /// Issues a token-authorized GET against one of the data endpoints.
    async fn fetch(
        &self,
        endpoint: &str,
        api_op: &'static str,
        token: &RefToken,
        account_number_full: &str,
    ) -> Result<String, ClientError> {
        let url = self.config.endpoint(endpoint);
        let descriptor = serde_json::to_string(&OperationDescriptor {
            api_op,
            account_number: account_number_full,
        })?;

        // Redact token from logs to prevent credential exposure
        tracing::debug!("GET {}?refToken=[REDACTED]&json={}", url, descriptor);

        let response = self
            .client
            .get(&url)
            .query(&[("refToken", token.as_str()), ("json", descriptor.as_str())])
            .header(CONTENT_TYPE, "application/json")
            .timeout(self.config.timeout)
            .send()
            .await?;

        read_success_body(response, Step::Fetch).await
    }
}

/// Returns the body of a 200 response, or the step's error for any other status.
async fn read_success_body(response: Response, step: Step) -> Result<String, ClientError> {
    let status = response.status();
    let body = response.text().await?;

    if status == StatusCode::OK {
        return Ok(body);
    }

    tracing::error!("MyWater API returned error {}: {}", status, body);
    Err(match step {
        Step::Validate => ClientError::validation_failed(status, &body),
        Step::Fetch => ClientError::fetch_failed(status, &body),
    })
}
