//! The account aggregate: validate, then fetch.

use serde_json::Value;

use crate::client::WaterApiClient;
use crate::errors::{ClientError, ResultExt};
use crate::models::{Credentials, LastPaymentMethod, Premise, RefToken};

/// A validated MyWater Toronto account with its premises and meters.
///
/// Only obtainable through [`WaterAccount::connect`], which either returns a
/// fully populated account or an error.
pub struct WaterAccount {
    client: WaterApiClient,
    credentials: Credentials,
    ref_token: RefToken,
    account: Value,
    account_type: Value,
    premises: Vec<Premise>,
}

impl WaterAccount {
    /// Validates the credentials, then loads account details.
    pub async fn connect(
        client: WaterApiClient,
        credentials: Credentials,
    ) -> Result<Self, ClientError> {
        let account_id = credentials.account_number_full().to_string();

        let ref_token = client
            .validate(&credentials)
            .await
            .with_context(|| format!("Unable to validate account number {}", account_id))?;

        let details = client
            .account_details(&ref_token, &account_id)
            .await
            .with_context(|| {
                format!("Unable to get account details for account number {}", account_id)
            })?;

        Ok(Self {
            client,
            credentials,
            ref_token,
            account: details.account,
            account_type: details.account_type,
            premises: details.premises,
        })
    }

    /// Obtains a fresh reference token, replacing the current one. The
    /// current token is kept if validation fails.
    pub async fn revalidate(&mut self) -> Result<(), ClientError> {
        let token = self
            .client
            .validate(&self.credentials)
            .await
            .with_context(|| {
                format!(
                    "Unable to validate account number {}",
                    self.credentials.account_number_full()
                )
            })?;
        self.ref_token = token;
        Ok(())
    }

    /// Issues the consumption call with the current token and returns the
    /// raw response body.
    pub async fn fetch_consumption(&self) -> Result<Value, ClientError> {
        self.client
            .consumption(&self.ref_token, self.credentials.account_number_full())
            .await
            .with_context(|| {
                format!(
                    "Unable to get consumption data for account number {}",
                    self.credentials.account_number_full()
                )
            })
    }

    pub fn account_number(&self) -> &str {
        self.credentials.account_number()
    }

    pub fn client_number(&self) -> &str {
        self.credentials.client_number()
    }

    pub fn account_number_full(&self) -> &str {
        self.credentials.account_number_full()
    }

    pub fn last_name(&self) -> &str {
        self.credentials.last_name()
    }

    pub fn postal_code(&self) -> &str {
        self.credentials.postal_code()
    }

    pub fn last_payment_method(&self) -> LastPaymentMethod {
        self.credentials.last_payment_method()
    }

    pub fn ref_token(&self) -> &RefToken {
        &self.ref_token
    }

    /// `account` value from the details response, verbatim.
    pub fn account(&self) -> &Value {
        &self.account
    }

    /// `accountType` value from the details response, verbatim.
    pub fn account_type(&self) -> &Value {
        &self.account_type
    }

    /// Premises in server order.
    pub fn premises(&self) -> &[Premise] {
        &self.premises
    }
}

impl std::fmt::Debug for WaterAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WaterAccount")
            .field("credentials", &self.credentials)
            .field("ref_token", &self.ref_token)
            .field("account_type", &self.account_type)
            .field("premises", &self.premises.len())
            .finish()
    }
}
