use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Request body for `POST /validate`.
#[derive(Debug, Clone, Serialize)]
pub struct ValidateRequest<'a> {
    #[serde(rename = "API_OP")]
    pub api_op: &'static str,
    #[serde(rename = "ACCOUNT_NUMBER")]
    pub account_number: &'a str,
    #[serde(rename = "LAST_NAME")]
    pub last_name: &'a str,
    #[serde(rename = "POSTAL_CODE")]
    pub postal_code: &'a str,
    #[serde(rename = "LAST_PAYMENT_METHOD")]
    pub last_payment_method: &'a str,
}

/// JSON-encoded operation descriptor passed in the `json` query parameter.
///
/// A struct rather than a map so `API_OP` serializes ahead of `ACCOUNT_NUMBER`.
#[derive(Debug, Clone, Serialize)]
pub struct OperationDescriptor<'a> {
    #[serde(rename = "API_OP")]
    pub api_op: &'static str,
    #[serde(rename = "ACCOUNT_NUMBER")]
    pub account_number: &'a str,
}

/// `POST /validate` success body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateResponse {
    pub validate_response: ValidateResponseInner,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateResponseInner {
    pub ref_token: String,
}

/// `GET /accountdetails` success body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDetailsResponse {
    /// Shape undocumented; kept verbatim.
    pub account: Value,
    /// Shape undocumented; kept verbatim.
    pub account_type: Value,
    pub premise_list: Vec<PremiseRecord>,
}

/// One entry of `premiseList`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PremiseRecord {
    #[serde(deserialize_with = "required_text")]
    pub premise_id: String,
    #[serde(deserialize_with = "nullable_text")]
    pub address: Option<String>,
    #[serde(deserialize_with = "nullable_text")]
    pub addr_num: Option<String>,
    #[serde(deserialize_with = "nullable_text")]
    pub addr_suf: Option<String>,
    #[serde(deserialize_with = "nullable_text")]
    pub addr_name: Option<String>,
    #[serde(deserialize_with = "nullable_text")]
    pub addr_city: Option<String>,
    #[serde(deserialize_with = "nullable_text")]
    pub addr_state: Option<String>,
    #[serde(deserialize_with = "nullable_text")]
    pub addr_zip: Option<String>,
    #[serde(deserialize_with = "nullable_text")]
    pub ward: Option<String>,
    pub meter_list: Vec<MeterRecord>,
}

/// One entry of `meterList`. Dates and numbers stay raw until
/// [`crate::models::Meter`] converts them.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeterRecord {
    #[serde(deserialize_with = "required_text")]
    pub miu: String,
    #[serde(deserialize_with = "nullable_text")]
    pub meter_size: Option<String>,
    #[serde(deserialize_with = "required_text")]
    pub meter_number: String,
    pub interval_mins: Value,
    #[serde(deserialize_with = "nullable_text")]
    pub meter_class: Option<String>,
    pub meter_install_date: Value,
    #[serde(deserialize_with = "nullable_text")]
    pub meter_manufacturer_type: Option<String>,
    pub first_read_date: Value,
    pub last_read_date: Value,
    pub last_reading: Value,
    /// The server spells this one `unitofMeasure`.
    #[serde(rename = "unitofMeasure", deserialize_with = "nullable_text")]
    pub unit_of_measure: Option<String>,
}

/// Text field that must be present; `null` is allowed. Numbers and booleans
/// are rendered as text since the server is not consistent about quoting.
fn nullable_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(text) => Ok(Some(text)),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        other => Err(serde::de::Error::custom(format!(
            "expected text, found {}",
            other
        ))),
    }
}

/// Text field that must be present and non-null.
fn required_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    nullable_text(deserializer)?
        .ok_or_else(|| serde::de::Error::custom("expected text, found null"))
}
