use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::errors::ClientError;
use crate::wire_models::{MeterRecord, PremiseRecord};

/// Date format used by every date field of the account API.
pub const API_DATE_FORMAT: &str = "%Y-%m-%d";

// ============ Credentials ============

/// How the customer paid their last utility bill; part of the validation
/// challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LastPaymentMethod {
    NotApplicable,
    PreAuthorized,
    MailInCheque,
    InPerson,
    BankPayment,
    PaymentDropBox,
}

impl LastPaymentMethod {
    /// Code sent in the `LAST_PAYMENT_METHOD` field.
    pub fn code(&self) -> &'static str {
        match self {
            LastPaymentMethod::NotApplicable => "0",
            LastPaymentMethod::PreAuthorized => "1",
            LastPaymentMethod::MailInCheque => "2",
            LastPaymentMethod::InPerson => "3",
            LastPaymentMethod::BankPayment => "4",
            LastPaymentMethod::PaymentDropBox => "5",
        }
    }
}

impl fmt::Display for LastPaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LastPaymentMethod::NotApplicable => "N/A",
            LastPaymentMethod::PreAuthorized => "Pre-Authorized",
            LastPaymentMethod::MailInCheque => "Mail-In Cheque",
            LastPaymentMethod::InPerson => "In-Person",
            LastPaymentMethod::BankPayment => "Bank Payment",
            LastPaymentMethod::PaymentDropBox => "Payment Drop Box",
        };
        f.write_str(label)
    }
}

impl FromStr for LastPaymentMethod {
    type Err = ClientError;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        match code.trim() {
            "0" => Ok(LastPaymentMethod::NotApplicable),
            "1" => Ok(LastPaymentMethod::PreAuthorized),
            "2" => Ok(LastPaymentMethod::MailInCheque),
            "3" => Ok(LastPaymentMethod::InPerson),
            "4" => Ok(LastPaymentMethod::BankPayment),
            "5" => Ok(LastPaymentMethod::PaymentDropBox),
            other => Err(ClientError::Config(format!(
                "unknown last payment method code '{}' (expected 0-5)",
                other
            ))),
        }
    }
}

/// Customer credentials as printed on the utility bill.
#[derive(Clone)]
pub struct Credentials {
    account_number: String,
    client_number: String,
    account_number_full: String,
    last_name: String,
    postal_code: String,
    last_payment_method: LastPaymentMethod,
}

impl Credentials {
    pub fn new(
        account_number: impl Into<String>,
        client_number: impl Into<String>,
        last_name: impl Into<String>,
        postal_code: impl Into<String>,
        last_payment_method: LastPaymentMethod,
    ) -> Self {
        let account_number = account_number.into();
        let client_number = client_number.into();
        let account_number_full = full_account_number(&account_number, &client_number);
        Self {
            account_number,
            client_number,
            account_number_full,
            last_name: last_name.into(),
            postal_code: postal_code.into(),
            last_payment_method,
        }
    }

    pub fn account_number(&self) -> &str {
        &self.account_number
    }

    pub fn client_number(&self) -> &str {
        &self.client_number
    }

    /// `accountNumber-clientNumber`, the identifier every endpoint expects.
    pub fn account_number_full(&self) -> &str {
        &self.account_number_full
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn postal_code(&self) -> &str {
        &self.postal_code
    }

    pub fn last_payment_method(&self) -> LastPaymentMethod {
        self.last_payment_method
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("account_number_full", &self.account_number_full)
            .field("last_name", &"[REDACTED]")
            .field("postal_code", &"[REDACTED]")
            .field("last_payment_method", &self.last_payment_method)
            .finish()
    }
}

/// Joins account and client numbers the way the API expects.
pub fn full_account_number(account_number: &str, client_number: &str) -> String {
    format!("{}-{}", account_number, client_number)
}

/// Short-lived token returned by `/validate`.
#[derive(Clone, PartialEq, Eq)]
pub struct RefToken(String);

impl RefToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for RefToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RefToken([REDACTED])")
    }
}

// ============ Account details ============

/// Parsed `/accountdetails` response.
#[derive(Debug, Clone)]
pub struct AccountDetails {
    pub account: Value,
    pub account_type: Value,
    pub premises: Vec<Premise>,
}

/// A service address on the account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Premise {
    premise_id: String,
    address: Option<String>,
    addr_num: Option<String>,
    addr_suf: Option<String>,
    addr_name: Option<String>,
    addr_city: Option<String>,
    addr_state: Option<String>,
    addr_zip: Option<String>,
    ward: Option<String>,
    meters: Vec<Meter>,
}

impl Premise {
    pub fn premise_id(&self) -> &str {
        &self.premise_id
    }

    /// Full address line as formatted by the server.
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    pub fn addr_num(&self) -> Option<&str> {
        self.addr_num.as_deref()
    }

    pub fn addr_suf(&self) -> Option<&str> {
        self.addr_suf.as_deref()
    }

    pub fn addr_name(&self) -> Option<&str> {
        self.addr_name.as_deref()
    }

    pub fn addr_city(&self) -> Option<&str> {
        self.addr_city.as_deref()
    }

    pub fn addr_state(&self) -> Option<&str> {
        self.addr_state.as_deref()
    }

    pub fn addr_zip(&self) -> Option<&str> {
        self.addr_zip.as_deref()
    }

    pub fn ward(&self) -> Option<&str> {
        self.ward.as_deref()
    }

    /// Meters in server order.
    pub fn meters(&self) -> &[Meter] {
        &self.meters
    }
}

impl TryFrom<PremiseRecord> for Premise {
    type Error = ClientError;

    fn try_from(record: PremiseRecord) -> Result<Self, Self::Error> {
        let meters = record
            .meter_list
            .into_iter()
            .map(Meter::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            premise_id: record.premise_id,
            address: record.address,
            addr_num: record.addr_num,
            addr_suf: record.addr_suf,
            addr_name: record.addr_name,
            addr_city: record.addr_city,
            addr_state: record.addr_state,
            addr_zip: record.addr_zip,
            ward: record.ward,
            meters,
        })
    }
}

/// A water meter installed at a premise.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Meter {
    miu: String,
    meter_size: Option<String>,
    meter_number: String,
    interval_mins: u32,
    meter_class: Option<String>,
    meter_install_date: NaiveDate,
    meter_manufacturer_type: Option<String>,
    first_read_date: NaiveDate,
    last_read_date: NaiveDate,
    last_reading: f64,
    unit_of_measure: Option<String>,
}

impl Meter {
    /// Meter interface unit id.
    pub fn miu(&self) -> &str {
        &self.miu
    }

    pub fn meter_size(&self) -> Option<&str> {
        self.meter_size.as_deref()
    }

    /// Serial number printed on the device.
    pub fn meter_number(&self) -> &str {
        &self.meter_number
    }

    pub fn interval_mins(&self) -> u32 {
        self.interval_mins
    }

    pub fn meter_class(&self) -> Option<&str> {
        self.meter_class.as_deref()
    }

    pub fn meter_install_date(&self) -> NaiveDate {
        self.meter_install_date
    }

    pub fn meter_manufacturer_type(&self) -> Option<&str> {
        self.meter_manufacturer_type.as_deref()
    }

    pub fn first_read_date(&self) -> NaiveDate {
        self.first_read_date
    }

    pub fn last_read_date(&self) -> NaiveDate {
        self.last_read_date
    }

    pub fn last_reading(&self) -> f64 {
        self.last_reading
    }

    pub fn unit_of_measure(&self) -> Option<&str> {
        self.unit_of_measure.as_deref()
    }
}

impl TryFrom<MeterRecord> for Meter {
    type Error = ClientError;

    fn try_from(record: MeterRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            interval_mins: parse_interval_mins(&record.interval_mins)?,
            meter_install_date: parse_api_date("meterInstallDate", &record.meter_install_date)?,
            first_read_date: parse_api_date("firstReadDate", &record.first_read_date)?,
            last_read_date: parse_api_date("lastReadDate", &record.last_read_date)?,
            last_reading: parse_reading(&record.last_reading)?,
            miu: record.miu,
            meter_size: record.meter_size,
            meter_number: record.meter_number,
            meter_class: record.meter_class,
            meter_manufacturer_type: record.meter_manufacturer_type,
            unit_of_measure: record.unit_of_measure,
        })
    }
}

// ============ Field conversion ============

fn conversion_error(field: &'static str, value: &Value, reason: impl Into<String>) -> ClientError {
    let value = match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    };
    ClientError::Conversion {
        field,
        value,
        reason: reason.into(),
    }
}

/// Parses a `YYYY-MM-DD` date field.
pub fn parse_api_date(field: &'static str, value: &Value) -> Result<NaiveDate, ClientError> {
    let text = value
        .as_str()
        .ok_or_else(|| conversion_error(field, value, "expected a date string"))?;
    NaiveDate::parse_from_str(text, API_DATE_FORMAT)
        .map_err(|e| conversion_error(field, value, format!("expected YYYY-MM-DD: {}", e)))
}

/// Parses `intervalMins`, sent either as an integer or as a numeric string.
///
/// Stricter than a plain integer cast: negative and fractional values are
/// rejected instead of being accepted or truncated.
pub fn parse_interval_mins(value: &Value) -> Result<u32, ClientError> {
    const FIELD: &str = "intervalMins";
    match value {
        Value::Number(n) => n
            .as_u64()
            .and_then(|mins| u32::try_from(mins).ok())
            .ok_or_else(|| conversion_error(FIELD, value, "expected a whole number of minutes")),
        Value::String(text) => text
            .trim()
            .parse::<u32>()
            .map_err(|e| conversion_error(FIELD, value, e.to_string())),
        _ => Err(conversion_error(FIELD, value, "expected a number")),
    }
}

/// Parses `lastReading`, sent either as a number or as a numeric string.
pub fn parse_reading(value: &Value) -> Result<f64, ClientError> {
    const FIELD: &str = "lastReading";
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| conversion_error(FIELD, value, "not representable as f64")),
        Value::String(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|e| conversion_error(FIELD, value, e.to_string())),
        _ => Err(conversion_error(FIELD, value, "expected a number")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn meter_record(overrides: Value) -> MeterRecord {
        let mut base = json!({
            "miu": "MIU-1",
            "meterSize": "5/8",
            "meterNumber": "SN-1",
            "intervalMins": "60",
            "meterClass": "RES",
            "meterInstallDate": "2015-06-01",
            "meterManufacturerType": "Sensus",
            "firstReadDate": "2015-06-02",
            "lastReadDate": "2024-03-31",
            "lastReading": "1234.56",
            "unitofMeasure": "m3"
        });
        if let (Some(base), Some(overrides)) = (base.as_object_mut(), overrides.as_object()) {
            for (key, value) in overrides {
                base.insert(key.clone(), value.clone());
            }
        }
        serde_json::from_value(base).unwrap()
    }

    #[test]
    fn test_full_account_number() {
        assert_eq!(full_account_number("123", "456"), "123-456");
        let creds = Credentials::new(
            "000000000",
            "000000000-00",
            "Doe",
            "M1M 1M1",
            LastPaymentMethod::BankPayment,
        );
        assert_eq!(creds.account_number_full(), "000000000-000000000-00");
    }

    #[test]
    fn test_last_payment_method_codes() {
        for code in ["0", "1", "2", "3", "4", "5"] {
            let method: LastPaymentMethod = code.parse().unwrap();
            assert_eq!(method.code(), code);
        }
        assert_eq!("4".parse::<LastPaymentMethod>().unwrap().to_string(), "Bank Payment");
        assert!("6".parse::<LastPaymentMethod>().is_err());
        assert!("".parse::<LastPaymentMethod>().is_err());
    }

    #[test]
    fn test_debug_output_redacts_secrets() {
        let creds = Credentials::new("1", "2", "Secretname", "A1A 1A1", LastPaymentMethod::InPerson);
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("Secretname"));
        assert!(!debug.contains("A1A 1A1"));

        let token = RefToken::new("abc123");
        assert!(!format!("{:?}", token).contains("abc123"));
    }

    #[test]
    fn test_meter_conversion() {
        let meter = Meter::try_from(meter_record(json!({}))).unwrap();
        assert_eq!(meter.miu(), "MIU-1");
        assert_eq!(meter.interval_mins(), 60);
        assert_eq!(
            meter.meter_install_date(),
            NaiveDate::from_ymd_opt(2015, 6, 1).unwrap()
        );
        assert_eq!(
            meter.last_read_date(),
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap()
        );
        assert_eq!(meter.last_reading(), 1234.56);
        assert_eq!(meter.unit_of_measure(), Some("m3"));
    }

    #[test]
    fn test_meter_accepts_json_numbers() {
        let meter =
            Meter::try_from(meter_record(json!({"intervalMins": 15, "lastReading": 42.5}))).unwrap();
        assert_eq!(meter.interval_mins(), 15);
        assert_eq!(meter.last_reading(), 42.5);
    }

    #[test]
    fn test_malformed_date_fails_conversion() {
        let err = Meter::try_from(meter_record(json!({"firstReadDate": "2020/01/01"}))).unwrap_err();
        match err {
            ClientError::Conversion { field, value, .. } => {
                assert_eq!(field, "firstReadDate");
                assert_eq!(value, "2020/01/01");
            }
            other => panic!("expected conversion error, got {:?}", other),
        }
    }

    #[test]
    fn test_non_numeric_reading_fails_conversion() {
        let err = Meter::try_from(meter_record(json!({"lastReading": "n/a"}))).unwrap_err();
        assert!(matches!(
            err,
            ClientError::Conversion { field: "lastReading", .. }
        ));
    }

    #[test]
    fn test_fractional_interval_is_rejected() {
        assert!(parse_interval_mins(&json!(15.5)).is_err());
        assert!(parse_interval_mins(&json!(-1)).is_err());
        assert!(parse_interval_mins(&json!(null)).is_err());
        assert_eq!(parse_interval_mins(&json!(" 30 ")).unwrap(), 30);
    }

    #[test]
    fn test_null_date_is_rejected() {
        assert!(parse_api_date("lastReadDate", &json!(null)).is_err());
        assert!(parse_api_date("lastReadDate", &json!("2024-02-30")).is_err());
    }

    #[test]
    fn test_meter_serializes_dates_as_api_strings() {
        let meter = Meter::try_from(meter_record(json!({}))).unwrap();
        let value = serde_json::to_value(&meter).unwrap();
        assert_eq!(value["meter_install_date"], json!("2015-06-01"));
        assert_eq!(value["last_read_date"], json!("2024-03-31"));
        assert_eq!(value["last_reading"], json!(1234.56));
        assert_eq!(value["interval_mins"], json!(60));
    }

    #[test]
    fn test_premise_keeps_meter_order() {
        let record: PremiseRecord = serde_json::from_value(json!({
            "premiseId": "P1",
            "address": "1 MAIN ST",
            "addrNum": "1",
            "addrSuf": null,
            "addrName": "MAIN ST",
            "addrCity": "TORONTO",
            "addrState": "ON",
            "addrZip": "M1M 1M1",
            "ward": "3",
            "meterList": [
                {
                    "miu": "A", "meterSize": null, "meterNumber": "1", "intervalMins": 60,
                    "meterClass": null, "meterInstallDate": "2020-01-01",
                    "meterManufacturerType": null, "firstReadDate": "2020-01-01",
                    "lastReadDate": "2020-01-02", "lastReading": "1", "unitofMeasure": null
                },
                {
                    "miu": "B", "meterSize": null, "meterNumber": "2", "intervalMins": 60,
                    "meterClass": null, "meterInstallDate": "2020-01-01",
                    "meterManufacturerType": null, "firstReadDate": "2020-01-01",
                    "lastReadDate": "2020-01-02", "lastReading": "2", "unitofMeasure": null
                }
            ]
        }))
        .unwrap();

        let premise = Premise::try_from(record).unwrap();
        let mius: Vec<&str> = premise.meters().iter().map(|m| m.miu()).collect();
        assert_eq!(mius, vec!["A", "B"]);
        assert_eq!(premise.addr_suf(), None);
    }
}
