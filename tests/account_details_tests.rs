/// Unit tests for account details decoding
/// Tests the wire-to-model conversion on a realistic response document
use chrono::NaiveDate;
use my_water_toronto::wire_models::AccountDetailsResponse;
use my_water_toronto::{ClientError, Premise};

const SAMPLE_DETAILS: &str = r#"{
    "account": "000123456-000654321-01",
    "accountType": "RES",
    "premiseList": [
        {
            "premiseId": "1019283",
            "address": "55 JOHN ST",
            "addrNum": "55",
            "addrSuf": "",
            "addrName": "JOHN ST",
            "addrCity": "TORONTO",
            "addrState": "ON",
            "addrZip": "M5V 3C6",
            "ward": 10,
            "meterList": [
                {
                    "miu": "1553948371",
                    "meterSize": "0.625",
                    "meterNumber": "19551732",
                    "intervalMins": "60",
                    "meterClass": "RESIDENTIAL",
                    "meterInstallDate": "2012-08-22",
                    "meterManufacturerType": "SENSUS",
                    "firstReadDate": "2012-08-23",
                    "lastReadDate": "2024-06-30",
                    "lastReading": "2861.43",
                    "unitofMeasure": "m3"
                }
            ]
        },
        {
            "premiseId": "1019284",
            "address": "57A JOHN ST",
            "addrNum": "57",
            "addrSuf": "A",
            "addrName": "JOHN ST",
            "addrCity": "TORONTO",
            "addrState": "ON",
            "addrZip": "M5V 3C6",
            "ward": 10,
            "meterList": []
        }
    ]
}"#;

fn decode(body: &str) -> Result<Vec<Premise>, ClientError> {
    let parsed: AccountDetailsResponse = serde_json::from_str(body)?;
    parsed
        .premise_list
        .into_iter()
        .map(Premise::try_from)
        .collect()
}

#[cfg(test)]
mod decoding_tests {
    use super::*;

    #[test]
    fn test_sample_document_decodes() {
        let premises = decode(SAMPLE_DETAILS).unwrap();
        assert_eq!(premises.len(), 2);

        let first = &premises[0];
        assert_eq!(first.premise_id(), "1019283");
        assert_eq!(first.addr_suf(), Some(""));
        assert_eq!(first.ward(), Some("10"));

        let meter = &first.meters()[0];
        assert_eq!(meter.miu(), "1553948371");
        assert_eq!(meter.meter_size(), Some("0.625"));
        assert_eq!(meter.interval_mins(), 60);
        assert_eq!(
            meter.meter_install_date(),
            NaiveDate::from_ymd_opt(2012, 8, 22).unwrap()
        );
        assert_eq!(meter.last_reading(), 2861.43);

        let second = &premises[1];
        assert_eq!(second.addr_suf(), Some("A"));
        assert!(second.meters().is_empty());
    }

    #[test]
    fn test_account_summary_kept_verbatim() {
        let parsed: AccountDetailsResponse = serde_json::from_str(SAMPLE_DETAILS).unwrap();
        assert_eq!(parsed.account, serde_json::json!("000123456-000654321-01"));
        assert_eq!(parsed.account_type, serde_json::json!("RES"));
    }
}

#[cfg(test)]
mod failure_tests {
    use super::*;

    #[test]
    fn test_bad_reading_rejects_document() {
        let body = SAMPLE_DETAILS.replace("\"2861.43\"", "\"not read\"");
        match decode(&body) {
            Err(ClientError::Conversion { field, value, .. }) => {
                assert_eq!(field, "lastReading");
                assert_eq!(value, "not read");
            }
            other => panic!("expected conversion error, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_install_date_rejects_document() {
        let body = SAMPLE_DETAILS.replace("2012-08-22", "22/08/2012");
        let err = decode(&body).unwrap_err();
        assert!(matches!(
            err,
            ClientError::Conversion {
                field: "meterInstallDate",
                ..
            }
        ));
        assert!(err.to_string().contains("22/08/2012"));
    }

    #[test]
    fn test_missing_meter_list_is_parse_error() {
        let body = SAMPLE_DETAILS.replace("\"meterList\": []", "\"meterLst\": []");
        assert!(matches!(decode(&body), Err(ClientError::Parse(_))));
    }

    #[test]
    fn test_non_json_body_is_parse_error() {
        assert!(matches!(
            decode("<html>maintenance</html>"),
            Err(ClientError::Parse(_))
        ));
    }
}
