//! Fires the deployed Apps Script webhook that regenerates the capacity
//! model inside the spreadsheet.

use std::time::Duration;

use chrono::Utc;
use reqwest::StatusCode;
use serde_json::{json, Value};
use tracing::info;

use crate::client::SheetsError;

const TRIGGER_TIMEOUT: Duration = Duration::from_secs(30);

/// POST the generation trigger and require a `status: success` body.
pub async fn trigger_generation(url: &str) -> Result<(), SheetsError> {
    let client = reqwest::Client::builder().timeout(TRIGGER_TIMEOUT).build()?;

    let response = client.post(url).json(&trigger_payload()).send().await?;
    let status = response.status();
    let body = response.json::<Value>().await.unwrap_or(Value::Null);
    check_webhook_response(status, &body)?;

    info!(url, "capacity model generation triggered");
    Ok(())
}

fn trigger_payload() -> Value {
    json!({
        "action": "generate_capacity_model",
        "timestamp": Utc::now().to_rfc3339(),
    })
}

/// The webhook must answer with an HTTP success AND a `status: success`
/// body; a 200 carrying an error body still fails the trigger.
fn check_webhook_response(status: StatusCode, body: &Value) -> Result<(), SheetsError> {
    if !status.is_success() {
        return Err(SheetsError::Api { status: status.as_u16(), message: webhook_message(body) });
    }

    if body.get("status").and_then(Value::as_str) != Some("success") {
        return Err(SheetsError::Api { status: status.as_u16(), message: webhook_message(body) });
    }

    Ok(())
}

fn webhook_message(body: &Value) -> String {
    body.get("message")
        .and_then(Value::as_str)
        .unwrap_or("webhook did not report success")
        .to_string()
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;
    use reqwest::StatusCode;
    use serde_json::{json, Value};

    use crate::client::SheetsError;

    use super::{check_webhook_response, trigger_payload};

    #[test]
    fn payload_carries_action_and_rfc3339_timestamp() {
        let payload = trigger_payload();

        assert_eq!(payload["action"], "generate_capacity_model");
        let timestamp = payload["timestamp"].as_str().expect("timestamp is a string");
        assert!(
            DateTime::parse_from_rfc3339(timestamp).is_ok(),
            "timestamp should be RFC 3339: {timestamp}"
        );
        assert_eq!(payload.as_object().map(|fields| fields.len()), Some(2));
    }

    #[test]
    fn success_status_and_body_pass() {
        let body = json!({ "status": "success" });
        assert!(check_webhook_response(StatusCode::OK, &body).is_ok());
    }

    #[test]
    fn success_status_with_error_body_fails() {
        let body = json!({ "status": "error", "message": "script threw" });

        let error = check_webhook_response(StatusCode::OK, &body).expect_err("should fail");
        assert!(
            matches!(error, SheetsError::Api { status: 200, ref message } if message == "script threw")
        );
    }

    #[test]
    fn http_failure_status_fails_with_code() {
        let error =
            check_webhook_response(StatusCode::BAD_GATEWAY, &Value::Null).expect_err("should fail");
        assert!(matches!(
            error,
            SheetsError::Api { status: 502, ref message } if message == "webhook did not report success"
        ));
    }

    #[test]
    fn missing_status_field_fails() {
        let body = json!({ "ok": true });
        assert!(check_webhook_response(StatusCode::OK, &body).is_err());
    }
}
