use capmodel_core::AppConfig;
use secrecy::ExposeSecret;
use serde_json::json;

use super::CommandResult;

const COMMAND: &str = "doctor";

/// Readiness checks: configuration shape plus spreadsheet credentials.
pub fn run(config: &AppConfig) -> CommandResult {
    let checks = vec![
        check("config_valid", config.validate().is_ok(), "configuration validates"),
        check(
            "spreadsheet_id",
            !config.sheets.spreadsheet_id.trim().is_empty(),
            "sheets.spreadsheet_id is set",
        ),
        check(
            "access_token",
            !config.sheets.access_token.expose_secret().trim().is_empty(),
            "sheets.access_token is set",
        ),
        check("webhook_url", config.webhook.url.is_some(), "webhook.url is configured (optional)"),
    ];

    // The webhook is optional; only the first three checks gate readiness.
    let ready = checks.iter().take(3).all(|entry| entry["ok"] == true);
    let data = json!({ "ready": ready, "checks": checks });

    if ready {
        CommandResult::success_with_data(COMMAND, "ready", Some(data))
    } else {
        let mut result = CommandResult::success_with_data(COMMAND, "not ready", Some(data));
        result.exit_code = 1;
        result
    }
}

fn check(name: &str, ok: bool, detail: &str) -> serde_json::Value {
    json!({ "name": name, "ok": ok, "detail": detail })
}
