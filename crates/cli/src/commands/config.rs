use capmodel_core::{AppConfig, LogFormat};
use secrecy::ExposeSecret;
use serde_json::json;

use super::CommandResult;

const COMMAND: &str = "config";

/// Effective configuration with secrets redacted.
pub fn run(config: &AppConfig) -> CommandResult {
    let token_state = if config.sheets.access_token.expose_secret().trim().is_empty() {
        "unset"
    } else {
        "redacted"
    };

    let data = json!({
        "sheets": {
            "spreadsheet_id": config.sheets.spreadsheet_id,
            "access_token": token_state,
            "base_url": config.sheets.base_url,
            "timeout_secs": config.sheets.timeout_secs,
        },
        "model": {
            "sales_sheet": config.model.sales_sheet,
            "matrix_sheet": config.model.matrix_sheet,
            "projection_sheet": config.model.projection_sheet,
            "summary_sheet": config.model.summary_sheet,
            "domestic_country": config.model.domestic_country,
        },
        "webhook": { "url": config.webhook.url },
        "logging": {
            "level": config.logging.level,
            "format": match config.logging.format {
                LogFormat::Compact => "compact",
                LogFormat::Pretty => "pretty",
                LogFormat::Json => "json",
            },
        },
    });

    CommandResult::success_with_data(COMMAND, "effective configuration", Some(data))
}
