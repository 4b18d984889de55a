pub mod config;
pub mod doctor;
pub mod export;
pub mod generate;
pub mod insights;
pub mod matrix;
pub mod trigger;
pub mod update_matrix;

use serde::Serialize;
use serde_json::Value;

/// Exit code for configuration failures.
pub const EXIT_CONFIG: u8 = 2;
/// Exit code for spreadsheet-platform failures.
pub const EXIT_SHEETS: u8 = 3;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        Self::success_with_data(command, message, None)
    }

    pub fn success_with_data(
        command: &str,
        message: impl Into<String>,
        data: Option<Value>,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            data,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }
}

/// Refuse early when the config cannot reach the spreadsheet platform, then
/// hand back a ready client.
pub(crate) fn build_client(
    command: &str,
    config: &capmodel_core::AppConfig,
) -> Result<capmodel_sheets::SheetsClient, CommandResult> {
    if let Err(error) = config.validate_for_sheets_access() {
        return Err(CommandResult::failure(
            command,
            "config_validation",
            error.to_string(),
            EXIT_CONFIG,
        ));
    }

    capmodel_sheets::SheetsClient::new(&config.sheets).map_err(|error| {
        CommandResult::failure(command, "sheets_client", error.to_string(), EXIT_SHEETS)
    })
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}
