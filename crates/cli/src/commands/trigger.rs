use capmodel_core::AppConfig;
use capmodel_sheets::trigger_generation;

use super::{CommandResult, EXIT_CONFIG, EXIT_SHEETS};

const COMMAND: &str = "trigger";

pub async fn run(config: &AppConfig, webhook_url: Option<String>) -> CommandResult {
    let Some(url) = webhook_url.or_else(|| config.webhook.url.clone()) else {
        return CommandResult::failure(
            COMMAND,
            "config_validation",
            "no webhook url configured (pass --webhook-url or set CAPMODEL_WEBHOOK_URL)",
            EXIT_CONFIG,
        );
    };

    match trigger_generation(&url).await {
        Ok(()) => CommandResult::success(COMMAND, "capacity model generation triggered"),
        Err(error) => CommandResult::failure(COMMAND, "webhook", error.to_string(), EXIT_SHEETS),
    }
}
