use capmodel_core::AppConfig;
use capmodel_sheets::{model, SheetsApi};
use serde_json::json;

use super::{build_client, CommandResult, EXIT_SHEETS};

const COMMAND: &str = "matrix";

pub async fn run(config: &AppConfig) -> CommandResult {
    let client = match build_client(COMMAND, config) {
        Ok(client) => client,
        Err(result) => return result,
    };
    run_with(&client, config).await
}

pub async fn run_with(api: &dyn SheetsApi, config: &AppConfig) -> CommandResult {
    match model::load_rule_set(api, &config.model).await {
        Ok(rules) => {
            let data = match serde_json::to_value(rules.rules()) {
                Ok(value) => value,
                Err(error) => {
                    return CommandResult::failure(COMMAND, "serialization", error.to_string(), 1)
                }
            };
            CommandResult::success_with_data(
                COMMAND,
                format!("{} role rules active", rules.len()),
                Some(json!({ "rules": data })),
            )
        }
        Err(error) => CommandResult::failure(COMMAND, "sheets", error.to_string(), EXIT_SHEETS),
    }
}
