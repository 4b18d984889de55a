use capmodel_core::AppConfig;
use capmodel_sheets::{model, SheetsApi};
use serde_json::json;

use super::{build_client, CommandResult, EXIT_SHEETS};

const COMMAND: &str = "insights";

pub async fn run(config: &AppConfig) -> CommandResult {
    let client = match build_client(COMMAND, config) {
        Ok(client) => client,
        Err(result) => return result,
    };
    run_with(&client, config).await
}

pub async fn run_with(api: &dyn SheetsApi, config: &AppConfig) -> CommandResult {
    match model::run_model(api, &config.model).await {
        Ok((_, _, summary)) => {
            let data = match serde_json::to_value(&summary) {
                Ok(value) => value,
                Err(error) => {
                    return CommandResult::failure(COMMAND, "serialization", error.to_string(), 1)
                }
            };
            CommandResult::success_with_data(
                COMMAND,
                format!(
                    "{} sales reps, {} classified projects",
                    summary.rep_count, summary.classified_rows
                ),
                Some(json!({ "summary": data })),
            )
        }
        Err(error) => CommandResult::failure(COMMAND, "sheets", error.to_string(), EXIT_SHEETS),
    }
}
