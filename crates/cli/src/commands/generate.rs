use capmodel_core::AppConfig;
use capmodel_sheets::{model, SheetsApi};
use serde_json::json;

use super::{build_client, CommandResult, EXIT_SHEETS};

const COMMAND: &str = "generate";

pub async fn run(config: &AppConfig) -> CommandResult {
    let client = match build_client(COMMAND, config) {
        Ok(client) => client,
        Err(result) => return result,
    };
    run_with(&client, config).await
}

pub async fn run_with(api: &dyn SheetsApi, config: &AppConfig) -> CommandResult {
    match model::generate(api, &config.model).await {
        Ok(outcome) => CommandResult::success_with_data(
            COMMAND,
            format!(
                "capacity model written for {} sales reps ({} cells updated)",
                outcome.rep_count, outcome.updated_cells
            ),
            Some(json!({
                "rep_count": outcome.rep_count,
                "updated_cells": outcome.updated_cells,
            })),
        ),
        Err(error) => CommandResult::failure(COMMAND, "sheets", error.to_string(), EXIT_SHEETS),
    }
}
