use std::path::{Path, PathBuf};

use capmodel_core::AppConfig;
use capmodel_sheets::{default_export_filename, model, write_projection_csv, SheetsApi};
use serde_json::json;

use super::{build_client, CommandResult, EXIT_SHEETS};

const COMMAND: &str = "export";

pub async fn run(config: &AppConfig, output: Option<PathBuf>) -> CommandResult {
    let client = match build_client(COMMAND, config) {
        Ok(client) => client,
        Err(result) => return result,
    };
    run_with(&client, config, output).await
}

pub async fn run_with(
    api: &dyn SheetsApi,
    config: &AppConfig,
    output: Option<PathBuf>,
) -> CommandResult {
    let path = output.unwrap_or_else(|| PathBuf::from(default_export_filename()));

    let (aggregates, rules, _) = match model::run_model(api, &config.model).await {
        Ok(result) => result,
        Err(error) => {
            return CommandResult::failure(COMMAND, "sheets", error.to_string(), EXIT_SHEETS)
        }
    };

    match write_projection_csv(Path::new(&path), &aggregates, &rules) {
        Ok(()) => CommandResult::success_with_data(
            COMMAND,
            format!("projection exported to {}", path.display()),
            Some(json!({
                "path": path.display().to_string(),
                "rep_count": aggregates.len(),
            })),
        ),
        Err(error) => CommandResult::failure(COMMAND, "export", error.to_string(), 1),
    }
}
