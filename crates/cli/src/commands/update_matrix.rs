use std::fs;
use std::path::Path;

use capmodel_core::{AppConfig, RoleRule, RuleSet};
use capmodel_sheets::{model, SheetsApi};

use super::{build_client, CommandResult, EXIT_CONFIG, EXIT_SHEETS};

const COMMAND: &str = "update-matrix";

pub async fn run(config: &AppConfig, criteria_path: &Path) -> CommandResult {
    let client = match build_client(COMMAND, config) {
        Ok(client) => client,
        Err(result) => return result,
    };
    run_with(&client, config, criteria_path).await
}

pub async fn run_with(
    api: &dyn SheetsApi,
    config: &AppConfig,
    criteria_path: &Path,
) -> CommandResult {
    let rules = match load_criteria(criteria_path) {
        Ok(rules) => rules,
        Err(message) => {
            return CommandResult::failure(COMMAND, "criteria_file", message, EXIT_CONFIG)
        }
    };

    match model::update_rule_set(api, &config.model, &rules).await {
        Ok(updated_cells) => CommandResult::success(
            COMMAND,
            format!("matrix updated: {} rules, {updated_cells} cells", rules.len()),
        ),
        Err(error) => CommandResult::failure(COMMAND, "sheets", error.to_string(), EXIT_SHEETS),
    }
}

/// Criteria files are a JSON array of role rules; band bounds may be omitted
/// (legacy two-field form) and default to the open band.
fn load_criteria(path: &Path) -> Result<RuleSet, String> {
    let raw = fs::read_to_string(path)
        .map_err(|error| format!("could not read criteria file `{}`: {error}", path.display()))?;
    let rules: Vec<RoleRule> = serde_json::from_str(&raw)
        .map_err(|error| format!("could not parse criteria file `{}`: {error}", path.display()))?;

    if rules.is_empty() {
        return Err(format!("criteria file `{}` contains no rules", path.display()));
    }

    Ok(RuleSet::new(rules))
}
