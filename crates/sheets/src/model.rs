//! High-level capacity-model operations composed over any [`SheetsApi`]
//! implementation. The CLI commands are thin wrappers around these.

use capmodel_core::aggregate::aggregate;
use capmodel_core::config::ModelConfig;
use capmodel_core::domain::record::SalesRecord;
use capmodel_core::domain::report::{RepAggregate, SummaryReport};
use capmodel_core::domain::rules::RuleSet;
use tracing::info;

use crate::client::{SheetsApi, SheetsError};
use crate::matrix::{parse_rule_set, render_rule_set};
use crate::render::{projection_table, summary_table};
use crate::table::decode_records;

#[derive(Clone, Debug, PartialEq)]
pub struct GenerateOutcome {
    pub rep_count: u64,
    pub updated_cells: u64,
    pub summary: SummaryReport,
}

pub async fn load_rule_set(
    api: &dyn SheetsApi,
    model: &ModelConfig,
) -> Result<RuleSet, SheetsError> {
    let rows = api.get_values(&model.matrix_sheet).await?;
    Ok(parse_rule_set(&rows))
}

pub async fn load_records(
    api: &dyn SheetsApi,
    model: &ModelConfig,
) -> Result<Vec<SalesRecord>, SheetsError> {
    let rows = api.get_values(&model.sales_sheet).await?;
    if rows.is_empty() {
        return Err(SheetsError::EmptySheet(model.sales_sheet.clone()));
    }
    decode_records(&rows)
}

/// Run the whole pipeline against the configured sheets.
pub async fn run_model(
    api: &dyn SheetsApi,
    model: &ModelConfig,
) -> Result<(Vec<RepAggregate>, RuleSet, SummaryReport), SheetsError> {
    let rules = load_rule_set(api, model).await?;
    let records = load_records(api, model).await?;
    let (aggregates, summary) = aggregate(&records, &rules, &model.domestic_country);

    info!(
        reps = aggregates.len(),
        rows = records.len(),
        rules = rules.len(),
        "capacity model computed"
    );
    Ok((aggregates, rules, summary))
}

/// Run the pipeline and write the projection and summary sheets back.
pub async fn generate(
    api: &dyn SheetsApi,
    model: &ModelConfig,
) -> Result<GenerateOutcome, SheetsError> {
    let (aggregates, rules, summary) = run_model(api, model).await?;

    api.clear(&model.projection_sheet).await?;
    let mut updated_cells =
        api.update_values(&model.projection_sheet, &projection_table(&aggregates, &rules)).await?;

    api.clear(&model.summary_sheet).await?;
    updated_cells += api.update_values(&model.summary_sheet, &summary_table(&summary)).await?;

    Ok(GenerateOutcome { rep_count: aggregates.len() as u64, updated_cells, summary })
}

/// Replace the Matrix sheet with the given rule set.
pub async fn update_rule_set(
    api: &dyn SheetsApi,
    model: &ModelConfig,
    rules: &RuleSet,
) -> Result<u64, SheetsError> {
    api.clear(&model.matrix_sheet).await?;
    api.update_values(&model.matrix_sheet, &render_rule_set(rules)).await
}
