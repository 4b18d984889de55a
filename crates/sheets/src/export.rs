//! Delimited-text export of the projection table.

use std::path::Path;

use capmodel_core::domain::report::RepAggregate;
use capmodel_core::domain::rules::RuleSet;
use chrono::Utc;
use tracing::info;

use crate::client::SheetsError;
use crate::render::projection_table;

/// `capacity_model_YYYY-MM-DD.csv`, matching the historical export name.
pub fn default_export_filename() -> String {
    format!("capacity_model_{}.csv", Utc::now().format("%Y-%m-%d"))
}

pub fn write_projection_csv(
    path: &Path,
    aggregates: &[RepAggregate],
    rules: &RuleSet,
) -> Result<(), SheetsError> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in projection_table(aggregates, rules) {
        writer.write_record(&row)?;
    }
    writer.flush().map_err(csv::Error::from)?;

    info!(path = %path.display(), reps = aggregates.len(), "projection exported");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::fs;

    use capmodel_core::domain::report::RepAggregate;
    use capmodel_core::domain::rules::{RoleLabel, RoleRule, RuleSet};
    use rust_decimal::Decimal;
    use tempfile::TempDir;

    use super::{default_export_filename, write_projection_csv};

    #[test]
    fn writes_header_and_rows() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("projection.csv");

        let rules = RuleSet::new(vec![RoleRule::new("Admin", vec!["invoice".to_string()])]);
        let mut role_counts = BTreeMap::new();
        role_counts.insert(RoleLabel::named("Admin"), 3);
        let aggregates = vec![RepAggregate {
            name: "Jane Doe".to_string(),
            total_amount: Decimal::from(900),
            role_counts,
            international_count: 0,
        }];

        write_projection_csv(&path, &aggregates, &rules).expect("export succeeds");

        let contents = fs::read_to_string(&path).expect("file readable");
        let mut lines = contents.lines();
        assert_eq!(
            lines.next(),
            Some("Sales Rep,Sales ($),Admin Count,Uncategorized Count,Intl Project Count")
        );
        assert_eq!(lines.next(), Some("Jane Doe,900,3,0,0"));
    }

    #[test]
    fn default_filename_is_dated_csv() {
        let name = default_export_filename();
        assert!(name.starts_with("capacity_model_"));
        assert!(name.ends_with(".csv"));
    }
}
