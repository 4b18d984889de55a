//! Renders the pipeline output into the two result tables written back to
//! the spreadsheet: the per-rep projection and the key/value summary.

use capmodel_core::domain::report::{RepAggregate, SummaryReport};
use capmodel_core::domain::rules::{RoleLabel, RuleSet};
use rust_decimal::Decimal;

/// Projection table: one row per salesperson in first-seen order, role
/// columns in rule-set order with the fallback bucket next to last.
pub fn projection_table(aggregates: &[RepAggregate], rules: &RuleSet) -> Vec<Vec<String>> {
    let role_labels: Vec<RoleLabel> = rules
        .roles()
        .map(RoleLabel::named)
        .chain(std::iter::once(RoleLabel::Unclassified))
        .collect();

    let mut header = vec!["Sales Rep".to_string(), "Sales ($)".to_string()];
    header.extend(role_labels.iter().map(|role| format!("{role} Count")));
    header.push("Intl Project Count".to_string());

    let mut rows = vec![header];
    rows.extend(aggregates.iter().map(|aggregate| {
        let mut row = vec![aggregate.name.clone(), aggregate.total_amount.round_dp(2).to_string()];
        row.extend(role_labels.iter().map(|role| aggregate.role_count(role).to_string()));
        row.push(aggregate.international_count.to_string());
        row
    }));
    rows
}

/// Summary table: two-column key/value rows in a fixed order.
pub fn summary_table(summary: &SummaryReport) -> Vec<Vec<String>> {
    let mut rows = vec![
        kv("Total Sales Reps", summary.rep_count.to_string()),
        kv("Total Sales", format_money(summary.total_amount)),
        kv("Average Sales per Rep", format_money(summary.average_amount)),
        kv("Total Classified Projects", summary.classified_rows.to_string()),
        kv("International Projects", summary.international_count.to_string()),
        kv(
            "Top Performer",
            summary
                .top_performer
                .as_ref()
                .map(|top| top.name.clone())
                .unwrap_or_default(),
        ),
        kv(
            "Top Performer Sales",
            format_money(
                summary
                    .top_performer
                    .as_ref()
                    .map(|top| top.total_amount)
                    .unwrap_or(Decimal::ZERO),
            ),
        ),
    ];

    for share in &summary.role_totals {
        rows.push(kv(&format!("{} Count", share.role), share.count.to_string()));
        rows.push(kv(&format!("{} %", share.role), format!("{:.1}%", share.percentage)));
    }

    rows
}

fn kv(key: &str, value: String) -> Vec<String> {
    vec![key.to_string(), value]
}

fn format_money(amount: Decimal) -> String {
    format!("${}", amount.round_dp(2))
}
