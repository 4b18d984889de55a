//! Matrix sheet adapter: turns the rule sheet (`Role | Keywords | Min Sales
//! ($) | Max Sales ($)`) into a [`RuleSet`] and back. Row order in the sheet
//! is the rule priority order.

use capmodel_core::domain::rules::{RoleRule, RuleSet, UNBOUNDED_AMOUNT};
use rust_decimal::Decimal;

pub const MATRIX_HEADER: [&str; 4] = ["Role", "Keywords", "Min Sales ($)", "Max Sales ($)"];

/// Parse Matrix rows (header included) into a rule set. Rows without a role
/// or keywords are skipped; missing or unparseable band bounds fall back to
/// the defaults, which also covers the legacy two-column form.
pub fn parse_rule_set(rows: &[Vec<String>]) -> RuleSet {
    let rules = rows
        .iter()
        .skip(1)
        .filter_map(|row| {
            let role = row.first().map(String::as_str).unwrap_or("").trim();
            let keywords_cell = row.get(1).map(String::as_str).unwrap_or("").trim();
            if role.is_empty() || keywords_cell.is_empty() {
                return None;
            }

            let keywords = keywords_cell
                .split(',')
                .map(|keyword| keyword.trim().to_lowercase())
                .filter(|keyword| !keyword.is_empty())
                .collect();

            let min_amount = parse_bound(row.get(2), Decimal::ZERO);
            let max_amount = parse_bound(row.get(3), UNBOUNDED_AMOUNT);

            Some(RoleRule::new(role, keywords).with_band(min_amount, max_amount))
        })
        .collect();

    RuleSet::new(rules)
}

/// Render a rule set back to Matrix rows for write-back.
pub fn render_rule_set(rules: &RuleSet) -> Vec<Vec<String>> {
    let mut rows = vec![MATRIX_HEADER.iter().map(|cell| cell.to_string()).collect()];
    rows.extend(rules.iter().map(|rule| {
        vec![
            rule.role.clone(),
            rule.keywords.join(", "),
            rule.min_amount.to_string(),
            rule.max_amount.to_string(),
        ]
    }));
    rows
}

fn parse_bound(cell: Option<&String>, default: Decimal) -> Decimal {
    cell.map(|raw| raw.trim())
        .filter(|raw| !raw.is_empty())
        .and_then(|raw| crate::table::parse_amount_opt(raw))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use capmodel_core::domain::rules::UNBOUNDED_AMOUNT;
    use rust_decimal::Decimal;

    use super::{parse_rule_set, render_rule_set, MATRIX_HEADER};

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|cell| cell.to_string()).collect()
    }

    fn matrix_rows() -> Vec<Vec<String>> {
        vec![
            row(&MATRIX_HEADER),
            row(&["Sr. Production Specialist", "Senior, Lead", "1000", "50000"]),
            row(&["Production Specialist", "production,assembly", "0", "5000"]),
        ]
    }

    #[test]
    fn parses_ordered_rules_with_lowercased_keywords() {
        let rules = parse_rule_set(&matrix_rows());

        assert_eq!(rules.len(), 2);
        let first = &rules.rules()[0];
        assert_eq!(first.role, "Sr. Production Specialist");
        assert_eq!(first.keywords, vec!["senior".to_string(), "lead".to_string()]);
        assert_eq!(first.min_amount, Decimal::from(1_000));
        assert_eq!(first.max_amount, Decimal::from(50_000));
    }

    #[test]
    fn legacy_two_column_rows_get_default_band() {
        let rows = vec![row(&["Role", "Keywords"]), row(&["Admin", "invoice, filing"])];

        let rules = parse_rule_set(&rows);
        let rule = &rules.rules()[0];
        assert_eq!(rule.min_amount, Decimal::ZERO);
        assert_eq!(rule.max_amount, UNBOUNDED_AMOUNT);
    }

    #[test]
    fn unparseable_bounds_degrade_to_defaults() {
        let rows = vec![
            row(&MATRIX_HEADER),
            row(&["Admin", "invoice", "lots", "more"]),
            row(&["Lead", "lead", "", "2500.50"]),
        ];

        let rules = parse_rule_set(&rows);
        assert_eq!(rules.rules()[0].min_amount, Decimal::ZERO);
        assert_eq!(rules.rules()[0].max_amount, UNBOUNDED_AMOUNT);
        assert_eq!(rules.rules()[1].min_amount, Decimal::ZERO);
        assert_eq!(rules.rules()[1].max_amount, Decimal::new(250050, 2));
    }

    #[test]
    fn rows_without_role_or_keywords_are_skipped() {
        let rows = vec![
            row(&MATRIX_HEADER),
            row(&["", "keyword"]),
            row(&["Role Only"]),
            row(&["Admin", "  "]),
            row(&["Lead", "lead"]),
        ];

        let rules = parse_rule_set(&rows);
        assert_eq!(rules.len(), 1);
        assert_eq!(rules.rules()[0].role, "Lead");
    }

    #[test]
    fn duplicate_roles_keep_the_earlier_row() {
        let rows = vec![
            row(&MATRIX_HEADER),
            row(&["Admin", "invoice"]),
            row(&["Admin", "filing"]),
        ];

        let rules = parse_rule_set(&rows);
        assert_eq!(rules.len(), 1);
        assert_eq!(rules.rules()[0].keywords, vec!["invoice".to_string()]);
    }

    #[test]
    fn render_round_trips_through_parse() {
        let rules = parse_rule_set(&matrix_rows());
        let rendered = render_rule_set(&rules);

        assert_eq!(rendered[0], row(&MATRIX_HEADER));
        assert_eq!(parse_rule_set(&rendered), rules);
    }
}
