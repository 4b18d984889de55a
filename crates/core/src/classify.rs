//! Rule evaluator: maps a row's text blob and sales amount to a role bucket.
//!
//! Matching is two-pass. The first pass requires both the amount band and a
//! keyword hit; the second relaxes to the band alone so that rows with
//! unrecognizable text still land in the band-appropriate bucket instead of
//! the fallback. Rule order is a priority ordering: within each pass the
//! first satisfying rule wins.

use rust_decimal::Decimal;

use crate::domain::rules::{RoleLabel, RoleRule, RuleSet};

/// First rule whose band contains `amount` and whose keyword list has at
/// least one case-insensitive substring hit in the text blob. Rules without
/// keywords never match this pass.
pub fn match_keywords_in_band<'a>(
    text_blob: &str,
    amount: Decimal,
    rules: &'a RuleSet,
) -> Option<&'a RoleRule> {
    let normalized = text_blob.to_lowercase();
    rules.iter().find(|rule| {
        rule.band_contains(amount)
            && rule.keywords.iter().any(|keyword| normalized.contains(keyword.as_str()))
    })
}

/// First rule whose band contains `amount`, keywords ignored.
pub fn match_band_only(amount: Decimal, rules: &RuleSet) -> Option<&RoleRule> {
    rules.iter().find(|rule| rule.band_contains(amount))
}

/// Total over every input: falls through keyword matching to band-only
/// matching, and to the fallback bucket when no band contains `amount`.
pub fn classify(text_blob: &str, amount: Decimal, rules: &RuleSet) -> RoleLabel {
    match_keywords_in_band(text_blob, amount, rules)
        .or_else(|| match_band_only(amount, rules))
        .map(|rule| RoleLabel::named(rule.role.clone()))
        .unwrap_or(RoleLabel::Unclassified)
}
