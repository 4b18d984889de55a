use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Sentinel upper bound meaning "no cap" on a rule's amount band.
pub const UNBOUNDED_AMOUNT: Decimal = Decimal::from_parts(999_999_999, 0, 0, false, 0);

/// One classification rule: a role label, keyword triggers, and an inclusive
/// sales-amount band the rule applies within.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoleRule {
    pub role: String,
    /// Lowercase substrings; a row matches if its text blob contains any one.
    pub keywords: Vec<String>,
    /// Band defaults cover the legacy two-field rule form (role + keywords).
    #[serde(default)]
    pub min_amount: Decimal,
    #[serde(default = "unbounded_amount")]
    pub max_amount: Decimal,
}

fn unbounded_amount() -> Decimal {
    UNBOUNDED_AMOUNT
}

impl RoleRule {
    pub fn new(role: impl Into<String>, keywords: Vec<String>) -> Self {
        Self {
            role: role.into(),
            keywords: keywords.into_iter().map(|keyword| keyword.to_lowercase()).collect(),
            min_amount: Decimal::ZERO,
            max_amount: UNBOUNDED_AMOUNT,
        }
    }

    pub fn with_band(mut self, min_amount: Decimal, max_amount: Decimal) -> Self {
        self.min_amount = min_amount;
        self.max_amount = max_amount;
        self
    }

    /// Inclusive on both bounds. An inverted band never contains anything.
    pub fn band_contains(&self, amount: Decimal) -> bool {
        self.min_amount <= amount && amount <= self.max_amount
    }
}

/// Ordered rule collection; earlier rules take priority over later ones.
/// Role labels are unique within a set (first occurrence wins).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    rules: Vec<RoleRule>,
}

impl RuleSet {
    pub fn new(rules: Vec<RoleRule>) -> Self {
        let mut deduped: Vec<RoleRule> = Vec::with_capacity(rules.len());
        for mut rule in rules {
            if deduped.iter().any(|existing| existing.role == rule.role) {
                continue;
            }
            rule.keywords = rule
                .keywords
                .iter()
                .map(|keyword| keyword.trim().to_lowercase())
                .filter(|keyword| !keyword.is_empty())
                .collect();
            deduped.push(rule);
        }
        Self { rules: deduped }
    }

    pub fn rules(&self) -> &[RoleRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RoleRule> {
        self.rules.iter()
    }

    /// Role labels in priority order.
    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|rule| rule.role.as_str())
    }
}

/// A role assignment produced by classification. The fallback bucket is an
/// explicit variant so callers can detect unclassified rows without string
/// comparison.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleLabel {
    Named(String),
    Unclassified,
}

impl RoleLabel {
    pub const FALLBACK_DISPLAY: &'static str = "Uncategorized";

    pub fn named(role: impl Into<String>) -> Self {
        Self::Named(role.into())
    }

    pub fn is_unclassified(&self) -> bool {
        matches!(self, Self::Unclassified)
    }
}

impl std::fmt::Display for RoleLabel {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Named(role) => formatter.write_str(role),
            Self::Unclassified => formatter.write_str(Self::FALLBACK_DISPLAY),
        }
    }
}
