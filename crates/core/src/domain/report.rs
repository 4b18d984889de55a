use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::rules::RoleLabel;

/// Running totals for one salesperson, keyed by identity key.
#[derive(Clone, Debug, PartialEq)]
pub struct RepAggregate {
    pub name: String,
    pub total_amount: Decimal,
    pub role_counts: BTreeMap<RoleLabel, u64>,
    pub international_count: u64,
}

impl RepAggregate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            total_amount: Decimal::ZERO,
            role_counts: BTreeMap::new(),
            international_count: 0,
        }
    }

    pub fn role_count(&self, role: &RoleLabel) -> u64 {
        self.role_counts.get(role).copied().unwrap_or(0)
    }

    /// Rows absorbed into this aggregate, across all role buckets.
    pub fn classified_rows(&self) -> u64 {
        self.role_counts.values().sum()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TopPerformer {
    pub name: String,
    pub total_amount: Decimal,
}

/// One role's slice of the classified-row total.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoleShare {
    pub role: RoleLabel,
    pub count: u64,
    pub percentage: f64,
}

/// Global statistics computed once the aggregation pass is complete.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SummaryReport {
    pub rep_count: u64,
    pub total_amount: Decimal,
    pub average_amount: Decimal,
    pub classified_rows: u64,
    pub international_count: u64,
    pub top_performer: Option<TopPerformer>,
    /// Rule-set order, fallback bucket last.
    pub role_totals: Vec<RoleShare>,
}
