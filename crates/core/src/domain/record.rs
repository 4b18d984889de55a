use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One raw sales row after the adapter has decoded it. Never mutated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub first_name: String,
    pub last_name: String,
    pub amount: Decimal,
    pub ship_country: String,
    /// All descriptive cells of the row, lowercased and space-joined.
    pub text_blob: String,
}

impl SalesRecord {
    /// Grouping key: `"{first} {last}"` trimmed. Empty means the record is
    /// skipped by the pipeline.
    pub fn identity_key(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

/// True when the shipping destination is non-empty and differs from the
/// domestic country, case-insensitively. An empty destination counts as
/// domestic.
pub fn is_international(ship_country: &str, domestic_country: &str) -> bool {
    let destination = ship_country.trim();
    !destination.is_empty() && !destination.eq_ignore_ascii_case(domestic_country.trim())
}
