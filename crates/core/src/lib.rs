pub mod aggregate;
pub mod classify;
pub mod config;
pub mod domain;

pub use aggregate::{aggregate, summarize};
pub use classify::{classify, match_band_only, match_keywords_in_band};
pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use domain::record::{is_international, SalesRecord};
pub use domain::report::{RepAggregate, RoleShare, SummaryReport, TopPerformer};
pub use domain::rules::{RoleLabel, RoleRule, RuleSet, UNBOUNDED_AMOUNT};
