pub mod client;
pub mod export;
pub mod matrix;
pub mod model;
pub mod render;
pub mod table;
pub mod webhook;

pub use client::{InMemorySheets, SheetsApi, SheetsClient, SheetsError};
pub use export::{default_export_filename, write_projection_csv};
pub use matrix::{parse_rule_set, render_rule_set, MATRIX_HEADER};
pub use model::{generate, load_records, load_rule_set, run_model, update_rule_set, GenerateOutcome};
pub use render::{projection_table, summary_table};
pub use table::{decode_records, discover_columns, parse_amount, ColumnMap};
pub use webhook::trigger_generation;
