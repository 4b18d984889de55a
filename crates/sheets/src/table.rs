//! Decodes the raw sales sheet into [`SalesRecord`]s. Which column plays
//! which part is discovered from the header row by case-insensitive substring
//! matching, so the sheet can be reorganized without code changes.

use capmodel_core::domain::record::SalesRecord;
use rust_decimal::Decimal;

use crate::client::SheetsError;

/// Header marker words for descriptive free-text columns.
const DESCRIPTIVE_MARKERS: [&str; 4] = ["project", "description", "item", "detail"];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnMap {
    pub first_name: usize,
    pub last_name: usize,
    pub amount: usize,
    pub ship_country: Option<usize>,
    pub descriptive: Vec<usize>,
}

/// Resolve column positions from the header row. Identity and amount columns
/// are required; without them the adapter refuses to run the pipeline.
pub fn discover_columns(header: &[String]) -> Result<ColumnMap, SheetsError> {
    let normalized: Vec<String> = header.iter().map(|cell| cell.to_lowercase()).collect();

    let first_name = find_column(&normalized, &["first"], &[])
        .ok_or(SheetsError::MissingColumn("first name"))?;
    let last_name = find_column(&normalized, &["last"], &[first_name])
        .ok_or(SheetsError::MissingColumn("last name"))?;
    let amount = find_column(&normalized, &["sales", "amount"], &[first_name, last_name])
        .ok_or(SheetsError::MissingColumn("amount"))?;
    let ship_country =
        find_column(&normalized, &["country", "ship"], &[first_name, last_name, amount]);

    let descriptive = normalized
        .iter()
        .enumerate()
        .filter(|(index, cell)| {
            ![Some(first_name), Some(last_name), Some(amount), ship_country]
                .contains(&Some(*index))
                && DESCRIPTIVE_MARKERS.iter().any(|marker| cell.contains(marker))
        })
        .map(|(index, _)| index)
        .collect();

    Ok(ColumnMap { first_name, last_name, amount, ship_country, descriptive })
}

fn find_column(normalized: &[String], markers: &[&str], taken: &[usize]) -> Option<usize> {
    normalized.iter().enumerate().position(|(index, cell)| {
        !taken.contains(&index) && markers.iter().any(|marker| cell.contains(marker))
    })
}

/// First row is the header; the remainder become records. Short rows are
/// padded with empty cells, never rejected.
pub fn decode_records(rows: &[Vec<String>]) -> Result<Vec<SalesRecord>, SheetsError> {
    let Some((header, data)) = rows.split_first() else {
        return Ok(Vec::new());
    };
    let columns = discover_columns(header)?;

    Ok(data.iter().map(|row| decode_record(row, &columns)).collect())
}

fn decode_record(row: &[String], columns: &ColumnMap) -> SalesRecord {
    let cell = |index: usize| row.get(index).map(String::as_str).unwrap_or("");

    let text_blob = columns
        .descriptive
        .iter()
        .map(|&index| cell(index))
        .filter(|text| !text.trim().is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    SalesRecord {
        first_name: cell(columns.first_name).trim().to_string(),
        last_name: cell(columns.last_name).trim().to_string(),
        amount: parse_amount(cell(columns.amount)),
        ship_country: columns
            .ship_country
            .map(|index| cell(index).trim().to_string())
            .unwrap_or_default(),
        text_blob,
    }
}

/// Monetary cells arrive as free text (`"$1,200.50"`). Unparseable values
/// degrade to zero instead of failing the run.
pub fn parse_amount(raw: &str) -> Decimal {
    parse_amount_opt(raw).unwrap_or(Decimal::ZERO)
}

pub(crate) fn parse_amount_opt(raw: &str) -> Option<Decimal> {
    let cleaned: String =
        raw.trim().chars().filter(|character| !matches!(character, '$' | ',')).collect();
    cleaned.parse().ok()
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::client::SheetsError;

    use super::{decode_records, discover_columns, parse_amount};

    fn header() -> Vec<String> {
        ["Sales Rep First", "Sales Rep Last", "Sales ($)", "Ship to Country", "Project Description"]
            .iter()
            .map(|cell| cell.to_string())
            .collect()
    }

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|cell| cell.to_string()).collect()
    }

    #[test]
    fn discovers_original_sheet_columns() {
        let columns = discover_columns(&header()).expect("all columns resolvable");
        assert_eq!(columns.first_name, 0);
        assert_eq!(columns.last_name, 1);
        assert_eq!(columns.amount, 2);
        assert_eq!(columns.ship_country, Some(3));
        assert_eq!(columns.descriptive, vec![4]);
    }

    #[test]
    fn amount_column_is_not_confused_with_identity_columns() {
        // "Sales Rep First" contains "sales"; identity columns are resolved
        // first and excluded from the amount search.
        let columns = discover_columns(&header()).expect("all columns resolvable");
        assert_eq!(columns.amount, 2);
    }

    #[test]
    fn missing_identity_column_is_refused() {
        let header = row(&["Sales ($)", "Ship to Country"]);
        let error = discover_columns(&header).expect_err("should refuse");
        assert!(matches!(error, SheetsError::MissingColumn("first name")));
    }

    #[test]
    fn decode_builds_records_with_lowercased_text_blob() {
        let rows = vec![
            header(),
            row(&["Jane", "Doe", "$1,200.50", "Canada", "Senior Production LEAD"]),
        ];

        let records = decode_records(&rows).expect("decodable table");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].first_name, "Jane");
        assert_eq!(records[0].amount, Decimal::new(120050, 2));
        assert_eq!(records[0].ship_country, "Canada");
        assert_eq!(records[0].text_blob, "senior production lead");
    }

    #[test]
    fn decode_pads_short_rows_and_degrades_bad_amounts() {
        let rows = vec![header(), row(&["Sam", "Hill", "n/a"])];

        let records = decode_records(&rows).expect("decodable table");
        assert_eq!(records[0].amount, Decimal::ZERO);
        assert_eq!(records[0].ship_country, "");
        assert_eq!(records[0].text_blob, "");
    }

    #[test]
    fn multiple_descriptive_columns_are_joined() {
        let rows = vec![
            row(&["First", "Last", "Amount", "Item Type", "Project Notes"]),
            row(&["A", "B", "10", "Widget", "rush order"]),
        ];

        let records = decode_records(&rows).expect("decodable table");
        assert_eq!(records[0].text_blob, "widget rush order");
    }

    #[test]
    fn empty_table_decodes_to_no_records() {
        assert!(decode_records(&[]).expect("empty ok").is_empty());
        assert!(decode_records(&[header()]).expect("header only ok").is_empty());
    }

    #[test]
    fn parse_amount_strips_currency_formatting() {
        assert_eq!(parse_amount("$12,345.67"), Decimal::new(1234567, 2));
        assert_eq!(parse_amount("  300 "), Decimal::from(300));
        assert_eq!(parse_amount(""), Decimal::ZERO);
        assert_eq!(parse_amount("pending"), Decimal::ZERO);
        assert_eq!(parse_amount("-50"), Decimal::from(-50));
    }
}
