//! Aggregation pipeline: one forward pass over the sales rows, grouped by
//! salesperson identity, followed by summary statistics over the finished
//! aggregates. Output order is first-seen order so repeated runs over the
//! same input are byte-identical.

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::classify::classify;
use crate::domain::record::{is_international, SalesRecord};
use crate::domain::report::{RepAggregate, RoleShare, SummaryReport, TopPerformer};
use crate::domain::rules::{RoleLabel, RuleSet};

/// Group rows by identity key and accumulate totals, role counts, and the
/// international flag. Rows with an empty identity key are dropped without
/// error. A row is either fully absorbed or fully skipped.
pub fn aggregate(
    records: &[SalesRecord],
    rules: &RuleSet,
    domestic_country: &str,
) -> (Vec<RepAggregate>, SummaryReport) {
    let mut aggregates: Vec<RepAggregate> = Vec::new();
    let mut index_by_key: HashMap<String, usize> = HashMap::new();

    for record in records {
        let key = record.identity_key();
        if key.is_empty() {
            continue;
        }

        let index = *index_by_key.entry(key.clone()).or_insert_with(|| {
            aggregates.push(RepAggregate::new(key));
            aggregates.len() - 1
        });
        let entry = &mut aggregates[index];

        entry.total_amount += record.amount;
        let role = classify(&record.text_blob, record.amount, rules);
        *entry.role_counts.entry(role).or_insert(0) += 1;
        if is_international(&record.ship_country, domestic_country) {
            entry.international_count += 1;
        }
    }

    let summary = summarize(&aggregates, rules);
    (aggregates, summary)
}

/// Summary statistics over finalized aggregates. Role shares come out in
/// rule-set order with the fallback bucket last; percentages are taken over
/// the classified-row total and are all zero when that total is zero.
pub fn summarize(aggregates: &[RepAggregate], rules: &RuleSet) -> SummaryReport {
    let rep_count = aggregates.len() as u64;
    let total_amount: Decimal = aggregates.iter().map(|aggregate| aggregate.total_amount).sum();
    let average_amount = if rep_count == 0 {
        Decimal::ZERO
    } else {
        (total_amount / Decimal::from(rep_count)).round_dp(2)
    };

    let classified_rows: u64 = aggregates.iter().map(RepAggregate::classified_rows).sum();
    let international_count: u64 =
        aggregates.iter().map(|aggregate| aggregate.international_count).sum();

    let role_totals = role_shares(aggregates, rules, classified_rows);

    SummaryReport {
        rep_count,
        total_amount,
        average_amount,
        classified_rows,
        international_count,
        top_performer: top_performer(aggregates),
        role_totals,
    }
}

/// The aggregate with the strictly greatest total. The fold seeds from zero
/// and replaces only on strict `>`, so ties resolve to the first-encountered
/// aggregate and an all-nonpositive field produces no top performer.
fn top_performer(aggregates: &[RepAggregate]) -> Option<TopPerformer> {
    let mut best: Option<&RepAggregate> = None;
    let mut best_total = Decimal::ZERO;

    for aggregate in aggregates {
        if aggregate.total_amount > best_total {
            best_total = aggregate.total_amount;
            best = Some(aggregate);
        }
    }

    best.map(|aggregate| TopPerformer {
        name: aggregate.name.clone(),
        total_amount: aggregate.total_amount,
    })
}

fn role_shares(aggregates: &[RepAggregate], rules: &RuleSet, classified_rows: u64) -> Vec<RoleShare> {
    let labels = rules
        .roles()
        .map(RoleLabel::named)
        .chain(std::iter::once(RoleLabel::Unclassified));

    labels
        .map(|role| {
            let count: u64 =
                aggregates.iter().map(|aggregate| aggregate.role_count(&role)).sum();
            let percentage = if classified_rows == 0 {
                0.0
            } else {
                count as f64 / classified_rows as f64 * 100.0
            };
            RoleShare { role, count, percentage }
        })
        .collect()
}
