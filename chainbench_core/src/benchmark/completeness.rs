use std::collections::BTreeMap;

use super::dto::CompletenessResult;
use crate::providers::dto::TokenRecord;

pub const COMPLETENESS_FIELDS: [&str; 12] = [
    "token_address",
    "name",
    "symbol",
    "decimals",
    "logo_url",
    "balance",
    "balance_usd",
    "price_usd",
    "price_24h_change",
    "contract_type",
    "is_spam",
    "last_transfer_date",
];

/// A field counts as present when strictly more than this share of the
/// sample populates it.
pub const PRESENCE_THRESHOLD: f64 = 0.3;

pub const SAMPLE_SIZE: usize = 20;

/// Minimum named records needed before the sample is restricted to them.
pub const MIN_NAMED_RECORDS: usize = 5;

fn has_text(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|text| !text.is_empty())
}

/// Presence of every scored field, in `COMPLETENESS_FIELDS` order. Numeric
/// zero and `false` are present values.
fn field_presence(record: &TokenRecord) -> [bool; 12] {
    [
        has_text(&record.token_address),
        has_text(&record.name),
        has_text(&record.symbol),
        record.decimals.is_some(),
        has_text(&record.logo_url),
        has_text(&record.balance),
        record.balance_usd.is_some(),
        record.price_usd.is_some(),
        record.price_24h_change.is_some(),
        has_text(&record.contract_type),
        record.is_spam.is_some(),
        has_text(&record.last_transfer_date),
    ]
}

fn is_named(record: &TokenRecord) -> bool {
    has_text(&record.symbol) || has_text(&record.name)
}

pub fn score_completeness(records: &[TokenRecord]) -> CompletenessResult {
    let named: Vec<&TokenRecord> = records.iter().filter(|record| is_named(record)).collect();
    let pool: Vec<&TokenRecord> = if named.len() >= MIN_NAMED_RECORDS {
        named
    } else {
        records.iter().collect()
    };
    let sample = &pool[..pool.len().min(SAMPLE_SIZE)];

    let mut counts = [0usize; 12];
    for record in sample {
        for (count, present) in counts.iter_mut().zip(field_presence(record)) {
            if present {
                *count += 1;
            }
        }
    }

    let threshold = sample.len() as f64 * PRESENCE_THRESHOLD;
    let field_breakdown: BTreeMap<String, bool> = COMPLETENESS_FIELDS
        .iter()
        .zip(counts)
        .map(|(field, count)| (field.to_string(), !sample.is_empty() && count as f64 > threshold))
        .collect();

    let total_fields = COMPLETENESS_FIELDS.len() as u32;
    let present_fields = field_breakdown.values().filter(|present| **present).count() as u32;

    CompletenessResult {
        score: (present_fields as f64 / total_fields as f64 * 100.0).round() as u32,
        total_fields,
        present_fields,
        field_breakdown,
        tokens_returned: records.len() as u32,
    }
}
