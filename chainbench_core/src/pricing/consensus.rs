use std::collections::BTreeMap;

use super::dto::{
    CategoryBreakdown, PricingBenchmarkResult, PricingOutcome, PricingToken, TokenCategory,
    TokenPriceResult,
};
use crate::helpers::utils::{percent, round2};
use crate::providers::adapter::PriceMap;
use crate::providers::dto::ProviderName;

/// One provider's batch quotes, fetched before aggregation starts.
#[derive(Debug, Clone)]
pub struct ProviderQuotes {
    pub provider: ProviderName,
    /// Empty when the batch call failed.
    pub prices: PriceMap,
    pub latency_ms: u64,
    pub error: Option<String>,
}

impl ProviderQuotes {
    /// A missing key reads the same as an explicit null.
    pub fn price_of(&self, token: &PricingToken) -> Option<f64> {
        self.prices.get(&token.address).copied().flatten()
    }
}

/// Median of the positive, finite quotes. `None` when no quote is usable.
pub fn consensus_price(quotes: &[Option<f64>]) -> Option<f64> {
    let mut valid: Vec<f64> = quotes
        .iter()
        .flatten()
        .copied()
        .filter(|price| price.is_finite() && *price > 0.0)
        .collect();

    if valid.is_empty() {
        return None;
    }

    valid.sort_by(f64::total_cmp);
    let mid = valid.len() / 2;

    if valid.len() % 2 == 0 {
        Some((valid[mid - 1] + valid[mid]) / 2.0)
    } else {
        Some(valid[mid])
    }
}

/// Absolute percentage distance from consensus.
pub fn deviation(price: Option<f64>, consensus: Option<f64>) -> Option<f64> {
    match (price, consensus) {
        (Some(price), Some(consensus)) if consensus != 0.0 => {
            Some(((price - consensus) / consensus).abs() * 100.0)
        }
        _ => None,
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(round2(values.iter().sum::<f64>() / values.len() as f64))
    }
}

fn token_result(token: &PricingToken, quotes: &[ProviderQuotes]) -> TokenPriceResult {
    let prices: BTreeMap<ProviderName, Option<f64>> = quotes
        .iter()
        .map(|quote| (quote.provider, quote.price_of(token)))
        .collect();

    let quoted: Vec<Option<f64>> = prices.values().copied().collect();
    let consensus = consensus_price(&quoted);

    let deviations = prices
        .iter()
        .map(|(provider, price)| (*provider, deviation(*price, consensus)))
        .collect();

    TokenPriceResult {
        token: token.clone(),
        prices,
        consensus_price: consensus,
        deviations,
    }
}

fn price_for(result: &TokenPriceResult, provider: ProviderName) -> Option<f64> {
    result.prices.get(&provider).copied().flatten()
}

fn deviation_for(result: &TokenPriceResult, provider: ProviderName) -> Option<f64> {
    result.deviations.get(&provider).copied().flatten()
}

fn provider_result(
    quotes: &ProviderQuotes,
    token_results: &[TokenPriceResult],
) -> PricingBenchmarkResult {
    let provider = quotes.provider;
    let meta = provider.meta();

    let covered = token_results
        .iter()
        .filter(|r| price_for(r, provider).is_some())
        .count() as u32;
    let total = token_results.len() as u32;
    let deviations: Vec<f64> = token_results
        .iter()
        .filter_map(|r| deviation_for(r, provider))
        .collect();

    let category_breakdown = TokenCategory::ALL
        .iter()
        .map(|category| {
            let in_category: Vec<&TokenPriceResult> = token_results
                .iter()
                .filter(|r| r.token.category == *category)
                .collect();
            let category_deviations: Vec<f64> = in_category
                .iter()
                .filter_map(|r| deviation_for(r, provider))
                .collect();

            CategoryBreakdown {
                category: *category,
                covered: in_category
                    .iter()
                    .filter(|r| price_for(r, provider).is_some())
                    .count() as u32,
                total: in_category.len() as u32,
                avg_deviation: mean(&category_deviations),
            }
        })
        .collect();

    PricingBenchmarkResult {
        provider,
        display_name: meta.display_name.to_string(),
        color: meta.color.to_string(),
        tokens_covered: covered,
        total_tokens: total,
        coverage_percent: percent(covered, total),
        avg_deviation: mean(&deviations),
        max_deviation: deviations
            .iter()
            .copied()
            .max_by(f64::total_cmp)
            .map(round2),
        latency_ms: quotes.latency_ms,
        category_breakdown,
        error: quotes.error.clone(),
    }
}

/// Joint reduction over every provider's quotes. Runs only after all batch
/// fetches have settled.
pub fn aggregate(tokens: &[PricingToken], quotes: &[ProviderQuotes]) -> PricingOutcome {
    let token_results: Vec<TokenPriceResult> = tokens
        .iter()
        .map(|token| token_result(token, quotes))
        .collect();

    let provider_results = quotes
        .iter()
        .map(|quote| provider_result(quote, &token_results))
        .collect();

    PricingOutcome {
        token_results,
        provider_results,
    }
}
