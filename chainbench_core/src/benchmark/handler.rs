use futures::future::join_all;
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::time::Instant;

use super::completeness::score_completeness;
use super::dto::{NftBenchmarkResult, ProviderBenchmarkResult, RunPhase};
use super::error::BenchmarkError;
use super::sampler::{elapsed_ms, sample_latency, truncate_message};
use super::throughput::probe_throughput;
use crate::helpers::config::BenchmarkConfig;
use crate::helpers::dto::ProviderRequest;
use crate::helpers::utils::is_valid_address;
use crate::keys::handler::KeyResolver;
use crate::pricing::consensus::aggregate;
use crate::pricing::dto::{PricingOutcome, PricingToken};
use crate::pricing::handler::collect_quotes;
use crate::providers::adapter::{bounded, call_budget, ProviderAdapter};
use crate::providers::dto::{Chain, ProviderName};

pub const RAW_SAMPLE_SIZE: usize = 5;

/// Drives the balance, pricing and NFT scenarios over a set of providers.
///
/// Each provider is isolated: its failures become reliability samples or an
/// error entry in its own result, never an error for the run.
pub struct Benchmarker<A> {
    adapter: A,
    keys: Arc<dyn KeyResolver>,
    config: BenchmarkConfig,
}

fn resolve_chain(chain: &str) -> Result<&'static Chain, BenchmarkError> {
    Chain::find(chain).ok_or_else(|| BenchmarkError::UnsupportedChain(chain.to_string()))
}

/// Token addresses are interpolated into upstream URLs and queries, so
/// anything that is not a plain contract address is refused.
fn validate_tokens(tokens: &[PricingToken]) -> Result<(), BenchmarkError> {
    match tokens.iter().find(|token| !is_valid_address(&token.address)) {
        Some(token) => Err(BenchmarkError::InvalidRequest(format!(
            "{} is not a valid token address",
            token.address
        ))),
        None => Ok(()),
    }
}

fn validate_wallet(wallet: &str) -> Result<(), BenchmarkError> {
    if is_valid_address(wallet) {
        Ok(())
    } else {
        Err(BenchmarkError::InvalidRequest(format!(
            "{} is not a valid wallet address",
            wallet
        )))
    }
}

fn advance(phase: &mut RunPhase, scenario: &str, chain: &Chain) {
    *phase = phase.next();
    log::info!("{} run on {} is {}", scenario, chain.id, phase);
}

impl<A: ProviderAdapter> Benchmarker<A> {
    pub fn new(adapter: A, keys: Arc<dyn KeyResolver>, config: BenchmarkConfig) -> Self {
        Self {
            adapter,
            keys,
            config,
        }
    }

    pub fn config(&self) -> &BenchmarkConfig {
        &self.config
    }

    pub fn keys(&self) -> &dyn KeyResolver {
        self.keys.as_ref()
    }

    /// Pairs each requested provider with a usable key. Providers without
    /// one are skipped, and repeated providers keep their first entry.
    pub fn resolve_providers(&self, providers: &[ProviderRequest]) -> Vec<(ProviderName, String)> {
        let mut seen = HashSet::new();

        providers
            .iter()
            .filter(|request| seen.insert(request.name))
            .filter_map(
                |request| match self.keys.resolve(request.name, request.api_key.as_deref()) {
                    Some(key) => Some((request.name, key)),
                    None => {
                        log::warn!("Skipping {}: no API key available", request.name);
                        None
                    }
                },
            )
            .collect()
    }

    async fn benchmark_provider(
        &self,
        provider: ProviderName,
        api_key: &str,
        wallet: &str,
        chain: &Chain,
        iterations: u32,
        concurrency: u32,
    ) -> ProviderBenchmarkResult {
        let adapter = &self.adapter;
        let limit = call_budget(
            self.config.request_timeout,
            adapter.balance_requests(provider),
        );
        let fetch = move || {
            bounded(
                provider,
                limit,
                adapter.fetch_balances(provider, wallet, chain, api_key),
            )
        };

        let sampled = sample_latency(iterations, fetch).await;
        let throughput = probe_throughput(concurrency, fetch).await;

        let records = sampled.last_success.unwrap_or_default();
        let completeness = score_completeness(&records);
        let meta = provider.meta();

        log::info!(
            "{} benchmarked: avg {}ms, p95 {}ms, {}% success, {} rps",
            provider,
            sampled.latency.avg,
            sampled.latency.p95,
            sampled.reliability.success_rate,
            throughput.requests_per_second
        );

        ProviderBenchmarkResult {
            provider,
            display_name: meta.display_name.to_string(),
            color: meta.color.to_string(),
            latency: sampled.latency,
            completeness,
            reliability: sampled.reliability,
            throughput,
            raw_data_sample: records.into_iter().take(RAW_SAMPLE_SIZE).collect(),
        }
    }

    /// Samples, probes and scores every provider in parallel. Results come
    /// back in request order; providers still running at the run deadline
    /// are dropped and the finished ones returned.
    pub async fn run_balance_benchmark(
        &self,
        wallet: &str,
        chain: &str,
        providers: &[ProviderRequest],
        iterations: u32,
        concurrency: u32,
    ) -> Result<Vec<ProviderBenchmarkResult>, BenchmarkError> {
        validate_wallet(wallet)?;
        let chain = resolve_chain(chain)?;

        if providers.is_empty() {
            return Err(BenchmarkError::InvalidRequest(
                "at least one provider is required".to_string(),
            ));
        }
        if iterations == 0 {
            return Err(BenchmarkError::InvalidRequest(
                "iterations must be at least 1".to_string(),
            ));
        }
        if concurrency == 0 {
            return Err(BenchmarkError::InvalidRequest(
                "concurrency must be at least 1".to_string(),
            ));
        }

        let mut phase = RunPhase::Pending;
        let resolved = self.resolve_providers(providers);
        let deadline = Instant::now() + self.config.run_deadline;

        advance(&mut phase, "Balance", chain);
        let mut pending: FuturesUnordered<_> = resolved
            .iter()
            .enumerate()
            .map(|(index, (provider, api_key))| async move {
                let result = self
                    .benchmark_provider(*provider, api_key, wallet, chain, iterations, concurrency)
                    .await;
                (index, result)
            })
            .collect();

        let mut finished = Vec::with_capacity(resolved.len());
        loop {
            match tokio::time::timeout_at(deadline, pending.next()).await {
                Ok(Some(entry)) => finished.push(entry),
                Ok(None) => break,
                Err(_) => {
                    log::warn!(
                        "Balance run deadline reached with {} of {} providers finished",
                        finished.len(),
                        resolved.len()
                    );
                    break;
                }
            }
        }

        advance(&mut phase, "Balance", chain);
        finished.sort_by_key(|(index, _)| *index);
        let results = finished.into_iter().map(|(_, result)| result).collect();

        advance(&mut phase, "Balance", chain);
        Ok(results)
    }

    /// One batch price call per provider, then a joint consensus reduction.
    pub async fn run_pricing_benchmark(
        &self,
        tokens: &[PricingToken],
        chain: &str,
        providers: &[ProviderRequest],
    ) -> Result<PricingOutcome, BenchmarkError> {
        let chain = resolve_chain(chain)?;
        validate_tokens(tokens)?;

        let mut phase = RunPhase::Pending;
        let resolved = self.resolve_providers(providers);

        advance(&mut phase, "Pricing", chain);
        let quotes = collect_quotes(
            &self.adapter,
            tokens,
            chain,
            &resolved,
            self.config.request_timeout,
        )
        .await;

        advance(&mut phase, "Pricing", chain);
        let outcome = aggregate(tokens, &quotes);

        advance(&mut phase, "Pricing", chain);
        Ok(outcome)
    }

    /// Single timed NFT-count call per provider. Providers without the
    /// capability are left out of the results.
    pub async fn run_nft_benchmark(
        &self,
        wallet: &str,
        chain: &str,
        providers: &[ProviderRequest],
    ) -> Result<Vec<NftBenchmarkResult>, BenchmarkError> {
        validate_wallet(wallet)?;
        let chain = resolve_chain(chain)?;

        let mut phase = RunPhase::Pending;
        let resolved = self.resolve_providers(providers);
        let adapter = &self.adapter;
        let limit = self.config.request_timeout;

        advance(&mut phase, "NFT", chain);
        let probes = resolved.iter().map(|(provider, api_key)| async move {
            let start = Instant::now();
            let outcome = bounded(
                *provider,
                limit,
                adapter.fetch_nft_count(*provider, wallet, chain, api_key),
            )
            .await;

            (*provider, outcome, elapsed_ms(start))
        });
        let settled = join_all(probes).await;

        advance(&mut phase, "NFT", chain);
        let results = settled
            .into_iter()
            .filter_map(|(provider, outcome, latency_ms)| {
                let meta = provider.meta();
                let (nft_count, error) = match outcome {
                    Ok(count) => (count, None),
                    Err(e) if e.is_configuration() => {
                        log::info!("Excluding {} from NFT run: {}", provider, e);
                        return None;
                    }
                    Err(e) => {
                        log::warn!("NFT count failed for {}: {}", provider, e);
                        (0, Some(truncate_message(&e.to_string())))
                    }
                };

                Some(NftBenchmarkResult {
                    provider,
                    display_name: meta.display_name.to_string(),
                    color: meta.color.to_string(),
                    nft_count,
                    latency_ms,
                    success: error.is_none(),
                    error,
                })
            })
            .collect();

        advance(&mut phase, "NFT", chain);
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::handler::EnvKeyResolver;
    use crate::pricing::dto::TokenCategory;
    use crate::providers::adapter::PriceMap;
    use crate::providers::dto::TokenRecord;
    use crate::providers::error::ProviderError;
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::time::sleep;

    const WALLET: &str = "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045";

    /// Covalent answers slowly but fully, Alchemy fails fast, Moralis hangs
    /// on balances, Codex has no NFT support.
    struct StubAdapter;

    fn record(i: usize) -> TokenRecord {
        TokenRecord {
            token_address: Some(format!("0x{:040x}", i)),
            name: Some(format!("Token {}", i)),
            symbol: Some(format!("T{}", i)),
            decimals: Some(18),
            logo_url: Some("https://logo.png".to_string()),
            balance: Some("1000".to_string()),
            balance_usd: Some(1.0),
            price_usd: Some(0.001),
            price_24h_change: Some(0.0),
            contract_type: Some("ERC-20".to_string()),
            is_spam: Some(false),
            last_transfer_date: Some("2024-01-01T00:00:00Z".to_string()),
        }
    }

    fn quote_all(tokens: &[PricingToken], price: f64) -> PriceMap {
        tokens
            .iter()
            .map(|token| (token.address.clone(), Some(price)))
            .collect()
    }

    #[async_trait]
    impl ProviderAdapter for StubAdapter {
        async fn fetch_balances(
            &self,
            provider: ProviderName,
            _wallet: &str,
            _chain: &Chain,
            _api_key: &str,
        ) -> Result<Vec<TokenRecord>, ProviderError> {
            match provider {
                ProviderName::Covalent => {
                    sleep(Duration::from_millis(100)).await;
                    Ok((0..6).map(record).collect())
                }
                ProviderName::Moralis => {
                    sleep(Duration::from_secs(3600)).await;
                    Ok(vec![])
                }
                _ => {
                    sleep(Duration::from_millis(50)).await;
                    Err(ProviderError::Status {
                        provider,
                        status: 500,
                        reason: "Internal Server Error".to_string(),
                    })
                }
            }
        }

        async fn fetch_prices(
            &self,
            provider: ProviderName,
            tokens: &[PricingToken],
            _chain: &Chain,
            _api_key: &str,
        ) -> Result<PriceMap, ProviderError> {
            match provider {
                ProviderName::Covalent => Ok(quote_all(tokens, 100.0)),
                ProviderName::Moralis => Ok(quote_all(tokens, 102.0)),
                _ => Err(ProviderError::Status {
                    provider,
                    status: 503,
                    reason: "Service Unavailable".to_string(),
                }),
            }
        }

        async fn fetch_nft_count(
            &self,
            provider: ProviderName,
            _wallet: &str,
            _chain: &Chain,
            _api_key: &str,
        ) -> Result<u64, ProviderError> {
            match provider {
                ProviderName::Covalent => Ok(7),
                ProviderName::Codex => Err(ProviderError::Unsupported {
                    provider,
                    capability: "NFT counts",
                }),
                _ => Err(ProviderError::Timeout { provider }),
            }
        }
    }

    fn benchmarker(config: BenchmarkConfig) -> Benchmarker<StubAdapter> {
        // Mobula deliberately has no key.
        let keys = EnvKeyResolver::from_map([
            (ProviderName::Covalent, "covalent-key"),
            (ProviderName::Alchemy, "alchemy-key"),
            (ProviderName::Moralis, "moralis-key"),
            (ProviderName::Codex, "codex-key"),
        ]);

        Benchmarker::new(StubAdapter, Arc::new(keys), config)
    }

    fn requests(names: &[ProviderName]) -> Vec<ProviderRequest> {
        names.iter().map(|name| ProviderRequest::new(*name)).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_balance_run_isolates_failures() {
        let bench = benchmarker(BenchmarkConfig::default());
        let providers = requests(&[
            ProviderName::Covalent,
            ProviderName::Alchemy,
            ProviderName::Mobula,
        ]);

        let results = bench
            .run_balance_benchmark(WALLET, "eth-mainnet", &providers, 3, 2)
            .await
            .unwrap();

        // Mobula has no key and is skipped.
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].provider, ProviderName::Covalent);
        assert_eq!(results[1].provider, ProviderName::Alchemy);

        let covalent = &results[0];
        assert_eq!(covalent.display_name, "Covalent (GoldRush)");
        assert_eq!(covalent.latency.samples, vec![100, 100, 100]);
        assert_eq!(covalent.reliability.success_rate, 100);
        assert_eq!(covalent.throughput.completed_in_window, 2);
        assert_eq!(covalent.throughput.window_ms, 100);
        assert_eq!(covalent.throughput.requests_per_second, 20.0);
        assert_eq!(covalent.completeness.score, 100);
        assert_eq!(covalent.completeness.tokens_returned, 6);
        assert_eq!(covalent.raw_data_sample.len(), RAW_SAMPLE_SIZE);

        let alchemy = &results[1];
        assert_eq!(alchemy.reliability.success_rate, 0);
        assert_eq!(alchemy.reliability.failed_requests, 3);
        assert_eq!(alchemy.reliability.errors.len(), 3);
        assert!(alchemy.reliability.errors[0].contains("500"));
        assert_eq!(alchemy.latency.samples, vec![50, 50, 50]);
        assert_eq!(alchemy.completeness.score, 0);
        assert_eq!(alchemy.throughput.completed_in_window, 0);
        assert!(alchemy.raw_data_sample.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_calls_become_timeouts() {
        let bench = benchmarker(BenchmarkConfig {
            request_timeout: Duration::from_secs(1),
            ..BenchmarkConfig::default()
        });
        let providers = requests(&[ProviderName::Moralis]);

        let results = bench
            .run_balance_benchmark(WALLET, "eth-mainnet", &providers, 2, 2)
            .await
            .unwrap();

        let moralis = &results[0];
        assert_eq!(moralis.reliability.failed_requests, 2);
        assert!(moralis.reliability.errors[0].contains("timed out"));
        assert_eq!(moralis.latency.samples, vec![1000, 1000]);
        assert_eq!(moralis.throughput.window_ms, 1000);
        assert_eq!(moralis.throughput.completed_in_window, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_keeps_finished_providers() {
        let bench = benchmarker(BenchmarkConfig {
            request_timeout: Duration::from_secs(60),
            run_deadline: Duration::from_secs(5),
            ..BenchmarkConfig::default()
        });
        let providers = requests(&[ProviderName::Moralis, ProviderName::Covalent]);

        let results = bench
            .run_balance_benchmark(WALLET, "eth-mainnet", &providers, 2, 1)
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].provider, ProviderName::Covalent);
    }

    #[tokio::test]
    async fn test_invalid_requests_are_rejected() {
        let bench = benchmarker(BenchmarkConfig::default());
        let providers = requests(&[ProviderName::Covalent]);

        let err = bench
            .run_balance_benchmark(WALLET, "eth-mainnet", &providers, 0, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, BenchmarkError::InvalidRequest(_)));

        let err = bench
            .run_balance_benchmark("0x1234", "eth-mainnet", &providers, 1, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, BenchmarkError::InvalidRequest(_)));

        let err = bench
            .run_balance_benchmark(WALLET, "eth-mainnet", &[], 1, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, BenchmarkError::InvalidRequest(_)));

        let err = bench
            .run_balance_benchmark(WALLET, "solana-mainnet", &providers, 1, 1)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            BenchmarkError::UnsupportedChain("solana-mainnet".to_string())
        );
    }

    #[test]
    fn test_repeated_providers_run_once() {
        let bench = benchmarker(BenchmarkConfig::default());
        let providers = vec![
            ProviderRequest::new(ProviderName::Codex),
            ProviderRequest {
                name: ProviderName::Codex,
                api_key: Some("other".to_string()),
            },
        ];

        let resolved = bench.resolve_providers(&providers);
        assert_eq!(resolved, vec![(ProviderName::Codex, "codex-key".to_string())]);
    }

    #[tokio::test]
    async fn test_pricing_run_degrades_failed_batches() {
        let bench = benchmarker(BenchmarkConfig::default());
        let tokens = vec![
            PricingToken {
                address: "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2".to_string(),
                symbol: "WETH".to_string(),
                name: "Wrapped Ether".to_string(),
                category: TokenCategory::BlueChip,
                chain_id: "eth-mainnet".to_string(),
            },
            PricingToken {
                address: "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48".to_string(),
                symbol: "USDC".to_string(),
                name: "USD Coin".to_string(),
                category: TokenCategory::Stablecoin,
                chain_id: "eth-mainnet".to_string(),
            },
        ];
        let providers = requests(&[
            ProviderName::Covalent,
            ProviderName::Alchemy,
            ProviderName::Moralis,
            ProviderName::Mobula,
        ]);

        let outcome = bench
            .run_pricing_benchmark(&tokens, "eth-mainnet", &providers)
            .await
            .unwrap();

        assert_eq!(outcome.token_results.len(), 2);
        assert_eq!(outcome.token_results[0].consensus_price, Some(101.0));
        assert_eq!(outcome.token_results[0].prices.len(), 3);

        let providers: Vec<ProviderName> = outcome
            .provider_results
            .iter()
            .map(|result| result.provider)
            .collect();
        assert_eq!(
            providers,
            vec![
                ProviderName::Covalent,
                ProviderName::Alchemy,
                ProviderName::Moralis
            ]
        );

        let alchemy = &outcome.provider_results[1];
        assert_eq!(alchemy.coverage_percent, 0);
        assert!(alchemy.error.as_deref().unwrap_or("").contains("503"));

        let covalent = &outcome.provider_results[0];
        assert_eq!(covalent.coverage_percent, 100);
        assert_eq!(covalent.avg_deviation, Some(0.99));
    }

    #[tokio::test]
    async fn test_pricing_run_rejects_malformed_token_addresses() {
        let bench = benchmarker(BenchmarkConfig::default());
        let providers = requests(&[ProviderName::Covalent]);

        for address in [
            "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48\", priceUsd: 0 }",
            "0x/../../v1/1/address/0xabc/balances_v2",
            "",
        ] {
            let tokens = vec![PricingToken {
                address: address.to_string(),
                symbol: "BAD".to_string(),
                name: "Bad".to_string(),
                category: TokenCategory::LongTail,
                chain_id: "eth-mainnet".to_string(),
            }];

            let err = bench
                .run_pricing_benchmark(&tokens, "eth-mainnet", &providers)
                .await
                .unwrap_err();
            assert!(matches!(err, BenchmarkError::InvalidRequest(_)), "{}", address);
        }
    }

    #[tokio::test]
    async fn test_pricing_run_without_providers_is_well_formed() {
        let bench = benchmarker(BenchmarkConfig::default());
        let tokens = crate::pricing::tokens::pricing_tokens_for_chain(
            Chain::find("base-mainnet").unwrap(),
        );

        let outcome = bench
            .run_pricing_benchmark(&tokens, "base-mainnet", &[])
            .await
            .unwrap();

        assert!(outcome.provider_results.is_empty());
        assert_eq!(outcome.token_results.len(), tokens.len());
        assert!(outcome
            .token_results
            .iter()
            .all(|result| result.consensus_price.is_none()));
    }

    #[tokio::test]
    async fn test_nft_run_excludes_unsupported_providers() {
        let bench = benchmarker(BenchmarkConfig::default());
        let providers = requests(&[
            ProviderName::Covalent,
            ProviderName::Alchemy,
            ProviderName::Codex,
        ]);

        let results = bench
            .run_nft_benchmark(WALLET, "polygon-mainnet", &providers)
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert!(results[0].success);
        assert_eq!(results[0].nft_count, 7);
        assert!(!results[1].success);
        assert_eq!(results[1].nft_count, 0);
        assert!(results[1].error.as_deref().unwrap_or("").contains("timed out"));
    }
}
