use crate::{benchmark, cron, error::ErrorServer, history, info, keys, nfts, pricing, trends};
use chainbench_core::{
    benchmark::dto::{
        BenchmarkRun, CompletenessResult, LatencyStats, NftBenchmarkResult, NftRun,
        ProviderBenchmarkResult, ReliabilityResult, RunStatus, ThroughputResult,
    },
    helpers::dto::{BenchmarkRequest, NftRequest, PricingRequest, ProviderRequest},
    keys::dto::KeyStatus,
    pricing::dto::{
        CategoryBreakdown, PricingBenchmarkResult, PricingRun, PricingToken, TokenCategory,
        TokenPriceResult,
    },
    providers::dto::{ProviderName, TokenRecord},
    storage::dto::{
        CoverageSnapshot, CoverageTrendPoint, LatencySnapshot, LatencyTrendPoint,
        StoredBenchmarkRun, StoredPricingRun, TriggerType,
    },
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        info::handler::info,
        benchmark::handler::benchmark,
        pricing::handler::pricing,
        nfts::handler::nfts,
        history::handler::history,
        history::handler::history_entry,
        trends::handler::trends,
        keys::handler::keys,
        cron::handler::cron,
    ),
    components(schemas(
        info::dto::Info,
        info::dto::ChainInfo,
        ErrorServer,
        ProviderName,
        ProviderRequest,
        BenchmarkRequest,
        PricingRequest,
        NftRequest,
        TokenRecord,
        RunStatus,
        LatencyStats,
        ReliabilityResult,
        ThroughputResult,
        CompletenessResult,
        ProviderBenchmarkResult,
        BenchmarkRun,
        NftBenchmarkResult,
        NftRun,
        TokenCategory,
        PricingToken,
        TokenPriceResult,
        CategoryBreakdown,
        PricingBenchmarkResult,
        PricingRun,
        KeyStatus,
        TriggerType,
        StoredBenchmarkRun,
        StoredPricingRun,
        LatencySnapshot,
        CoverageSnapshot,
        LatencyTrendPoint,
        CoverageTrendPoint,
        history::dto::HistoryKind,
        history::dto::HistoryResponse,
        history::dto::HistoryEntry,
        trends::dto::TrendsResponse,
        cron::dto::ScenarioStatus,
        cron::dto::ScenarioSummary,
        cron::dto::CronSummary,
    ))
)]
pub struct ApiDoc;
