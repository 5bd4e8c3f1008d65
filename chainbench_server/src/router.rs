use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};

use crate::{
    benchmark::handler::benchmark,
    cron::handler::cron,
    docs::{dto::ApiDoc, handler::api_docs},
    history::handler::{history, history_entry},
    info::handler::info,
    keys::handler::keys,
    middlewares::handler::cron_auth,
    nfts::handler::nfts,
    pricing::handler::pricing,
    state::ServerState,
    trends::handler::trends,
};

pub fn router(state: Arc<ServerState>) -> Router {
    let doc = ApiDoc::openapi();

    let cron_router = Router::new()
        .route("/cron", get(cron))
        .route_layer(middleware::from_fn_with_state(state.clone(), cron_auth));

    Router::new()
        .merge(Redoc::with_url("/redoc", doc))
        .merge(cron_router)
        .route("/", get(info))
        .route("/docs", get(api_docs))
        .route("/benchmark", post(benchmark))
        .route("/pricing", post(pricing))
        .route("/nfts", post(nfts))
        .route("/history", get(history))
        .route("/history/{id}", get(history_entry))
        .route("/trends", get(trends))
        .route("/keys", get(keys))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use chainbench_core::{
        benchmark::{dto::BenchmarkRun, handler::Benchmarker},
        helpers::config::BenchmarkConfig,
        keys::handler::{EnvKeyResolver, KeyResolver},
        providers::{
            adapter::{HttpAdapter, ProviderEndpoints},
            dto::ProviderName,
        },
        pricing::dto::PricingRun,
        storage::{
            dto::{
                CoverageTrendPoint, LatencyTrendPoint, StoredBenchmarkRun, StoredPricingRun,
                TriggerType,
            },
            handler::{RunStore, SledRunStore},
        },
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use serde_json::{Value, json};
    use std::time::Duration;
    use tempfile::TempDir;
    use tower::ServiceExt;

    const WALLET: &str = "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045";

    fn test_state(
        keys: Vec<(ProviderName, &str)>,
        cron_secret: Option<&str>,
    ) -> (Arc<ServerState>, Arc<dyn RunStore>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store: Arc<dyn RunStore> =
            Arc::new(SledRunStore::open(temp_dir.path().to_str().unwrap()).unwrap());

        (state_with_store(store.clone(), keys, cron_secret), store, temp_dir)
    }

    fn state_with_store(
        store: Arc<dyn RunStore>,
        keys: Vec<(ProviderName, &str)>,
        cron_secret: Option<&str>,
    ) -> Arc<ServerState> {
        let config = BenchmarkConfig {
            request_timeout: Duration::from_secs(1),
            ..BenchmarkConfig::default()
        };
        let adapter = HttpAdapter::new(
            config.request_timeout,
            ProviderEndpoints::single_host("http://127.0.0.1:9"),
        )
        .unwrap();
        let resolver: Arc<dyn KeyResolver> = Arc::new(EnvKeyResolver::from_map(keys));

        let state = ServerState::from((
            Benchmarker::new(adapter, resolver, config),
            store,
            cron_secret.map(str::to_string),
        ));

        Arc::new(state)
    }

    /// Store whose every operation fails, counting attempted saves.
    #[derive(Default)]
    struct BrokenStore {
        saves: AtomicUsize,
    }

    impl RunStore for BrokenStore {
        fn save_benchmark_run(
            &self,
            _run: &BenchmarkRun,
            _trigger: TriggerType,
        ) -> anyhow::Result<String> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            Err(anyhow::anyhow!("disk full"))
        }

        fn save_pricing_run(
            &self,
            _run: &PricingRun,
            _trigger: TriggerType,
        ) -> anyhow::Result<String> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            Err(anyhow::anyhow!("disk full"))
        }

        fn benchmark_run(&self, _id: &str) -> anyhow::Result<Option<StoredBenchmarkRun>> {
            Err(anyhow::anyhow!("disk full"))
        }

        fn pricing_run(&self, _id: &str) -> anyhow::Result<Option<StoredPricingRun>> {
            Err(anyhow::anyhow!("disk full"))
        }

        fn list_benchmark_runs(
            &self,
            _limit: usize,
            _offset: usize,
        ) -> anyhow::Result<Vec<StoredBenchmarkRun>> {
            Err(anyhow::anyhow!("disk full"))
        }

        fn list_pricing_runs(
            &self,
            _limit: usize,
            _offset: usize,
        ) -> anyhow::Result<Vec<StoredPricingRun>> {
            Err(anyhow::anyhow!("disk full"))
        }

        fn count_benchmark_runs(&self) -> anyhow::Result<usize> {
            Err(anyhow::anyhow!("disk full"))
        }

        fn count_pricing_runs(&self) -> anyhow::Result<usize> {
            Err(anyhow::anyhow!("disk full"))
        }

        fn has_recent_scheduled_run(&self, _since_ms: i64) -> anyhow::Result<bool> {
            Err(anyhow::anyhow!("disk full"))
        }

        fn latency_trends(&self, _limit: usize) -> anyhow::Result<Vec<LatencyTrendPoint>> {
            Err(anyhow::anyhow!("disk full"))
        }

        fn coverage_trends(&self, _limit: usize) -> anyhow::Result<Vec<CoverageTrendPoint>> {
            Err(anyhow::anyhow!("disk full"))
        }
    }

    async fn wait_for_saves(store: &BrokenStore, expected: usize) {
        for _ in 0..100 {
            if store.saves.load(Ordering::SeqCst) >= expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("expected {} save attempts", expected);
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn fetch(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_info_lists_providers_and_chains() {
        let (state, _store, _dir) = test_state(vec![], None);
        let (status, body) = send(router(state), fetch("/")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["providers"].as_array().unwrap().len(), 5);
        assert_eq!(body["chains"].as_array().unwrap().len(), 7);
        assert_eq!(body["defaultChain"], "eth-mainnet");
    }

    #[tokio::test]
    async fn test_benchmark_rejects_invalid_wallet() {
        let (state, _store, _dir) = test_state(vec![(ProviderName::Covalent, "cov-key-123456")], None);
        let request = post_json(
            "/benchmark",
            json!({ "walletAddress": "0x1234", "providers": [{ "name": "covalent" }] }),
        );

        let (status, body) = send(router(state), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], 400);
    }

    #[tokio::test]
    async fn test_benchmark_rejects_zero_iterations_and_empty_providers() {
        let (state, _store, _dir) = test_state(vec![(ProviderName::Covalent, "cov-key-123456")], None);

        let zero = post_json(
            "/benchmark",
            json!({ "walletAddress": WALLET, "providers": [{ "name": "covalent" }], "iterations": 0 }),
        );
        let (status, _) = send(router(state.clone()), zero).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let empty = post_json("/benchmark", json!({ "walletAddress": WALLET, "providers": [] }));
        let (status, _) = send(router(state), empty).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_failed_saves_leave_the_response_intact() {
        let store = Arc::new(BrokenStore::default());
        let state = state_with_store(
            store.clone(),
            vec![(ProviderName::Covalent, "cov-key-123456")],
            None,
        );

        let request = post_json(
            "/benchmark",
            json!({
                "walletAddress": WALLET,
                "providers": [{ "name": "covalent" }],
                "iterations": 1,
                "concurrency": 1
            }),
        );
        let (status, body) = send(router(state.clone()), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "completed");
        assert_eq!(body["walletAddress"], WALLET);
        assert_eq!(body["results"].as_array().unwrap().len(), 1);
        assert_eq!(body["results"][0]["provider"], "covalent");
        assert_eq!(body["results"][0]["reliability"]["totalRequests"], 1);

        let request = post_json("/pricing", json!({ "providers": [{ "name": "covalent" }] }));
        let (status, body) = send(router(state), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "completed");
        assert_eq!(body["providerResults"].as_array().unwrap().len(), 1);
        assert!(!body["tokenResults"].as_array().unwrap().is_empty());

        wait_for_saves(&store, 2).await;
    }

    #[tokio::test]
    async fn test_pricing_and_nfts_need_a_resolvable_key() {
        let (state, _store, _dir) = test_state(vec![], None);

        let pricing = post_json("/pricing", json!({ "providers": [{ "name": "mobula" }] }));
        let (status, body) = send(router(state.clone()), pricing).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().contains("API keys"));

        let nfts = post_json(
            "/nfts",
            json!({ "walletAddress": WALLET, "providers": [{ "name": "alchemy", "apiKey": "  " }] }),
        );
        let (status, _) = send(router(state), nfts).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_pricing_rejects_unknown_chain() {
        let (state, _store, _dir) = test_state(vec![(ProviderName::Covalent, "cov-key-123456")], None);
        let request = post_json(
            "/pricing",
            json!({ "chain": "doge-mainnet", "providers": [{ "name": "covalent" }] }),
        );

        let (status, _) = send(router(state), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_keys_are_masked() {
        let (state, _store, _dir) =
            test_state(vec![(ProviderName::Alchemy, "abcd1234efgh5678")], None);
        let (status, body) = send(router(state), fetch("/keys")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["alchemy"]["hasEnvKey"], true);
        assert_eq!(body["alchemy"]["masked"], "abcd********5678");
        assert_eq!(body["covalent"]["hasEnvKey"], false);
        assert_eq!(body["covalent"]["masked"], "");
    }

    #[tokio::test]
    async fn test_cron_requires_the_shared_secret() {
        let (state, _store, _dir) = test_state(vec![], None);
        let (status, _) = send(router(state), fetch("/cron?secret=anything")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (state, _store, _dir) = test_state(vec![], Some("s3cret"));
        let (status, _) = send(router(state.clone()), fetch("/cron")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(router(state.clone()), fetch("/cron?secret=wrong")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        // Authorized, but no provider has an operator key.
        let (status, body) = send(router(state.clone()), fetch("/cron?secret=s3cret")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "No API keys configured");

        let request = Request::builder()
            .uri("/cron")
            .header("x-cron-secret", "s3cret")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(router(state), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_history_lists_and_fetches_saved_runs() {
        let (state, store, _dir) = test_state(vec![], None);
        let run = BenchmarkRun::completed(WALLET, "eth-mainnet", vec![]);
        let id = store.save_benchmark_run(&run, TriggerType::Manual).unwrap();

        let (status, body) = send(router(state.clone()), fetch("/history?type=balances")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["benchmarkRuns"].as_array().unwrap().len(), 1);
        assert_eq!(body["benchmarkTotal"], 1);
        assert!(body.get("pricingRuns").is_none());

        let (status, body) = send(router(state.clone()), fetch(&format!("/history/{}", id))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["type"], "balances");
        assert_eq!(body["run"]["id"], id.as_str());
        assert_eq!(body["run"]["triggerType"], "manual");

        let (status, _) = send(router(state), fetch(&format!("/history/{}?type=pricing", id))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_history_entry_is_not_found() {
        let (state, _store, _dir) = test_state(vec![], None);
        let (status, body) = send(router(state), fetch("/history/missing")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["status"], 404);
    }

    #[tokio::test]
    async fn test_trends_start_empty() {
        let (state, _store, _dir) = test_state(vec![], None);
        let (status, body) = send(router(state), fetch("/trends?limit=500")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["latency"], json!([]));
        assert_eq!(body["coverage"], json!([]));
    }

    #[tokio::test]
    async fn test_docs_describe_every_route() {
        let (state, _store, _dir) = test_state(vec![], None);
        let (status, body) = send(router(state), fetch("/docs")).await;

        assert_eq!(status, StatusCode::OK);
        for path in ["/", "/benchmark", "/pricing", "/nfts", "/history", "/trends", "/keys", "/cron"] {
            assert!(body["paths"].get(path).is_some(), "{}", path);
        }

        for path in ["/history", "/trends"] {
            let params = body["paths"][path]["get"]["parameters"].as_array().unwrap();
            assert!(params.iter().all(|param| param["in"] == "query"), "{}", path);
        }
    }
}
