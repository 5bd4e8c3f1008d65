use std::{env, sync::Arc};

use chainbench_core::{
    benchmark::handler::Benchmarker,
    helpers::config::BenchmarkConfig,
    keys::handler::{EnvKeyResolver, KeyResolver},
    providers::adapter::{HttpAdapter, ProviderEndpoints},
    storage::handler::{RunStore, SledRunStore},
};

pub struct ServerState {
    benchmarker: Benchmarker<HttpAdapter>,
    store: Arc<dyn RunStore>,
    cron_secret: Option<String>,
}

impl From<(Benchmarker<HttpAdapter>, Arc<dyn RunStore>, Option<String>)> for ServerState {
    fn from(states: (Benchmarker<HttpAdapter>, Arc<dyn RunStore>, Option<String>)) -> Self {
        let (benchmarker, store, cron_secret) = states;
        Self {
            benchmarker,
            store,
            cron_secret,
        }
    }
}

impl ServerState {
    pub fn from_env() -> anyhow::Result<Self> {
        let config = BenchmarkConfig::from_env();
        let adapter = HttpAdapter::new(config.request_timeout, ProviderEndpoints::from_env())?;
        let keys: Arc<dyn KeyResolver> = Arc::new(EnvKeyResolver::from_env());

        let database_path = env::var("DATABASE_PATH").unwrap_or("chainbench_db".to_string());
        let store: Arc<dyn RunStore> = Arc::new(SledRunStore::open(&database_path)?);

        let cron_secret = env::var("CRON_SECRET")
            .ok()
            .map(|secret| secret.trim().to_string())
            .filter(|secret| !secret.is_empty());

        if cron_secret.is_none() {
            log::warn!("CRON_SECRET not set, scheduled runs are disabled");
        }

        Ok(Self::from((
            Benchmarker::new(adapter, keys, config),
            store,
            cron_secret,
        )))
    }

    pub fn benchmarker(&self) -> &Benchmarker<HttpAdapter> {
        &self.benchmarker
    }

    pub fn store(&self) -> Arc<dyn RunStore> {
        self.store.clone()
    }

    pub fn cron_secret(&self) -> Option<&str> {
        self.cron_secret.as_deref()
    }
}
