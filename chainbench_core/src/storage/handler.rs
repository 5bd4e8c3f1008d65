use anyhow::Result;
use serde::{de::DeserializeOwned, Serialize};
use sled::{Batch, Db, Tree};

use super::dto::{
    CoverageSnapshot, CoverageTrendPoint, LatencySnapshot, LatencyTrendPoint, StoredBenchmarkRun,
    StoredPricingRun, TriggerType,
};
use crate::benchmark::dto::{BenchmarkRun, RunStatus};
use crate::pricing::dto::PricingRun;

const BENCHMARK_TREE: &str = "benchmark_runs";
const PRICING_TREE: &str = "pricing_runs";
const TS_PREFIX: &str = "ts:";

/// Append/query store for finished runs. Engine-agnostic so the server can
/// be wired against any backing store.
pub trait RunStore: Send + Sync {
    fn save_benchmark_run(&self, run: &BenchmarkRun, trigger: TriggerType) -> Result<String>;
    fn save_pricing_run(&self, run: &PricingRun, trigger: TriggerType) -> Result<String>;

    fn benchmark_run(&self, id: &str) -> Result<Option<StoredBenchmarkRun>>;
    fn pricing_run(&self, id: &str) -> Result<Option<StoredPricingRun>>;

    /// Newest first.
    fn list_benchmark_runs(&self, limit: usize, offset: usize) -> Result<Vec<StoredBenchmarkRun>>;
    fn list_pricing_runs(&self, limit: usize, offset: usize) -> Result<Vec<StoredPricingRun>>;

    fn count_benchmark_runs(&self) -> Result<usize>;
    fn count_pricing_runs(&self) -> Result<usize>;

    /// True when a completed scheduled balance run started at or after
    /// `since_ms`.
    fn has_recent_scheduled_run(&self, since_ms: i64) -> Result<bool>;

    /// The latest `limit` completed runs, oldest first.
    fn latency_trends(&self, limit: usize) -> Result<Vec<LatencyTrendPoint>>;
    fn coverage_trends(&self, limit: usize) -> Result<Vec<CoverageTrendPoint>>;
}

/// Runs are stored under `ts:{timestamp}:{id}` so a prefix scan yields them
/// in time order; `id:{id}` points back at that key.
#[derive(Clone)]
pub struct SledRunStore {
    db: Db,
}

fn time_key(timestamp: i64, id: &str) -> String {
    format!("{}{:020}:{}", TS_PREFIX, timestamp.max(0), id)
}

fn id_key(id: &str) -> String {
    format!("id:{}", id)
}

fn newest_first<T: DeserializeOwned>(tree: &Tree) -> impl Iterator<Item = Result<T>> {
    tree.scan_prefix(TS_PREFIX).rev().map(|entry| {
        let (_, bytes) = entry?;
        Ok(serde_json::from_slice::<T>(&bytes)?)
    })
}

impl SledRunStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub fn open(path: &str) -> Result<Self> {
        Ok(Self::new(sled::open(path)?))
    }

    fn tree(&self, name: &str) -> Result<Tree> {
        Ok(self.db.open_tree(name)?)
    }

    fn insert<T: Serialize>(&self, tree: &str, id: &str, timestamp: i64, value: &T) -> Result<()> {
        let tree = self.tree(tree)?;
        let key = time_key(timestamp, id);

        // Record and id index land together or not at all.
        let mut batch = Batch::default();
        batch.insert(key.as_bytes(), serde_json::to_vec(value)?);
        batch.insert(id_key(id).as_bytes(), key.as_bytes());
        tree.apply_batch(batch)?;
        tree.flush()?;

        Ok(())
    }

    fn get<T: DeserializeOwned>(&self, tree: &str, id: &str) -> Result<Option<T>> {
        let tree = self.tree(tree)?;

        let Some(key) = tree.get(id_key(id))? else {
            return Ok(None);
        };

        match tree.get(key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn list<T: DeserializeOwned>(&self, tree: &str, limit: usize, offset: usize) -> Result<Vec<T>> {
        let tree = self.tree(tree)?;

        newest_first(&tree).skip(offset).take(limit).collect()
    }

    fn count(&self, tree: &str) -> Result<usize> {
        Ok(self.tree(tree)?.scan_prefix(TS_PREFIX).count())
    }
}

impl RunStore for SledRunStore {
    fn save_benchmark_run(&self, run: &BenchmarkRun, trigger: TriggerType) -> Result<String> {
        let stored = StoredBenchmarkRun {
            run: run.clone(),
            trigger_type: trigger,
        };
        self.insert(BENCHMARK_TREE, &run.id, run.timestamp, &stored)?;

        log::info!("Saved {} balance run {}", trigger, run.id);
        Ok(run.id.clone())
    }

    fn save_pricing_run(&self, run: &PricingRun, trigger: TriggerType) -> Result<String> {
        let stored = StoredPricingRun {
            run: run.clone(),
            trigger_type: trigger,
        };
        self.insert(PRICING_TREE, &run.id, run.timestamp, &stored)?;

        log::info!("Saved {} pricing run {}", trigger, run.id);
        Ok(run.id.clone())
    }

    fn benchmark_run(&self, id: &str) -> Result<Option<StoredBenchmarkRun>> {
        self.get(BENCHMARK_TREE, id)
    }

    fn pricing_run(&self, id: &str) -> Result<Option<StoredPricingRun>> {
        self.get(PRICING_TREE, id)
    }

    fn list_benchmark_runs(&self, limit: usize, offset: usize) -> Result<Vec<StoredBenchmarkRun>> {
        self.list(BENCHMARK_TREE, limit, offset)
    }

    fn list_pricing_runs(&self, limit: usize, offset: usize) -> Result<Vec<StoredPricingRun>> {
        self.list(PRICING_TREE, limit, offset)
    }

    fn count_benchmark_runs(&self) -> Result<usize> {
        self.count(BENCHMARK_TREE)
    }

    fn count_pricing_runs(&self) -> Result<usize> {
        self.count(PRICING_TREE)
    }

    fn has_recent_scheduled_run(&self, since_ms: i64) -> Result<bool> {
        let tree = self.tree(BENCHMARK_TREE)?;

        for stored in newest_first::<StoredBenchmarkRun>(&tree) {
            let stored = stored?;
            if stored.run.timestamp < since_ms {
                break;
            }
            if stored.trigger_type == TriggerType::Scheduled
                && stored.run.status == RunStatus::Completed
            {
                return Ok(true);
            }
        }

        Ok(false)
    }

    fn latency_trends(&self, limit: usize) -> Result<Vec<LatencyTrendPoint>> {
        let tree = self.tree(BENCHMARK_TREE)?;
        let mut points = Vec::new();

        for stored in newest_first::<StoredBenchmarkRun>(&tree) {
            if points.len() >= limit {
                break;
            }
            let run = stored?.run;
            if run.status != RunStatus::Completed {
                continue;
            }

            points.push(LatencyTrendPoint {
                providers: run
                    .results
                    .iter()
                    .map(|result| LatencySnapshot {
                        provider: result.provider,
                        display_name: result.display_name.clone(),
                        color: result.color.clone(),
                        latency_avg: result.latency.avg,
                        latency_p95: result.latency.p95,
                        reliability_rate: result.reliability.success_rate,
                        throughput_rps: result.throughput.requests_per_second,
                        completeness_score: result.completeness.score,
                    })
                    .collect(),
                id: run.id,
                timestamp: run.timestamp,
            });
        }

        points.reverse();
        Ok(points)
    }

    fn coverage_trends(&self, limit: usize) -> Result<Vec<CoverageTrendPoint>> {
        let tree = self.tree(PRICING_TREE)?;
        let mut points = Vec::new();

        for stored in newest_first::<StoredPricingRun>(&tree) {
            if points.len() >= limit {
                break;
            }
            let run = stored?.run;
            if run.status != RunStatus::Completed {
                continue;
            }

            points.push(CoverageTrendPoint {
                providers: run
                    .provider_results
                    .iter()
                    .map(|result| CoverageSnapshot {
                        provider: result.provider,
                        display_name: result.display_name.clone(),
                        color: result.color.clone(),
                        coverage_pct: result.coverage_percent,
                        avg_deviation: result.avg_deviation,
                    })
                    .collect(),
                id: run.id,
                timestamp: run.timestamp,
            });
        }

        points.reverse();
        Ok(points)
    }
}
