use std::sync::Arc;

use chainbench_core::{
    benchmark::dto::BenchmarkRun,
    pricing::dto::PricingRun,
    storage::{dto::TriggerType, handler::RunStore},
};

/// Saves on a blocking task. A failed save is logged and never reaches the
/// caller, which already holds the computed run.
pub fn persist_benchmark_run(
    store: Arc<dyn RunStore>,
    run: BenchmarkRun,
    trigger: TriggerType,
) {
    tokio::task::spawn_blocking(move || {
        if let Err(e) = store.save_benchmark_run(&run, trigger) {
            log::error!("Failed to save balance run {}: {}", run.id, e);
        }
    });
}

pub fn persist_pricing_run(
    store: Arc<dyn RunStore>,
    run: PricingRun,
    trigger: TriggerType,
) {
    tokio::task::spawn_blocking(move || {
        if let Err(e) = store.save_pricing_run(&run, trigger) {
            log::error!("Failed to save pricing run {}: {}", run.id, e);
        }
    });
}
