use futures::future::join_all;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

use super::dto::ThroughputResult;
use super::sampler::elapsed_ms;
use crate::helpers::utils::round2;

/// Fires `concurrency` calls at once and measures the window from first
/// dispatch to last completion. Failures are counted, never retried.
pub async fn probe_throughput<F, Fut, T, E>(concurrency: u32, fetch: F) -> ThroughputResult
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let start = Instant::now();
    let outcomes = join_all((0..concurrency).map(|_| fetch())).await;
    let window = start.elapsed();
    let window_ms = elapsed_ms(start);

    let completed = outcomes.iter().filter(|outcome| outcome.is_ok()).count() as u32;

    ThroughputResult {
        requests_per_second: requests_per_second(completed, window),
        concurrent_requests: concurrency,
        completed_in_window: completed,
        window_ms,
    }
}

/// Measured against the exact window; `window_ms` on the result is only the
/// rounded display value.
pub fn requests_per_second(completed: u32, window: Duration) -> f64 {
    if window.is_zero() {
        return 0.0;
    }

    round2(completed as f64 / window.as_secs_f64())
}
