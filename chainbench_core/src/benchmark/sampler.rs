use std::fmt::Display;
use std::future::Future;
use tokio::time::Instant;

use super::dto::{LatencyStats, ReliabilityResult};

pub const MAX_RETAINED_ERRORS: usize = 5;
pub const MAX_ERROR_LENGTH: usize = 200;

pub struct SampleOutcome<T> {
    pub latency: LatencyStats,
    pub reliability: ReliabilityResult,
    pub last_success: Option<T>,
}

pub(crate) fn elapsed_ms(start: Instant) -> u64 {
    (start.elapsed().as_secs_f64() * 1000.0).round() as u64
}

pub(crate) fn truncate_message(message: &str) -> String {
    if message.chars().count() <= MAX_ERROR_LENGTH {
        message.to_string()
    } else {
        let truncated: String = message.chars().take(MAX_ERROR_LENGTH).collect();
        format!("{}...", truncated)
    }
}

impl LatencyStats {
    /// `p95` is always an observed sample: the element at `floor(0.95 * n)`,
    /// clamped to the last index.
    pub fn from_samples(samples: Vec<u64>) -> Self {
        if samples.is_empty() {
            return LatencyStats::default();
        }

        let mut sorted = samples.clone();
        sorted.sort_unstable();

        let n = sorted.len();
        let sum: u64 = sorted.iter().sum();
        let avg = (sum as f64 / n as f64).round() as u64;
        let p95_index = ((n as f64 * 0.95).floor() as usize).min(n - 1);

        LatencyStats {
            avg,
            min: sorted[0],
            max: sorted[n - 1],
            p95: sorted[p95_index],
            samples,
        }
    }

    /// True for the degenerate all-zero stats of a run with no iterations.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl ReliabilityResult {
    pub fn from_counts(successful: u32, failed: u32, errors: Vec<String>) -> Self {
        let total = successful + failed;
        let success_rate = if total > 0 {
            (successful as f64 / total as f64 * 100.0).round() as u32
        } else {
            0
        };

        ReliabilityResult {
            success_rate,
            total_requests: total,
            successful_requests: successful,
            failed_requests: failed,
            errors,
        }
    }
}

/// Runs `iterations` calls strictly one after another, timing each call
/// whether it succeeds or fails.
pub async fn sample_latency<F, Fut, T, E>(iterations: u32, mut fetch: F) -> SampleOutcome<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut samples = Vec::with_capacity(iterations as usize);
    let mut successful = 0;
    let mut failed = 0;
    let mut errors = Vec::new();
    let mut last_success = None;

    for _ in 0..iterations {
        let start = Instant::now();
        let outcome = fetch().await;
        samples.push(elapsed_ms(start));

        match outcome {
            Ok(payload) => {
                successful += 1;
                last_success = Some(payload);
            }
            Err(e) => {
                failed += 1;
                if errors.len() < MAX_RETAINED_ERRORS {
                    errors.push(truncate_message(&e.to_string()));
                }
            }
        }
    }

    SampleOutcome {
        latency: LatencyStats::from_samples(samples),
        reliability: ReliabilityResult::from_counts(successful, failed, errors),
        last_success,
    }
}
