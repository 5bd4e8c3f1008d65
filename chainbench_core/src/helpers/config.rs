use std::{env, str::FromStr, time::Duration};

/// Orchestrator limits, read once at startup.
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    pub default_iterations: u32,
    pub default_concurrency: u32,
    pub max_iterations: u32,
    pub max_concurrency: u32,
    pub request_timeout: Duration,
    pub run_deadline: Duration,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            default_iterations: 5,
            default_concurrency: 3,
            max_iterations: 20,
            max_concurrency: 10,
            request_timeout: Duration::from_secs(15),
            run_deadline: Duration::from_secs(110),
        }
    }
}

fn env_or<T: FromStr>(name: &str, fallback: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.trim().parse::<T>().unwrap_or_else(|_| {
            log::warn!("Ignoring unparsable {}={:?}", name, raw);
            fallback
        }),
        Err(_) => fallback,
    }
}

impl BenchmarkConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            default_iterations: env_or("BENCH_DEFAULT_ITERATIONS", defaults.default_iterations),
            default_concurrency: env_or("BENCH_DEFAULT_CONCURRENCY", defaults.default_concurrency),
            max_iterations: env_or("BENCH_MAX_ITERATIONS", defaults.max_iterations),
            max_concurrency: env_or("BENCH_MAX_CONCURRENCY", defaults.max_concurrency),
            request_timeout: Duration::from_secs(env_or(
                "BENCH_REQUEST_TIMEOUT_SECS",
                defaults.request_timeout.as_secs(),
            )),
            run_deadline: Duration::from_secs(env_or(
                "BENCH_RUN_DEADLINE_SECS",
                defaults.run_deadline.as_secs(),
            )),
        }
    }

    /// Defaulted and clamped iteration count. Zero stays zero so the
    /// orchestrator can reject it.
    pub fn iterations(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.default_iterations)
            .min(self.max_iterations)
    }

    pub fn concurrency(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.default_concurrency)
            .clamp(1, self.max_concurrency.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iterations_are_defaulted_and_clamped() {
        let config = BenchmarkConfig::default();

        assert_eq!(config.iterations(None), 5);
        assert_eq!(config.iterations(Some(3)), 3);
        assert_eq!(config.iterations(Some(500)), 20);
        assert_eq!(config.iterations(Some(0)), 0);
    }

    #[test]
    fn test_concurrency_is_defaulted_and_clamped() {
        let config = BenchmarkConfig::default();

        assert_eq!(config.concurrency(None), 3);
        assert_eq!(config.concurrency(Some(0)), 1);
        assert_eq!(config.concurrency(Some(64)), 10);
    }
}
