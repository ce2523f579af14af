//! Per-operation cache and retry policies

use std::time::Duration;

use court_api::ApiError;

/// How long an unobserved entry survives after its last access
pub const DEFAULT_GC_TIME: Duration = Duration::from_secs(5 * 60);

const RETRY_BASE_DELAY: Duration = Duration::from_secs(1);
const RETRY_MAX_DELAY: Duration = Duration::from_secs(30);

/// Decides whether a failed fetch is attempted again
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPolicy {
    /// 4xx responses retry only on 408/429 (twice); everything else up to three times
    Default,
    /// Network failures retry twice, everything else once
    Health,
}

impl RetryPolicy {
    /// `failure_count` is the number of retries already made for this fetch
    pub fn should_retry(&self, failure_count: u32, error: &ApiError) -> bool {
        match self {
            RetryPolicy::Health => {
                if error.is_network() {
                    failure_count < 2
                } else {
                    failure_count < 1
                }
            }
            RetryPolicy::Default => match error {
                ApiError::Http { status, .. } if (400..500).contains(status) => {
                    matches!(status, 408 | 429) && failure_count < 2
                }
                _ => failure_count < 3,
            },
        }
    }
}

/// Delay before retry number `attempt_index` (0-based): 1s, 2s, 4s ... capped at 30s
pub fn retry_delay(attempt_index: u32) -> Duration {
    let factor = 1u32.checked_shl(attempt_index).unwrap_or(u32::MAX);
    RETRY_BASE_DELAY
        .checked_mul(factor)
        .map_or(RETRY_MAX_DELAY, |delay| delay.min(RETRY_MAX_DELAY))
}

/// Cache behaviour of one query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryPolicy {
    /// Data younger than this is served without a network call
    pub stale_time: Duration,
    /// Background refetch cadence while the key is observed
    pub refetch_interval: Option<Duration>,
    pub retry: RetryPolicy,
    pub gc_time: Duration,
}

impl Default for QueryPolicy {
    fn default() -> Self {
        Self {
            stale_time: Duration::from_secs(60),
            refetch_interval: None,
            retry: RetryPolicy::Default,
            gc_time: DEFAULT_GC_TIME,
        }
    }
}

impl QueryPolicy {
    pub fn health() -> Self {
        Self {
            stale_time: Duration::from_secs(30),
            refetch_interval: Some(Duration::from_secs(30)),
            retry: RetryPolicy::Health,
            ..Self::default()
        }
    }

    /// Lists, upcoming and detail views
    pub fn schedules() -> Self {
        Self::default()
    }

    pub fn stats() -> Self {
        Self {
            stale_time: Duration::from_secs(5 * 60),
            ..Self::default()
        }
    }

    pub fn scheduler_status() -> Self {
        Self {
            refetch_interval: Some(Duration::from_secs(2 * 60)),
            ..Self::default()
        }
    }

    pub fn token_status() -> Self {
        Self::default()
    }

    pub fn with_refetch_interval(mut self, interval: Option<Duration>) -> Self {
        self.refetch_interval = interval;
        self
    }
}
