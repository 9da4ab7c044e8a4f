use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use crate::config::AppConfig;
use crate::error::AppError;

/// Fixed-window limiter for `/v1/relay`, keyed by client address.
#[derive(Clone)]
pub struct RelayRateLimiter {
    state: Arc<Mutex<HashMap<IpAddr, RateWindow>>>,
    window: Duration,
    limit: u32,
    metrics: Arc<RateLimitMetrics>,
}

#[derive(Default)]
struct RateLimitMetrics {
    relay_allowed: AtomicU64,
    relay_limited: AtomicU64,
}

#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct RateLimitMetricsSnapshot {
    pub relay_allowed: u64,
    pub relay_limited: u64,
    pub tracked_clients: usize,
}

#[derive(Debug, Clone, Copy)]
struct RateWindow {
    started_at: Instant,
    count: u32,
}

impl RelayRateLimiter {
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.rate_limit_window, config.relay_rate_limit_per_window)
    }

    fn new(window: Duration, limit: u32) -> Self {
        Self {
            state: Arc::new(Mutex::new(HashMap::new())),
            window,
            limit,
            metrics: Arc::new(RateLimitMetrics::default()),
        }
    }

    pub async fn check(&self, client: IpAddr) -> Result<(), AppError> {
        let now = Instant::now();
        let mut guard = self.state.lock().await;

        // Expired windows would otherwise pile up per address.
        let window = self.window;
        guard.retain(|_, entry| now.duration_since(entry.started_at) < window);

        let entry = guard.entry(client).or_insert(RateWindow {
            started_at: now,
            count: 0,
        });

        if entry.count >= self.limit {
            let retry_after_secs = self
                .window
                .saturating_sub(now.duration_since(entry.started_at))
                .as_secs()
                .max(1);
            self.metrics.relay_limited.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(%client, retry_after_secs, "Relay rate limit exceeded");
            return Err(AppError::too_many_requests(
                "Rate limit exceeded, try again later",
                retry_after_secs,
            ));
        }

        entry.count += 1;
        self.metrics.relay_allowed.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    pub async fn metrics_snapshot(&self) -> RateLimitMetricsSnapshot {
        let tracked_clients = self.state.lock().await.len();
        RateLimitMetricsSnapshot {
            relay_allowed: self.metrics.relay_allowed.load(Ordering::Relaxed),
            relay_limited: self.metrics.relay_limited.load(Ordering::Relaxed),
            tracked_clients,
        }
    }
}
