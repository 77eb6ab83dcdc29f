//! Per-client token bucket
//!
//! Buckets live in a moka cache that forgets a client once it has been idle
//! for a whole window. By then its bucket would have refilled anyway, so
//! eviction never changes a decision.

use crate::config::RateLimitConfig;
use moka::future::Cache;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    refilled_at: Instant,
}

impl Bucket {
    fn full(capacity: f64) -> Self {
        Self {
            tokens: capacity,
            refilled_at: Instant::now(),
        }
    }

    /// Add tokens earned since the last refill, then try to spend one
    fn take(&mut self, capacity: f64, per_sec: f64) -> bool {
        let now = Instant::now();
        let earned = now.saturating_duration_since(self.refilled_at).as_secs_f64() * per_sec;
        self.tokens = capacity.min(self.tokens + earned);
        self.refilled_at = now;

        let allowed = self.tokens >= 1.0;
        if allowed {
            self.tokens -= 1.0;
        }
        allowed
    }
}

/// Token buckets keyed by client address
#[derive(Debug, Clone)]
pub struct RateLimiter {
    buckets: Cache<String, Arc<Mutex<Bucket>>>,
    capacity: f64,
    refill_per_sec: f64,
}

impl RateLimiter {
    /// Create limiter from config
    #[must_use]
    pub fn new(config: &RateLimitConfig) -> Self {
        let idle = config.window().max(Duration::from_secs(1));
        Self {
            buckets: Cache::builder()
                .max_capacity(config.max_clients)
                .time_to_idle(idle)
                .build(),
            capacity: f64::from(config.capacity),
            refill_per_sec: config.refill_per_sec(),
        }
    }

    /// Take one token for `key`; false when the bucket is empty
    pub async fn allow(&self, key: &str) -> bool {
        let capacity = self.capacity;
        let bucket = self
            .buckets
            .get_with_by_ref(key, async move { Arc::new(Mutex::new(Bucket::full(capacity))) })
            .await;

        let allowed = bucket.lock().take(self.capacity, self.refill_per_sec);
        if !allowed {
            tracing::warn!("Rate limit exceeded for {}", key);
        }
        allowed
    }

    /// Number of tracked clients, after pending evictions
    pub async fn tracked(&self) -> u64 {
        self.buckets.run_pending_tasks().await;
        self.buckets.entry_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(capacity: u32, window_secs: u64) -> RateLimiter {
        RateLimiter::new(&RateLimitConfig {
            capacity,
            window_secs,
            ..RateLimitConfig::default()
        })
    }

    #[tokio::test(start_paused = true)]
    async fn exhausts_then_refills() {
        let limiter = limiter(3, 30);
        for _ in 0..3 {
            assert!(limiter.allow("10.0.0.1").await);
        }
        assert!(!limiter.allow("10.0.0.1").await);

        // one token every 10 s
        tokio::time::advance(Duration::from_secs(10)).await;
        assert!(limiter.allow("10.0.0.1").await);
        assert!(!limiter.allow("10.0.0.1").await);
    }

    #[tokio::test(start_paused = true)]
    async fn clients_are_independent() {
        let limiter = limiter(1, 900);
        assert!(limiter.allow("10.0.0.1").await);
        assert!(!limiter.allow("10.0.0.1").await);
        assert!(limiter.allow("10.0.0.2").await);
        assert_eq!(limiter.tracked().await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn refill_is_capped() {
        let limiter = limiter(2, 2);
        assert!(limiter.allow("a").await);
        tokio::time::advance(Duration::from_secs(3600)).await;
        assert!(limiter.allow("a").await);
        assert!(limiter.allow("a").await);
        assert!(!limiter.allow("a").await);
    }

    #[tokio::test]
    async fn idle_clients_are_forgotten() {
        let limiter = limiter(5, 1);
        for i in 0..200 {
            assert!(limiter.allow(&format!("10.0.{}.{}", i / 256, i % 256)).await);
        }
        assert_eq!(limiter.tracked().await, 200);

        // idle expiry runs on the cache's own wall clock
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(limiter.allow("10.9.9.9").await);
        assert_eq!(limiter.tracked().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn bounded_by_max_clients() {
        let limiter = RateLimiter::new(&RateLimitConfig {
            max_clients: 10,
            ..RateLimitConfig::default()
        });
        for i in 0..100 {
            limiter.allow(&format!("client-{i}")).await;
        }
        assert!(limiter.tracked().await <= 10);
    }
}
