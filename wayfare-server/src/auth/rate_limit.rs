//! Application-layer rate limiting for login and registration routes

use dashmap::DashMap;
use std::sync::Arc;
use tokio::time::Instant;

struct IpEntry {
    count: u32,
    window_start: Instant,
}

/// 按 (路由, IP) 的滑动窗口计数器。
///
/// DashMap 分片锁，认证热点路径无全局互斥。
#[derive(Clone)]
pub struct RateLimiter {
    inner: Arc<DashMap<(&'static str, String), IpEntry>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
        }
    }

    /// Returns `true` if the request is allowed, `false` if rate-limited.
    pub fn check(&self, route: &'static str, ip: &str, max_requests: u32, window_secs: u64) -> bool {
        let now = Instant::now();
        let mut entry = self
            .inner
            .entry((route, ip.to_owned()))
            .or_insert_with(|| IpEntry {
                count: 0,
                window_start: now,
            });

        // Reset window if expired
        if now.duration_since(entry.window_start).as_secs() >= window_secs {
            entry.count = 0;
            entry.window_start = now;
        }

        entry.count += 1;
        entry.count <= max_requests
    }

    /// Remove entries older than 5 minutes
    pub fn cleanup(&self) {
        let cutoff = std::time::Duration::from_secs(300);
        let now = Instant::now();
        self.inner
            .retain(|_, entry| now.duration_since(entry.window_start) < cutoff);
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn window_allows_then_blocks() {
        let limiter = RateLimiter::new();
        for _ in 0..5 {
            assert!(limiter.check("auth", "1.2.3.4", 5, 60));
        }
        assert!(!limiter.check("auth", "1.2.3.4", 5, 60));
        // Different IP has its own window
        assert!(limiter.check("auth", "5.6.7.8", 5, 60));
    }
}
