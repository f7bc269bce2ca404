use dashmap::DashMap;
use std::time::{Duration, Instant};

// One fixed window: at most `max_points` consumptions per `window_secs`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimiterConfig {
    pub max_points: u32,
    pub window_secs: u64,
}

impl RateLimiterConfig {
    pub fn new(max_points: u32, window_secs: u64) -> Self {
        Self { max_points, window_secs }
    }
}

// Window state - tracks consumptions per key, per window duration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowState {
    pub count: u32,
    pub window_start: Instant,
    pub window_secs: u64,
}

impl WindowState {
    fn new(window_secs: u64, now: Instant) -> Self {
        Self { count: 0, window_start: now, window_secs }
    }

    // window expired..? reset it
    fn roll(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed >= Duration::from_secs(self.window_secs) {
            self.count = 0;
            self.window_start = now;
        }
    }

    fn retry_after_secs(&self, now: Instant) -> u64 {
        let elapsed = now.saturating_duration_since(self.window_start);
        ceil_secs(Duration::from_secs(self.window_secs).saturating_sub(elapsed))
    }
}

fn ceil_secs(d: Duration) -> u64 {
    d.as_secs() + u64::from(d.subsec_nanos() > 0)
}

// Rejection - which window was full and when to try again
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimited {
    pub window_secs: u64,
    pub retry_after_secs: u64,
}

// Per-key limiter over any number of fixed windows.
//
// All windows of a key live in a single map entry, so the check-then-increment
// for one key runs under that entry's shard lock and can't interleave with
// another request for the same key.
#[derive(Default)]
pub struct RateLimiter {
    entries: DashMap<String, Vec<WindowState>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_consume(&self, key: &str, configs: &[RateLimiterConfig]) -> Result<(), RateLimited> {
        self.try_consume_at(key, configs, Instant::now())
    }

    // All-or-nothing: either every window gets a point or none does
    pub fn try_consume_at(
        &self,
        key: &str,
        configs: &[RateLimiterConfig],
        now: Instant,
    ) -> Result<(), RateLimited> {
        let mut windows = self.entries.entry(key.to_string()).or_default();

        let mut slots = Vec::with_capacity(configs.len());
        for config in configs {
            let idx = match windows.iter().position(|w| w.window_secs == config.window_secs) {
                Some(idx) => idx,
                None => {
                    windows.push(WindowState::new(config.window_secs, now));
                    windows.len() - 1
                }
            };

            let window = &mut windows[idx];
            window.roll(now);

            // over limit - bail before touching any counter
            if window.count >= config.max_points {
                return Err(RateLimited {
                    window_secs: config.window_secs,
                    retry_after_secs: window.retry_after_secs(now),
                });
            }
            slots.push(idx);
        }

        for idx in slots {
            windows[idx].count += 1;
        }
        Ok(())
    }

    // Snapshot of a key's windows (empty if the key was never consumed)
    pub fn usage(&self, key: &str) -> Vec<WindowState> {
        self.entries.get(key).map(|w| w.value().clone()).unwrap_or_default()
    }

    pub fn count(&self, key: &str, window: &RateLimiterConfig) -> u32 {
        self.entries
            .get(key)
            .and_then(|ws| ws.iter().find(|w| w.window_secs == window.window_secs).map(|w| w.count))
            .unwrap_or(0)
    }

    pub fn tracked_keys(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const HOURLY: RateLimiterConfig = RateLimiterConfig { max_points: 3, window_secs: 3600 };
    const DAILY: RateLimiterConfig = RateLimiterConfig { max_points: 10, window_secs: 86_400 };
    const KEY: &str = "user@example.com";

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn first_request_always_succeeds() {
        let limiter = RateLimiter::new();
        assert!(limiter.try_consume(KEY, &[HOURLY, DAILY]).is_ok());
        assert_eq!(limiter.count(KEY, &HOURLY), 1);
        assert_eq!(limiter.count(KEY, &DAILY), 1);
    }

    #[test]
    fn fourth_attempt_within_the_hour_is_rejected() {
        let limiter = RateLimiter::new();
        let start = Instant::now();

        for i in 0..3 {
            assert!(limiter.try_consume_at(KEY, &[HOURLY, DAILY], start + secs(i * 60)).is_ok());
        }

        let err = limiter
            .try_consume_at(KEY, &[HOURLY, DAILY], start + secs(600))
            .unwrap_err();
        assert_eq!(err.window_secs, 3600);
        assert_eq!(err.retry_after_secs, 3000);
        assert!(err.retry_after_secs > 0 && err.retry_after_secs <= 3600);
    }

    #[test]
    fn retry_after_rounds_up() {
        let limiter = RateLimiter::new();
        let start = Instant::now();
        let one = RateLimiterConfig::new(1, 10);

        limiter.try_consume_at(KEY, &[one], start).unwrap();
        let err = limiter
            .try_consume_at(KEY, &[one], start + Duration::from_millis(9_001))
            .unwrap_err();
        assert_eq!(err.retry_after_secs, 1);
    }

    #[test]
    fn window_resets_after_duration() {
        let limiter = RateLimiter::new();
        let start = Instant::now();

        for _ in 0..3 {
            limiter.try_consume_at(KEY, &[HOURLY, DAILY], start).unwrap();
        }
        assert!(limiter.try_consume_at(KEY, &[HOURLY, DAILY], start + secs(3599)).is_err());

        // exactly at the boundary the window rolls over
        assert!(limiter.try_consume_at(KEY, &[HOURLY, DAILY], start + secs(3600)).is_ok());
        assert_eq!(limiter.count(KEY, &HOURLY), 1);
        assert_eq!(limiter.count(KEY, &DAILY), 4);
    }

    #[test]
    fn daily_window_blocks_without_touching_hourly() {
        let limiter = RateLimiter::new();
        let start = Instant::now();

        // 10 sends spread over hours exhaust the daily quota
        for h in 0..10 {
            limiter
                .try_consume_at(KEY, &[HOURLY, DAILY], start + secs(h * 3600))
                .unwrap();
        }

        let at = start + secs(10 * 3600);
        let err = limiter.try_consume_at(KEY, &[HOURLY, DAILY], at).unwrap_err();
        assert_eq!(err.window_secs, 86_400);
        assert_eq!(err.retry_after_secs, 86_400 - 10 * 3600);

        // the hourly window rolled over during the check but got no point
        assert_eq!(limiter.count(KEY, &HOURLY), 0);
        assert_eq!(limiter.count(KEY, &DAILY), 10);
    }

    #[test]
    fn hourly_rejection_leaves_daily_untouched() {
        let limiter = RateLimiter::new();
        let start = Instant::now();

        for _ in 0..3 {
            limiter.try_consume_at(KEY, &[HOURLY, DAILY], start).unwrap();
        }
        for _ in 0..5 {
            assert!(limiter.try_consume_at(KEY, &[HOURLY, DAILY], start).is_err());
        }
        assert_eq!(limiter.count(KEY, &HOURLY), 3);
        assert_eq!(limiter.count(KEY, &DAILY), 3);
    }

    #[test]
    fn keys_are_independent() {
        let limiter = RateLimiter::new();
        let start = Instant::now();

        for _ in 0..3 {
            limiter.try_consume_at("a@example.com", &[HOURLY], start).unwrap();
        }
        assert!(limiter.try_consume_at("a@example.com", &[HOURLY], start).is_err());
        assert!(limiter.try_consume_at("b@example.com", &[HOURLY], start).is_ok());
        assert_eq!(limiter.tracked_keys(), 2);
    }

    #[test]
    fn huge_quota_never_limits() {
        let limiter = RateLimiter::new();
        let roomy = RateLimiterConfig::new(u32::MAX, 60);
        for _ in 0..10_000 {
            assert!(limiter.try_consume(KEY, &[roomy]).is_ok());
        }
    }

    #[test]
    fn usage_is_empty_for_unknown_key() {
        let limiter = RateLimiter::new();
        assert!(limiter.usage("nobody@example.com").is_empty());
        assert_eq!(limiter.count("nobody@example.com", &HOURLY), 0);
    }

    #[test]
    fn concurrent_requests_never_exceed_quota() {
        let limiter = Arc::new(RateLimiter::new());
        let allowed = Arc::new(AtomicUsize::new(0));

        std::thread::scope(|s| {
            for _ in 0..64 {
                let limiter = Arc::clone(&limiter);
                let allowed = Arc::clone(&allowed);
                s.spawn(move || {
                    if limiter.try_consume(KEY, &[HOURLY, DAILY]).is_ok() {
                        allowed.fetch_add(1, Ordering::SeqCst);
                    }
                });
            }
        });

        assert_eq!(allowed.load(Ordering::SeqCst), 3);
        assert_eq!(limiter.count(KEY, &HOURLY), 3);
        assert_eq!(limiter.count(KEY, &DAILY), 3);
    }

    proptest! {
        // Within one instant: exactly min(hourly, daily) attempts pass and a
        // rejected attempt never moves either counter.
        #[test]
        fn windows_are_conjunctive(hourly in 1u32..8, daily in 1u32..8, attempts in 1usize..24) {
            let limiter = RateLimiter::new();
            let now = Instant::now();
            let configs = [RateLimiterConfig::new(hourly, 3600), RateLimiterConfig::new(daily, 86_400)];

            let mut passed = 0u32;
            for _ in 0..attempts {
                let before = limiter.usage(KEY);
                match limiter.try_consume_at(KEY, &configs, now) {
                    Ok(()) => passed += 1,
                    Err(_) => {
                        prop_assert_eq!(limiter.usage(KEY), before);
                    }
                }
            }

            let expected = (attempts as u32).min(hourly.min(daily));
            prop_assert_eq!(passed, expected);
            prop_assert_eq!(limiter.count(KEY, &configs[0]), expected);
            prop_assert_eq!(limiter.count(KEY, &configs[1]), expected);
        }
    }
}
