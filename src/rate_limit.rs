// ==============================================================================
// rate_limit.rs - Per-Source Admission Control
// ==============================================================================
// Description: Blocking requests-per-second gate shared by all annotation workers
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================
// Callers wait for capacity instead of being rejected. Admissions are spaced
// evenly (one every 1/N seconds, burst of one), so any rolling one-second
// window holds at most N admissions.
// ==============================================================================

use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::num::NonZeroU32;
use std::time::Duration;

/// Admission gate for one upstream source
pub struct AdmissionGate {
    limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    per_second: NonZeroU32,
}

impl AdmissionGate {
    /// Gate admitting at most `per_second` callers per rolling second
    pub fn per_second(per_second: NonZeroU32) -> Self {
        let period = Duration::from_secs(1) / per_second.get();
        let quota = Quota::with_period(period)
            .unwrap_or_else(|| Quota::per_second(per_second))
            .allow_burst(NonZeroU32::MIN);

        Self {
            limiter: RateLimiter::direct(quota),
            per_second,
        }
    }

    /// Wait until a slot is available, then consume it
    pub async fn acquire(&self) {
        self.limiter.until_ready().await;
    }

}

impl std::fmt::Debug for AdmissionGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdmissionGate")
            .field("per_second", &self.per_second)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Instant;

    fn nz(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    #[tokio::test]
    async fn test_no_burst_beyond_one() {
        let gate = AdmissionGate::per_second(nz(15));
        let start = Instant::now();
        gate.acquire().await;
        assert!(start.elapsed() < Duration::from_millis(50));

        // Second admission waits out the 1/15 s spacing
        gate.acquire().await;
        assert!(start.elapsed() >= Duration::from_millis(60));
    }

    #[tokio::test]
    async fn test_acquire_waits_for_capacity() {
        let gate = AdmissionGate::per_second(nz(10));
        let start = Instant::now();
        for _ in 0..4 {
            gate.acquire().await;
        }
        // First admission is immediate, the next three are 100 ms apart
        assert!(start.elapsed() >= Duration::from_millis(280));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_rolling_window_ceiling_under_concurrency() {
        let limit = 10usize;
        let gate = Arc::new(AdmissionGate::per_second(nz(limit as u32)));

        let handles: Vec<_> = (0..25)
            .map(|_| {
                let gate = Arc::clone(&gate);
                tokio::spawn(async move {
                    gate.acquire().await;
                    Instant::now()
                })
            })
            .collect();

        let mut admitted = Vec::new();
        for handle in handles {
            admitted.push(handle.await.unwrap());
        }
        admitted.sort();

        // Any limit+1 consecutive admissions must span (almost) a full second;
        // the slack covers scheduling delay between admission and timestamp.
        for window in admitted.windows(limit + 1) {
            let span = window[limit].duration_since(window[0]);
            assert!(
                span >= Duration::from_millis(900),
                "{} admissions within {:?}",
                limit + 1,
                span
            );
        }
    }
}
