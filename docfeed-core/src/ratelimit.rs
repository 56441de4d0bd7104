//! Request pacing for the source API.
//!
//! Single token bucket with capacity one: `acquire` returns immediately when a
//! token is available and otherwise sleeps for the remaining refill time. At
//! 1.0 requests/second this reproduces the one-fetch-per-second cadence while
//! keeping the rate a configuration knob instead of a hardcoded sleep.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

struct PacerState {
    tokens: f64,
    last_refill: Instant,
}

pub struct RequestPacer {
    refill_per_second: f64,
    state: Mutex<PacerState>,
}

impl RequestPacer {
    /// `requests_per_second` must be positive; config validation enforces this.
    pub fn new(requests_per_second: f64) -> Self {
        Self {
            refill_per_second: requests_per_second,
            state: Mutex::new(PacerState {
                tokens: 1.0,
                last_refill: Instant::now(),
            }),
        }
    }

    /// Wait until the next request slot is available, then consume it.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut state = self.state.lock().await;
                let now = Instant::now();
                let elapsed = now.duration_since(state.last_refill).as_secs_f64();
                state.tokens = (state.tokens + elapsed * self.refill_per_second).min(1.0);
                state.last_refill = now;

                if state.tokens >= 1.0 {
                    state.tokens -= 1.0;
                    return;
                }
                Duration::from_secs_f64((1.0 - state.tokens) / self.refill_per_second)
            };
            tokio::time::sleep(wait).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn first_acquire_is_immediate() {
        let pacer = RequestPacer::new(1.0);
        let start = Instant::now();
        pacer.acquire().await;
        assert!(start.elapsed() < Duration::from_millis(10));
    }

    #[tokio::test(start_paused = true)]
    async fn second_acquire_waits_for_refill() {
        let pacer = RequestPacer::new(1.0);
        let start = Instant::now();
        pacer.acquire().await;
        pacer.acquire().await;
        assert!(start.elapsed() >= Duration::from_millis(900));
    }

    #[tokio::test(start_paused = true)]
    async fn rate_scales_the_wait() {
        let pacer = RequestPacer::new(10.0);
        let start = Instant::now();
        for _ in 0..5 {
            pacer.acquire().await;
        }
        // Four refills at 100ms each after the initial token.
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(350), "elapsed: {elapsed:?}");
        assert!(elapsed < Duration::from_secs(1), "elapsed: {elapsed:?}");
    }
}
