use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use governor::clock::{Clock, DefaultClock};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::blocking::Client;

const REQUEST_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = concat!("ladder_digest/", env!("CARGO_PKG_VERSION"));

pub fn build_http_client() -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .user_agent(USER_AGENT)
        .build()
        .context("failed to build http client")
}

/// Spaces requests at least `min_interval` apart across every thread that
/// shares it. A zero interval disables pacing.
pub struct RequestPacer {
    limiter: Option<DefaultDirectRateLimiter>,
    clock: DefaultClock,
}

impl RequestPacer {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            limiter: Quota::with_period(min_interval).map(RateLimiter::direct),
            clock: DefaultClock::default(),
        }
    }

    /// Block until the next request may go out.
    pub fn wait(&self) {
        let Some(limiter) = self.limiter.as_ref() else {
            return;
        };
        while let Err(not_until) = limiter.check() {
            thread::sleep(not_until.wait_time_from(self.clock.now()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RequestPacer;
    use std::time::{Duration, Instant};

    #[test]
    fn consecutive_waits_are_spaced() {
        let pacer = RequestPacer::new(Duration::from_millis(30));
        let start = Instant::now();
        pacer.wait();
        pacer.wait();
        pacer.wait();
        // two full periods, with a little slack for clock granularity
        assert!(start.elapsed() >= Duration::from_millis(55));
    }

    #[test]
    fn first_wait_is_immediate() {
        let pacer = RequestPacer::new(Duration::from_secs(5));
        let start = Instant::now();
        pacer.wait();
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn zero_interval_never_blocks() {
        let pacer = RequestPacer::new(Duration::ZERO);
        let start = Instant::now();
        for _ in 0..100 {
            pacer.wait();
        }
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
