//! Rate-limited page fetching with bounded retries.
//!
//! One blocking GET at a time, a minimum pause between consecutive
//! requests, and a linear backoff between attempts on the same URL.

use std::time::{Duration, Instant};

use crate::error::{FetchError, FetchResult};

// The wiki answers 403 to default library user agents, so requests
// carry a browser-shaped header set.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
                          AppleWebKit/537.36 (KHTML, like Gecko) \
                          Chrome/114.0.0.0 Safari/537.36";
const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

/// Time source for the rate limiter. Swappable so tests can observe
/// the wait schedule without real sleeping.
pub trait Clock: Send {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration);
}

/// Wall clock used outside of tests
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Tuning knobs for the fetcher
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Minimum pause between the end of one request and the start of the next
    pub min_delay: Duration,
    /// Attempts per URL before giving up
    pub max_attempts: u32,
    /// Base wait between attempts; attempt n is followed by n times this
    pub retry_backoff: Duration,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_millis(1500),
            max_attempts: 3,
            retry_backoff: Duration::from_secs(1),
            timeout: Duration::from_secs(15),
        }
    }
}

/// Blocking HTTP fetcher shared by every request of a sweep.
///
/// Keeping one instance per run is what makes the rate limit global:
/// the timestamp of the previous request lives here.
pub struct Fetcher {
    client: reqwest::blocking::Client,
    config: FetchConfig,
    referer: String,
    clock: Box<dyn Clock>,
    last_request: Option<Instant>,
}

impl Fetcher {
    /// Creates a fetcher whose Referer header points at the site root
    pub fn new(base_url: &str, config: FetchConfig) -> FetchResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            config,
            referer: base_url.trim_end_matches('/').to_string(),
            clock: Box::new(SystemClock),
            last_request: None,
        })
    }

    /// Replaces the time source (used by tests)
    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Fetches a page body, retrying failed attempts with linear backoff.
    ///
    /// Any network error or non-success status counts as a failed
    /// attempt; the last attempt's error surfaces to the caller.
    pub fn fetch(&mut self, url: &str) -> FetchResult<String> {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 1u32;

        loop {
            self.wait_for_slot();
            let result = self.try_get(url);
            self.last_request = Some(self.clock.now());

            let err = match result {
                Ok(body) => return Ok(body),
                Err(e) => e,
            };

            if attempt >= max_attempts {
                log::warn!("Giving up on {} after {} attempts: {}", url, attempt, err);
                return Err(err);
            }

            let backoff = self.config.retry_backoff * attempt;
            match &err {
                FetchError::HttpStatus(status) if is_rate_limit(status) => {
                    log::warn!("{} on {}, backing off {:?}", status, url, backoff);
                }
                _ => {
                    log::warn!(
                        "Attempt {} failed on {}: {}, retrying in {:?}",
                        attempt,
                        url,
                        err,
                        backoff
                    );
                }
            }
            self.clock.sleep(backoff);
            attempt += 1;
        }
    }

    /// One GET, no retries. Success means a 2xx status with a readable body.
    fn try_get(&self, url: &str) -> FetchResult<String> {
        log::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .header("User-Agent", USER_AGENT)
            .header("Accept", ACCEPT)
            .header("Accept-Language", ACCEPT_LANGUAGE)
            .header("Referer", &self.referer)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status));
        }

        Ok(response.text()?)
    }

    /// Blocks until the minimum inter-request pause has passed, measured
    /// from the end of the previous request.
    fn wait_for_slot(&mut self) {
        if let Some(last) = self.last_request {
            let elapsed = self.clock.now().duration_since(last);
            if elapsed < self.config.min_delay {
                self.clock.sleep(self.config.min_delay - elapsed);
            }
        }
    }
}

/// Statuses the wiki uses to push back on scrapers
fn is_rate_limit(status: &reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 403 | 405 | 429)
}

#[cfg(test)]
#[path = "fetch_tests.rs"]
mod tests;
