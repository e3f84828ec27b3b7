//! Tests for the rate-limited fetcher.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use wiremock::matchers::{header, headers, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::{Clock, FetchConfig, Fetcher};
use crate::error::FetchError;

/// Fake clock that advances instantly on sleep and records every wait.
#[derive(Clone)]
struct TestClock {
    state: Arc<Mutex<TestClockState>>,
}

struct TestClockState {
    now: Instant,
    sleeps: Vec<Duration>,
}

impl TestClock {
    fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(TestClockState {
                now: Instant::now(),
                sleeps: Vec::new(),
            })),
        }
    }

    /// Moves time forward without recording a wait
    fn advance(&self, duration: Duration) {
        self.state.lock().unwrap().now += duration;
    }

    fn sleeps(&self) -> Vec<Duration> {
        self.state.lock().unwrap().sleeps.clone()
    }
}

impl Clock for TestClock {
    fn now(&self) -> Instant {
        self.state.lock().unwrap().now
    }

    fn sleep(&self, duration: Duration) {
        let mut state = self.state.lock().unwrap();
        state.now += duration;
        state.sleeps.push(duration);
    }
}

/// Config with no real waiting, for tests that only care about requests
fn quick_config() -> FetchConfig {
    FetchConfig {
        min_delay: Duration::ZERO,
        retry_backoff: Duration::ZERO,
        ..FetchConfig::default()
    }
}

// ── fetch ────────────────────────────────────────────────────────────

#[tokio::test]
async fn fetch_returns_body_on_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .mount(&mock_server)
        .await;

    let base = mock_server.uri();
    let body = tokio::task::spawn_blocking(move || {
        let mut fetcher = Fetcher::new(&base, quick_config()).unwrap();
        fetcher.fetch(&format!("{base}/page"))
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(body, "<html>ok</html>");
}

#[tokio::test]
async fn fetch_sends_browser_headers() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/page"))
        // wiremock's header matcher splits received values on commas, so
        // comma-containing expectations must be written in pre-split form
        .and(headers(
            "User-Agent",
            vec![
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML",
                "like Gecko) Chrome/114.0.0.0 Safari/537.36",
            ],
        ))
        .and(headers("Accept-Language", vec!["en-US", "en;q=0.9"]))
        .and(header("Referer", base.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = tokio::task::spawn_blocking(move || {
        let config = FetchConfig {
            max_attempts: 1,
            ..quick_config()
        };
        let mut fetcher = Fetcher::new(&base, config).unwrap();
        fetcher.fetch(&format!("{base}/page"))
    })
    .await
    .unwrap();

    assert!(result.is_ok(), "headers did not match: {result:?}");
}

// ── retries ──────────────────────────────────────────────────────────

#[tokio::test]
async fn failing_url_is_tried_exactly_max_attempts_times() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;

    let base = mock_server.uri();
    let result = tokio::task::spawn_blocking(move || {
        let config = FetchConfig {
            max_attempts: 3,
            ..quick_config()
        };
        let mut fetcher = Fetcher::new(&base, config).unwrap();
        fetcher.fetch(&format!("{base}/broken"))
    })
    .await
    .unwrap();

    match result {
        Err(FetchError::HttpStatus(status)) => assert_eq!(status.as_u16(), 500),
        other => panic!("Expected HttpStatus error, got: {other:?}"),
    }
    // The mock server verifies the expected request count on drop
}

#[tokio::test]
async fn recovers_when_a_retry_succeeds() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_string("recovered"))
        .mount(&mock_server)
        .await;

    let base = mock_server.uri();
    let body = tokio::task::spawn_blocking(move || {
        let mut fetcher = Fetcher::new(&base, quick_config()).unwrap();
        fetcher.fetch(&format!("{base}/flaky"))
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(body, "recovered");
}

#[tokio::test]
async fn non_success_status_surfaces_as_http_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let base = mock_server.uri();
    let result = tokio::task::spawn_blocking(move || {
        let config = FetchConfig {
            max_attempts: 1,
            ..quick_config()
        };
        let mut fetcher = Fetcher::new(&base, config).unwrap();
        fetcher.fetch(&format!("{base}/missing"))
    })
    .await
    .unwrap();

    match result {
        Err(FetchError::HttpStatus(status)) => {
            assert_eq!(status, reqwest::StatusCode::NOT_FOUND);
        }
        other => panic!("Expected HttpStatus error, got: {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_host_returns_network_error() {
    let result = tokio::task::spawn_blocking(|| {
        let config = FetchConfig {
            max_attempts: 1,
            ..quick_config()
        };
        let mut fetcher = Fetcher::new("http://127.0.0.1:1", config).unwrap();
        fetcher.fetch("http://127.0.0.1:1/nope")
    })
    .await
    .unwrap();

    match result {
        Err(FetchError::Network(_)) => {}
        other => panic!("Expected Network error, got: {other:?}"),
    }
}

// ── rate limiting ────────────────────────────────────────────────────

#[tokio::test]
async fn consecutive_fetches_wait_out_the_min_delay() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&mock_server)
        .await;

    let clock = TestClock::new();
    let sleeps_handle = clock.clone();
    let base = mock_server.uri();

    tokio::task::spawn_blocking(move || {
        let config = FetchConfig {
            min_delay: Duration::from_millis(1500),
            ..FetchConfig::default()
        };
        let mut fetcher = Fetcher::new(&base, config)
            .unwrap()
            .with_clock(Box::new(clock));
        fetcher.fetch(&format!("{base}/a")).unwrap();
        fetcher.fetch(&format!("{base}/b")).unwrap();
    })
    .await
    .unwrap();

    // The first request goes out immediately, the second waits the full delay
    assert_eq!(sleeps_handle.sleeps(), vec![Duration::from_millis(1500)]);
}

#[tokio::test]
async fn elapsed_time_counts_toward_the_min_delay() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&mock_server)
        .await;

    let clock = TestClock::new();
    let sleeps_handle = clock.clone();
    let in_thread = clock.clone();
    let base = mock_server.uri();

    tokio::task::spawn_blocking(move || {
        let config = FetchConfig {
            min_delay: Duration::from_millis(1500),
            ..FetchConfig::default()
        };
        let mut fetcher = Fetcher::new(&base, config)
            .unwrap()
            .with_clock(Box::new(clock));
        fetcher.fetch(&format!("{base}/a")).unwrap();
        in_thread.advance(Duration::from_millis(600));
        fetcher.fetch(&format!("{base}/b")).unwrap();
    })
    .await
    .unwrap();

    // 600 ms already passed, so only the remaining 900 ms are waited
    assert_eq!(sleeps_handle.sleeps(), vec![Duration::from_millis(900)]);
}

#[tokio::test]
async fn no_wait_when_interval_already_elapsed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&mock_server)
        .await;

    let clock = TestClock::new();
    let sleeps_handle = clock.clone();
    let in_thread = clock.clone();
    let base = mock_server.uri();

    tokio::task::spawn_blocking(move || {
        let config = FetchConfig {
            min_delay: Duration::from_millis(1500),
            ..FetchConfig::default()
        };
        let mut fetcher = Fetcher::new(&base, config)
            .unwrap()
            .with_clock(Box::new(clock));
        fetcher.fetch(&format!("{base}/a")).unwrap();
        in_thread.advance(Duration::from_secs(2));
        fetcher.fetch(&format!("{base}/b")).unwrap();
    })
    .await
    .unwrap();

    assert!(sleeps_handle.sleeps().is_empty());
}

// ── backoff schedule ─────────────────────────────────────────────────

#[tokio::test]
async fn backoff_grows_linearly_between_attempts() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let clock = TestClock::new();
    let sleeps_handle = clock.clone();
    let base = mock_server.uri();

    let result = tokio::task::spawn_blocking(move || {
        let config = FetchConfig {
            min_delay: Duration::ZERO,
            max_attempts: 3,
            retry_backoff: Duration::from_secs(1),
            ..FetchConfig::default()
        };
        let mut fetcher = Fetcher::new(&base, config)
            .unwrap()
            .with_clock(Box::new(clock));
        fetcher.fetch(&format!("{base}/fail"))
    })
    .await
    .unwrap();

    assert!(result.is_err());
    // Attempt 1 waits 1x the base, attempt 2 waits 2x; attempt 3 gives up
    assert_eq!(
        sleeps_handle.sleeps(),
        vec![Duration::from_secs(1), Duration::from_secs(2)]
    );
}
