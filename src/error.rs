//! Error types for the cost sweep

use std::fmt;

/// Unified error type for wiki page fetches
#[derive(Debug)]
pub enum FetchError {
    /// HTTP request failed (network error, timeout, etc.)
    Network(reqwest::Error),
    /// Server answered with a non-success status code
    HttpStatus(reqwest::StatusCode),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Network(e) => write!(f, "Network error: {}", e),
            FetchError::HttpStatus(status) => write!(f, "HTTP error: {}", status),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Network(e) => Some(e),
            FetchError::HttpStatus(_) => None,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Network(err)
    }
}

/// Result type alias for fetch operations
pub type FetchResult<T> = Result<T, FetchError>;

/// Fatal run-level failure: the sweep produced nothing at all
#[derive(Debug)]
pub enum RunError {
    /// Every configured category index was unreachable after retries
    AllCategoriesFailed { attempted: usize },
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunError::AllCategoriesFailed { attempted } => write!(
                f,
                "No category index reachable ({} categories attempted)",
                attempted
            ),
        }
    }
}

impl std::error::Error for RunError {}
