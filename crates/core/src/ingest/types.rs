use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteErrorKind {
    NotFound,
    Unavailable,
    RateLimited,
}

/// Per-ticker quote failure. Never fatal for a planning run.
#[derive(Debug, Clone)]
pub struct QuoteError {
    pub kind: QuoteErrorKind,
    pub ticker: String,
    pub detail: String,
}

impl QuoteError {
    pub fn not_found(ticker: &str) -> Self {
        Self {
            kind: QuoteErrorKind::NotFound,
            ticker: ticker.to_string(),
            detail: "no quote for ticker".to_string(),
        }
    }

    pub fn unavailable(ticker: &str, detail: impl Into<String>) -> Self {
        Self {
            kind: QuoteErrorKind::Unavailable,
            ticker: ticker.to_string(),
            detail: detail.into(),
        }
    }

    pub fn rate_limited(ticker: &str) -> Self {
        Self {
            kind: QuoteErrorKind::RateLimited,
            ticker: ticker.to_string(),
            detail: "provider rate limit hit".to_string(),
        }
    }

    pub fn is_transient(&self) -> bool {
        !matches!(self.kind, QuoteErrorKind::NotFound)
    }
}

impl fmt::Display for QuoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "quote error (ticker={}, kind={:?}): {}",
            self.ticker, self.kind, self.detail
        )
    }
}

impl std::error::Error for QuoteError {}
