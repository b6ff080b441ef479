use crate::config::Settings;
use crate::domain::quote::Quote;
use crate::ingest::types::QuoteError;
use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::StatusCode;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_PATH: &str = "/v1/quotes";
const DEFAULT_RETRIES: u32 = 3;
const MAX_RETRIES: u32 = 10;
const BASE_BACKOFF_MS: u64 = 250;
const MAX_BACKOFF: Duration = Duration::from_secs(30);

#[async_trait::async_trait]
pub trait QuoteProvider: Send + Sync {
    fn provider_name(&self) -> &'static str;

    async fn get_quote(&self, ticker: &str) -> Result<Quote, QuoteError>;
}

/// Quote provider backed by a JSON endpoint: `GET {base_url}{path}/{ticker}` returning a
/// [`Quote`] object.
#[derive(Debug, Clone)]
pub struct HttpJsonQuoteProvider {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    path: String,
    retries: u32,
}

impl HttpJsonQuoteProvider {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let base_url = settings.require_quote_provider_base_url()?.to_string();
        let api_key = settings.quote_provider_api_key.clone();

        let timeout_secs = std::env::var("QUOTE_PROVIDER_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let retries = std::env::var("QUOTE_PROVIDER_RETRIES")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(DEFAULT_RETRIES)
            .clamp(1, MAX_RETRIES);

        let path = std::env::var("QUOTE_PROVIDER_PATH")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PATH.to_string());

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build quote provider http client")?;

        Ok(Self {
            http,
            base_url,
            api_key,
            path,
            retries,
        })
    }

    fn url(&self, ticker: &str) -> String {
        let path = if self.path.starts_with('/') {
            self.path.clone()
        } else {
            format!("/{}", self.path)
        };

        format!(
            "{}{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_end_matches('/'),
            ticker
        )
    }

    fn headers(&self, ticker: &str) -> Result<HeaderMap, QuoteError> {
        let mut headers = HeaderMap::new();
        if let Some(api_key) = &self.api_key {
            let value = HeaderValue::from_str(api_key)
                .map_err(|e| QuoteError::unavailable(ticker, format!("bad api key header: {e}")))?;
            headers.insert("x-api-key", value);
        }
        Ok(headers)
    }

    async fn fetch_once(&self, ticker: &str) -> Result<Quote, QuoteError> {
        let res = self
            .http
            .get(self.url(ticker))
            .headers(self.headers(ticker)?)
            .send()
            .await
            .map_err(|e| QuoteError::unavailable(ticker, format!("request failed: {e}")))?;

        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(|e| QuoteError::unavailable(ticker, format!("failed to read body: {e}")))?;

        match status {
            StatusCode::NOT_FOUND => return Err(QuoteError::not_found(ticker)),
            StatusCode::TOO_MANY_REQUESTS => return Err(QuoteError::rate_limited(ticker)),
            s if !s.is_success() => {
                return Err(QuoteError::unavailable(ticker, format!("HTTP {s}: {text}")))
            }
            _ => {}
        }

        parse_quote(ticker, &text)
    }
}

fn parse_quote(ticker: &str, text: &str) -> Result<Quote, QuoteError> {
    let quote = serde_json::from_str::<Quote>(text).map_err(|e| {
        QuoteError::unavailable(ticker, format!("response is not a valid quote: {e}"))
    })?;
    validate_quote(ticker, &quote)?;
    Ok(quote)
}

fn validate_quote(ticker: &str, quote: &Quote) -> Result<(), QuoteError> {
    let bad = |detail: &str| Err(QuoteError::unavailable(ticker, detail));
    if !quote.symbol.trim().eq_ignore_ascii_case(ticker.trim()) {
        return bad("symbol does not match requested ticker");
    }
    if !quote.price.is_finite() || quote.price <= 0.0 {
        return bad("price must be positive");
    }
    if !quote.beta.is_finite() || !quote.market_cap.is_finite() || quote.market_cap < 0.0 {
        return bad("beta and market cap must be finite");
    }
    if !quote.dividend_yield.is_finite() || quote.dividend_yield < 0.0 {
        return bad("dividend yield must be a non-negative fraction");
    }
    Ok(())
}

/// Exponential backoff after the given 1-based attempt, capped at [`MAX_BACKOFF`].
fn retry_backoff(attempt: u32) -> Duration {
    // 250ms << 16 is already far past the cap.
    let exp = attempt.saturating_sub(1).min(16);
    Duration::from_millis(BASE_BACKOFF_MS << exp).min(MAX_BACKOFF)
}

#[async_trait::async_trait]
impl QuoteProvider for HttpJsonQuoteProvider {
    fn provider_name(&self) -> &'static str {
        "external_http_json"
    }

    async fn get_quote(&self, ticker: &str) -> Result<Quote, QuoteError> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self.fetch_once(ticker).await {
                Ok(quote) => return Ok(quote),
                Err(err) => {
                    if !err.is_transient() || attempt >= self.retries {
                        return Err(err);
                    }
                    let backoff = retry_backoff(attempt);
                    tracing::warn!(attempt, ticker, ?backoff, error = %err, "quote fetch failed; retrying");
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::types::QuoteErrorKind;
    use serde_json::json;

    #[test]
    fn parses_expected_shape() {
        let body = json!({
            "symbol": "AAPL",
            "name": "Apple Inc.",
            "price": 190.5,
            "sector": "Technology",
            "dividend_yield": 0.005,
            "pe_ratio": 29.1,
            "beta": 1.25,
            "market_cap": 2.9e12,
        })
        .to_string();

        let q = parse_quote("AAPL", &body).unwrap();
        assert_eq!(q.sector, "Technology");
        assert_eq!(q.pe_ratio, Some(29.1));
    }

    #[test]
    fn null_pe_is_accepted() {
        let body = json!({
            "symbol": "RIVN",
            "name": "Rivian",
            "price": 12.0,
            "sector": "Consumer Cyclical",
            "pe_ratio": null,
            "beta": 2.0,
            "market_cap": 1.2e10,
        })
        .to_string();
        assert_eq!(parse_quote("RIVN", &body).unwrap().pe_ratio, None);
    }

    #[test]
    fn rejects_mismatched_symbol_and_bad_price() {
        let body = json!({
            "symbol": "MSFT",
            "name": "Microsoft",
            "price": 400.0,
            "sector": "Technology",
            "beta": 0.9,
            "market_cap": 3e12,
        });
        let err = parse_quote("AAPL", &body.to_string()).unwrap_err();
        assert_eq!(err.kind, QuoteErrorKind::Unavailable);

        let mut zero = body.clone();
        zero["price"] = json!(0.0);
        assert!(parse_quote("MSFT", &zero.to_string()).is_err());
    }

    #[test]
    fn backoff_doubles_then_caps() {
        assert_eq!(retry_backoff(1), Duration::from_millis(250));
        assert_eq!(retry_backoff(3), Duration::from_millis(1000));
        assert_eq!(retry_backoff(63), MAX_BACKOFF);
        assert_eq!(retry_backoff(64), MAX_BACKOFF);
        assert_eq!(retry_backoff(u32::MAX), MAX_BACKOFF);
    }

    #[test]
    fn builds_url_without_double_slashes() {
        let settings = Settings {
            quote_provider_base_url: Some("https://quotes.example.com/".to_string()),
            ..Settings::default()
        };
        let p = HttpJsonQuoteProvider::from_settings(&settings).unwrap();
        assert_eq!(p.url("AAPL"), "https://quotes.example.com/v1/quotes/AAPL");
    }
}
