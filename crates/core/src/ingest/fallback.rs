use crate::domain::quote::Quote;
use crate::ingest::provider::QuoteProvider;
use crate::ingest::types::QuoteError;
use std::collections::BTreeMap;

/// In-memory quote source for offline runs and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticQuoteProvider {
    quotes: BTreeMap<String, Quote>,
}

impl StaticQuoteProvider {
    pub fn new(quotes: impl IntoIterator<Item = Quote>) -> Self {
        Self {
            quotes: quotes
                .into_iter()
                .map(|q| (q.symbol.to_ascii_uppercase(), q))
                .collect(),
        }
    }

    /// Illustrative snapshot of well-known US equities. Figures are approximate and only
    /// meant to exercise the engine without network access.
    pub fn builtin() -> Self {
        Self::new(builtin_quotes())
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}

#[async_trait::async_trait]
impl QuoteProvider for StaticQuoteProvider {
    fn provider_name(&self) -> &'static str {
        "static"
    }

    async fn get_quote(&self, ticker: &str) -> Result<Quote, QuoteError> {
        self.quotes
            .get(&ticker.trim().to_ascii_uppercase())
            .cloned()
            .ok_or_else(|| QuoteError::not_found(ticker))
    }
}

#[allow(clippy::too_many_arguments)]
fn q(
    symbol: &str,
    name: &str,
    price: f64,
    sector: &str,
    dividend_yield: f64,
    pe_ratio: Option<f64>,
    beta: f64,
    market_cap: f64,
) -> Quote {
    Quote {
        symbol: symbol.to_string(),
        name: name.to_string(),
        price,
        sector: sector.to_string(),
        dividend_yield,
        pe_ratio,
        beta,
        market_cap,
    }
}

fn builtin_quotes() -> Vec<Quote> {
    vec![
        q("AAPL", "Apple Inc.", 190.0, "Technology", 0.005, Some(29.0), 1.25, 2.9e12),
        q("MSFT", "Microsoft Corporation", 410.0, "Technology", 0.007, Some(35.0), 0.90, 3.0e12),
        q("GOOGL", "Alphabet Inc.", 160.0, "Technology", 0.0, Some(25.0), 1.05, 2.0e12),
        q("NVDA", "NVIDIA Corporation", 880.0, "Technology", 0.0003, Some(70.0), 1.70, 2.2e12),
        q("INTC", "Intel Corporation", 35.0, "Technology", 0.014, None, 1.00, 1.5e11),
        q("JNJ", "Johnson & Johnson", 155.0, "Healthcare", 0.031, Some(15.0), 0.55, 3.7e11),
        q("PFE", "Pfizer Inc.", 28.0, "Healthcare", 0.060, Some(18.0), 0.60, 1.6e11),
        q("ABBV", "AbbVie Inc.", 170.0, "Healthcare", 0.037, Some(19.5), 0.60, 3.0e11),
        q("JPM", "JPMorgan Chase & Co.", 195.0, "Finance", 0.023, Some(11.5), 1.10, 5.6e11),
        q("BAC", "Bank of America Corporation", 36.0, "Finance", 0.027, Some(12.0), 1.35, 2.8e11),
        q("V", "Visa Inc.", 280.0, "Finance", 0.008, Some(31.0), 0.95, 5.7e11),
        q("XOM", "Exxon Mobil Corporation", 115.0, "Energy", 0.033, Some(13.0), 0.90, 4.6e11),
        q("CVX", "Chevron Corporation", 155.0, "Energy", 0.041, Some(14.0), 1.05, 2.9e11),
        q("WMT", "Walmart Inc.", 60.0, "Consumer", 0.014, Some(30.0), 0.50, 4.8e11),
        q("PG", "Procter & Gamble Company", 160.0, "Consumer", 0.024, Some(26.0), 0.40, 3.8e11),
        q("KO", "Coca-Cola Company", 60.0, "Consumer", 0.031, Some(24.0), 0.60, 2.6e11),
        q("MCD", "McDonald's Corporation", 280.0, "Consumer", 0.023, Some(24.0), 0.70, 2.0e11),
        q("NEE", "NextEra Energy, Inc.", 65.0, "Utilities", 0.030, Some(18.0), 0.55, 1.3e11),
        q("DUK", "Duke Energy Corporation", 97.0, "Utilities", 0.042, Some(19.0), 0.45, 7.5e10),
        q("SO", "Southern Company", 70.0, "Utilities", 0.040, Some(17.0), 0.50, 7.6e10),
        q("O", "Realty Income Corporation", 53.0, "Real Estate", 0.058, Some(40.0), 0.80, 4.6e10),
        q("T", "AT&T Inc.", 17.0, "Telecommunications", 0.065, None, 0.70, 1.2e11),
        q("VZ", "Verizon Communications Inc.", 40.0, "Telecommunications", 0.066, Some(15.0), 0.40, 1.7e11),
        q("CAT", "Caterpillar Inc.", 330.0, "Industrial", 0.016, Some(16.0), 1.10, 1.6e11),
        q("MMM", "3M Company", 95.0, "Industrial", 0.064, None, 1.00, 5.2e10),
        q("TGT", "Target Corporation", 160.0, "Consumer", 0.027, Some(18.0), 1.05, 7.4e10),
        q("MO", "Altria Group, Inc.", 43.0, "Consumer", 0.090, Some(9.0), 0.65, 7.6e10),
        q("IBM", "International Business Machines", 185.0, "Technology", 0.036, Some(22.0), 0.75, 1.7e11),
        q("PEP", "PepsiCo, Inc.", 170.0, "Consumer", 0.030, Some(25.0), 0.55, 2.3e11),
    ]
}
