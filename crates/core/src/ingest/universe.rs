use crate::domain::profile::{Profile, RiskTolerance};
use std::collections::BTreeSet;

const SECTOR_TICKERS: &[(&str, &[&str])] = &[
    ("technology", &["AAPL", "MSFT", "GOOGL", "META", "NVDA", "AVGO", "CSCO", "ADBE", "CRM", "INTC"]),
    ("healthcare", &["JNJ", "UNH", "PFE", "ABBV", "MRK", "TMO", "ABT", "DHR", "LLY", "BMY"]),
    ("finance", &["JPM", "BAC", "WFC", "C", "GS", "MS", "BLK", "SCHW", "AXP", "USB"]),
    ("energy", &["XOM", "CVX", "COP", "SLB", "EOG", "MPC", "PSX", "VLO", "OXY", "HAL"]),
    ("consumer", &["AMZN", "TSLA", "WMT", "HD", "NKE", "MCD", "SBUX", "TGT", "LOW", "DIS"]),
    ("industrial", &["BA", "HON", "UNP", "CAT", "GE", "MMM", "LMT", "RTX", "DE", "UPS"]),
    ("utilities", &["NEE", "DUK", "SO", "D", "AEP", "EXC", "SRE", "PEG", "XEL", "ED"]),
    ("real estate", &["AMT", "PLD", "CCI", "EQIX", "PSA", "SPG", "O", "WELL", "DLR", "AVB"]),
    ("materials", &["LIN", "APD", "SHW", "FCX", "NEM", "ECL", "DD", "DOW", "NUE", "VMC"]),
    ("telecommunications", &["T", "VZ", "TMUS", "CMCSA", "CHTR"]),
];

const SECTOR_ALIASES: &[(&str, &str)] = &[
    ("tech", "technology"),
    ("financial", "finance"),
    ("financials", "finance"),
    ("health care", "healthcare"),
    ("industrials", "industrial"),
    ("telecom", "telecommunications"),
];

const DIVIDEND_STALWARTS: &[&str] = &[
    "JNJ", "PG", "KO", "PEP", "MCD", "WMT", "XOM", "CVX", "T", "VZ", "IBM", "ABBV", "MMM", "CAT",
    "TGT", "O", "MO", "SO", "DUK", "NEE",
];

const BLUE_CHIPS: &[&str] = &["AAPL", "MSFT", "GOOGL", "JNJ", "JPM", "V", "WMT", "PG"];

#[derive(Debug, Clone)]
pub struct UniverseOptions {
    /// Tickers taken from each preferred sector.
    pub per_sector: usize,

    /// Dividend stalwarts added for conservative profiles.
    pub dividend_picks: usize,

    /// Hard cap on candidates, to stay inside provider rate limits.
    pub max_candidates: usize,
}

impl Default for UniverseOptions {
    fn default() -> Self {
        Self {
            per_sector: 5,
            dividend_picks: 10,
            max_candidates: 30,
        }
    }
}

impl UniverseOptions {
    pub fn from_env() -> Self {
        let mut out = Self::default();

        if let Ok(s) = std::env::var("UNIVERSE_PER_SECTOR") {
            if let Ok(n) = s.parse::<usize>() {
                out.per_sector = n;
            }
        }

        if let Ok(s) = std::env::var("UNIVERSE_DIVIDEND_PICKS") {
            if let Ok(n) = s.parse::<usize>() {
                out.dividend_picks = n;
            }
        }

        if let Ok(s) = std::env::var("UNIVERSE_MAX_CANDIDATES") {
            if let Ok(n) = s.parse::<usize>() {
                out.max_candidates = n;
            }
        }

        out
    }
}

pub fn sector_tickers(sector: &str) -> &'static [&'static str] {
    let key = sector.trim().to_ascii_lowercase();
    let key = SECTOR_ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or(key);

    SECTOR_TICKERS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, tickers)| *tickers)
        .unwrap_or(&[])
}

/// Candidate tickers for a profile, de-duplicated in first-seen order and capped.
pub fn build_candidate_universe(profile: &Profile, opts: &UniverseOptions) -> Vec<String> {
    let mut picked: Vec<&str> = Vec::new();

    for sector in &profile.preferred_sectors {
        let tickers = sector_tickers(sector);
        if tickers.is_empty() {
            tracing::debug!(%sector, "no ticker list for preferred sector");
        }
        picked.extend(tickers.iter().take(opts.per_sector));
    }

    if profile.risk_tolerance == RiskTolerance::Conservative {
        picked.extend(DIVIDEND_STALWARTS.iter().take(opts.dividend_picks));
    }

    picked.extend(BLUE_CHIPS);

    let mut seen = BTreeSet::new();
    picked
        .into_iter()
        .filter(|t| seen.insert(*t))
        .take(opts.max_candidates)
        .map(str::to_string)
        .collect()
}

/// Normalizes user-supplied tickers: trims, upper-cases, drops blanks and duplicates.
pub fn normalize_tickers<I, S>(tickers: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = BTreeSet::new();
    tickers
        .into_iter()
        .map(|t| t.as_ref().trim().to_ascii_uppercase())
        .filter(|t| !t.is_empty() && seen.insert(t.clone()))
        .collect()
}
