use crate::domain::quote::Quote;
use crate::ingest::types::QuoteErrorKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreFactor {
    SectorMatch,
    RiskAlignment,
    DividendYield,
    Valuation,
    MarketCap,
}

/// One fired scoring adjustment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Adjustment {
    pub factor: ScoreFactor,
    pub delta: f64,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredStock {
    pub quote: Quote,
    pub score: f64,
    pub rationale: Vec<Adjustment>,
}

/// A candidate that was dropped because its quote could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedTicker {
    pub ticker: String,
    pub kind: QuoteErrorKind,
    pub reason: String,
}
