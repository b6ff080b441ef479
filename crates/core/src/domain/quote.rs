use serde::{Deserialize, Serialize};

const LARGE_CAP_MIN: f64 = 10_000_000_000.0;
const MID_CAP_MIN: f64 = 2_000_000_000.0;

/// Point-in-time market snapshot for one ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub name: String,
    pub price: f64,
    pub sector: String,
    /// Fraction, `0.0` when the stock pays no dividend.
    #[serde(default)]
    pub dividend_yield: f64,
    /// `None` when earnings are negative or unavailable.
    #[serde(default)]
    pub pe_ratio: Option<f64>,
    pub beta: f64,
    pub market_cap: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketCapTier {
    Large,
    Mid,
    Small,
}

impl Quote {
    pub fn market_cap_tier(&self) -> MarketCapTier {
        if self.market_cap >= LARGE_CAP_MIN {
            MarketCapTier::Large
        } else if self.market_cap >= MID_CAP_MIN {
            MarketCapTier::Mid
        } else {
            MarketCapTier::Small
        }
    }
}
