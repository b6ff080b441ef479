use crate::domain::profile::{Profile, RiskTolerance};
use crate::domain::quote::{MarketCapTier, Quote};
use crate::domain::recommendation::{Adjustment, ScoreFactor, ScoredStock};
use std::cmp::Ordering;

pub const BASE_SCORE: f64 = 50.0;
pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 100.0;

const SECTOR_MATCH_BONUS: f64 = 15.0;

const CONSERVATIVE_MAX_BETA: f64 = 0.8;
const AGGRESSIVE_MIN_BETA: f64 = 1.2;
const BETA_IN_BAND_BONUS: f64 = 10.0;
const BETA_FAR_OUTSIDE_PENALTY: f64 = -10.0;
const BETA_FAR_OUTSIDE_DISTANCE: f64 = 0.5;

const DIVIDEND_TARGET_YIELD: f64 = 0.03;
const DIVIDEND_MAX_BONUS: f64 = 15.0;
const SHORT_HORIZON_YEARS: u32 = 10;
const LONG_HORIZON_YEARS: u32 = 25;

const PE_REASONABLE_MIN: f64 = 10.0;
const PE_REASONABLE_MAX: f64 = 20.0;
const PE_EXPENSIVE: f64 = 35.0;
const PE_REASONABLE_BONUS: f64 = 10.0;
const PE_PENALTY: f64 = -5.0;

const CAP_MATCH_BONUS: f64 = 10.0;
const MID_CAP_MATCH_BONUS: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapPreference {
    Large,
    SmallMid,
}

/// Inclusive beta band `(min, max)` the profile is aiming for.
pub fn target_beta_band(risk: RiskTolerance) -> (f64, f64) {
    match risk {
        RiskTolerance::Conservative => (f64::NEG_INFINITY, CONSERVATIVE_MAX_BETA),
        RiskTolerance::Moderate => (CONSERVATIVE_MAX_BETA, AGGRESSIVE_MIN_BETA),
        RiskTolerance::Aggressive => (AGGRESSIVE_MIN_BETA, f64::INFINITY),
    }
}

pub fn cap_preference(profile: &Profile) -> Option<CapPreference> {
    match profile.risk_tolerance {
        RiskTolerance::Conservative => Some(CapPreference::Large),
        RiskTolerance::Aggressive => Some(CapPreference::SmallMid),
        RiskTolerance::Moderate => match profile.known_years_to_retirement() {
            Some(y) if y <= SHORT_HORIZON_YEARS => Some(CapPreference::Large),
            Some(y) if y >= LONG_HORIZON_YEARS => Some(CapPreference::SmallMid),
            _ => None,
        },
    }
}

fn wants_income(profile: &Profile) -> bool {
    profile.risk_tolerance == RiskTolerance::Conservative
        || profile
            .known_years_to_retirement()
            .is_some_and(|y| y <= SHORT_HORIZON_YEARS)
}

fn sector_adjustment(profile: &Profile, quote: &Quote) -> Option<Adjustment> {
    profile.prefers_sector(&quote.sector).then(|| Adjustment {
        factor: ScoreFactor::SectorMatch,
        delta: SECTOR_MATCH_BONUS,
        reason: format!("matches your interest in {}", quote.sector),
    })
}

fn risk_adjustment(profile: &Profile, quote: &Quote) -> Option<Adjustment> {
    let (min, max) = target_beta_band(profile.risk_tolerance);
    let beta = quote.beta;
    let distance = if beta < min {
        min - beta
    } else if beta > max {
        beta - max
    } else {
        0.0
    };

    let (delta, reason) = if distance == 0.0 {
        (
            BETA_IN_BAND_BONUS,
            format!(
                "beta {beta:.2} fits a {} risk tolerance",
                profile.risk_tolerance
            ),
        )
    } else if distance > BETA_FAR_OUTSIDE_DISTANCE {
        (
            BETA_FAR_OUTSIDE_PENALTY,
            format!(
                "beta {beta:.2} is far outside the {} band",
                profile.risk_tolerance
            ),
        )
    } else {
        return None;
    };

    Some(Adjustment {
        factor: ScoreFactor::RiskAlignment,
        delta,
        reason,
    })
}

fn dividend_adjustment(profile: &Profile, quote: &Quote) -> Option<Adjustment> {
    if !wants_income(profile) || quote.dividend_yield <= 0.0 {
        return None;
    }

    let delta = if quote.dividend_yield >= DIVIDEND_TARGET_YIELD {
        DIVIDEND_MAX_BONUS
    } else {
        DIVIDEND_MAX_BONUS * quote.dividend_yield / DIVIDEND_TARGET_YIELD
    };

    Some(Adjustment {
        factor: ScoreFactor::DividendYield,
        delta,
        reason: format!(
            "dividend yield of {:.2}% supports income goals",
            quote.dividend_yield * 100.0
        ),
    })
}

fn valuation_adjustment(quote: &Quote) -> Option<Adjustment> {
    let pe = quote.pe_ratio?;
    let (delta, reason) = if (PE_REASONABLE_MIN..=PE_REASONABLE_MAX).contains(&pe) {
        (PE_REASONABLE_BONUS, format!("reasonable valuation (P/E {pe:.1})"))
    } else if pe < 0.0 {
        (PE_PENALTY, format!("negative earnings (P/E {pe:.1})"))
    } else if pe > PE_EXPENSIVE {
        (PE_PENALTY, format!("rich valuation (P/E {pe:.1})"))
    } else {
        return None;
    };

    Some(Adjustment {
        factor: ScoreFactor::Valuation,
        delta,
        reason,
    })
}

fn market_cap_adjustment(profile: &Profile, quote: &Quote) -> Option<Adjustment> {
    let tier = quote.market_cap_tier();
    let delta = match (cap_preference(profile)?, tier) {
        (CapPreference::Large, MarketCapTier::Large) => CAP_MATCH_BONUS,
        (CapPreference::SmallMid, MarketCapTier::Small) => CAP_MATCH_BONUS,
        (CapPreference::SmallMid, MarketCapTier::Mid) => MID_CAP_MATCH_BONUS,
        _ => return None,
    };

    let reason = match tier {
        MarketCapTier::Large => "large-cap stability suits your profile",
        MarketCapTier::Mid => "mid-cap growth suits your horizon",
        MarketCapTier::Small => "small-cap growth potential suits your horizon",
    };

    Some(Adjustment {
        factor: ScoreFactor::MarketCap,
        delta,
        reason: reason.to_string(),
    })
}

/// All adjustments that fire for this quote, in evaluation order.
pub fn adjustments(profile: &Profile, quote: &Quote) -> Vec<Adjustment> {
    [
        sector_adjustment(profile, quote),
        risk_adjustment(profile, quote),
        dividend_adjustment(profile, quote),
        valuation_adjustment(quote),
        market_cap_adjustment(profile, quote),
    ]
    .into_iter()
    .flatten()
    .collect()
}

pub fn clamp_score(raw: f64) -> f64 {
    raw.clamp(MIN_SCORE, MAX_SCORE)
}

pub fn score_stock(profile: &Profile, quote: Quote) -> ScoredStock {
    let rationale = adjustments(profile, &quote);
    let raw = BASE_SCORE + rationale.iter().map(|a| a.delta).sum::<f64>();
    ScoredStock {
        quote,
        score: clamp_score(raw),
        rationale,
    }
}

/// Score descending, then symbol ascending.
pub fn rank(stocks: &mut [ScoredStock]) {
    stocks.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.quote.symbol.cmp(&b.quote.symbol))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::profile::sample_profile;

    fn quote(symbol: &str, sector: &str, beta: f64, dividend_yield: f64, pe: Option<f64>) -> Quote {
        Quote {
            symbol: symbol.to_string(),
            name: format!("{symbol} Inc"),
            price: 100.0,
            sector: sector.to_string(),
            dividend_yield,
            pe_ratio: pe,
            beta,
            market_cap: 2.5e12,
        }
    }

    fn aggressive_tech_profile() -> Profile {
        let mut p = sample_profile();
        p.risk_tolerance = RiskTolerance::Aggressive;
        p.preferred_sectors = vec!["Technology".to_string()];
        p.years_to_retirement = Some(30);
        p
    }

    #[test]
    fn aggressive_tech_growth_stock() {
        let s = score_stock(
            &aggressive_tech_profile(),
            quote("NVDA", "Technology", 1.3, 0.0, Some(28.0)),
        );
        assert_eq!(s.score, 75.0);
        assert_eq!(s.rationale.len(), 2);
        assert_eq!(s.rationale[0].factor, ScoreFactor::SectorMatch);
        assert_eq!(s.rationale[0].delta, 15.0);
        assert_eq!(s.rationale[1].factor, ScoreFactor::RiskAlignment);
        assert_eq!(s.rationale[1].delta, 10.0);
    }

    #[test]
    fn clamps_when_everything_fires_positive() {
        let mut p = sample_profile();
        p.risk_tolerance = RiskTolerance::Conservative;
        p.preferred_sectors = vec!["utilities".to_string()];
        let s = score_stock(&p, quote("DUK", "Utilities", 0.4, 0.04, Some(15.0)));
        // 50 + 15 + 10 + 15 + 10 + 10
        assert_eq!(s.score, MAX_SCORE);
        assert_eq!(s.rationale.len(), 5);
    }

    #[test]
    fn clamps_at_zero_when_penalties_overwhelm() {
        assert_eq!(clamp_score(BASE_SCORE - 80.0), MIN_SCORE);
        let mut p = sample_profile();
        p.risk_tolerance = RiskTolerance::Conservative;
        p.preferred_sectors.clear();
        let s = score_stock(&p, quote("TSLA", "Consumer Cyclical", 2.3, 0.0, Some(-4.0)));
        assert_eq!(s.score, 50.0 - 10.0 - 5.0 + 10.0);
        assert!(s.score >= MIN_SCORE && s.score <= MAX_SCORE);
    }

    #[test]
    fn null_pe_is_neutral() {
        let p = sample_profile();
        let with_none = adjustments(&p, &quote("X", "Energy", 1.0, 0.0, None));
        assert!(with_none.iter().all(|a| a.factor != ScoreFactor::Valuation));
    }

    #[test]
    fn small_yield_scales_dividend_bonus() {
        let mut p = sample_profile();
        p.risk_tolerance = RiskTolerance::Conservative;
        let adj = dividend_adjustment(&p, &quote("KO", "Consumer", 0.6, 0.015, None)).unwrap();
        assert!((adj.delta - 7.5).abs() < 1e-9);

        // Long-horizon moderate investors do not weight dividends.
        let q = quote("KO", "Consumer", 0.6, 0.05, None);
        assert!(dividend_adjustment(&sample_profile(), &q).is_none());
    }

    #[test]
    fn beta_slightly_outside_band_is_neutral() {
        let p = sample_profile();
        assert!(risk_adjustment(&p, &quote("A", "x", 1.5, 0.0, None)).is_none());
        assert_eq!(
            risk_adjustment(&p, &quote("A", "x", 1.9, 0.0, None)).unwrap().delta,
            -10.0
        );
        assert_eq!(
            risk_adjustment(&p, &quote("A", "x", 1.2, 0.0, None)).unwrap().delta,
            10.0
        );
    }

    #[test]
    fn score_does_not_depend_on_adjustment_order() {
        let mut p = sample_profile();
        p.risk_tolerance = RiskTolerance::Conservative;
        let q = quote("JNJ", "Technology", 0.5, 0.02, Some(40.0));
        let adj = adjustments(&p, &q);
        let forward = clamp_score(BASE_SCORE + adj.iter().map(|a| a.delta).sum::<f64>());
        let backward = clamp_score(BASE_SCORE + adj.iter().rev().map(|a| a.delta).sum::<f64>());
        assert_eq!(forward, backward);
        assert_eq!(forward, score_stock(&p, q).score);
    }

    #[test]
    fn rank_breaks_ties_by_symbol() {
        let p = sample_profile();
        let mut stocks = vec![
            score_stock(&p, quote("MSFT", "Energy", 1.0, 0.0, None)),
            score_stock(&p, quote("AAPL", "Energy", 1.0, 0.0, None)),
            score_stock(&p, quote("ZZZ", "Technology", 1.0, 0.0, None)),
        ];
        rank(&mut stocks);
        let order: Vec<_> = stocks.iter().map(|s| s.quote.symbol.as_str()).collect();
        assert_eq!(order, ["ZZZ", "AAPL", "MSFT"]);
    }
}
