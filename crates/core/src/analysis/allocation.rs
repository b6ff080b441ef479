use crate::domain::allocation::{Allocation, AllocationBreakdown};
use crate::domain::profile::{Profile, RiskTolerance};

const AGE_RULE_BASE: i64 = 110;
const RISK_ADJUSTMENT: i64 = 15;

const LARGE_CAP_SHARE: f64 = 0.60;
const MID_CAP_SHARE: f64 = 0.25;
const SMALL_CAP_SHARE: f64 = 0.10;
const INTERNATIONAL_SHARE: f64 = 0.05;

/// Stock percent from the "110 minus age" rule, before the risk adjustment.
pub fn base_stock_percent(age: u32) -> i64 {
    (AGE_RULE_BASE - i64::from(age)).clamp(0, 100)
}

pub fn risk_adjustment(risk: RiskTolerance) -> i64 {
    match risk {
        RiskTolerance::Conservative => -RISK_ADJUSTMENT,
        RiskTolerance::Moderate => 0,
        RiskTolerance::Aggressive => RISK_ADJUSTMENT,
    }
}

pub fn stock_percent(age: u32, risk: RiskTolerance) -> i64 {
    (base_stock_percent(age) + risk_adjustment(risk)).clamp(0, 100)
}

/// Splits `stock_percent` across the cap buckets and gives the rest to bonds.
pub fn split_stock_percent(stock_percent: f64) -> anyhow::Result<Allocation> {
    Allocation::from_buckets(AllocationBreakdown {
        large_cap: stock_percent * LARGE_CAP_SHARE,
        mid_cap: stock_percent * MID_CAP_SHARE,
        small_cap: stock_percent * SMALL_CAP_SHARE,
        international: stock_percent * INTERNATIONAL_SHARE,
        bonds: 100.0 - stock_percent,
    })
}

pub fn recommend_allocation(age: u32, risk: RiskTolerance) -> anyhow::Result<Allocation> {
    split_stock_percent(stock_percent(age, risk) as f64)
}

pub fn allocation_for(profile: &Profile) -> anyhow::Result<Allocation> {
    recommend_allocation(profile.age, profile.risk_tolerance)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moderate_35_year_old() {
        let a = recommend_allocation(35, RiskTolerance::Moderate).unwrap();
        assert_eq!(a.stock_percent, 75.0);
        assert_eq!(a.bond_percent, 25.0);
        assert_eq!(a.breakdown.large_cap, 45.0);
        assert_eq!(a.breakdown.mid_cap, 18.75);
        assert_eq!(a.breakdown.small_cap, 7.5);
        assert_eq!(a.breakdown.international, 3.75);
        assert_eq!(a.breakdown.bonds, 25.0);
    }

    #[test]
    fn sums_to_100_for_every_age_and_risk() {
        for age in 0..=100 {
            for risk in RiskTolerance::ALL {
                let a = recommend_allocation(age, risk).unwrap();
                let b = a.breakdown;
                let units = |p: f64| (p * 100.0).round() as i64;
                assert_eq!(units(a.stock_percent) + units(a.bond_percent), 10_000);
                assert_eq!(
                    units(b.large_cap)
                        + units(b.mid_cap)
                        + units(b.small_cap)
                        + units(b.international)
                        + units(b.bonds),
                    10_000,
                    "age={age} risk={risk}"
                );
                assert_eq!(b.bonds, a.bond_percent);
            }
        }
    }

    #[test]
    fn monotonic_in_risk_tolerance() {
        for age in 0..=100 {
            let c = stock_percent(age, RiskTolerance::Conservative);
            let m = stock_percent(age, RiskTolerance::Moderate);
            let a = stock_percent(age, RiskTolerance::Aggressive);
            assert!(a >= m && m >= c, "age={age}");
        }
    }

    #[test]
    fn clamps_at_both_ends() {
        assert_eq!(stock_percent(5, RiskTolerance::Aggressive), 100);
        assert_eq!(stock_percent(120, RiskTolerance::Conservative), 0);
        let a = recommend_allocation(120, RiskTolerance::Conservative).unwrap();
        assert_eq!(a.bond_percent, 100.0);
        assert_eq!(a.breakdown.large_cap, 0.0);
    }
}
