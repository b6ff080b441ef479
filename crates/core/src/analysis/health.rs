use crate::domain::health::{HealthFlag, HealthMetrics, InvestmentStrategy, RiskLevel};
use crate::domain::profile::{Profile, RiskTolerance};

const LOW_SAVINGS_RATE_PERCENT: f64 = 10.0;
const HIGH_DEBT_TO_INCOME: f64 = 0.40;
const MIN_EMERGENCY_FUND_MONTHS: f64 = 3.0;
const LOW_INCOME: f64 = 50_000.0;
const SHORT_HORIZON_YEARS: u32 = 10;

const HIGH_RISK_FLAGS: usize = 3;

const PRESERVATION_MAX_YEARS: u32 = 5;
const BALANCED_MAX_YEARS: u32 = 15;

pub fn assess_health(profile: &Profile) -> HealthMetrics {
    let income = profile.annual_income;
    let annual_expenses = profile.annual_expenses();

    let savings_rate_percent =
        (income > 0.0).then(|| ((income - annual_expenses) / income).min(1.0) * 100.0);
    let debt_to_income = (income > 0.0).then(|| profile.total_debt / income);
    let emergency_fund_months =
        (profile.monthly_expenses > 0.0).then(|| profile.current_savings / profile.monthly_expenses);

    let surplus = income - annual_expenses;
    let years_to_debt_free = if profile.total_debt <= 0.0 {
        Some(0.0)
    } else if surplus > 0.0 {
        Some(profile.total_debt / surplus)
    } else {
        None
    };

    let mut flags = Vec::new();
    if savings_rate_percent.map_or(true, |r| r < LOW_SAVINGS_RATE_PERCENT) {
        flags.push(HealthFlag::LowSavingsRate);
    }
    if debt_to_income.is_some_and(|d| d > HIGH_DEBT_TO_INCOME) {
        flags.push(HealthFlag::HighDebtToIncome);
    }
    if emergency_fund_months.is_some_and(|m| m < MIN_EMERGENCY_FUND_MONTHS) {
        flags.push(HealthFlag::ThinEmergencyFund);
    }
    if income < LOW_INCOME {
        flags.push(HealthFlag::LowIncome);
    }
    if profile.dependents > 0 {
        flags.push(HealthFlag::HasDependents);
    }
    if profile
        .known_years_to_retirement()
        .is_some_and(|y| y < SHORT_HORIZON_YEARS)
    {
        flags.push(HealthFlag::ShortHorizon);
    }

    let risk_level = match flags.len() {
        n if n >= HIGH_RISK_FLAGS => RiskLevel::High,
        0 => RiskLevel::Low,
        _ => RiskLevel::Moderate,
    };

    HealthMetrics {
        savings_rate_percent,
        debt_to_income,
        emergency_fund_months,
        years_to_debt_free,
        flags,
        risk_level,
        strategy: investment_strategy(profile),
    }
}

pub fn investment_strategy(profile: &Profile) -> InvestmentStrategy {
    match profile.known_years_to_retirement() {
        Some(y) if y <= PRESERVATION_MAX_YEARS => InvestmentStrategy::CapitalPreservation,
        Some(y) if y <= BALANCED_MAX_YEARS => InvestmentStrategy::BalancedGrowth,
        _ => match profile.risk_tolerance {
            RiskTolerance::Conservative => InvestmentStrategy::ConservativeGrowth,
            RiskTolerance::Moderate => InvestmentStrategy::ModerateGrowth,
            RiskTolerance::Aggressive => InvestmentStrategy::AggressiveGrowth,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::profile::sample_profile;

    #[test]
    fn computes_core_metrics() {
        let h = assess_health(&sample_profile());
        // (120000 - 54000) / 120000
        assert!((h.savings_rate_percent.unwrap() - 55.0).abs() < 1e-9);
        assert!((h.debt_to_income.unwrap() - 0.125).abs() < 1e-9);
        assert!((h.emergency_fund_months.unwrap() - 85_000.0 / 4_500.0).abs() < 1e-9);
        assert!((h.years_to_debt_free.unwrap() - 15_000.0 / 66_000.0).abs() < 1e-9);
        assert!(h.flags.is_empty());
        assert_eq!(h.risk_level, RiskLevel::Low);
        assert_eq!(h.strategy, InvestmentStrategy::ModerateGrowth);
    }

    #[test]
    fn zero_income_yields_undefined_rates_instead_of_panicking() {
        let mut p = sample_profile();
        p.annual_income = 0.0;
        let h = assess_health(&p);
        assert_eq!(h.savings_rate_percent, None);
        assert_eq!(h.debt_to_income, None);
        assert_eq!(h.years_to_debt_free, None);
        assert!(h.flags.contains(&HealthFlag::LowSavingsRate));
        assert!(h.flags.contains(&HealthFlag::LowIncome));
    }

    #[test]
    fn zero_expenses_leave_emergency_months_undefined() {
        let mut p = sample_profile();
        p.monthly_expenses = 0.0;
        let h = assess_health(&p);
        assert_eq!(h.emergency_fund_months, None);
        assert_eq!(h.savings_rate_percent, Some(100.0));
    }

    #[test]
    fn overspending_profile_is_high_risk() {
        let mut p = sample_profile();
        p.annual_income = 40_000.0;
        p.monthly_expenses = 4_000.0;
        p.current_savings = 2_000.0;
        p.total_debt = 30_000.0;
        let h = assess_health(&p);
        assert!(h.savings_rate_percent.unwrap() < 0.0);
        assert_eq!(h.years_to_debt_free, None);
        assert_eq!(h.risk_level, RiskLevel::High);
    }

    #[test]
    fn strategy_follows_horizon_then_risk() {
        let mut p = sample_profile();
        p.years_to_retirement = Some(3);
        assert_eq!(investment_strategy(&p), InvestmentStrategy::CapitalPreservation);
        p.years_to_retirement = Some(12);
        assert_eq!(investment_strategy(&p), InvestmentStrategy::BalancedGrowth);
        p.years_to_retirement = None;
        p.risk_tolerance = RiskTolerance::Aggressive;
        assert_eq!(investment_strategy(&p), InvestmentStrategy::AggressiveGrowth);
    }
}
