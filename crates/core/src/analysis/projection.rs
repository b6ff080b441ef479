//! Closed-form yearly projections of net worth, income and dividend income.
//!
//! Each scenario is a separate [`ProjectionConfig`]; best and worst cases only differ in the
//! return assumptions they carry.

use crate::domain::allocation::Allocation;
use crate::domain::profile::Profile;
use crate::domain::projection::{
    ProjectionResult, ProjectionSummary, RetirementReadiness, Scenario, ScenarioProjection,
    YearRecord,
};
use crate::domain::recommendation::ScoredStock;
use serde::{Deserialize, Serialize};

pub const DEFAULT_INFLATION_RATE: f64 = 0.03;
pub const DEFAULT_WITHDRAWAL_RATE: f64 = 0.04;
pub const DEFAULT_HORIZON_CAP: u32 = 40;
/// Upper bound on any projection horizon, configured or profile-supplied.
pub const MAX_HORIZON_YEARS: u32 = 120;
pub const DEFAULT_REPLACEMENT_TARGET: f64 = 0.80;

const SUMMARY_LOOKAHEAD_YEARS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnAssumptions {
    pub equity_return: f64,
    pub bond_return: f64,
}

impl ReturnAssumptions {
    pub const EXPECTED: Self = Self {
        equity_return: 0.10,
        bond_return: 0.04,
    };
    pub const BEST_CASE: Self = Self {
        equity_return: 0.12,
        bond_return: 0.05,
    };
    pub const WORST_CASE: Self = Self {
        equity_return: 0.04,
        bond_return: 0.02,
    };

    pub fn blended(&self, allocation: &Allocation) -> f64 {
        allocation.stock_fraction() * self.equity_return
            + allocation.bond_fraction() * self.bond_return
    }
}

/// Everything one projection run needs besides the profile and portfolio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionConfig {
    pub returns: ReturnAssumptions,
    pub inflation_rate: f64,
    pub withdrawal_rate: f64,
    pub horizon_cap: u32,
    pub replacement_target: f64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            returns: ReturnAssumptions::EXPECTED,
            inflation_rate: DEFAULT_INFLATION_RATE,
            withdrawal_rate: DEFAULT_WITHDRAWAL_RATE,
            horizon_cap: DEFAULT_HORIZON_CAP,
            replacement_target: DEFAULT_REPLACEMENT_TARGET,
        }
    }
}

/// Shared assumptions plus per-scenario returns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Assumptions {
    pub expected: ReturnAssumptions,
    pub best_case: ReturnAssumptions,
    pub worst_case: ReturnAssumptions,
    pub inflation_rate: f64,
    pub withdrawal_rate: f64,
    pub horizon_cap: u32,
    pub replacement_target: f64,
}

impl Default for Assumptions {
    fn default() -> Self {
        Self {
            expected: ReturnAssumptions::EXPECTED,
            best_case: ReturnAssumptions::BEST_CASE,
            worst_case: ReturnAssumptions::WORST_CASE,
            inflation_rate: DEFAULT_INFLATION_RATE,
            withdrawal_rate: DEFAULT_WITHDRAWAL_RATE,
            horizon_cap: DEFAULT_HORIZON_CAP,
            replacement_target: DEFAULT_REPLACEMENT_TARGET,
        }
    }
}

impl Assumptions {
    pub fn from_env() -> Self {
        let mut out = Self::default();

        if let Some(v) = env_f64("NESTEGG_EQUITY_RETURN") {
            out.expected.equity_return = v;
        }
        if let Some(v) = env_f64("NESTEGG_BOND_RETURN") {
            out.expected.bond_return = v;
        }
        if let Some(v) = env_f64("NESTEGG_INFLATION_RATE") {
            out.inflation_rate = v;
        }
        if let Some(v) = env_f64("NESTEGG_WITHDRAWAL_RATE") {
            out.withdrawal_rate = v;
        }
        if let Some(v) = std::env::var("NESTEGG_HORIZON_CAP")
            .ok()
            .and_then(|s| parse_horizon_cap(&s))
        {
            out.horizon_cap = v;
        }

        out
    }

    pub fn config_for(&self, scenario: Scenario) -> ProjectionConfig {
        let returns = match scenario {
            Scenario::Expected => self.expected,
            Scenario::BestCase => self.best_case,
            Scenario::WorstCase => self.worst_case,
        };
        ProjectionConfig {
            returns,
            inflation_rate: self.inflation_rate,
            withdrawal_rate: self.withdrawal_rate,
            horizon_cap: self.horizon_cap,
            replacement_target: self.replacement_target,
        }
    }
}

fn parse_horizon_cap(s: &str) -> Option<u32> {
    s.trim()
        .parse::<u32>()
        .ok()
        .map(|v| v.clamp(1, MAX_HORIZON_YEARS))
}

fn env_f64(key: &str) -> Option<f64> {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

pub fn horizon_years(profile: &Profile, config: &ProjectionConfig) -> u32 {
    profile
        .known_years_to_retirement()
        .unwrap_or(config.horizon_cap)
        .min(MAX_HORIZON_YEARS)
}

/// Market-cap-weighted dividend yield of the recommended stocks.
///
/// Falls back to an equal weighting when no market caps are known, and to zero without
/// recommendations.
pub fn portfolio_dividend_yield(recommendations: &[ScoredStock]) -> f64 {
    if recommendations.is_empty() {
        return 0.0;
    }

    let total_cap: f64 = recommendations
        .iter()
        .map(|s| s.quote.market_cap.max(0.0))
        .sum();
    if total_cap > 0.0 {
        recommendations
            .iter()
            .map(|s| s.quote.market_cap.max(0.0) * s.quote.dividend_yield)
            .sum::<f64>()
            / total_cap
    } else {
        recommendations
            .iter()
            .map(|s| s.quote.dividend_yield)
            .sum::<f64>()
            / recommendations.len() as f64
    }
}

pub fn project_scenario(
    scenario: Scenario,
    profile: &Profile,
    allocation: &Allocation,
    dividend_yield: f64,
    config: &ProjectionConfig,
) -> ScenarioProjection {
    let horizon = horizon_years(profile, config);
    let blended_return = config.returns.blended(allocation);
    let stock_fraction = allocation.stock_fraction();

    let mut net_worth = profile.current_savings;
    let mut income = profile.annual_income;
    let mut monthly_expenses = profile.monthly_expenses;

    let mut years = Vec::with_capacity(horizon as usize + 1);
    years.push(YearRecord {
        year: 0,
        age: profile.age,
        net_worth,
        income,
        annual_expenses: monthly_expenses * 12.0,
        contribution: 0.0,
        investment_return: 0.0,
        dividend_income: 0.0,
    });

    for year in 1..=horizon {
        let next_income = income * (1.0 + profile.income_growth_rate);
        // Deficit years contribute nothing rather than drawing down savings.
        let contribution = (next_income - monthly_expenses * 12.0).max(0.0);
        let investment_return = net_worth * blended_return;

        net_worth += contribution + investment_return;
        income = next_income;
        monthly_expenses *= 1.0 + config.inflation_rate;

        years.push(YearRecord {
            year,
            age: profile.age.saturating_add(year),
            net_worth,
            income,
            annual_expenses: monthly_expenses * 12.0,
            contribution,
            investment_return,
            dividend_income: net_worth * stock_fraction * dividend_yield,
        });
    }

    let readiness = retirement_readiness(&years, config);

    ScenarioProjection {
        scenario,
        blended_return,
        years,
        readiness,
    }
}

pub fn retirement_readiness(years: &[YearRecord], config: &ProjectionConfig) -> RetirementReadiness {
    let (nest_egg, annual_expenses) = years
        .last()
        .map(|y| (y.net_worth, y.annual_expenses))
        .unwrap_or((0.0, 0.0));

    let sustainable_withdrawal = nest_egg * config.withdrawal_rate;
    let replacement_ratio =
        (annual_expenses > 0.0).then(|| sustainable_withdrawal / annual_expenses);
    let on_track = replacement_ratio.map_or(true, |r| r >= config.replacement_target);

    let retirement_goal = if config.withdrawal_rate > 0.0 {
        annual_expenses / config.withdrawal_rate
    } else {
        f64::INFINITY
    };

    RetirementReadiness {
        projected_nest_egg: nest_egg,
        sustainable_withdrawal,
        replacement_ratio,
        on_track,
        retirement_goal,
        surplus_shortfall: nest_egg - retirement_goal,
    }
}

pub fn project(
    profile: &Profile,
    allocation: &Allocation,
    recommendations: &[ScoredStock],
    assumptions: &Assumptions,
) -> ProjectionResult {
    let dividend_yield = portfolio_dividend_yield(recommendations);
    let scenarios = Scenario::ALL
        .into_iter()
        .map(|scenario| {
            project_scenario(
                scenario,
                profile,
                allocation,
                dividend_yield,
                &assumptions.config_for(scenario),
            )
        })
        .collect();

    ProjectionResult {
        portfolio_dividend_yield: dividend_yield,
        scenarios,
    }
}

pub fn summarize(projection: &ScenarioProjection) -> Option<ProjectionSummary> {
    let current = projection.years.first()?;
    let idx = (SUMMARY_LOOKAHEAD_YEARS as usize).min(projection.years.len() - 1);
    let future = &projection.years[idx];

    let growth = |from: f64, to: f64| (from != 0.0).then(|| (to - from) / from.abs() * 100.0);

    Some(ProjectionSummary {
        current_net_worth: current.net_worth,
        current_income: current.income,
        years_ahead: future.year,
        future_age: future.age,
        future_net_worth: future.net_worth,
        future_income: future.income,
        future_dividend_income: future.dividend_income,
        net_worth_growth_percent: growth(current.net_worth, future.net_worth),
        income_growth_percent: growth(current.income, future.income),
    })
}
