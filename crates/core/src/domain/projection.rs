use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    Expected,
    BestCase,
    WorstCase,
}

impl Scenario {
    pub const ALL: [Scenario; 3] = [Scenario::Expected, Scenario::BestCase, Scenario::WorstCase];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearRecord {
    pub year: u32,
    pub age: u32,
    pub net_worth: f64,
    pub income: f64,
    pub annual_expenses: f64,
    /// Savings added during the step that produced this year (0 for year 0).
    pub contribution: f64,
    pub investment_return: f64,
    pub dividend_income: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetirementReadiness {
    pub projected_nest_egg: f64,
    pub sustainable_withdrawal: f64,
    /// `None` when the final-year expenses are zero.
    pub replacement_ratio: Option<f64>,
    pub on_track: bool,
    pub retirement_goal: f64,
    pub surplus_shortfall: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioProjection {
    pub scenario: Scenario,
    pub blended_return: f64,
    pub years: Vec<YearRecord>,
    pub readiness: RetirementReadiness,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResult {
    pub portfolio_dividend_yield: f64,
    pub scenarios: Vec<ScenarioProjection>,
}

impl ProjectionResult {
    pub fn scenario(&self, scenario: Scenario) -> Option<&ScenarioProjection> {
        self.scenarios.iter().find(|s| s.scenario == scenario)
    }

    pub fn expected(&self) -> Option<&ScenarioProjection> {
        self.scenario(Scenario::Expected)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSummary {
    pub current_net_worth: f64,
    pub current_income: f64,
    pub years_ahead: u32,
    pub future_age: u32,
    pub future_net_worth: f64,
    pub future_income: f64,
    pub future_dividend_income: f64,
    pub net_worth_growth_percent: Option<f64>,
    pub income_growth_percent: Option<f64>,
}
