use crate::domain::profile::{Profile, RiskTolerance};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DemoScenario {
    Young,
    Moderate,
    Conservative,
    Retirement,
}

impl DemoScenario {
    pub const ALL: [DemoScenario; 4] = [
        DemoScenario::Young,
        DemoScenario::Moderate,
        DemoScenario::Conservative,
        DemoScenario::Retirement,
    ];

    pub fn description(&self) -> &'static str {
        match self {
            Self::Young => "Young Professional - aggressive growth, long time horizon",
            Self::Moderate => "Mid-Career Family - balanced approach with dependents",
            Self::Conservative => "Pre-Retirement - focus on stability and income",
            Self::Retirement => "Recently Retired - capital preservation and income",
        }
    }

    pub fn profile(&self) -> Profile {
        match self {
            Self::Young => Profile {
                age: 28,
                annual_income: 85_000.0,
                current_savings: 25_000.0,
                monthly_expenses: 3_200.0,
                total_debt: 35_000.0,
                risk_tolerance: RiskTolerance::Aggressive,
                years_to_retirement: Some(37),
                preferred_sectors: strings(&["technology", "healthcare", "finance"]),
                income_growth_rate: 0.05,
                dependents: 0,
                investment_horizon_years: Some(35),
                location: Some("Austin, TX".to_string()),
                career_field: Some("Software Engineering".to_string()),
                life_goals: strings(&[
                    "Buy a house in 5 years",
                    "Build wealth for early retirement",
                    "Travel internationally",
                ]),
                notes: Some("Tech-savvy, interested in growth stocks".to_string()),
            },
            Self::Moderate => Profile {
                age: 38,
                annual_income: 125_000.0,
                current_savings: 180_000.0,
                monthly_expenses: 5_500.0,
                total_debt: 280_000.0,
                risk_tolerance: RiskTolerance::Moderate,
                years_to_retirement: Some(27),
                preferred_sectors: strings(&["consumer", "healthcare", "technology"]),
                income_growth_rate: 0.035,
                dependents: 2,
                investment_horizon_years: Some(25),
                location: Some("Chicago, IL".to_string()),
                career_field: Some("Marketing Manager".to_string()),
                life_goals: strings(&[
                    "Save for children's college education",
                    "Pay off mortgage early",
                    "Comfortable retirement",
                    "Family vacations",
                ]),
                notes: Some("Family-oriented, balanced approach to investing".to_string()),
            },
            Self::Conservative => Profile {
                age: 52,
                annual_income: 145_000.0,
                current_savings: 525_000.0,
                monthly_expenses: 6_800.0,
                total_debt: 85_000.0,
                risk_tolerance: RiskTolerance::Conservative,
                years_to_retirement: Some(13),
                preferred_sectors: strings(&["utilities", "consumer", "healthcare"]),
                income_growth_rate: 0.025,
                dependents: 0,
                investment_horizon_years: Some(13),
                location: Some("Denver, CO".to_string()),
                career_field: Some("Financial Analyst".to_string()),
                life_goals: strings(&[
                    "Retire comfortably at 65",
                    "Generate passive income",
                    "Travel during retirement",
                    "Leave inheritance for children",
                ]),
                notes: Some("Focus on capital preservation and income generation".to_string()),
            },
            // Already retired: years_to_retirement of 0 means the horizon cap applies.
            Self::Retirement => Profile {
                age: 67,
                annual_income: 45_000.0,
                current_savings: 850_000.0,
                monthly_expenses: 4_200.0,
                total_debt: 0.0,
                risk_tolerance: RiskTolerance::Conservative,
                years_to_retirement: Some(0),
                preferred_sectors: strings(&["utilities", "consumer", "healthcare"]),
                income_growth_rate: 0.0,
                dependents: 0,
                investment_horizon_years: Some(5),
                location: Some("Phoenix, AZ".to_string()),
                career_field: Some("Retired Teacher".to_string()),
                life_goals: strings(&[
                    "Maintain standard of living",
                    "Healthcare expenses",
                    "Stay financially independent",
                    "Support grandchildren",
                ]),
                notes: Some("Retired, focus on income and preservation".to_string()),
            },
        }
    }
}

impl fmt::Display for DemoScenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Young => "young",
            Self::Moderate => "moderate",
            Self::Conservative => "conservative",
            Self::Retirement => "retirement",
        })
    }
}

impl FromStr for DemoScenario {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let key = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|d| d.to_string() == key)
            .ok_or_else(|| anyhow::anyhow!("unknown demo scenario: {s}"))
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
