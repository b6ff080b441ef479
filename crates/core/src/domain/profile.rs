use anyhow::ensure;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTolerance {
    Conservative,
    Moderate,
    Aggressive,
}

impl RiskTolerance {
    pub const ALL: [RiskTolerance; 3] = [
        RiskTolerance::Conservative,
        RiskTolerance::Moderate,
        RiskTolerance::Aggressive,
    ];
}

impl fmt::Display for RiskTolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Conservative => "conservative",
            Self::Moderate => "moderate",
            Self::Aggressive => "aggressive",
        };
        f.write_str(s)
    }
}

impl FromStr for RiskTolerance {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "conservative" => Ok(Self::Conservative),
            "moderate" => Ok(Self::Moderate),
            "aggressive" => Ok(Self::Aggressive),
            other => anyhow::bail!("unknown risk tolerance: {other}"),
        }
    }
}

/// Self-reported financial profile for a single planning run.
///
/// Money amounts are in the profile's currency; `monthly_expenses` is per month, every other
/// amount is annual or a balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub age: u32,
    pub annual_income: f64,
    pub current_savings: f64,
    pub monthly_expenses: f64,
    pub total_debt: f64,
    pub risk_tolerance: RiskTolerance,

    /// `None` or `Some(0)` means unknown; projections then fall back to the horizon cap.
    #[serde(default)]
    pub years_to_retirement: Option<u32>,

    #[serde(default)]
    pub preferred_sectors: Vec<String>,

    /// Fraction, e.g. `0.03` for 3% per year.
    #[serde(default)]
    pub income_growth_rate: f64,

    #[serde(default)]
    pub dependents: u32,

    #[serde(default)]
    pub investment_horizon_years: Option<u32>,

    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub career_field: Option<String>,
    #[serde(default)]
    pub life_goals: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

const MAX_AGE: u32 = 120;

impl Profile {
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            (1..=MAX_AGE).contains(&self.age),
            "age must be 1..={MAX_AGE} (got {})",
            self.age
        );

        for (field, years) in [
            ("years_to_retirement", self.years_to_retirement),
            ("investment_horizon_years", self.investment_horizon_years),
        ] {
            if let Some(y) = years {
                ensure!(
                    u64::from(self.age) + u64::from(y) <= u64::from(MAX_AGE),
                    "{field} must not reach past age {MAX_AGE} (age {}, got {y})",
                    self.age
                );
            }
        }

        for (field, value) in [
            ("annual_income", self.annual_income),
            ("current_savings", self.current_savings),
            ("monthly_expenses", self.monthly_expenses),
            ("total_debt", self.total_debt),
        ] {
            ensure!(
                value.is_finite() && value >= 0.0,
                "{field} must be a finite non-negative amount (got {value})"
            );
        }

        ensure!(
            self.income_growth_rate.is_finite() && self.income_growth_rate > -1.0,
            "income_growth_rate must be a fraction above -1 (got {})",
            self.income_growth_rate
        );

        Ok(())
    }

    /// Known years to retirement. Zero counts as unknown.
    pub fn known_years_to_retirement(&self) -> Option<u32> {
        self.years_to_retirement.filter(|&y| y > 0)
    }

    pub fn annual_expenses(&self) -> f64 {
        self.monthly_expenses * 12.0
    }

    pub fn prefers_sector(&self, sector: &str) -> bool {
        let sector = sector.trim();
        self.preferred_sectors
            .iter()
            .any(|s| s.trim().eq_ignore_ascii_case(sector))
    }
}

#[cfg(test)]
pub(crate) fn sample_profile() -> Profile {
    Profile {
        age: 35,
        annual_income: 120_000.0,
        current_savings: 85_000.0,
        monthly_expenses: 4_500.0,
        total_debt: 15_000.0,
        risk_tolerance: RiskTolerance::Moderate,
        years_to_retirement: Some(30),
        preferred_sectors: vec!["Technology".to_string()],
        income_growth_rate: 0.03,
        dependents: 0,
        investment_horizon_years: Some(30),
        location: None,
        career_field: None,
        life_goals: Vec::new(),
        notes: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_minimal_profile_with_defaults() {
        let v = json!({
            "age": 40,
            "annual_income": 90000.0,
            "current_savings": 20000.0,
            "monthly_expenses": 3000.0,
            "total_debt": 0.0,
            "risk_tolerance": "aggressive",
        });

        let p: Profile = serde_json::from_value(v).unwrap();
        assert_eq!(p.risk_tolerance, RiskTolerance::Aggressive);
        assert!(p.preferred_sectors.is_empty());
        assert_eq!(p.years_to_retirement, None);
        assert_eq!(p.income_growth_rate, 0.0);
        p.validate().unwrap();
    }

    #[test]
    fn rejects_unknown_risk_tolerance() {
        let v = json!({
            "age": 40,
            "annual_income": 1.0,
            "current_savings": 1.0,
            "monthly_expenses": 1.0,
            "total_debt": 0.0,
            "risk_tolerance": "yolo",
        });
        assert!(serde_json::from_value::<Profile>(v).is_err());
        assert!("yolo".parse::<RiskTolerance>().is_err());
        assert_eq!(
            " Moderate ".parse::<RiskTolerance>().unwrap(),
            RiskTolerance::Moderate
        );
    }

    #[test]
    fn validate_rejects_negative_amounts_and_zero_age() {
        let mut p = sample_profile();
        p.monthly_expenses = -1.0;
        assert!(p.validate().is_err());

        let mut p = sample_profile();
        p.age = 0;
        assert!(p.validate().is_err());
    }

    #[test]
    fn validate_rejects_horizon_past_max_age() {
        let mut p = sample_profile();
        p.years_to_retirement = Some(u32::MAX);
        assert!(p.validate().is_err());

        p.years_to_retirement = Some(MAX_AGE - p.age + 1);
        assert!(p.validate().is_err());

        p.years_to_retirement = Some(MAX_AGE - p.age);
        p.validate().unwrap();

        p.investment_horizon_years = Some(1_000);
        assert!(p.validate().is_err());
    }

    #[test]
    fn sector_preference_is_case_insensitive() {
        let p = sample_profile();
        assert!(p.prefers_sector("technology"));
        assert!(p.prefers_sector(" TECHNOLOGY"));
        assert!(!p.prefers_sector("Energy"));
    }

    #[test]
    fn zero_years_to_retirement_is_unknown() {
        let mut p = sample_profile();
        p.years_to_retirement = Some(0);
        assert_eq!(p.known_years_to_retirement(), None);
    }
}
