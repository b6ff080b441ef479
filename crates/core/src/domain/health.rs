use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthFlag {
    LowSavingsRate,
    HighDebtToIncome,
    ThinEmergencyFund,
    LowIncome,
    HasDependents,
    ShortHorizon,
}

impl fmt::Display for HealthFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::LowSavingsRate => "savings rate needs attention",
            Self::HighDebtToIncome => "high debt-to-income ratio",
            Self::ThinEmergencyFund => "insufficient emergency fund",
            Self::LowIncome => "lower income calls for a more conservative approach",
            Self::HasDependents => "financial responsibility for dependents",
            Self::ShortHorizon => "short time horizon for retirement",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvestmentStrategy {
    CapitalPreservation,
    BalancedGrowth,
    ConservativeGrowth,
    ModerateGrowth,
    AggressiveGrowth,
}

impl fmt::Display for InvestmentStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::CapitalPreservation => {
                "Capital Preservation - stable dividend stocks and bonds"
            }
            Self::BalancedGrowth => "Balanced Growth - growth and dividend stocks with some bonds",
            Self::ConservativeGrowth => "Conservative Growth - blue-chip dividend stocks and bonds",
            Self::ModerateGrowth => "Moderate Growth - diversified growth and value stocks",
            Self::AggressiveGrowth => "Aggressive Growth - high-growth stocks and emerging sectors",
        };
        f.write_str(s)
    }
}

/// Derived health metrics. `None` marks a metric that is undefined for the profile
/// (for example a savings rate with zero income).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthMetrics {
    pub savings_rate_percent: Option<f64>,
    pub debt_to_income: Option<f64>,
    pub emergency_fund_months: Option<f64>,
    pub years_to_debt_free: Option<f64>,
    pub flags: Vec<HealthFlag>,
    pub risk_level: RiskLevel,
    pub strategy: InvestmentStrategy,
}
