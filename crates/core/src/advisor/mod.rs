pub mod anthropic;
pub mod error;
pub mod json;

use crate::analysis::allocation::{allocation_for, base_stock_percent, risk_adjustment};
use crate::config::Settings;
use crate::domain::advice::Advice;
use crate::domain::health::HealthMetrics;
use crate::domain::profile::Profile;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvisorKind {
    Rules,
    Anthropic,
}

impl fmt::Display for AdvisorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Rules => "rules",
            Self::Anthropic => "anthropic",
        })
    }
}

impl FromStr for AdvisorKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rules" | "rule" | "rule-based" => Ok(Self::Rules),
            "anthropic" | "claude" => Ok(Self::Anthropic),
            other => anyhow::bail!("unknown advisor: {other}"),
        }
    }
}

/// Produces an allocation plus rationale lines for a profile.
#[async_trait::async_trait]
pub trait Advisor: Send + Sync {
    fn name(&self) -> &'static str;

    async fn advise(&self, profile: &Profile, health: &HealthMetrics) -> anyhow::Result<Advice>;
}

/// Age rule with a risk adjustment. Always available.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedAdvisor;

impl RuleBasedAdvisor {
    pub fn advise_now(&self, profile: &Profile, health: &HealthMetrics) -> anyhow::Result<Advice> {
        let allocation = allocation_for(profile)?;

        let base = base_stock_percent(profile.age);
        let adj = risk_adjustment(profile.risk_tolerance);
        let mut rationale = vec![format!(
            "110 minus age {} puts {base}% in stocks before adjusting for risk",
            profile.age
        )];
        rationale.push(match adj {
            0 => format!("Risk tolerance {} keeps the age-based split", profile.risk_tolerance),
            a => format!(
                "Risk tolerance {} moves stocks by {a:+} points to {}%",
                profile.risk_tolerance, allocation.stock_percent
            ),
        });
        rationale.push(format!("Strategy: {}", health.strategy));

        Ok(Advice {
            allocation,
            rationale,
        })
    }
}

#[async_trait::async_trait]
impl Advisor for RuleBasedAdvisor {
    fn name(&self) -> &'static str {
        "rules"
    }

    async fn advise(&self, profile: &Profile, health: &HealthMetrics) -> anyhow::Result<Advice> {
        self.advise_now(profile, health)
    }
}

/// Builds the configured primary advisor. `Rules` needs no primary since the rule-based
/// advisor is always the fallback.
pub fn build_advisor(
    kind: AdvisorKind,
    settings: &Settings,
) -> anyhow::Result<Option<Arc<dyn Advisor>>> {
    match kind {
        AdvisorKind::Rules => Ok(None),
        AdvisorKind::Anthropic => Ok(Some(Arc::new(
            anthropic::AnthropicAdvisor::from_settings(settings)?,
        ))),
    }
}

/// Asks `primary` first and falls back to the rule-based advisor on any error.
///
/// Returns the name of the advisor whose answer was used.
pub async fn advise_with_fallback(
    primary: Option<&dyn Advisor>,
    profile: &Profile,
    health: &HealthMetrics,
) -> anyhow::Result<(&'static str, Advice)> {
    if let Some(advisor) = primary {
        match advisor.advise(profile, health).await {
            Ok(advice) => return Ok((advisor.name(), advice)),
            Err(err) => {
                tracing::warn!(
                    advisor = advisor.name(),
                    error = %err,
                    "advisor failed; falling back to rule-based allocation"
                );
            }
        }
    }

    let rules = RuleBasedAdvisor;
    Ok((rules.name(), rules.advise_now(profile, health)?))
}
