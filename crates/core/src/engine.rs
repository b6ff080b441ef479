use crate::advisor::{advise_with_fallback, Advisor};
use crate::analysis::health::assess_health;
use crate::analysis::projection::{project, summarize, Assumptions};
use crate::analysis::scoring::{rank, score_stock};
use crate::domain::allocation::Allocation;
use crate::domain::health::HealthMetrics;
use crate::domain::profile::Profile;
use crate::domain::projection::{ProjectionResult, ProjectionSummary};
use crate::domain::recommendation::{ScoredStock, SkippedTicker};
use crate::ingest::provider::QuoteProvider;
use crate::ingest::universe::{build_candidate_universe, normalize_tickers, UniverseOptions};
use anyhow::Context;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

const DEFAULT_TOP_N: usize = 10;
const DEFAULT_CONCURRENCY: usize = 4;

#[derive(Debug, Clone)]
pub struct PlannerConfig {
    pub assumptions: Assumptions,
    pub universe: UniverseOptions,

    /// Recommendations kept after ranking.
    pub top_n: usize,

    /// Quote requests in flight at once.
    pub concurrency: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            assumptions: Assumptions::default(),
            universe: UniverseOptions::default(),
            top_n: DEFAULT_TOP_N,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl PlannerConfig {
    pub fn from_env() -> Self {
        let top_n = std::env::var("NESTEGG_TOP_N")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(DEFAULT_TOP_N);
        let concurrency = std::env::var("QUOTE_PROVIDER_CONCURRENCY")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(DEFAULT_CONCURRENCY)
            .max(1);

        Self {
            assumptions: Assumptions::from_env(),
            universe: UniverseOptions::from_env(),
            top_n,
            concurrency,
        }
    }
}

/// Everything one planning run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub health: HealthMetrics,
    pub advisor: String,
    pub allocation: Allocation,
    pub allocation_rationale: Vec<String>,
    pub recommendations: Vec<ScoredStock>,
    pub skipped: Vec<SkippedTicker>,
    pub projection: ProjectionResult,
    pub summary: Option<ProjectionSummary>,
}

pub struct Planner {
    quotes: Arc<dyn QuoteProvider>,
    advisor: Option<Arc<dyn Advisor>>,
    config: PlannerConfig,
}

impl Planner {
    pub fn new(
        quotes: Arc<dyn QuoteProvider>,
        advisor: Option<Arc<dyn Advisor>>,
        config: PlannerConfig,
    ) -> Self {
        Self {
            quotes,
            advisor,
            config,
        }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Runs the full pipeline. `tickers` overrides the profile-derived candidate universe.
    pub async fn run(
        &self,
        profile: &Profile,
        tickers: Option<Vec<String>>,
    ) -> anyhow::Result<PlanReport> {
        profile.validate().context("invalid profile")?;
        let run_id = Uuid::new_v4();

        let health = assess_health(profile);
        let (advisor, advice) =
            advise_with_fallback(self.advisor.as_deref(), profile, &health).await?;
        advice
            .allocation
            .validate()
            .with_context(|| format!("advisor {advisor} produced an invalid allocation"))?;

        let candidates = match tickers {
            Some(t) => {
                let mut given = normalize_tickers(t);
                if given.len() > self.config.universe.max_candidates {
                    tracing::warn!(
                        %run_id,
                        requested = given.len(),
                        max = self.config.universe.max_candidates,
                        "too many tickers; keeping the first ones"
                    );
                    given.truncate(self.config.universe.max_candidates);
                }
                given
            }
            None => build_candidate_universe(profile, &self.config.universe),
        };
        tracing::info!(
            %run_id,
            advisor,
            provider = self.quotes.provider_name(),
            candidates = candidates.len(),
            "planning run started"
        );

        let (mut recommendations, mut skipped) = self.score_candidates(profile, candidates).await;
        rank(&mut recommendations);
        recommendations.truncate(self.config.top_n);
        skipped.sort_by(|a, b| a.ticker.cmp(&b.ticker));

        let projection = project(
            profile,
            &advice.allocation,
            &recommendations,
            &self.config.assumptions,
        );
        let summary = projection.expected().and_then(summarize);

        tracing::info!(
            %run_id,
            recommendations = recommendations.len(),
            skipped = skipped.len(),
            "planning run finished"
        );

        Ok(PlanReport {
            run_id,
            generated_at: Utc::now(),
            health,
            advisor: advisor.to_string(),
            allocation: advice.allocation,
            allocation_rationale: advice.rationale,
            recommendations,
            skipped,
            projection,
            summary,
        })
    }

    async fn score_candidates(
        &self,
        profile: &Profile,
        candidates: Vec<String>,
    ) -> (Vec<ScoredStock>, Vec<SkippedTicker>) {
        let quotes = &self.quotes;
        let results: Vec<_> = stream::iter(candidates)
            .map(|ticker| async move {
                let res = quotes.get_quote(&ticker).await;
                (ticker, res)
            })
            .buffer_unordered(self.config.concurrency.max(1))
            .collect()
            .await;

        let mut scored = Vec::new();
        let mut skipped = Vec::new();
        for (ticker, res) in results {
            match res {
                Ok(quote) => scored.push(score_stock(profile, quote)),
                Err(err) => {
                    tracing::warn!(%ticker, error = %err, "skipping ticker");
                    skipped.push(SkippedTicker {
                        ticker,
                        kind: err.kind,
                        reason: err.detail,
                    });
                }
            }
        }
        (scored, skipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::profile::{sample_profile, RiskTolerance};
    use crate::ingest::fallback::StaticQuoteProvider;
    use crate::ingest::types::QuoteErrorKind;

    fn planner() -> Planner {
        Planner::new(
            Arc::new(StaticQuoteProvider::builtin()),
            None,
            PlannerConfig::default(),
        )
    }

    fn tickers(list: &[&str]) -> Option<Vec<String>> {
        Some(list.iter().map(|s| s.to_string()).collect())
    }

    #[tokio::test]
    async fn failing_ticker_is_skipped_not_fatal() {
        let report = planner()
            .run(&sample_profile(), tickers(&["AAPL", "NOPE", "JNJ"]))
            .await
            .unwrap();

        let symbols: Vec<_> = report
            .recommendations
            .iter()
            .map(|s| s.quote.symbol.as_str())
            .collect();
        assert_eq!(symbols.len(), 2);
        assert!(!symbols.contains(&"NOPE"));
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].ticker, "NOPE");
        assert_eq!(report.skipped[0].kind, QuoteErrorKind::NotFound);
    }

    #[tokio::test]
    async fn no_quotes_still_yields_allocation_and_projection() {
        let report = planner()
            .run(&sample_profile(), tickers(&["NOPE1", "NOPE2"]))
            .await
            .unwrap();

        assert!(report.recommendations.is_empty());
        assert_eq!(report.allocation.stock_percent, 75.0);
        assert_eq!(report.projection.portfolio_dividend_yield, 0.0);
        assert_eq!(report.projection.scenarios.len(), 3);
        assert!(report.summary.is_some());
        assert_eq!(report.advisor, "rules");
    }

    #[tokio::test]
    async fn output_order_ignores_input_order() {
        let p = planner();
        let profile = sample_profile();
        let a = p
            .run(&profile, tickers(&["XOM", "AAPL", "KO", "MSFT", "JNJ", "VZ"]))
            .await
            .unwrap();
        let b = p
            .run(&profile, tickers(&["vz", "JNJ", "MSFT", "KO", "AAPL", "XOM"]))
            .await
            .unwrap();

        let order = |r: &PlanReport| -> Vec<String> {
            r.recommendations
                .iter()
                .map(|s| s.quote.symbol.clone())
                .collect()
        };
        assert_eq!(order(&a), order(&b));
        for pair in a.recommendations.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[tokio::test]
    async fn truncates_to_top_n() {
        let p = Planner::new(
            Arc::new(StaticQuoteProvider::builtin()),
            None,
            PlannerConfig {
                top_n: 3,
                ..PlannerConfig::default()
            },
        );
        let mut profile = sample_profile();
        profile.risk_tolerance = RiskTolerance::Conservative;

        let report = p.run(&profile, None).await.unwrap();
        assert_eq!(report.recommendations.len(), 3);
    }

    #[tokio::test]
    async fn given_tickers_respect_max_candidates() {
        let p = Planner::new(
            Arc::new(StaticQuoteProvider::builtin()),
            None,
            PlannerConfig {
                universe: UniverseOptions {
                    max_candidates: 3,
                    ..UniverseOptions::default()
                },
                ..PlannerConfig::default()
            },
        );

        let report = p
            .run(
                &sample_profile(),
                tickers(&["AAPL", "NOPE", "JNJ", "KO", "XOM", "MSFT"]),
            )
            .await
            .unwrap();
        assert_eq!(report.recommendations.len() + report.skipped.len(), 3);
        assert!(report
            .recommendations
            .iter()
            .all(|s| ["AAPL", "JNJ"].contains(&s.quote.symbol.as_str())));
        assert_eq!(report.skipped[0].ticker, "NOPE");
    }

    #[tokio::test]
    async fn rejects_invalid_profile() {
        let mut profile = sample_profile();
        profile.annual_income = -1.0;
        assert!(planner().run(&profile, None).await.is_err());
    }
}
