use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nestegg_core::advisor::{build_advisor, AdvisorKind};
use nestegg_core::demo::DemoScenario;
use nestegg_core::domain::profile::Profile;
use nestegg_core::engine::{PlanReport, Planner, PlannerConfig};
use nestegg_core::ingest::fallback::StaticQuoteProvider;
use nestegg_core::ingest::provider::{HttpJsonQuoteProvider, QuoteProvider};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = nestegg_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let quotes: Arc<dyn QuoteProvider> = match HttpJsonQuoteProvider::from_settings(&settings) {
        Ok(provider) => Arc::new(provider),
        Err(e) => {
            tracing::warn!(error = %e, "quote provider not configured; serving built-in quotes");
            Arc::new(StaticQuoteProvider::builtin())
        }
    };

    let kind = settings
        .advisor
        .as_deref()
        .map(str::parse::<AdvisorKind>)
        .transpose()?
        .unwrap_or(AdvisorKind::Rules);
    let advisor = match build_advisor(kind, &settings) {
        Ok(advisor) => advisor,
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %e, %kind, "advisor setup failed; using rule-based allocation");
            None
        }
    };

    let state = AppState {
        planner: Arc::new(Planner::new(quotes, advisor, PlannerConfig::from_env())),
    };

    let app = router(state).layer(TraceLayer::new_for_http());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/plans", post(create_plan))
        .route("/demo/:scenario", get(get_demo_plan))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Clone)]
struct AppState {
    planner: Arc<Planner>,
}

#[derive(Debug, Deserialize)]
struct PlanRequest {
    profile: Profile,
    #[serde(default)]
    tickers: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn internal(err: anyhow::Error) -> Self {
        sentry_anyhow::capture_anyhow(&err);
        tracing::error!(error = %err, "plan run failed");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "internal error".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

async fn create_plan(
    State(state): State<AppState>,
    Json(req): Json<PlanRequest>,
) -> Result<Json<PlanReport>, ApiError> {
    req.profile.validate().map_err(|e| ApiError {
        status: StatusCode::UNPROCESSABLE_ENTITY,
        message: format!("{e:#}"),
    })?;

    let report = state
        .planner
        .run(&req.profile, req.tickers)
        .await
        .map_err(ApiError::internal)?;
    Ok(Json(report))
}

async fn get_demo_plan(
    State(state): State<AppState>,
    Path(scenario): Path<String>,
) -> Result<Json<PlanReport>, ApiError> {
    let scenario = scenario.parse::<DemoScenario>().map_err(|e| ApiError {
        status: StatusCode::NOT_FOUND,
        message: e.to_string(),
    })?;

    let report = state
        .planner
        .run(&scenario.profile(), None)
        .await
        .map_err(ApiError::internal)?;
    Ok(Json(report))
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &nestegg_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn state() -> AppState {
        AppState {
            planner: Arc::new(Planner::new(
                Arc::new(StaticQuoteProvider::builtin()),
                None,
                PlannerConfig::default(),
            )),
        }
    }

    fn request(profile: serde_json::Value) -> PlanRequest {
        serde_json::from_value(json!({"profile": profile, "tickers": ["AAPL", "JNJ", "NOPE"]}))
            .unwrap()
    }

    fn profile_json() -> serde_json::Value {
        json!({
            "age": 35,
            "annual_income": 120000.0,
            "current_savings": 85000.0,
            "monthly_expenses": 4500.0,
            "total_debt": 15000.0,
            "risk_tolerance": "moderate",
            "years_to_retirement": 30,
        })
    }

    #[tokio::test]
    async fn creates_a_plan() {
        let Json(report) = create_plan(State(state()), Json(request(profile_json())))
            .await
            .unwrap();
        assert_eq!(report.allocation.stock_percent, 75.0);
        assert_eq!(report.recommendations.len(), 2);
        assert_eq!(report.skipped.len(), 1);
    }

    #[tokio::test]
    async fn invalid_profile_is_unprocessable() {
        let mut profile = profile_json();
        profile["monthly_expenses"] = json!(-10.0);
        let err = create_plan(State(state()), Json(request(profile)))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn unbounded_retirement_horizon_is_unprocessable() {
        let mut profile = profile_json();
        profile["years_to_retirement"] = json!(u32::MAX);
        let err = create_plan(State(state()), Json(request(profile)))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn unknown_risk_tolerance_is_rejected_at_parse() {
        let mut profile = profile_json();
        profile["risk_tolerance"] = json!("yolo");
        assert!(serde_json::from_value::<PlanRequest>(json!({"profile": profile})).is_err());
    }

    #[tokio::test]
    async fn demo_scenarios() {
        let Json(report) = get_demo_plan(State(state()), Path("young".to_string()))
            .await
            .unwrap();
        assert_eq!(report.advisor, "rules");

        let err = get_demo_plan(State(state()), Path("martian".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }
}
