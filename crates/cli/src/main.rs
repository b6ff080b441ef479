use anyhow::Context;
use clap::Parser;
use nestegg_core::advisor::{build_advisor, AdvisorKind};
use nestegg_core::demo::DemoScenario;
use nestegg_core::domain::profile::Profile;
use nestegg_core::engine::{Planner, PlannerConfig};
use nestegg_core::ingest::fallback::StaticQuoteProvider;
use nestegg_core::ingest::provider::{HttpJsonQuoteProvider, QuoteProvider};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod report;

#[derive(Debug, Parser)]
#[command(name = "nestegg", about = "Personal financial plan: allocation, stock picks, projection")]
struct Args {
    /// Path to a profile JSON file.
    #[arg(long, conflicts_with = "demo", required_unless_present = "demo")]
    profile: Option<PathBuf>,

    /// Built-in demo profile: young, moderate, conservative or retirement.
    #[arg(long)]
    demo: Option<String>,

    /// Comma-separated tickers to score instead of the profile-derived universe.
    #[arg(long, value_delimiter = ',')]
    tickers: Option<Vec<String>>,

    /// Use built-in quotes instead of the configured quote provider.
    #[arg(long)]
    offline: bool,

    /// Allocation advisor: rules or anthropic. Defaults to NESTEGG_ADVISOR, then rules.
    #[arg(long)]
    advisor: Option<String>,

    /// Number of recommendations to keep.
    #[arg(long)]
    top_n: Option<usize>,

    /// Print the full report as JSON.
    #[arg(long)]
    json: bool,

    /// Write the loaded profile to this path as pretty JSON.
    #[arg(long)]
    save_profile: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = nestegg_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    if let Err(err) = run(args, &settings).await {
        sentry_anyhow::capture_anyhow(&err);
        tracing::error!(error = %err, "planning failed");
        return Err(err);
    }
    Ok(())
}

async fn run(args: Args, settings: &nestegg_core::config::Settings) -> anyhow::Result<()> {
    let profile = load_profile(&args)?;
    if let Some(path) = &args.save_profile {
        save_profile(path, &profile)?;
        tracing::info!(path = %path.display(), "saved profile");
    }

    let quotes: Arc<dyn QuoteProvider> = if args.offline {
        Arc::new(StaticQuoteProvider::builtin())
    } else {
        Arc::new(HttpJsonQuoteProvider::from_settings(settings)?)
    };

    let kind = args
        .advisor
        .as_deref()
        .or(settings.advisor.as_deref())
        .map(str::parse::<AdvisorKind>)
        .transpose()?
        .unwrap_or(AdvisorKind::Rules);
    let advisor = build_advisor(kind, settings)?;

    let mut config = PlannerConfig::from_env();
    if let Some(n) = args.top_n {
        config.top_n = n;
    }

    let planner = Planner::new(quotes, advisor, config);
    let report = planner.run(&profile, args.tickers).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report::render(&report));
    }
    Ok(())
}

fn load_profile(args: &Args) -> anyhow::Result<Profile> {
    if let Some(path) = &args.profile {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read profile {}", path.display()))?;
        return serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse profile {}", path.display()));
    }

    let scenario = args
        .demo
        .as_deref()
        .unwrap_or("moderate")
        .parse::<DemoScenario>()?;
    tracing::info!(%scenario, description = scenario.description(), "using demo profile");
    Ok(scenario.profile())
}

fn save_profile(path: &std::path::Path, profile: &Profile) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(profile)?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write profile {}", path.display()))
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

    #[test]
    fn parses_flags() {
        let args = Args::try_parse_from([
            "nestegg",
            "--demo",
            "young",
            "--tickers",
            "AAPL,msft",
            "--offline",
            "--top-n",
            "5",
        ])
        .unwrap();
        assert_eq!(args.demo.as_deref(), Some("young"));
        assert_eq!(args.tickers.unwrap(), ["AAPL", "msft"]);
        assert!(args.offline);
        assert_eq!(args.top_n, Some(5));
    }

    #[test]
    fn requires_a_profile_source() {
        assert!(Args::try_parse_from(["nestegg"]).is_err());
        assert!(Args::try_parse_from(["nestegg", "--demo", "young", "--profile", "p.json"]).is_err());
    }

    #[test]
    fn saved_profile_loads_back() {
        let path = std::env::temp_dir().join(format!("nestegg-profile-{}.json", std::process::id()));
        let profile = DemoScenario::Conservative.profile();
        save_profile(&path, &profile).unwrap();

        let args = Args::try_parse_from([
            "nestegg",
            "--profile",
            path.to_str().unwrap(),
        ])
        .unwrap();
        let loaded = load_profile(&args).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.age, profile.age);
        assert_eq!(loaded.risk_tolerance, profile.risk_tolerance);
        assert_eq!(loaded.preferred_sectors, profile.preferred_sectors);
        assert_eq!(loaded.life_goals, profile.life_goals);
        assert_eq!(loaded.years_to_retirement, Some(13));
    }

    #[test]
    fn unknown_demo_is_an_error() {
        let args = Args::try_parse_from(["nestegg", "--demo", "martian"]).unwrap();
        assert!(load_profile(&args).is_err());
    }
}
