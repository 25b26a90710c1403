use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use advisor_core::config::Settings;
use advisor_core::domain::contract::AdviceRequest;

#[derive(Debug, Parser)]
#[command(name = "advisor", about = "Rule-based personal finance recommendations")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print ranked recommendations for a profile and its transactions.
    Recommend(InputArgs),
    /// Print the analytics report (totals, 50/30/20 plan, trend).
    Analytics(InputArgs),
}

#[derive(Debug, clap::Args)]
struct InputArgs {
    /// JSON request file, or `-` for stdin.
    #[arg(long, short)]
    input: PathBuf,

    /// Evaluation date (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    as_of_date: Option<String>,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();
    let result = run(args, &settings);
    if let Err(err) = &result {
        sentry_anyhow::capture_anyhow(err);
    }
    result
}

fn run(args: Args, settings: &Settings) -> anyhow::Result<()> {
    let (opts, analytics) = match args.command {
        Command::Recommend(opts) => (opts, false),
        Command::Analytics(opts) => (opts, true),
    };

    let request = read_request(&opts.input)?;
    let as_of = match (opts.as_of_date.as_deref(), request.as_of_date) {
        (Some(arg), _) => advisor_core::time::resolve_as_of_date(
            Some(arg),
            chrono::Utc::now(),
            settings.engine.utc_offset_minutes,
        )?,
        (None, Some(d)) => d,
        (None, None) => advisor_core::time::resolve_as_of_date(
            None,
            chrono::Utc::now(),
            settings.engine.utc_offset_minutes,
        )?,
    };

    let input = request
        .validate_and_into_input()
        .context("invalid advice request")?;

    let out = if analytics {
        let report =
            advisor_core::analytics::build_analytics(&input.profile, &input.transactions, as_of);
        serde_json::to_string_pretty(&report)?
    } else {
        let snapshot = advisor_core::generate_snapshot(
            &input,
            as_of,
            chrono::Utc::now(),
            &settings.engine,
        );
        tracing::info!(
            %as_of,
            recommendations = snapshot.recommendations.len(),
            "generated recommendations"
        );
        serde_json::to_string_pretty(&snapshot)?
    };

    println!("{out}");
    Ok(())
}

fn read_request(path: &Path) -> anyhow::Result<AdviceRequest> {
    let raw = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("read request from stdin failed")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("read {} failed", path.display()))?
    };

    serde_json::from_str(&raw).context("request is not valid JSON for the advice schema")
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
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
    fn parses_recommend_subcommand() {
        let args = Args::try_parse_from([
            "advisor",
            "recommend",
            "--input",
            "req.json",
            "--as-of-date",
            "2026-03-31",
        ])
        .unwrap();
        match args.command {
            Command::Recommend(opts) => {
                assert_eq!(opts.input, PathBuf::from("req.json"));
                assert_eq!(opts.as_of_date.as_deref(), Some("2026-03-31"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn input_is_required() {
        assert!(Args::try_parse_from(["advisor", "analytics"]).is_err());
    }
}
