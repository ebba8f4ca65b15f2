// League statistics command-line entry point.
//
// Startup sequence:
// 1. Initialize tracing (stderr, so stdout carries only query output)
// 2. Parse arguments
// 3. Load config (explicit --config, or config/stats.toml with defaults copied)
// 4. Build the engine over the configured CSV directory
// 5. Run the requested query

use ctc_stats::cli::{self, Cli};
use ctc_stats::config;
use ctc_stats_core::StatsEngine;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, info};

fn main() -> anyhow::Result<()> {
    init_tracing()?;

    let args = Cli::parse();

    let config = match &args.config {
        Some(path) => config::load_config_file(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => config::load_config().context("failed to load configuration")?,
    };

    let cwd = std::env::current_dir().context("failed to resolve working directory")?;
    let provider = config.provider(&cwd);
    info!("Reading division snapshots from {}", provider.dir().display());

    let engine = StatsEngine::new(provider).with_ranking_defaults(config.ranking_defaults());

    let division = args
        .division
        .clone()
        .unwrap_or_else(|| config.data.default_division.clone());
    debug!("Running {:?} against division {}", args.command, division);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    cli::run(&args.command, &engine, &division, args.json, &mut out)
}

/// Initialize tracing to stderr.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("ctc_stats=info,ctc_stats_core=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
