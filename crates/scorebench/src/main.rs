//! Command-line entry point.
//!
//! Reads `scorebench.toml` from the working directory, or the file named by
//! `SCOREBENCH_CONFIG`, falling back to the default configuration when the
//! file does not exist. Log verbosity follows `RUST_LOG` (default `info`).

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use tracing::level_filters::LevelFilter;
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use scorebench::Benchmark;
use scorebench_config::BenchmarkConfig;

const CONFIG_ENV: &str = "SCOREBENCH_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "scorebench.toml";

fn main() -> ExitCode {
    init_tracing();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(event = "benchmark_failed", error = %e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

fn run() -> scorebench::Result<()> {
    let path = env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    let config = if path.exists() {
        info!(event = "config_load", path = %path.display());
        BenchmarkConfig::load(&path)?
    } else {
        info!(event = "config_default", path = %path.display());
        BenchmarkConfig::default()
    };

    let results = Benchmark::new(config)?.run()?;
    for result in &results {
        info!(
            event = "result",
            example = %result.example,
            score_director_type = %result.score_director_type,
            iterations = result.measurement_count(),
            invocations_per_second = result.mean_invocations_per_second() as u64,
        );
    }
    Ok(())
}
