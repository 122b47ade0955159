use anyhow::Context;
use docker_usage::usage_plot::parse_cli;
use docker_usage::{run, Config};
use std::path::Path;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let statsin = match parse_cli() {
        Some(p) => p,
        None => {
            error!("You must provide path to data as first argument");
            return ExitCode::from(2);
        }
    };

    match process(&statsin) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn process(statsin: &Path) -> anyhow::Result<()> {
    let config = Config::default();
    let cwd = std::env::current_dir().context("could not get the working directory")?;
    info!(
        "read data from {} and save results to {}",
        statsin.display(),
        cwd.join(&config.results_dir).display()
    );
    let outputs = run(statsin, &cwd, &config)
        .with_context(|| format!("could not process {}", statsin.display()))?;
    info!(
        "done, saved {} and {} charts",
        outputs.clean_csv.display(),
        outputs.charts.len()
    );
    Ok(())
}
