#![forbid(unsafe_code)]

mod config;
mod error;
mod records;
mod replay;
mod snapshot;

use config::{Invocation, ReplayConfig};
use error::ReplayError;
use records::ArchiveFetcher;
use serde_json::Value;
use std::io::{BufReader, Write};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "tm_core=info,tm_replay=info";

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cfg: &ReplayConfig) -> Result<Value, ReplayError> {
    let records = match &cfg.log {
        Some(path) => {
            let file = std::fs::File::open(path).map_err(|source| ReplayError::Io {
                path: Some(path.clone()),
                source,
            })?;
            records::read_records(BufReader::new(file))?
        }
        None => records::read_records(std::io::stdin().lock())?,
    };

    let fetcher = match &cfg.solutions {
        Some(path) => {
            let fetcher = ArchiveFetcher::load(path)?;
            tracing::debug!(
                solutions = fetcher.len(),
                path = %path.display(),
                "loaded solution archive"
            );
            Some(fetcher)
        }
        None => None,
    };

    let outcome = replay::replay(cfg, records, fetcher);
    Ok(snapshot::render(&outcome))
}

fn main() {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let cfg = match config::parse_args(&args, config::env_var) {
        Ok(Invocation::Help) => {
            print!("{}", config::usage());
            return;
        }
        Ok(Invocation::Replay(cfg)) => cfg,
        Err(e) => {
            eprintln!("{e}\n");
            eprint!("{}", config::usage());
            std::process::exit(2);
        }
    };

    init_tracing();

    match run(&cfg) {
        Ok(snapshot) => {
            let mut stdout = std::io::stdout().lock();
            if let Err(e) = writeln!(stdout, "{snapshot:#}") {
                tracing::error!(error = %e, "failed to write snapshot");
                std::process::exit(1);
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "replay failed");
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests;
