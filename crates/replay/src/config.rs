#![forbid(unsafe_code)]

use std::path::PathBuf;
use tm_core::ids::SolutionId;
use tm_core::{SortKey, SortOrder};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ReplayConfig {
    /// `None` reads the log from stdin.
    pub(crate) log: Option<PathBuf>,
    pub(crate) solutions: Option<PathBuf>,
    pub(crate) max_cost: Option<f32>,
    pub(crate) sort: Option<(SortKey, SortOrder)>,
    pub(crate) lookups: Vec<SolutionId>,
    pub(crate) observe: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Invocation {
    Help,
    Replay(ReplayConfig),
}

pub(crate) fn usage() -> &'static str {
    "tm_replay: replay a recorded task monitor stream and print the resulting models\n\n\
USAGE:\n\
  tm_replay [--log FILE|-] [--solutions FILE] [--max-cost F]\n\
            [--sort KEY[:asc|desc]] [--lookup ID]... [--observe]\n\n\
NOTES:\n\
  - the log holds one JSON record per line: {\"kind\":\"description\",\"stages\":[...]},\n\
    {\"kind\":\"statistics\",\"stages\":[...]} or {\"kind\":\"solution\",...}.\n\
  - `--solutions` names a JSON array of solution payloads served on lookup misses.\n\
  - KEY is one of none, quality, name.\n\
  - `--observe` expands every row as it appears, so notifications are emitted and counted.\n\
  - env: TM_LOG, TM_SOLUTIONS, TM_MAX_COST, TM_SORT; flags override env.\n\
  - logging: RUST_LOG (default tm_core=info,tm_replay=info), written to stderr.\n"
}

pub(crate) fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn log_path(raw: &str) -> Option<PathBuf> {
    if raw == "-" {
        None
    } else {
        Some(PathBuf::from(raw))
    }
}

fn parse_max_cost(raw: &str) -> Result<f32, String> {
    raw.trim()
        .parse::<f32>()
        .ok()
        .filter(|v| !v.is_nan())
        .ok_or_else(|| format!("--max-cost must be a number (got {raw:?})"))
}

pub(crate) fn parse_sort(raw: &str) -> Result<(SortKey, SortOrder), String> {
    let (key, order) = match raw.split_once(':') {
        Some((key, order)) => (key, Some(order)),
        None => (raw, None),
    };
    let key = SortKey::parse(key).ok_or_else(|| format!("unknown sort key {key:?}"))?;
    let order = match order {
        Some(order) => {
            SortOrder::parse(order).ok_or_else(|| format!("unknown sort order {order:?}"))?
        }
        None => SortOrder::Ascending,
    };
    Ok((key, order))
}

pub(crate) fn parse_args(
    args: &[String],
    env: impl Fn(&str) -> Option<String>,
) -> Result<Invocation, String> {
    if args.iter().any(|a| a == "-h" || a == "--help") {
        return Ok(Invocation::Help);
    }

    let mut log = env("TM_LOG").and_then(|v| log_path(&v));
    let mut solutions = env("TM_SOLUTIONS").map(PathBuf::from);
    let mut max_cost = env("TM_MAX_COST")
        .map(|v| parse_max_cost(&v))
        .transpose()?;
    let mut sort = env("TM_SORT").map(|v| parse_sort(&v)).transpose()?;
    let mut lookups = Vec::new();
    let mut observe = false;

    let mut i = 0usize;
    while i < args.len() {
        let a = args[i].as_str();
        match a {
            "--log" => {
                i += 1;
                let v = args.get(i).ok_or("--log requires FILE")?;
                log = log_path(v);
            }
            "--solutions" => {
                i += 1;
                let v = args.get(i).ok_or("--solutions requires FILE")?;
                solutions = Some(PathBuf::from(v));
            }
            "--max-cost" => {
                i += 1;
                let v = args.get(i).ok_or("--max-cost requires F")?;
                max_cost = Some(parse_max_cost(v)?);
            }
            "--sort" => {
                i += 1;
                let v = args.get(i).ok_or("--sort requires KEY")?;
                sort = Some(parse_sort(v)?);
            }
            "--lookup" => {
                i += 1;
                let v = args.get(i).ok_or("--lookup requires ID")?;
                let id = v
                    .parse::<u32>()
                    .map_err(|_| "--lookup must be an integer solution id")?;
                lookups.push(SolutionId::new(id));
            }
            "--observe" => observe = true,
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    Ok(Invocation::Replay(ReplayConfig {
        log,
        solutions,
        max_cost,
        sort,
        lookups,
        observe,
    }))
}
