#![forbid(unsafe_code)]

use std::path::PathBuf;

#[derive(Debug)]
pub(crate) enum ReplayError {
    Io {
        path: Option<PathBuf>,
        source: std::io::Error,
    },
    Record {
        line: usize,
        source: serde_json::Error,
    },
    Archive {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl std::fmt::Display for ReplayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io {
                path: Some(path),
                source,
            } => write!(f, "io ({}): {source}", path.display()),
            Self::Io { path: None, source } => write!(f, "io (stdin): {source}"),
            Self::Record { line, source } => write!(f, "log line {line}: {source}"),
            Self::Archive { path, source } => {
                write!(f, "solution archive {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ReplayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Record { source, .. } | Self::Archive { source, .. } => Some(source),
        }
    }
}
