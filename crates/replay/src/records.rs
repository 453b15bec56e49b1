#![forbid(unsafe_code)]

use crate::error::ReplayError;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;
use tm_core::ids::SolutionId;
use tm_core::{FetchError, SolutionFetcher, SolutionMessage, StageDescription, StageStatistics};

/// One line of a recorded monitor stream.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub(crate) enum ReplayRecord {
    Description { stages: Vec<StageDescription> },
    Statistics { stages: Vec<StageStatistics> },
    Solution(SolutionMessage),
}

/// Blank lines and `#` comments are skipped; line numbers in errors are 1-based.
pub(crate) fn read_records(reader: impl BufRead) -> Result<Vec<ReplayRecord>, ReplayError> {
    let mut out = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| ReplayError::Io { path: None, source })?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let record = serde_json::from_str(trimmed).map_err(|source| ReplayError::Record {
            line: index + 1,
            source,
        })?;
        out.push(record);
    }
    Ok(out)
}

/// Serves recorded solution payloads to lookups that miss the cache.
#[derive(Clone, Debug, Default)]
pub(crate) struct ArchiveFetcher {
    solutions: HashMap<SolutionId, SolutionMessage>,
}

impl ArchiveFetcher {
    pub(crate) fn from_messages(messages: Vec<SolutionMessage>) -> Self {
        let solutions = messages
            .into_iter()
            .map(|message| (message.top_level_id, message))
            .collect();
        Self { solutions }
    }

    pub(crate) fn load(path: &Path) -> Result<Self, ReplayError> {
        let text = std::fs::read_to_string(path).map_err(|source| ReplayError::Io {
            path: Some(path.to_path_buf()),
            source,
        })?;
        let messages: Vec<SolutionMessage> =
            serde_json::from_str(&text).map_err(|source| ReplayError::Archive {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::from_messages(messages))
    }

    pub(crate) fn len(&self) -> usize {
        self.solutions.len()
    }
}

impl SolutionFetcher for ArchiveFetcher {
    fn fetch(&mut self, id: SolutionId) -> Result<SolutionMessage, FetchError> {
        self.solutions
            .get(&id)
            .cloned()
            .ok_or(FetchError::NotFound(id))
    }
}
