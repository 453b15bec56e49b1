#![forbid(unsafe_code)]

//! Inbound records, shaped after the remote task monitor's messages.

use crate::ids::{SolutionId, StageId};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StageDescription {
    pub id: StageId,
    pub parent_id: StageId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub flags: u32,
}

impl StageDescription {
    pub fn new(id: u32, parent_id: u32, name: impl Into<String>) -> Self {
        Self {
            id: StageId::new(id),
            parent_id: StageId::new(parent_id),
            name: name.into(),
            flags: 0,
        }
    }

    pub fn with_flags(mut self, flags: u32) -> Self {
        self.flags = flags;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StageStatistics {
    pub id: StageId,
    /// Successful solutions, best first.
    #[serde(default)]
    pub solved: Vec<SolutionId>,
    /// Failures, best first.
    #[serde(default)]
    pub failed: Vec<SolutionId>,
}

impl StageStatistics {
    pub fn new(id: u32, solved: &[u32], failed: &[u32]) -> Self {
        Self {
            id: StageId::new(id),
            solved: solved.iter().copied().map(SolutionId::new).collect(),
            failed: failed.iter().copied().map(SolutionId::new).collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubSolution {
    pub stage_id: StageId,
    pub id: SolutionId,
    pub cost: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubTrajectory {
    pub stage_id: StageId,
    pub id: SolutionId,
    pub cost: f32,
    #[serde(default)]
    pub name: String,
}

/// A full solution body: the solutions it is composed of and the leaf trajectories that
/// make it up, in execution order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SolutionMessage {
    pub top_level_id: SolutionId,
    #[serde(default)]
    pub sub_solution: Vec<SubSolution>,
    #[serde(default)]
    pub sub_trajectory: Vec<SubTrajectory>,
}
