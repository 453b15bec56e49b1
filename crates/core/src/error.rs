#![forbid(unsafe_code)]

use crate::ids::{SolutionId, StageId};

/// A single inbound record that could not be applied. The record is skipped and the rest of
/// its batch is still processed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProtocolError {
    MissingParent {
        stage: StageId,
        parent: StageId,
        name: String,
    },
    ParentMismatch {
        stage: StageId,
        expected: Option<StageId>,
        received: StageId,
    },
    UnknownStage {
        stage: StageId,
    },
    OutOfOrderSolution {
        stage: StageId,
        solution: SolutionId,
    },
}

impl std::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingParent {
                stage,
                parent,
                name,
            } => write!(f, "no parent {parent} found for stage {stage} ({name})"),
            Self::ParentMismatch {
                stage,
                expected,
                received,
            } => match expected {
                Some(expected) => write!(
                    f,
                    "stage {stage} moved (parent={expected}, received={received})"
                ),
                None => write!(f, "stage {stage} has no parent (received={received})"),
            },
            Self::UnknownStage { stage } => write!(f, "no stage {stage}"),
            Self::OutOfOrderSolution { stage, solution } => write!(
                f,
                "solution {solution} of stage {stage} is neither known nor newer than known ids"
            ),
        }
    }
}

impl std::error::Error for ProtocolError {}

#[derive(Debug)]
pub enum FetchError {
    NotFound(SolutionId),
    Transport(String),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "solution {id} not available"),
            Self::Transport(message) => write!(f, "transport: {message}"),
        }
    }
}

impl std::error::Error for FetchError {}
