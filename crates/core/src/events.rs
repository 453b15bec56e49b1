#![forbid(unsafe_code)]

//! Change notifications for the display layer.
//!
//! Every event is emitted after the mutation it describes has been committed. Observers must
//! not call back into a mutating model method while handling one.

use crate::ids::{SolutionId, StageId};
use crate::solutions::SolutionColumn;
use crate::tree::TreeColumn;
use std::collections::HashMap;

/// Inclusive rectangle of cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellRange<C> {
    pub first_row: usize,
    pub last_row: usize,
    pub first_column: C,
    pub last_column: C,
}

impl<C: Copy> CellRange<C> {
    pub fn row(row: usize, first_column: C, last_column: C) -> Self {
        Self {
            first_row: row,
            last_row: row,
            first_column,
            last_column,
        }
    }

    pub fn cell(row: usize, column: C) -> Self {
        Self::row(row, column, column)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TreeEvent {
    /// `count` children were appended to `parent`, starting at row `first`.
    RowsInserted {
        parent: StageId,
        first: usize,
        count: usize,
    },
    /// Cells of children of `parent` changed.
    DataChanged {
        parent: StageId,
        range: CellRange<TreeColumn>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListEvent {
    DataChanged(CellRange<SolutionColumn>),
    LayoutAboutToChange,
    /// The sorted view was rebuilt; the remap translates rows of the previous layout.
    LayoutChanged(RowRemap),
}

/// Translation of rows from one sorted layout to the next, keyed by solution id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RowRemap {
    old_ids: Vec<SolutionId>,
    new_rows: HashMap<SolutionId, usize>,
}

impl RowRemap {
    pub fn new(old_ids: Vec<SolutionId>, new_ids: &[SolutionId]) -> Self {
        let new_rows = new_ids
            .iter()
            .enumerate()
            .map(|(row, id)| (*id, row))
            .collect();
        Self { old_ids, new_rows }
    }

    /// Row that previously showed `old_row`'s solution, or `None` if that solution is no
    /// longer visible (or `old_row` was out of range).
    pub fn new_row(&self, old_row: usize) -> Option<usize> {
        let id = self.old_ids.get(old_row)?;
        self.row_of(*id)
    }

    pub fn row_of(&self, id: SolutionId) -> Option<usize> {
        self.new_rows.get(&id).copied()
    }

    pub fn old_row_count(&self) -> usize {
        self.old_ids.len()
    }

    pub fn new_row_count(&self) -> usize {
        self.new_rows.len()
    }

    pub fn is_identity(&self) -> bool {
        self.old_ids.len() == self.new_rows.len()
            && self
                .old_ids
                .iter()
                .enumerate()
                .all(|(row, id)| self.row_of(*id) == Some(row))
    }
}

/// Receiver of tree and per-stage list notifications.
pub trait ModelObserver {
    fn tree_changed(&mut self, event: &TreeEvent) {
        let _ = event;
    }

    fn solutions_changed(&mut self, stage: StageId, event: &ListEvent) {
        let _ = (stage, event);
    }
}

/// Observer that drops everything; installed until a consumer attaches.
#[derive(Debug, Default)]
pub struct NullObserver;

impl ModelObserver for NullObserver {}
