#![forbid(unsafe_code)]

//! Local mirror of the remote stage hierarchy.
//!
//! Nodes live in an arena and refer to each other by [`StageId`]; the [`IdentityIndex`]
//! maps ids to arena slots. Nodes are only ever appended. Notifications for a node are
//! suppressed until a consumer has seen it, so subtrees nobody looked at grow silently.

mod node;

pub use node::StageNode;

use crate::cell::CellValue;
use crate::error::ProtocolError;
use crate::events::{CellRange, ModelObserver, NullObserver, TreeEvent};
use crate::flags::InterfaceFlags;
use crate::identity::IdentityIndex;
use crate::ids::{SolutionId, StageId};
use crate::messages::{StageDescription, StageStatistics};
use crate::solutions::{SolutionList, SortKey, SortOrder};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TreeColumn {
    Name,
    Successful,
    Failed,
}

impl TreeColumn {
    pub const ALL: [TreeColumn; 3] = [Self::Name, Self::Successful, Self::Failed];

    pub fn header(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Successful => "successful",
            Self::Failed => "failed",
        }
    }

    pub fn is_editable(self) -> bool {
        matches!(self, Self::Name)
    }
}

/// Outcome of applying one inbound batch.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ApplyReport {
    pub created: usize,
    pub updated: usize,
    pub skipped: Vec<ProtocolError>,
}

impl ApplyReport {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }

    pub fn merge(&mut self, other: ApplyReport) {
        self.created += other.created;
        self.updated += other.updated;
        self.skipped.extend(other.skipped);
    }
}

pub struct StageTree {
    nodes: Vec<StageNode>,
    index: IdentityIndex,
    destroyed: bool,
    observer: Box<dyn ModelObserver>,
}

impl std::fmt::Debug for StageTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageTree")
            .field("nodes", &self.nodes.len())
            .field("destroyed", &self.destroyed)
            .finish()
    }
}

impl Default for StageTree {
    fn default() -> Self {
        Self::new()
    }
}

impl StageTree {
    pub fn new() -> Self {
        let mut index = IdentityIndex::new();
        index.insert(StageId::ROOT, 0);
        Self {
            nodes: vec![StageNode::root()],
            index,
            destroyed: false,
            observer: Box::new(NullObserver),
        }
    }

    pub fn set_observer(&mut self, observer: Box<dyn ModelObserver>) {
        self.observer = observer;
    }

    /// Creates or updates one node per record. An empty batch means the remote task is gone.
    pub fn apply_descriptions(&mut self, batch: &[StageDescription]) -> ApplyReport {
        let mut report = ApplyReport::default();

        for description in batch {
            let Some(parent_slot) = self.index.get(description.parent_id) else {
                tracing::warn!(
                    stage = description.id.get(),
                    parent = description.parent_id.get(),
                    name = %description.name,
                    "no parent found for stage"
                );
                report.skipped.push(ProtocolError::MissingParent {
                    stage: description.id,
                    parent: description.parent_id,
                    name: description.name.clone(),
                });
                continue;
            };

            let (slot, row, created) = match self.index.get(description.id) {
                Some(slot) => {
                    let expected = self.nodes[slot].parent();
                    if expected != Some(description.parent_id) {
                        tracing::warn!(
                            stage = description.id.get(),
                            received = description.parent_id.get(),
                            "stage description names a different parent"
                        );
                        report.skipped.push(ProtocolError::ParentMismatch {
                            stage: description.id,
                            expected,
                            received: description.parent_id,
                        });
                        continue;
                    }
                    let row = self.child_row(parent_slot, description.id);
                    (slot, row, false)
                }
                None => {
                    let slot = self.nodes.len();
                    self.nodes
                        .push(StageNode::new(description.id, Some(description.parent_id)));
                    let row = self.nodes[parent_slot].push_child(description.id);
                    self.index.insert(description.id, slot);
                    report.created += 1;

                    if self.nodes[parent_slot].was_observed() {
                        self.emit(TreeEvent::RowsInserted {
                            parent: description.parent_id,
                            first: row,
                            count: 1,
                        });
                    }
                    (slot, Some(row), true)
                }
            };

            let node = &mut self.nodes[slot];
            let mut changed = false;
            if !node.name_edited() {
                changed |= node.set_name(&description.name);
            }
            changed |= node.set_interface_flags(InterfaceFlags::from_wire(description.flags));

            if !changed || created {
                continue;
            }
            report.updated += 1;
            if let (true, Some(row)) = (node.was_observed(), row) {
                self.emit(TreeEvent::DataChanged {
                    parent: description.parent_id,
                    range: CellRange::row(row, TreeColumn::Name, TreeColumn::Failed),
                });
            }
        }

        if batch.is_empty() {
            self.destroyed = true;
            self.emit(TreeEvent::DataChanged {
                parent: StageId::ROOT,
                range: CellRange::row(0, TreeColumn::Name, TreeColumn::Failed),
            });
        }

        tracing::debug!(
            records = batch.len(),
            created = report.created,
            updated = report.updated,
            skipped = report.skipped.len(),
            "applied stage descriptions"
        );
        report
    }

    /// Routes solved/failed id lists into the stages' solution lists.
    pub fn apply_statistics(&mut self, batch: &[StageStatistics]) -> ApplyReport {
        let mut report = ApplyReport::default();

        for statistics in batch {
            let Some(slot) = self.index.get(statistics.id) else {
                tracing::warn!(stage = statistics.id.get(), "no stage for statistics");
                report.skipped.push(ProtocolError::UnknownStage {
                    stage: statistics.id,
                });
                continue;
            };

            let list = &mut self.nodes[slot].solutions;
            let counts_before = (list.successful_count(), list.failed_count());
            let merged = list.merge_statistics(&statistics.solved, &statistics.failed);
            let counts_after = (list.successful_count(), list.failed_count());

            report.created += merged.created;
            for solution in &merged.rejected {
                tracing::warn!(
                    stage = statistics.id.get(),
                    solution = solution.get(),
                    "solution id out of creation order, skipped"
                );
                report.skipped.push(ProtocolError::OutOfOrderSolution {
                    stage: statistics.id,
                    solution: *solution,
                });
            }
            self.flush_solutions(slot);

            let changed = merged.visible_changed || counts_before != counts_after;
            if !changed {
                continue;
            }
            report.updated += 1;
            if !self.nodes[slot].was_observed() {
                continue;
            }
            if let Some((parent, row)) = self.position(statistics.id) {
                self.emit(TreeEvent::DataChanged {
                    parent,
                    range: CellRange::row(row, TreeColumn::Successful, TreeColumn::Failed),
                });
            }
        }

        report
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Top-level rows are flagged once the remote task is gone.
    pub fn is_destroyed_row(&self, id: StageId) -> bool {
        self.destroyed && self.parent(id) == Some(StageId::ROOT)
    }

    pub fn node(&self, id: StageId) -> Option<&StageNode> {
        self.index.get(id).map(|slot| &self.nodes[slot])
    }

    pub fn contains(&self, id: StageId) -> bool {
        self.index.contains(id)
    }

    /// Number of nodes, the root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Number of children of `parent`. Reading it counts as observing `parent`.
    pub fn row_count(&self, parent: StageId) -> usize {
        let Some(node) = self.node(parent) else {
            return 0;
        };
        node.mark_observed();
        node.children().len()
    }

    /// Child at `row` of `parent`. The child is marked observed: from now on, changes to it
    /// and insertions below it are notified.
    pub fn index(&self, parent: StageId, row: usize) -> Option<StageId> {
        let child = *self.node(parent)?.children().get(row)?;
        let node = self.node(child)?;
        node.mark_observed();
        Some(child)
    }

    pub fn parent(&self, id: StageId) -> Option<StageId> {
        self.node(id)?.parent()
    }

    /// Parent and row of `id`; `None` for the root and unknown ids.
    pub fn position(&self, id: StageId) -> Option<(StageId, usize)> {
        let parent = self.parent(id)?;
        let parent_slot = self.index.get(parent)?;
        let row = self.child_row(parent_slot, id)?;
        Some((parent, row))
    }

    pub fn data(&self, id: StageId, column: TreeColumn) -> Option<CellValue> {
        let node = self.node(id)?;
        Some(match column {
            TreeColumn::Name => CellValue::Text(node.name().to_string()),
            TreeColumn::Successful => CellValue::Count(node.solutions().successful_count()),
            TreeColumn::Failed => CellValue::Count(node.solutions().failed_count()),
        })
    }

    /// Manual rename. Later descriptions no longer overwrite the label of this stage.
    pub fn set_name(&mut self, id: StageId, name: &str) -> bool {
        let Some(slot) = self.index.get(id) else {
            return false;
        };
        let node = &mut self.nodes[slot];
        node.mark_name_edited();
        if !node.set_name(name) {
            return true;
        }
        if let Some((parent, row)) = self.position(id) {
            self.emit(TreeEvent::DataChanged {
                parent,
                range: CellRange::cell(row, TreeColumn::Name),
            });
        }
        true
    }

    pub fn solutions(&self, id: StageId) -> Option<&SolutionList> {
        self.node(id).map(|node| node.solutions())
    }

    /// Runs `f` against the solution list of `stage` and forwards the list's notifications.
    pub fn update_solutions<R>(
        &mut self,
        stage: StageId,
        f: impl FnOnce(&mut SolutionList) -> R,
    ) -> Option<R> {
        let slot = self.index.get(stage)?;
        let result = f(&mut self.nodes[slot].solutions);
        self.flush_solutions(slot);
        Some(result)
    }

    pub fn set_solution_data(&mut self, stage: StageId, id: SolutionId, cost: f32, name: &str) {
        let _ = self.update_solutions(stage, |list| list.set_data(id, cost, name));
    }

    pub fn sort_solutions(&mut self, stage: StageId, key: SortKey, order: SortOrder) -> bool {
        self.update_solutions(stage, |list| list.sort(key, order))
            .unwrap_or(false)
    }

    pub fn set_visibility_threshold(&mut self, stage: StageId, max_cost: f32) -> bool {
        self.update_solutions(stage, |list| list.set_visibility_threshold(max_cost))
            .unwrap_or(false)
    }

    /// All stage ids in depth-first order, root first.
    pub fn stage_ids(&self) -> Vec<StageId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![StageId::ROOT];
        while let Some(id) = stack.pop() {
            out.push(id);
            if let Some(node) = self.node(id) {
                stack.extend(node.children().iter().rev().copied());
            }
        }
        out
    }

    fn child_row(&self, parent_slot: usize, id: StageId) -> Option<usize> {
        let row = self.nodes[parent_slot]
            .children()
            .iter()
            .position(|child| *child == id);
        debug_assert!(row.is_some(), "stage {id} missing from its parent's children");
        row
    }

    fn flush_solutions(&mut self, slot: usize) {
        let stage = self.nodes[slot].id();
        let events = self.nodes[slot].solutions.drain_events();
        for event in events {
            self.observer.solutions_changed(stage, &event);
        }
    }

    fn emit(&mut self, event: TreeEvent) {
        self.observer.tree_changed(&event);
    }
}
