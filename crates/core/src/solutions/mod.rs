#![forbid(unsafe_code)]

//! Per-stage list of solution candidates.
//!
//! Candidates are stored in creation order, which equals ascending id order: the remote side
//! hands out solution ids in discovery order, and an id that is neither known nor newer
//! than every known id is rejected. The sorted view holds only visible candidates and is
//! always rebuilt from scratch; it is never edited in place.

mod order;

pub use order::{SortKey, SortOrder};

use crate::cell::CellValue;
use crate::events::{CellRange, ListEvent, RowRemap};
use crate::ids::SolutionId;

#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    pub id: SolutionId,
    /// NaN while pending, +∞ for a failure.
    pub cost: f32,
    pub creation_rank: u32,
    pub quality_rank: u32,
    pub name: String,
}

impl Candidate {
    pub fn is_failed(&self) -> bool {
        self.cost.is_infinite() && self.cost > 0.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SolutionColumn {
    CreationRank,
    Cost,
    Name,
}

impl SolutionColumn {
    pub const ALL: [SolutionColumn; 3] = [Self::CreationRank, Self::Cost, Self::Name];

    pub fn header(self) -> &'static str {
        match self {
            Self::CreationRank => "#",
            Self::Cost => "cost",
            Self::Name => "name",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct RankingOutcome {
    pub(crate) visible_changed: bool,
    pub(crate) created: usize,
    pub(crate) rejected: Vec<SolutionId>,
}

#[derive(Clone, Debug)]
pub struct SolutionList {
    data: Vec<Candidate>,
    sorted: Vec<usize>,
    sort_key: SortKey,
    sort_order: SortOrder,
    max_cost: f32,
    pending: Vec<ListEvent>,
}

impl Default for SolutionList {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            sorted: Vec::new(),
            sort_key: SortKey::None,
            sort_order: SortOrder::Ascending,
            max_cost: f32::INFINITY,
            pending: Vec::new(),
        }
    }
}

impl SolutionList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges a best-first list of ids into the model.
    ///
    /// Every id gets its 1-based position as quality rank. Ids newer than all known ids are
    /// appended with `default_cost`; known ids only have their quality rank replaced. The
    /// sorted view is rebuilt afterwards. Returns whether the number of visible candidates
    /// changed.
    pub fn process_identifiers(&mut self, ids: &[SolutionId], default_cost: f32) -> bool {
        let outcome = self.merge(ranked(ids, default_cost));
        for id in &outcome.rejected {
            tracing::warn!(solution = id.get(), "solution id out of creation order, skipped");
        }
        outcome.visible_changed
    }

    /// Merges the solved (pending cost) and failed (infinite cost) lists of one statistics
    /// record in a single pass, so a failure found before a success is still appended.
    pub(crate) fn merge_statistics(
        &mut self,
        solved: &[SolutionId],
        failed: &[SolutionId],
    ) -> RankingOutcome {
        let mut entries = ranked(solved, f32::NAN);
        entries.extend(ranked(failed, f32::INFINITY));
        self.merge(entries)
    }

    fn merge(&mut self, mut entries: Vec<Ranked>) -> RankingOutcome {
        // incoming order is quality order; walking by id restores creation order
        entries.sort_by_key(|entry| entry.id);

        let mut outcome = RankingOutcome::default();
        for entry in entries {
            let id = entry.id;
            if !id.is_valid() {
                outcome.rejected.push(id);
                continue;
            }
            if self.data.last().is_none_or(|last| id > last.id) {
                let candidate = Candidate {
                    id,
                    cost: entry.cost,
                    creation_rank: self.data.len() as u32 + 1,
                    quality_rank: entry.quality_rank,
                    name: String::new(),
                };
                outcome.visible_changed |= self.is_visible(&candidate);
                outcome.created += 1;
                self.data.push(candidate);
                continue;
            }
            let Some(index) = self.position(id) else {
                outcome.rejected.push(id);
                continue;
            };
            let was_visible = self.is_visible(&self.data[index]);
            self.data[index].quality_rank = entry.quality_rank;
            outcome.visible_changed |= self.is_visible(&self.data[index]) != was_visible;
        }

        self.rebuild();
        outcome
    }

    /// Updates cost and name of a known candidate without re-sorting. Unknown ids are ignored.
    pub fn set_data(&mut self, id: SolutionId, cost: f32, name: &str) {
        let Some(index) = self.position(id) else {
            return;
        };
        let row = self.sorted.iter().position(|slot| *slot == index);

        let item = &mut self.data[index];
        let mut first = None;
        let mut last = None;
        if !same_cost(item.cost, cost) {
            item.cost = cost;
            first = Some(SolutionColumn::Cost);
            last = first;
        }
        if item.name != name {
            item.name = name.to_string();
            last = Some(SolutionColumn::Name);
            if first.is_none() {
                first = last;
            }
        }

        // hidden rows have nothing on screen to refresh
        if let (Some(row), Some(first), Some(last)) = (row, first, last) {
            self.pending
                .push(ListEvent::DataChanged(CellRange::row(row, first, last)));
        }
    }

    /// Re-sorts the view. Returns `false` without touching anything if `key` and `order` are
    /// already active.
    pub fn sort(&mut self, key: SortKey, order: SortOrder) -> bool {
        if self.sort_key == key && self.sort_order == order {
            return false;
        }
        self.sort_key = key;
        self.sort_order = order;
        self.rebuild();
        true
    }

    /// Candidates with a finite cost at or above `max_cost` are hidden.
    pub fn set_visibility_threshold(&mut self, max_cost: f32) -> bool {
        if same_cost(self.max_cost, max_cost) {
            return false;
        }
        self.max_cost = max_cost;
        self.rebuild();
        true
    }

    pub fn visibility_threshold(&self) -> f32 {
        self.max_cost
    }

    pub fn sort_key(&self) -> SortKey {
        self.sort_key
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    pub fn is_visible(&self, item: &Candidate) -> bool {
        item.cost.is_nan() || item.cost < self.max_cost
    }

    /// Number of known candidates, visible or not.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of rows in the sorted view.
    pub fn row_count(&self) -> usize {
        self.sorted.len()
    }

    pub fn successful_count(&self) -> usize {
        self.data.iter().filter(|item| !item.is_failed()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.data.iter().filter(|item| item.is_failed()).count()
    }

    pub fn candidate(&self, id: SolutionId) -> Option<&Candidate> {
        self.position(id).map(|index| &self.data[index])
    }

    pub fn candidate_at(&self, row: usize) -> Option<&Candidate> {
        self.sorted.get(row).map(|index| &self.data[*index])
    }

    pub fn id_at(&self, row: usize) -> Option<SolutionId> {
        self.candidate_at(row).map(|item| item.id)
    }

    pub fn row_of(&self, id: SolutionId) -> Option<usize> {
        let index = self.position(id)?;
        self.sorted.iter().position(|slot| *slot == index)
    }

    /// All candidates in creation order.
    pub fn candidates(&self) -> impl Iterator<Item = &Candidate> {
        self.data.iter()
    }

    /// Visible candidates in row order.
    pub fn rows(&self) -> impl Iterator<Item = &Candidate> {
        self.sorted.iter().map(|index| &self.data[*index])
    }

    pub fn data(&self, row: usize, column: SolutionColumn) -> Option<CellValue> {
        let item = self.candidate_at(row)?;
        Some(match column {
            SolutionColumn::CreationRank => CellValue::Rank(item.creation_rank),
            SolutionColumn::Cost => CellValue::from_cost(item.cost),
            SolutionColumn::Name => CellValue::Text(item.name.clone()),
        })
    }

    /// Takes the notifications produced since the last call, oldest first.
    pub fn drain_events(&mut self) -> Vec<ListEvent> {
        std::mem::take(&mut self.pending)
    }

    fn position(&self, id: SolutionId) -> Option<usize> {
        self.data.binary_search_by_key(&id, |item| item.id).ok()
    }

    fn visible_ids(&self) -> Vec<SolutionId> {
        self.sorted.iter().map(|index| self.data[*index].id).collect()
    }

    fn rebuild(&mut self) {
        self.pending.push(ListEvent::LayoutAboutToChange);
        let old_ids = self.visible_ids();

        let mut sorted = (0..self.data.len())
            .filter(|index| self.is_visible(&self.data[*index]))
            .collect::<Vec<_>>();
        if self.sort_key != SortKey::None {
            sorted.sort_by(|left, right| {
                order::compare(
                    &self.data[*left],
                    &self.data[*right],
                    self.sort_key,
                    self.sort_order,
                )
            });
        }
        self.sorted = sorted;

        let remap = RowRemap::new(old_ids, &self.visible_ids());
        self.pending.push(ListEvent::LayoutChanged(remap));
    }
}

struct Ranked {
    id: SolutionId,
    quality_rank: u32,
    cost: f32,
}

fn ranked(ids: &[SolutionId], cost: f32) -> Vec<Ranked> {
    ids.iter()
        .enumerate()
        .map(|(index, id)| Ranked {
            id: *id,
            quality_rank: index as u32 + 1,
            cost,
        })
        .collect()
}

fn same_cost(left: f32, right: f32) -> bool {
    (left.is_nan() && right.is_nan()) || left == right
}
