#![forbid(unsafe_code)]

//! Consumer-side persistent row references.
//!
//! A [`HandleRegistry`] remembers which solution each handle was pointing at. Feeding it
//! the [`RowRemap`] of a `LayoutChanged` event moves every handle to its solution's new row
//! or invalidates it when the solution left the visible set.

use crate::events::{ListEvent, RowRemap};
use crate::ids::SolutionId;
use crate::solutions::SolutionList;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RowHandle(usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Tracked {
    id: SolutionId,
    row: usize,
}

#[derive(Clone, Debug, Default)]
pub struct HandleRegistry {
    slots: Vec<Option<Tracked>>,
}

impl HandleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a handle for `row` of `list`. Returns `None` when the row does not exist.
    pub fn track(&mut self, list: &SolutionList, row: usize) -> Option<RowHandle> {
        let id = list.id_at(row)?;
        self.slots.push(Some(Tracked { id, row }));
        Some(RowHandle(self.slots.len() - 1))
    }

    pub fn row(&self, handle: RowHandle) -> Option<usize> {
        self.tracked(handle).map(|t| t.row)
    }

    pub fn id(&self, handle: RowHandle) -> Option<SolutionId> {
        self.tracked(handle).map(|t| t.id)
    }

    pub fn is_valid(&self, handle: RowHandle) -> bool {
        self.tracked(handle).is_some()
    }

    pub fn release(&mut self, handle: RowHandle) {
        if let Some(slot) = self.slots.get_mut(handle.0) {
            *slot = None;
        }
    }

    pub fn apply(&mut self, remap: &RowRemap) {
        for slot in &mut self.slots {
            let Some(tracked) = slot else {
                continue;
            };
            match remap.row_of(tracked.id) {
                Some(row) => tracked.row = row,
                None => *slot = None,
            }
        }
    }

    /// Applies the remap carried by a layout change; other events leave handles alone.
    pub fn observe(&mut self, event: &ListEvent) {
        if let ListEvent::LayoutChanged(remap) = event {
            self.apply(remap);
        }
    }

    pub fn live(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    fn tracked(&self, handle: RowHandle) -> Option<&Tracked> {
        self.slots.get(handle.0).and_then(|slot| slot.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solutions::{SortKey, SortOrder};

    fn ids(values: &[u32]) -> Vec<SolutionId> {
        values.iter().copied().map(SolutionId::new).collect()
    }

    #[test]
    fn handles_follow_their_solution_across_a_resort() {
        let mut list = SolutionList::new();
        list.process_identifiers(&ids(&[2, 1, 3]), f32::NAN);
        let _ = list.drain_events();

        let mut handles = HandleRegistry::new();
        let second = handles.track(&list, 1).expect("row 1");
        assert_eq!(handles.id(second), Some(SolutionId::new(2)));

        list.sort(SortKey::Quality, SortOrder::Descending);
        for event in list.drain_events() {
            handles.observe(&event);
        }
        assert_eq!(handles.row(second), Some(0));
        assert_eq!(list.id_at(0), Some(SolutionId::new(2)));
    }

    #[test]
    fn handles_to_hidden_rows_become_invalid() {
        let mut list = SolutionList::new();
        list.process_identifiers(&ids(&[1, 2]), f32::NAN);
        list.set_data(SolutionId::new(2), 5.0, "");
        let _ = list.drain_events();

        let mut handles = HandleRegistry::new();
        let first = handles.track(&list, 0).expect("row 0");
        let second = handles.track(&list, 1).expect("row 1");
        assert!(handles.track(&list, 2).is_none());

        list.set_visibility_threshold(5.0);
        for event in list.drain_events() {
            handles.observe(&event);
        }
        assert_eq!(handles.row(first), Some(0));
        assert!(!handles.is_valid(second));
        assert_eq!(handles.live(), 1);

        handles.release(first);
        assert_eq!(handles.row(first), None);
        assert_eq!(handles.live(), 0);
    }
}
