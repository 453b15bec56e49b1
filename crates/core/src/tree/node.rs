#![forbid(unsafe_code)]

use crate::flags::InterfaceFlags;
use crate::ids::StageId;
use crate::solutions::SolutionList;
use std::cell::Cell;

#[derive(Clone, Debug)]
pub struct StageNode {
    id: StageId,
    parent: Option<StageId>,
    children: Vec<StageId>,
    name: String,
    interface_flags: InterfaceFlags,
    // set from read-only navigation, hence the Cell
    observed: Cell<bool>,
    name_edited: bool,
    pub(super) solutions: SolutionList,
}

impl StageNode {
    pub(super) fn root() -> Self {
        Self::new(StageId::ROOT, None)
    }

    pub(super) fn new(id: StageId, parent: Option<StageId>) -> Self {
        Self {
            id,
            parent,
            children: Vec::new(),
            name: String::new(),
            interface_flags: InterfaceFlags::empty(),
            observed: Cell::new(false),
            name_edited: false,
            solutions: SolutionList::new(),
        }
    }

    pub fn id(&self) -> StageId {
        self.id
    }

    /// `None` only for the root.
    pub fn parent(&self) -> Option<StageId> {
        self.parent
    }

    pub fn children(&self) -> &[StageId] {
        &self.children
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn interface_flags(&self) -> InterfaceFlags {
        self.interface_flags
    }

    pub fn was_observed(&self) -> bool {
        self.observed.get()
    }

    pub fn name_edited(&self) -> bool {
        self.name_edited
    }

    pub fn solutions(&self) -> &SolutionList {
        &self.solutions
    }

    pub(super) fn mark_observed(&self) {
        self.observed.set(true);
    }

    pub(super) fn push_child(&mut self, child: StageId) -> usize {
        self.children.push(child);
        self.children.len() - 1
    }

    pub(super) fn set_name(&mut self, name: &str) -> bool {
        if self.name == name {
            return false;
        }
        self.name = name.to_string();
        true
    }

    pub(super) fn mark_name_edited(&mut self) {
        self.name_edited = true;
    }

    pub(super) fn set_interface_flags(&mut self, flags: InterfaceFlags) -> bool {
        if self.interface_flags == flags {
            return false;
        }
        self.interface_flags = flags;
        true
    }
}
