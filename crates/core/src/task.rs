#![forbid(unsafe_code)]

use crate::cache::{Solution, SolutionCache, SolutionFetcher};
use crate::events::ModelObserver;
use crate::ids::{SolutionId, StageId};
use crate::messages::{SolutionMessage, StageDescription, StageStatistics};
use crate::tree::{ApplyReport, StageTree};
use std::rc::Rc;

/// One remote task: its stage tree plus the solutions fetched for it.
///
/// All inbound traffic of a task is dispatched here, one call at a time.
#[derive(Debug, Default)]
pub struct RemoteTask {
    tree: StageTree,
    cache: SolutionCache,
}

impl RemoteTask {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fetcher(fetcher: Box<dyn SolutionFetcher>) -> Self {
        let mut task = Self::new();
        task.cache.set_fetcher(fetcher);
        task
    }

    pub fn set_observer(&mut self, observer: Box<dyn ModelObserver>) {
        self.tree.set_observer(observer);
    }

    pub fn tree(&self) -> &StageTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut StageTree {
        &mut self.tree
    }

    pub fn cache(&self) -> &SolutionCache {
        &self.cache
    }

    pub fn process_descriptions(&mut self, batch: &[StageDescription]) -> ApplyReport {
        self.tree.apply_descriptions(batch)
    }

    pub fn process_statistics(&mut self, batch: &[StageStatistics]) -> ApplyReport {
        self.tree.apply_statistics(batch)
    }

    pub fn process_solution(&mut self, message: &SolutionMessage) -> Rc<Solution> {
        self.cache.ingest(&mut self.tree, message)
    }

    pub fn solution(&mut self, id: SolutionId) -> Option<Rc<Solution>> {
        self.cache.lookup(&mut self.tree, id)
    }

    pub fn solution_at(&mut self, stage: StageId, row: usize) -> Option<Rc<Solution>> {
        self.cache.lookup_row(&mut self.tree, stage, row)
    }
}
