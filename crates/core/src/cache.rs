#![forbid(unsafe_code)]

use crate::error::FetchError;
use crate::ids::{SolutionId, StageId};
use crate::messages::SolutionMessage;
use crate::tree::StageTree;
use std::collections::HashMap;
use std::rc::Rc;

/// Stage id of the task's top-level container. Only solutions whose first sub-solution
/// belongs to it are complete task solutions.
pub const FIRST_REAL_STAGE: StageId = StageId::new(1);

#[derive(Clone, Debug, PartialEq)]
pub struct SolutionSegment {
    pub stage_id: StageId,
    pub id: SolutionId,
    pub cost: f32,
    pub name: String,
}

/// Materialized solution: the ordered trajectory segments it executes.
#[derive(Clone, Debug, PartialEq)]
pub struct Solution {
    id: SolutionId,
    segments: Vec<SolutionSegment>,
    /// Set for solutions cut out of a larger one: the composite and the segment's index in it.
    origin: Option<(SolutionId, usize)>,
}

impl Solution {
    pub fn from_message(message: &SolutionMessage) -> Self {
        let segments = message
            .sub_trajectory
            .iter()
            .map(|t| SolutionSegment {
                stage_id: t.stage_id,
                id: t.id,
                cost: t.cost,
                name: t.name.clone(),
            })
            .collect();
        Self {
            id: message.top_level_id,
            segments,
            origin: None,
        }
    }

    /// The single segment at `index`, as a solution of its own.
    pub fn segment(&self, index: usize) -> Option<Solution> {
        let segment = self.segments.get(index)?.clone();
        Some(Self {
            id: segment.id,
            segments: vec![segment],
            origin: Some((self.id, index)),
        })
    }

    pub fn id(&self) -> SolutionId {
        self.id
    }

    pub fn segments(&self) -> &[SolutionSegment] {
        &self.segments
    }

    pub fn origin(&self) -> Option<(SolutionId, usize)> {
        self.origin
    }

    /// Sum of segment costs; infinite if any segment failed.
    pub fn cost(&self) -> f32 {
        self.segments.iter().map(|segment| segment.cost).sum()
    }
}

/// Request/response access to solution bodies that were never pushed to us.
pub trait SolutionFetcher {
    fn fetch(&mut self, id: SolutionId) -> Result<SolutionMessage, FetchError>;
}

impl<F> SolutionFetcher for F
where
    F: FnMut(SolutionId) -> Result<SolutionMessage, FetchError>,
{
    fn fetch(&mut self, id: SolutionId) -> Result<SolutionMessage, FetchError> {
        self(id)
    }
}

#[derive(Default)]
pub struct SolutionCache {
    solutions: HashMap<SolutionId, Rc<Solution>>,
    fetcher: Option<Box<dyn SolutionFetcher>>,
}

impl std::fmt::Debug for SolutionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolutionCache")
            .field("solutions", &self.solutions.len())
            .field("fetcher", &self.fetcher.is_some())
            .finish()
    }
}

impl SolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fetcher(&mut self, fetcher: Box<dyn SolutionFetcher>) {
        self.fetcher = Some(fetcher);
    }

    pub fn has_fetcher(&self) -> bool {
        self.fetcher.is_some()
    }

    pub fn len(&self) -> usize {
        self.solutions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solutions.is_empty()
    }

    pub fn contains(&self, id: SolutionId) -> bool {
        self.solutions.contains_key(&id)
    }

    /// Cached solution only; never fetches.
    pub fn get(&self, id: SolutionId) -> Option<Rc<Solution>> {
        self.solutions.get(&id).cloned()
    }

    /// Materializes `message`. Complete task solutions are also cached, together with one
    /// derived solution per sub-trajectory, and their costs and names are pushed into the
    /// solution lists of the owning stages.
    pub fn ingest(&mut self, tree: &mut StageTree, message: &SolutionMessage) -> Rc<Solution> {
        let fresh = Solution::from_message(message);
        if !is_task_solution(message) {
            return Rc::new(fresh);
        }

        let solution = if message.top_level_id.is_valid() {
            self.solutions
                .entry(message.top_level_id)
                .or_insert_with(|| Rc::new(fresh.clone()))
                .clone()
        } else {
            Rc::new(fresh.clone())
        };

        for sub in &message.sub_solution {
            if !sub.id.is_valid() {
                continue;
            }
            if !tree.contains(sub.stage_id) {
                tracing::warn!(
                    stage = sub.stage_id.get(),
                    solution = sub.id.get(),
                    "no stage for sub-solution"
                );
                continue;
            }
            tree.set_solution_data(sub.stage_id, sub.id, sub.cost, "");
        }

        for (index, trajectory) in message.sub_trajectory.iter().enumerate() {
            if !trajectory.id.is_valid() || self.solutions.contains_key(&trajectory.id) {
                continue;
            }
            // indices refer to this payload, not to an earlier cached copy
            let Some(derived) = fresh.segment(index) else {
                continue;
            };
            self.solutions.insert(trajectory.id, Rc::new(derived));
            if !tree.contains(trajectory.stage_id) {
                tracing::warn!(
                    stage = trajectory.stage_id.get(),
                    solution = trajectory.id.get(),
                    "no stage for sub-trajectory"
                );
                continue;
            }
            tree.set_solution_data(
                trajectory.stage_id,
                trajectory.id,
                trajectory.cost,
                &trajectory.name,
            );
        }

        tracing::debug!(
            solution = message.top_level_id.get(),
            cached = self.solutions.len(),
            "ingested task solution"
        );
        solution
    }

    /// Cached solution, or the fetcher's answer routed through [`Self::ingest`]. `None` when
    /// neither knows `id`.
    pub fn lookup(&mut self, tree: &mut StageTree, id: SolutionId) -> Option<Rc<Solution>> {
        if let Some(solution) = self.solutions.get(&id) {
            return Some(solution.clone());
        }
        if !id.is_valid() {
            return None;
        }
        let fetcher = self.fetcher.as_mut()?;
        match fetcher.fetch(id) {
            Ok(message) => Some(self.ingest(tree, &message)),
            Err(err) => {
                tracing::debug!(solution = id.get(), error = %err, "solution fetch failed");
                None
            }
        }
    }

    /// Looks up the solution shown at `row` of `stage`'s solution list.
    pub fn lookup_row(
        &mut self,
        tree: &mut StageTree,
        stage: StageId,
        row: usize,
    ) -> Option<Rc<Solution>> {
        let id = tree.solutions(stage)?.id_at(row)?;
        self.lookup(tree, id)
    }
}

fn is_task_solution(message: &SolutionMessage) -> bool {
    message
        .sub_solution
        .first()
        .is_some_and(|first| first.stage_id == FIRST_REAL_STAGE && first.id.is_valid())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::{StageDescription, StageStatistics, SubSolution, SubTrajectory};

    fn sub(stage: u32, id: u32, cost: f32) -> SubSolution {
        SubSolution {
            stage_id: StageId::new(stage),
            id: SolutionId::new(id),
            cost,
        }
    }

    fn trajectory(stage: u32, id: u32, cost: f32, name: &str) -> SubTrajectory {
        SubTrajectory {
            stage_id: StageId::new(stage),
            id: SolutionId::new(id),
            cost,
            name: name.to_string(),
        }
    }

    fn pick_place_tree() -> StageTree {
        let mut tree = StageTree::new();
        tree.apply_descriptions(&[
            StageDescription::new(1, 0, "task"),
            StageDescription::new(2, 1, "current"),
            StageDescription::new(3, 1, "pick"),
        ]);
        tree.apply_statistics(&[
            StageStatistics::new(1, &[10], &[]),
            StageStatistics::new(2, &[11], &[]),
            StageStatistics::new(3, &[12], &[]),
        ]);
        tree
    }

    fn task_solution() -> SolutionMessage {
        SolutionMessage {
            top_level_id: SolutionId::new(10),
            sub_solution: vec![sub(1, 10, 3.0), sub(2, 11, 0.0), sub(3, 12, 3.0)],
            sub_trajectory: vec![
                trajectory(2, 11, 0.0, "start"),
                trajectory(3, 12, 3.0, "grasp"),
                trajectory(3, 0, 1.0, "ignored"),
            ],
        }
    }

    fn cost_and_name(tree: &StageTree, stage: u32, id: u32) -> Option<(f32, String)> {
        tree.solutions(StageId::new(stage))?
            .candidate(SolutionId::new(id))
            .map(|c| (c.cost, c.name.clone()))
    }

    #[test]
    fn task_solution_is_cached_with_its_segments() {
        let mut tree = pick_place_tree();
        let mut cache = SolutionCache::new();

        let solution = cache.ingest(&mut tree, &task_solution());

        assert_eq!(solution.id(), SolutionId::new(10));
        assert_eq!(solution.segments().len(), 3);
        assert_eq!(cache.len(), 3);
        assert!(cache.contains(SolutionId::new(11)));
        assert!(!cache.contains(SolutionId::INVALID));

        let grasp = cache.get(SolutionId::new(12)).expect("derived solution");
        assert_eq!(grasp.origin(), Some((SolutionId::new(10), 1)));
        assert_eq!(grasp.segments()[0].name, "grasp");

        assert_eq!(cost_and_name(&tree, 1, 10), Some((3.0, String::new())));
        assert_eq!(cost_and_name(&tree, 3, 12), Some((3.0, "grasp".to_string())));
    }

    #[test]
    fn partial_solution_is_materialized_but_not_cached() {
        let mut tree = pick_place_tree();
        let mut cache = SolutionCache::new();
        let message = SolutionMessage {
            top_level_id: SolutionId::new(12),
            sub_solution: vec![sub(3, 12, 3.0)],
            sub_trajectory: vec![trajectory(3, 12, 3.0, "grasp")],
        };

        let solution = cache.ingest(&mut tree, &message);

        assert_eq!(solution.segments().len(), 1);
        assert!(cache.is_empty());
        // the list entry keeps its pending cost
        assert!(cost_and_name(&tree, 3, 12).is_some_and(|(cost, _)| cost.is_nan()));
    }

    #[test]
    fn derived_solutions_are_never_replaced() {
        let mut tree = pick_place_tree();
        let mut cache = SolutionCache::new();
        cache.ingest(&mut tree, &task_solution());
        let first = cache.get(SolutionId::new(12)).expect("cached");

        let mut again = task_solution();
        again.sub_trajectory[1].name = "renamed".to_string();
        cache.ingest(&mut tree, &again);

        let second = cache.get(SolutionId::new(12)).expect("cached");
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(cost_and_name(&tree, 3, 12), Some((3.0, String::new())));
    }

    #[test]
    fn later_payload_segments_come_from_that_payload() {
        let mut tree = pick_place_tree();
        let mut cache = SolutionCache::new();
        cache.ingest(&mut tree, &task_solution());

        let mut again = task_solution();
        again.sub_trajectory = vec![
            trajectory(3, 13, 4.0, "regrasp"),
            trajectory(2, 11, 0.0, "start"),
        ];
        let returned = cache.ingest(&mut tree, &again);

        // the top-level entry keeps its first copy
        assert_eq!(returned.segments().len(), 3);
        assert_eq!(returned.segments()[0].name, "start");

        let regrasp = cache.get(SolutionId::new(13)).expect("derived from the new payload");
        assert_eq!(regrasp.id(), SolutionId::new(13));
        assert_eq!(regrasp.segments()[0].name, "regrasp");
        assert_eq!(regrasp.origin(), Some((SolutionId::new(10), 0)));
    }

    #[test]
    fn lookup_without_fetcher_is_a_plain_miss() {
        let mut tree = pick_place_tree();
        let mut cache = SolutionCache::new();
        assert!(cache.lookup(&mut tree, SolutionId::new(10)).is_none());
        assert!(!cache.has_fetcher());
    }

    #[test]
    fn lookup_fetches_once_and_then_serves_from_cache() {
        let mut tree = pick_place_tree();
        let mut cache = SolutionCache::new();
        let calls = Rc::new(std::cell::Cell::new(0));
        let counter = calls.clone();
        cache.set_fetcher(Box::new(move |id: SolutionId| {
            counter.set(counter.get() + 1);
            if id == SolutionId::new(10) {
                Ok(task_solution())
            } else {
                Err(FetchError::NotFound(id))
            }
        }));

        let solution = cache.lookup(&mut tree, SolutionId::new(10)).expect("fetched");
        assert_eq!(solution.id(), SolutionId::new(10));
        assert!(cache.lookup(&mut tree, SolutionId::new(10)).is_some());
        assert!(cache.lookup(&mut tree, SolutionId::new(12)).is_some());
        assert_eq!(calls.get(), 1);

        assert!(cache.lookup(&mut tree, SolutionId::new(99)).is_none());
        assert!(cache.lookup(&mut tree, SolutionId::INVALID).is_none());
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn lookup_row_resolves_the_visible_id() {
        let mut tree = pick_place_tree();
        let mut cache = SolutionCache::new();
        cache.ingest(&mut tree, &task_solution());

        let solution = cache
            .lookup_row(&mut tree, StageId::new(3), 0)
            .expect("row 0 of pick");
        assert_eq!(solution.id(), SolutionId::new(12));
        assert!(cache.lookup_row(&mut tree, StageId::new(3), 1).is_none());
        assert!(cache.lookup_row(&mut tree, StageId::new(9), 0).is_none());
    }
}
