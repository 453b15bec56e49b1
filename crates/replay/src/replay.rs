#![forbid(unsafe_code)]

use crate::config::ReplayConfig;
use crate::records::{ArchiveFetcher, ReplayRecord};
use std::cell::RefCell;
use std::rc::Rc;
use tm_core::ids::{SolutionId, StageId};
use tm_core::{
    ApplyReport, ListEvent, ModelObserver, ProtocolError, RemoteTask, Solution, StageTree,
    TreeEvent,
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct NotificationCounts {
    pub(crate) rows_inserted: usize,
    pub(crate) tree_data_changed: usize,
    pub(crate) list_data_changed: usize,
    pub(crate) layout_changes: usize,
}

#[derive(Clone, Default)]
struct CountingObserver(Rc<RefCell<NotificationCounts>>);

impl ModelObserver for CountingObserver {
    fn tree_changed(&mut self, event: &TreeEvent) {
        let mut counts = self.0.borrow_mut();
        match event {
            TreeEvent::RowsInserted { count, .. } => counts.rows_inserted += count,
            TreeEvent::DataChanged { .. } => counts.tree_data_changed += 1,
        }
    }

    fn solutions_changed(&mut self, _stage: StageId, event: &ListEvent) {
        let mut counts = self.0.borrow_mut();
        match event {
            ListEvent::DataChanged(_) => counts.list_data_changed += 1,
            ListEvent::LayoutChanged(_) => counts.layout_changes += 1,
            ListEvent::LayoutAboutToChange => {}
        }
    }
}

pub(crate) struct ReplayOutcome {
    pub(crate) task: RemoteTask,
    pub(crate) records: usize,
    pub(crate) errors: Vec<ProtocolError>,
    pub(crate) lookups: Vec<(SolutionId, Option<Rc<Solution>>)>,
    pub(crate) notifications: NotificationCounts,
}

/// Expands every row, the way a view showing the whole tree would.
pub(crate) fn observe_all(tree: &StageTree) {
    for stage in tree.stage_ids() {
        for row in 0..tree.row_count(stage) {
            let _ = tree.index(stage, row);
        }
    }
}

pub(crate) fn replay(
    cfg: &ReplayConfig,
    records: Vec<ReplayRecord>,
    fetcher: Option<ArchiveFetcher>,
) -> ReplayOutcome {
    let mut task = match fetcher {
        Some(fetcher) => RemoteTask::with_fetcher(Box::new(fetcher)),
        None => RemoteTask::new(),
    };
    let counts = CountingObserver::default();
    task.set_observer(Box::new(counts.clone()));

    let mut report = ApplyReport::default();
    let total = records.len();
    for record in records {
        match record {
            ReplayRecord::Description { stages } => {
                report.merge(task.process_descriptions(&stages));
                if cfg.observe {
                    observe_all(task.tree());
                }
            }
            ReplayRecord::Statistics { stages } => {
                report.merge(task.process_statistics(&stages));
            }
            ReplayRecord::Solution(message) => {
                let _ = task.process_solution(&message);
            }
        }
    }

    let stages = task.tree().stage_ids();
    if let Some(max_cost) = cfg.max_cost {
        for stage in &stages {
            task.tree_mut().set_visibility_threshold(*stage, max_cost);
        }
    }
    if let Some((key, order)) = cfg.sort {
        for stage in &stages {
            task.tree_mut().sort_solutions(*stage, key, order);
        }
    }

    let lookups = cfg
        .lookups
        .iter()
        .map(|id| (*id, task.solution(*id)))
        .collect();

    tracing::info!(
        records = total,
        stages = task.tree().len() - 1,
        cached = task.cache().len(),
        created = report.created,
        updated = report.updated,
        skipped = report.skipped.len(),
        "replay finished"
    );

    let notifications = counts.0.borrow().clone();
    ReplayOutcome {
        task,
        records: total,
        errors: report.skipped,
        lookups,
        notifications,
    }
}
