#![forbid(unsafe_code)]

use crate::replay::ReplayOutcome;
use serde_json::{Value, json};
use tm_core::ids::StageId;
use tm_core::{CellValue, Solution, SolutionColumn, SolutionList, StageTree, TreeColumn};

fn cell_json(value: Option<CellValue>) -> Value {
    match value {
        Some(CellValue::Text(text)) => json!(text),
        Some(CellValue::Count(count)) => json!(count),
        Some(CellValue::Rank(rank)) => json!(rank),
        Some(CellValue::Cost(cost)) => json!(cost),
        Some(CellValue::Infinite) => json!("∞"),
        Some(CellValue::Empty) | None => Value::Null,
    }
}

fn columns_json() -> Value {
    let tree = TreeColumn::ALL
        .iter()
        .map(|column| json!({ "header": column.header(), "editable": column.is_editable() }))
        .collect::<Vec<_>>();
    let solutions = SolutionColumn::ALL
        .iter()
        .map(|column| column.header())
        .collect::<Vec<_>>();
    json!({ "tree": tree, "solutions": solutions })
}

fn rows_json(list: &SolutionList) -> Value {
    let rows = (0..list.row_count())
        .map(|row| {
            json!({
                "rank": cell_json(list.data(row, SolutionColumn::CreationRank)),
                "id": list.id_at(row).map(|id| id.get()),
                "cost": cell_json(list.data(row, SolutionColumn::Cost)),
                "name": cell_json(list.data(row, SolutionColumn::Name)),
            })
        })
        .collect::<Vec<_>>();
    Value::Array(rows)
}

fn stage_json(tree: &StageTree, id: StageId) -> Value {
    let Some(node) = tree.node(id) else {
        return Value::Null;
    };
    let children = node
        .children()
        .iter()
        .map(|child| stage_json(tree, *child))
        .collect::<Vec<_>>();
    json!({
        "id": id.get(),
        "name": node.name(),
        "flags": node.interface_flags().names(),
        "successful": node.solutions().successful_count(),
        "failed": node.solutions().failed_count(),
        "destroyed": tree.is_destroyed_row(id),
        "solutions": rows_json(node.solutions()),
        "children": children,
    })
}

fn solution_json(solution: &Solution) -> Value {
    let segments = solution
        .segments()
        .iter()
        .map(|segment| {
            json!({
                "stage": segment.stage_id.get(),
                "id": segment.id.get(),
                "cost": cell_json(Some(CellValue::from_cost(segment.cost))),
                "name": segment.name,
            })
        })
        .collect::<Vec<_>>();
    json!({
        "id": solution.id().get(),
        "cost": cell_json(Some(CellValue::from_cost(solution.cost()))),
        "segments": segments,
    })
}

pub(crate) fn render(outcome: &ReplayOutcome) -> Value {
    let tree = outcome.task.tree();
    let stages = tree
        .node(StageId::ROOT)
        .map(|root| {
            root.children()
                .iter()
                .map(|child| stage_json(tree, *child))
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    let lookups = outcome
        .lookups
        .iter()
        .map(|(id, found)| match found {
            Some(solution) => json!({
                "id": id.get(),
                "found": true,
                "solution": solution_json(solution),
            }),
            None => json!({ "id": id.get(), "found": false }),
        })
        .collect::<Vec<_>>();

    let counts = &outcome.notifications;
    json!({
        "records": outcome.records,
        "destroyed": tree.is_destroyed(),
        "columns": columns_json(),
        "stages": stages,
        "cached_solutions": outcome.task.cache().len(),
        "lookups": lookups,
        "notifications": {
            "rows_inserted": counts.rows_inserted,
            "tree_data_changed": counts.tree_data_changed,
            "list_data_changed": counts.list_data_changed,
            "layout_changes": counts.layout_changes,
        },
        "errors": outcome.errors.iter().map(|e| e.to_string()).collect::<Vec<_>>(),
    })
}
