use crate::backend::{Mutation, TaskPatch, Transaction};
use crate::model::task::TaskId;

use super::task_list::TaskList;

/// Single-element list move: take the item at `from` out and reinsert it
/// at `to`. Items in between shift one slot toward the gap.
pub fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) {
    if from >= items.len() || to >= items.len() || from == to {
        return;
    }
    let item = items.remove(from);
    items.insert(to, item);
}

/// The id sequence after dropping `source` onto `target`, or `None` when
/// the drop does nothing.
pub fn reordered_ids(list: &TaskList, source: &TaskId, target: Option<&TaskId>) -> Option<Vec<TaskId>> {
    let target = target?;
    if target == source {
        return None;
    }
    let from = list.position(source)?;
    let to = list.position(target)?;
    let mut ids: Vec<TaskId> = list.tasks().iter().map(|t| t.id.clone()).collect();
    move_item(&mut ids, from, to);
    Some(ids)
}

/// Plan the writes for a drop. Every task ends up with `order` equal to
/// its new zero-based index; only tasks whose stored order differs get an
/// update, and all updates go out as one batch.
pub fn plan_reorder(list: &TaskList, source: &TaskId, target: Option<&TaskId>) -> Option<Transaction> {
    let ids = reordered_ids(list, source, target)?;
    let ops: Vec<Mutation> = ids
        .into_iter()
        .enumerate()
        .filter_map(|(index, id)| {
            let new_order = index as f64;
            let current = list.get(&id)?.order;
            (current != new_order).then(|| Mutation::Update {
                id,
                fields: TaskPatch::order(new_order),
            })
        })
        .collect();
    if ops.is_empty() {
        return None;
    }
    tracing::debug!(source = %source, writes = ops.len(), "reorder planned");
    Some(Transaction::new(ops))
}
