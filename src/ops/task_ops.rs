use chrono::{DateTime, Utc};

use crate::backend::{Mutation, TaskPatch, Transaction};
use crate::model::task::TaskId;
use crate::model::user::UserId;

use super::task_list::TaskList;

/// Error type for task operations that name a task
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("task not found: {0}")]
    NotFound(String),
    #[error("title cannot be empty")]
    EmptyTitle,
}

/// Create a task at the end of the list, linked to `owner`.
/// Returns the generated id with the batch, or `None` for a blank title.
pub fn add_task(
    list: &TaskList,
    title: &str,
    owner: &UserId,
    now: DateTime<Utc>,
) -> Option<(TaskId, Transaction)> {
    let title = title.trim();
    if title.is_empty() {
        return None;
    }
    let id = TaskId::generate();
    let fields = TaskPatch {
        title: Some(title.to_string()),
        completed: Some(false),
        order: Some(list.next_order()),
        created_at: Some(now.timestamp_millis()),
    };
    let tx = Transaction::new(vec![
        Mutation::Create {
            id: id.clone(),
            fields,
        },
        Mutation::Link {
            id: id.clone(),
            owner: owner.clone(),
        },
    ]);
    Some((id, tx))
}

/// Flip completion. Returns the new value with the batch.
pub fn toggle_task(list: &TaskList, id: &TaskId) -> Result<(bool, Transaction), TaskError> {
    let task = list
        .get(id)
        .ok_or_else(|| TaskError::NotFound(id.to_string()))?;
    let completed = !task.completed;
    let tx = Transaction::single(Mutation::Update {
        id: id.clone(),
        fields: TaskPatch::completed(completed),
    });
    Ok((completed, tx))
}

/// Set a new title (trimmed).
pub fn rename_task(id: &TaskId, title: &str) -> Result<Transaction, TaskError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(TaskError::EmptyTitle);
    }
    Ok(Transaction::single(Mutation::Update {
        id: id.clone(),
        fields: TaskPatch::title(title),
    }))
}

pub fn delete_task(id: &TaskId) -> Transaction {
    Transaction::single(Mutation::Delete { id: id.clone() })
}
