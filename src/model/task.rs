use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::UserId;

/// Opaque task identifier, generated client-side and never changed
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Fresh random id (UUID v4, the format the backend expects)
    pub fn generate() -> Self {
        TaskId(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        TaskId(s.to_string())
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        TaskId(s)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single to-do item as reported by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    /// Display text, stored trimmed
    pub title: String,
    pub completed: bool,
    /// Sort key. Ascending; ties are left in snapshot order.
    pub order: f64,
    /// Informational only
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    pub owner: UserId,
}

impl Task {
    pub fn new(id: TaskId, title: impl Into<String>, order: f64, owner: UserId) -> Self {
        Task {
            id,
            title: title.into(),
            completed: false,
            order,
            created_at: Utc::now(),
            owner,
        }
    }
}

/// Checkbox rendering shared by the TUI and the CLI
pub fn checkbox(completed: bool) -> &'static str {
    if completed { "[x]" } else { "[ ]" }
}
