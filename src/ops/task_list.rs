use crate::model::task::{Task, TaskId};

/// The sorted, read-only view of one subscription snapshot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskList {
    tasks: Vec<Task>,
}

impl TaskList {
    /// Sort a snapshot by ascending `order`. The sort is stable, so equal
    /// keys keep the sequence the store returned them in.
    pub fn from_snapshot(mut tasks: Vec<Task>) -> Self {
        tasks.sort_by(|a, b| a.order.total_cmp(&b.order));
        TaskList { tasks }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    /// Display index of a task
    pub fn position(&self, id: &TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| &t.id == id)
    }

    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.completed).count()
    }

    pub fn pending_count(&self) -> usize {
        self.len() - self.completed_count()
    }

    /// Largest `order` present, never below 0
    pub fn max_order(&self) -> f64 {
        self.tasks.iter().map(|t| t.order).fold(0.0, f64::max)
    }

    /// Order value for a newly added task
    pub fn next_order(&self) -> f64 {
        self.max_order() + 1.0
    }

    /// Resolve a user-typed id: exact match first, then a unique prefix.
    pub fn resolve(&self, needle: &str) -> Option<&Task> {
        if let Some(task) = self.tasks.iter().find(|t| t.id.as_str() == needle) {
            return Some(task);
        }
        if needle.is_empty() {
            return None;
        }
        let mut matches = self.tasks.iter().filter(|t| t.id.as_str().starts_with(needle));
        let first = matches.next()?;
        if matches.next().is_some() {
            return None;
        }
        Some(first)
    }
}
