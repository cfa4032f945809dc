use serde::Serialize;

use crate::model::task::{Task, checkbox};
use crate::model::user::User;
use crate::ops::task_list::TaskList;

/// Characters of the id shown in text output
pub const SHORT_ID_LEN: usize = 8;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskJson {
    pub id: String,
    pub title: String,
    pub completed: bool,
    pub order: f64,
    pub created_at: String,
}

#[derive(Serialize)]
pub struct TaskListJson {
    pub pending: usize,
    pub completed: usize,
    pub tasks: Vec<TaskJson>,
}

#[derive(Serialize)]
pub struct UserJson {
    pub id: String,
    pub email: String,
}

pub fn task_to_json(task: &Task) -> TaskJson {
    TaskJson {
        id: task.id.to_string(),
        title: task.title.clone(),
        completed: task.completed,
        order: task.order,
        created_at: task.created_at.to_rfc3339(),
    }
}

pub fn list_to_json(list: &TaskList) -> TaskListJson {
    TaskListJson {
        pending: list.pending_count(),
        completed: list.completed_count(),
        tasks: list.tasks().iter().map(task_to_json).collect(),
    }
}

pub fn user_to_json(user: &User) -> UserJson {
    UserJson {
        id: user.id.to_string(),
        email: user.email.clone(),
    }
}

// ---------------------------------------------------------------------------
// Text output
// ---------------------------------------------------------------------------

pub fn short_id(task: &Task) -> &str {
    let id = task.id.as_str();
    match id.char_indices().nth(SHORT_ID_LEN) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}

/// `[x] 1a2b3c4d  Title`
pub fn format_task_line(task: &Task) -> String {
    format!(
        "{} {}  {}",
        checkbox(task.completed),
        short_id(task),
        task.title
    )
}

/// Every task line followed by the counters
pub fn format_list(list: &TaskList) -> String {
    if list.is_empty() {
        return "no tasks yet".to_string();
    }
    let mut lines: Vec<String> = list.tasks().iter().map(format_task_line).collect();
    lines.push(String::new());
    lines.push(format!(
        "{} pending, {} completed",
        list.pending_count(),
        list.completed_count()
    ));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::task_list::tests::task;
    use pretty_assertions::assert_eq;

    #[test]
    fn short_id_cuts_long_ids_only() {
        let long = task("1a2b3c4d-aaaa-bbbb", 1.0, false);
        assert_eq!(short_id(&long), "1a2b3c4d");
        let short = task("abc", 1.0, false);
        assert_eq!(short_id(&short), "abc");
    }

    #[test]
    fn list_text() {
        let list = TaskList::from_snapshot(vec![
            task("aaaaaaaa-1", 1.0, true),
            task("bbbbbbbb-2", 2.0, false),
        ]);
        let out = format_list(&list);
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].starts_with("[x] aaaaaaaa  "));
        assert!(lines[1].starts_with("[ ] bbbbbbbb  "));
        assert_eq!(lines[3], "1 pending, 1 completed");
        assert_eq!(format_list(&TaskList::default()), "no tasks yet");
    }

    #[test]
    fn list_json_shape() {
        let list = TaskList::from_snapshot(vec![task("a", 1.0, false)]);
        let value = serde_json::to_value(list_to_json(&list)).unwrap();
        assert_eq!(value["pending"], 1);
        assert_eq!(value["completed"], 0);
        assert_eq!(value["tasks"][0]["id"], "a");
        assert_eq!(value["tasks"][0]["completed"], false);
    }
}
