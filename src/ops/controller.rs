use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;

use crate::backend::{Backend, BackendError, QueryState, Transaction};
use crate::model::task::{Task, TaskId};
use crate::model::user::User;
use crate::util::TextInput;

use super::reorder;
use super::task_list::TaskList;
use super::task_ops;

/// The one task being renamed
#[derive(Debug, Clone)]
pub struct EditSlot {
    pub id: TaskId,
    pub input: TextInput,
}

/// Task list state and the operations that turn user intent into
/// transactions. Every operation submits at most one transaction and
/// returns whether it submitted one; the list itself only changes when
/// the next snapshot arrives through [`TaskListController::apply_query`].
pub struct TaskListController {
    backend: Arc<dyn Backend>,
    user: User,
    query: QueryState,
    list: TaskList,
    /// Add dialog input; meaningful while the dialog is open
    pub add_input: TextInput,
    add_open: bool,
    editing: Option<EditSlot>,
    pending_delete: Option<TaskId>,
    celebrate_until: Option<Instant>,
    celebration: Duration,
}

impl TaskListController {
    pub fn new(backend: Arc<dyn Backend>, user: User, celebration: Duration) -> Self {
        TaskListController {
            backend,
            user,
            query: QueryState::Loading,
            list: TaskList::default(),
            add_input: TextInput::new(),
            add_open: false,
            editing: None,
            pending_delete: None,
            celebrate_until: None,
            celebration,
        }
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    // -----------------------------------------------------------------------
    // Query projection
    // -----------------------------------------------------------------------

    /// Take in the latest subscription state.
    pub fn apply_query(&mut self, state: QueryState) {
        if let QueryState::Ready(tasks) = &state {
            self.list = TaskList::from_snapshot(tasks.clone());
            // A rename target that vanished can no longer be saved.
            if let Some(slot) = &self.editing
                && self.list.get(&slot.id).is_none()
            {
                self.editing = None;
            }
        }
        self.query = state;
    }

    pub fn query(&self) -> &QueryState {
        &self.query
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.query, QueryState::Ready(_))
    }

    pub fn list(&self) -> &TaskList {
        &self.list
    }

    fn submit(&self, what: &str, tx: Transaction) -> Result<bool, BackendError> {
        tracing::debug!(op = what, writes = tx.len(), "submitting transaction");
        self.backend.transact(&self.user, tx)?;
        Ok(true)
    }

    // -----------------------------------------------------------------------
    // Add
    // -----------------------------------------------------------------------

    pub fn is_add_open(&self) -> bool {
        self.add_open
    }

    /// Whether the `n` shortcut may open the add dialog
    pub fn can_open_add(&self) -> bool {
        !self.add_open && self.editing.is_none() && self.pending_delete.is_none()
    }

    pub fn open_add(&mut self) {
        self.add_open = true;
    }

    /// Close the add dialog, discarding its input.
    pub fn close_add(&mut self) {
        self.add_open = false;
        self.add_input.clear();
    }

    /// Add the task typed into the dialog. Blank input does nothing and
    /// leaves the dialog open.
    pub fn add(&mut self) -> Result<Option<TaskId>, BackendError> {
        let title = self.add_input.text().to_string();
        let id = self.add_title(&title)?;
        if id.is_some() {
            self.close_add();
        }
        Ok(id)
    }

    /// Add a task with the given title directly.
    pub fn add_title(&mut self, title: &str) -> Result<Option<TaskId>, BackendError> {
        let Some((id, tx)) = task_ops::add_task(&self.list, title, &self.user.id, Utc::now())
        else {
            return Ok(None);
        };
        self.submit("add", tx)?;
        Ok(Some(id))
    }

    // -----------------------------------------------------------------------
    // Toggle
    // -----------------------------------------------------------------------

    /// Flip completion. Completing a task starts the celebration.
    pub fn toggle(&mut self, id: &TaskId, now: Instant) -> Result<bool, BackendError> {
        let Ok((completed, tx)) = task_ops::toggle_task(&self.list, id) else {
            return Ok(false);
        };
        if completed {
            self.celebrate_until = Some(now + self.celebration);
        }
        self.submit("toggle", tx)
    }

    pub fn is_celebrating(&self, now: Instant) -> bool {
        self.celebrate_until.is_some_and(|until| now < until)
    }

    /// Expire the celebration once its deadline passes.
    pub fn tick(&mut self, now: Instant) {
        if self.celebrate_until.is_some_and(|until| now >= until) {
            self.celebrate_until = None;
        }
    }

    // -----------------------------------------------------------------------
    // Rename
    // -----------------------------------------------------------------------

    /// Put a task into rename mode, seeded with its title. Replaces any
    /// other task's edit.
    pub fn start_edit(&mut self, id: &TaskId) -> bool {
        let Some(task) = self.list.get(id) else {
            return false;
        };
        let mut input = TextInput::new();
        input.set(&task.title);
        self.editing = Some(EditSlot {
            id: id.clone(),
            input,
        });
        true
    }

    pub fn editing(&self) -> Option<&EditSlot> {
        self.editing.as_ref()
    }

    pub fn editing_input_mut(&mut self) -> Option<&mut TextInput> {
        self.editing.as_mut().map(|slot| &mut slot.input)
    }

    /// Save the rename. Blank text is not saved and edit mode stays on.
    pub fn save_edit(&mut self) -> Result<bool, BackendError> {
        let Some(slot) = &self.editing else {
            return Ok(false);
        };
        let Ok(tx) = task_ops::rename_task(&slot.id, slot.input.text()) else {
            return Ok(false);
        };
        self.editing = None;
        self.submit("rename", tx)
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    // -----------------------------------------------------------------------
    // Delete
    // -----------------------------------------------------------------------

    /// Ask for confirmation before deleting `id`.
    pub fn request_delete(&mut self, id: &TaskId) {
        self.pending_delete = Some(id.clone());
    }

    pub fn pending_delete(&self) -> Option<&TaskId> {
        self.pending_delete.as_ref()
    }

    /// The task awaiting confirmation, if it is still in the snapshot
    pub fn pending_delete_task(&self) -> Option<&Task> {
        self.pending_delete.as_ref().and_then(|id| self.list.get(id))
    }

    pub fn confirm_delete(&mut self) -> Result<bool, BackendError> {
        let Some(id) = self.pending_delete.take() else {
            return Ok(false);
        };
        self.submit("delete", task_ops::delete_task(&id))
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    // -----------------------------------------------------------------------
    // Reorder
    // -----------------------------------------------------------------------

    /// Drop `source` onto `target`.
    pub fn reorder(&mut self, source: &TaskId, target: Option<&TaskId>) -> Result<bool, BackendError> {
        match reorder::plan_reorder(&self.list, source, target) {
            Some(tx) => self.submit("reorder", tx),
            None => Ok(false),
        }
    }

    // -----------------------------------------------------------------------
    // Modal bookkeeping
    // -----------------------------------------------------------------------

    /// Escape: close the add dialog, drop the edit, cancel the delete.
    pub fn escape(&mut self) {
        if self.add_open {
            self.close_add();
        }
        self.cancel_edit();
        self.cancel_delete();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::memory::MemoryBackend;
    use pretty_assertions::assert_eq;

    struct Fixture {
        backend: Arc<MemoryBackend>,
        controller: TaskListController,
        sub: crate::backend::Subscription,
    }

    impl Fixture {
        fn new() -> Self {
            let backend = Arc::new(MemoryBackend::new("123456"));
            let user = backend.ensure_user("me@example.com").unwrap();
            let sub = backend.subscribe(&user).unwrap();
            let dyn_backend: Arc<dyn Backend> = backend.clone();
            let mut controller =
                TaskListController::new(dyn_backend, user, Duration::from_secs(2));
            if let Some(state) = sub.poll() {
                controller.apply_query(state);
            }
            Fixture {
                backend,
                controller,
                sub,
            }
        }

        /// Deliver whatever the store pushed since the last sync.
        fn sync(&mut self) {
            if let Some(state) = self.sub.poll() {
                self.controller.apply_query(state);
            }
        }

        fn add(&mut self, title: &str) -> TaskId {
            let id = self.controller.add_title(title).unwrap().unwrap();
            self.sync();
            id
        }

        fn titles(&self) -> Vec<String> {
            self.controller
                .list()
                .tasks()
                .iter()
                .map(|t| t.title.clone())
                .collect()
        }
    }

    #[test]
    fn starts_loading_until_first_snapshot() {
        let backend: Arc<dyn Backend> = Arc::new(MemoryBackend::new("123456"));
        let user = User {
            id: "u".into(),
            email: "e@x.io".into(),
            refresh_token: None,
        };
        let controller = TaskListController::new(backend, user, Duration::from_secs(2));
        assert_eq!(controller.query(), &QueryState::Loading);
        assert!(!controller.is_ready());
    }

    #[test]
    fn add_appends_with_max_plus_one() {
        let mut f = Fixture::new();
        f.add("First");
        f.add("Second");
        let orders: Vec<f64> = f.controller.list().tasks().iter().map(|t| t.order).collect();
        assert_eq!(orders, vec![1.0, 2.0]);
        assert_eq!(f.titles(), vec!["First", "Second"]);
        assert_eq!(
            f.backend.tasks_for(&f.controller.user().id).unwrap().len(),
            2
        );
    }

    #[test]
    fn add_dialog_closes_and_clears_on_success() {
        let mut f = Fixture::new();
        f.controller.open_add();
        f.controller.add_input.set("  Walk dog ");
        let id = f.controller.add().unwrap();
        assert!(id.is_some());
        assert!(!f.controller.is_add_open());
        assert_eq!(f.controller.add_input.text(), "");
        f.sync();
        assert_eq!(f.titles(), vec!["Walk dog"]);
    }

    #[test]
    fn blank_add_is_noop_and_keeps_dialog() {
        let mut f = Fixture::new();
        f.controller.open_add();
        f.controller.add_input.set("   ");
        assert_eq!(f.controller.add().unwrap(), None);
        assert!(f.controller.is_add_open());
        f.sync();
        assert!(f.controller.list().is_empty());
    }

    #[test]
    fn toggle_twice_restores_task() {
        let mut f = Fixture::new();
        let id = f.add("Read");
        let before = f.controller.list().get(&id).unwrap().clone();
        let now = Instant::now();
        assert!(f.controller.toggle(&id, now).unwrap());
        f.sync();
        assert!(f.controller.list().get(&id).unwrap().completed);
        f.controller.toggle(&id, now).unwrap();
        f.sync();
        let after = f.controller.list().get(&id).unwrap();
        assert_eq!(after, &before);
    }

    #[test]
    fn completing_celebrates_for_two_seconds() {
        let mut f = Fixture::new();
        let id = f.add("Read");
        let now = Instant::now();
        f.controller.toggle(&id, now).unwrap();
        f.sync();
        assert!(f.controller.is_celebrating(now + Duration::from_millis(1999)));
        f.controller.tick(now + Duration::from_secs(2));
        assert!(!f.controller.is_celebrating(now + Duration::from_secs(2)));

        // Un-completing does not celebrate.
        f.controller.toggle(&id, now).unwrap();
        assert!(!f.controller.is_celebrating(now));
    }

    #[test]
    fn toggle_unknown_id_is_noop() {
        let mut f = Fixture::new();
        assert!(!f.controller.toggle(&"ghost".into(), Instant::now()).unwrap());
        assert!(!f.controller.is_celebrating(Instant::now()));
    }

    #[test]
    fn rename_saves_trimmed_title_and_exits_edit() {
        let mut f = Fixture::new();
        let id = f.add("Old");
        assert!(f.controller.start_edit(&id));
        assert_eq!(f.controller.editing().unwrap().input.text(), "Old");
        f.controller.editing_input_mut().unwrap().set("  New  ");
        assert!(f.controller.save_edit().unwrap());
        assert!(f.controller.editing().is_none());
        f.sync();
        assert_eq!(f.titles(), vec!["New"]);
    }

    #[test]
    fn blank_rename_keeps_title_and_edit_mode() {
        let mut f = Fixture::new();
        let id = f.add("Keep");
        f.controller.start_edit(&id);
        f.controller.editing_input_mut().unwrap().set("   ");
        assert!(!f.controller.save_edit().unwrap());
        assert!(f.controller.editing().is_some());
        f.sync();
        assert_eq!(f.titles(), vec!["Keep"]);
    }

    #[test]
    fn save_without_edit_is_noop() {
        let mut f = Fixture::new();
        assert!(!f.controller.save_edit().unwrap());
    }

    #[test]
    fn edit_mode_is_exclusive() {
        let mut f = Fixture::new();
        let a = f.add("A");
        let b = f.add("B");
        f.controller.start_edit(&a);
        f.controller.start_edit(&b);
        assert_eq!(f.controller.editing().unwrap().id, b);
    }

    #[test]
    fn delete_requires_confirmation() {
        let mut f = Fixture::new();
        let a = f.add("A");
        f.add("B");

        f.controller.request_delete(&a);
        assert_eq!(f.controller.pending_delete_task().unwrap().title, "A");
        f.controller.cancel_delete();
        assert!(f.controller.pending_delete().is_none());
        f.sync();
        assert_eq!(f.titles(), vec!["A", "B"]);

        f.controller.request_delete(&a);
        assert!(f.controller.confirm_delete().unwrap());
        assert!(f.controller.pending_delete().is_none());
        f.sync();
        assert_eq!(f.titles(), vec!["B"]);
    }

    #[test]
    fn confirm_without_pending_is_noop() {
        let mut f = Fixture::new();
        assert!(!f.controller.confirm_delete().unwrap());
    }

    #[test]
    fn reorder_moves_first_after_last() {
        let mut f = Fixture::new();
        let a = f.add("A");
        f.add("B");
        let c = f.add("C");
        assert!(f.controller.reorder(&a, Some(&c)).unwrap());
        f.sync();
        assert_eq!(f.titles(), vec!["B", "C", "A"]);
        let orders: Vec<f64> = f.controller.list().tasks().iter().map(|t| t.order).collect();
        assert_eq!(orders, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn reorder_onto_self_or_nothing_is_noop() {
        let mut f = Fixture::new();
        let a = f.add("A");
        assert!(!f.controller.reorder(&a, Some(&a)).unwrap());
        assert!(!f.controller.reorder(&a, None).unwrap());
    }

    #[test]
    fn new_shortcut_guard() {
        let mut f = Fixture::new();
        let a = f.add("A");
        assert!(f.controller.can_open_add());
        f.controller.start_edit(&a);
        assert!(!f.controller.can_open_add());
        f.controller.cancel_edit();
        f.controller.request_delete(&a);
        assert!(!f.controller.can_open_add());
        f.controller.cancel_delete();
        f.controller.open_add();
        assert!(!f.controller.can_open_add());
    }

    #[test]
    fn escape_closes_everything() {
        let mut f = Fixture::new();
        let a = f.add("A");
        f.controller.open_add();
        f.controller.add_input.set("draft");
        f.controller.start_edit(&a);
        f.controller.request_delete(&a);
        f.controller.escape();
        assert!(!f.controller.is_add_open());
        assert_eq!(f.controller.add_input.text(), "");
        assert!(f.controller.editing().is_none());
        assert!(f.controller.pending_delete().is_none());
    }

    #[test]
    fn vanished_task_drops_edit_and_hides_delete() {
        let mut f = Fixture::new();
        let a = f.add("A");
        f.controller.start_edit(&a);
        f.controller.request_delete(&a);
        f.controller.apply_query(QueryState::Ready(Vec::new()));
        assert!(f.controller.editing().is_none());
        assert!(f.controller.pending_delete_task().is_none());
    }

    #[test]
    fn error_state_is_kept() {
        let mut f = Fixture::new();
        f.controller
            .apply_query(QueryState::Error("permission denied".into()));
        assert_eq!(
            f.controller.query(),
            &QueryState::Error("permission denied".into())
        );
        assert!(!f.controller.is_ready());
    }
}
