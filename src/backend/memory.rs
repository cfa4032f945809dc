use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::model::{Task, TaskId, User, UserId};

use super::{
    Backend, BackendError, Mutation, QueryState, SnapshotSender, Subscription, TaskPatch,
    Transaction,
};

/// On-disk shape of the fixture store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct FixtureData {
    #[serde(default)]
    users: Vec<User>,
    /// Insertion order is the "underlying sequence" ties fall back to
    #[serde(default)]
    tasks: IndexMap<TaskId, Task>,
    /// Emails a code has been sent to and not yet redeemed
    #[serde(default)]
    pending_codes: Vec<String>,
}

struct State {
    data: FixtureData,
    subscribers: Vec<(UserId, SnapshotSender)>,
}

/// In-process stand-in for the hosted store. Accepts one fixed code for
/// every address, applies transactions atomically and pushes the new
/// snapshot to subscribers straight away.
pub struct MemoryBackend {
    state: Mutex<State>,
    path: Option<PathBuf>,
    code: String,
}

impl MemoryBackend {
    /// Purely in-memory store
    pub fn new(code: &str) -> Self {
        MemoryBackend {
            state: Mutex::new(State {
                data: FixtureData::default(),
                subscribers: Vec::new(),
            }),
            path: None,
            code: code.to_string(),
        }
    }

    /// Store persisted to `path` (loaded now if the file exists)
    pub fn open(path: Option<PathBuf>, code: &str) -> Result<Self, BackendError> {
        let mut backend = MemoryBackend::new(code);
        if let Some(path) = path {
            if path.exists() {
                let text = fs::read_to_string(&path)
                    .map_err(|e| BackendError::Fixture(format!("{}: {}", path.display(), e)))?;
                let data: FixtureData = serde_json::from_str(&text)
                    .map_err(|e| BackendError::Fixture(format!("{}: {}", path.display(), e)))?;
                backend.lock()?.data = data;
            }
            backend.path = Some(path);
        }
        Ok(backend)
    }

    /// Register (or find) an account without the code round trip.
    pub fn ensure_user(&self, email: &str) -> Result<User, BackendError> {
        let mut state = self.lock()?;
        let mut data = state.data.clone();
        let user = find_or_create_user(&mut data, email);
        self.commit(&mut state, data)?;
        Ok(user)
    }

    /// All tasks owned by `owner`, in store order
    pub fn tasks_for(&self, owner: &UserId) -> Result<Vec<Task>, BackendError> {
        let state = self.lock()?;
        Ok(snapshot_for(&state.data, owner))
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, BackendError> {
        self.state
            .lock()
            .map_err(|_| BackendError::Fixture("store lock poisoned".into()))
    }

    /// Persist `data`, then make it current and notify subscribers. A
    /// failed write leaves the store as it was.
    fn commit(&self, state: &mut State, data: FixtureData) -> Result<(), BackendError> {
        self.persist(&data)?;
        state.data = data;
        let data = &state.data;
        state.subscribers.retain(|(owner, sender)| {
            sender.send(QueryState::Ready(snapshot_for(data, owner)))
        });
        Ok(())
    }

    fn persist(&self, data: &FixtureData) -> Result<(), BackendError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let text =
            serde_json::to_string_pretty(data).map_err(|e| BackendError::Fixture(e.to_string()))?;
        fs::write(path, text)
            .map_err(|e| BackendError::Fixture(format!("{}: {}", path.display(), e)))
    }
}

fn snapshot_for(data: &FixtureData, owner: &UserId) -> Vec<Task> {
    data.tasks
        .values()
        .filter(|t| &t.owner == owner)
        .cloned()
        .collect()
}

fn find_or_create_user(data: &mut FixtureData, email: &str) -> User {
    if let Some(user) = data.users.iter().find(|u| u.email == email) {
        return user.clone();
    }
    let user = User {
        id: UserId::from(uuid::Uuid::new_v4().to_string()),
        email: email.to_string(),
        refresh_token: None,
    };
    data.users.push(user.clone());
    user
}

/// Apply one mutation to a working copy of the task table.
fn apply(
    tasks: &mut IndexMap<TaskId, Task>,
    user: &User,
    op: Mutation,
) -> Result<(), BackendError> {
    match op {
        Mutation::Create { id, fields } => {
            if tasks.get(&id).is_some_and(|t| t.owner != user.id) {
                return Err(BackendError::Rejected(format!("task id {} is taken", id)));
            }
            let mut task = Task::new(id.clone(), String::new(), 0.0, user.id.clone());
            patch(&mut task, fields);
            tasks.insert(id, task);
        }
        Mutation::Update { id, fields } => {
            let task = owned_mut(tasks, user, &id)?;
            patch(task, fields);
        }
        Mutation::Delete { id } => {
            owned_mut(tasks, user, &id)?;
            tasks.shift_remove(&id);
        }
        Mutation::Link { id, owner } => {
            if owner != user.id {
                return Err(BackendError::Rejected(format!(
                    "cannot link {} to another account",
                    id
                )));
            }
            owned_mut(tasks, user, &id)?.owner = owner;
        }
    }
    Ok(())
}

fn owned_mut<'a>(
    tasks: &'a mut IndexMap<TaskId, Task>,
    user: &User,
    id: &TaskId,
) -> Result<&'a mut Task, BackendError> {
    match tasks.get_mut(id) {
        Some(task) if task.owner == user.id => Ok(task),
        _ => Err(BackendError::Fixture(format!("task not found: {}", id))),
    }
}

fn patch(task: &mut Task, fields: TaskPatch) {
    if let Some(title) = fields.title {
        task.title = title;
    }
    if let Some(completed) = fields.completed {
        task.completed = completed;
    }
    if let Some(order) = fields.order {
        task.order = order;
    }
    if let Some(ms) = fields.created_at
        && let Some(at) = chrono::DateTime::from_timestamp_millis(ms)
    {
        task.created_at = at;
    }
}

impl Backend for MemoryBackend {
    fn subscribe(&self, user: &User) -> Result<Subscription, BackendError> {
        let (sender, subscription) = Subscription::channel();
        let mut state = self.lock()?;
        if !state.data.users.iter().any(|u| u.id == user.id) {
            return Err(BackendError::Unauthenticated);
        }
        sender.send(QueryState::Ready(snapshot_for(&state.data, &user.id)));
        state.subscribers.push((user.id.clone(), sender));
        Ok(subscription)
    }

    fn transact(&self, user: &User, tx: Transaction) -> Result<(), BackendError> {
        let mut state = self.lock()?;
        if !state.data.users.iter().any(|u| u.id == user.id) {
            return Err(BackendError::Unauthenticated);
        }
        // Work on a copy so a failing op leaves the store untouched.
        let mut data = state.data.clone();
        for op in tx.ops {
            apply(&mut data.tasks, user, op)?;
        }
        self.commit(&mut state, data)
    }

    fn send_code(&self, email: &str) -> Result<(), BackendError> {
        let mut state = self.lock()?;
        let email = email.trim().to_string();
        tracing::info!(%email, code = %self.code, "fixture magic code issued");
        let mut data = state.data.clone();
        if !data.pending_codes.contains(&email) {
            data.pending_codes.push(email);
        }
        self.commit(&mut state, data)
    }

    fn verify_code(&self, email: &str, code: &str) -> Result<User, BackendError> {
        let mut state = self.lock()?;
        let email = email.trim();
        if !state.data.pending_codes.iter().any(|e| e == email) || code.trim() != self.code {
            return Err(BackendError::Rejected(
                "Invalid or expired verification code".into(),
            ));
        }
        let mut data = state.data.clone();
        data.pending_codes.retain(|e| e != email);
        let mut user = find_or_create_user(&mut data, email);
        self.commit(&mut state, data)?;
        user.refresh_token = Some(uuid::Uuid::new_v4().to_string());
        Ok(user)
    }

    fn sign_out(&self, user: &User) -> Result<(), BackendError> {
        let mut state = self.lock()?;
        state.subscribers.retain(|(owner, _)| owner != &user.id);
        Ok(())
    }
}
