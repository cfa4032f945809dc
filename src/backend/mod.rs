//! The hosted store seen through three narrow operations: a live query,
//! transactional writes, and magic-code auth.
//!
//! Two implementations exist: [`instant::InstantBackend`] talks to the
//! hosted realtime database over HTTP, [`memory::MemoryBackend`] is the
//! local fixture store. Which one is used is decided by configuration.

pub mod error;
pub mod instant;
pub mod memory;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;

use serde::Serialize;

use crate::model::{AppConfig, BackendKind, Task, TaskId, User, UserId};

pub use error::BackendError;

/// What a live query currently reports
#[derive(Debug, Clone, PartialEq)]
pub enum QueryState {
    Loading,
    Error(String),
    Ready(Vec<Task>),
}

/// Field values written by a create or update. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<f64>,
    /// Epoch milliseconds
    #[serde(rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
}

impl TaskPatch {
    pub fn title(title: impl Into<String>) -> Self {
        TaskPatch {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn completed(completed: bool) -> Self {
        TaskPatch {
            completed: Some(completed),
            ..Default::default()
        }
    }

    pub fn order(order: f64) -> Self {
        TaskPatch {
            order: Some(order),
            ..Default::default()
        }
    }
}

/// One write operation against the task entity
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    Create { id: TaskId, fields: TaskPatch },
    Update { id: TaskId, fields: TaskPatch },
    Delete { id: TaskId },
    /// Attach the task to its owning account
    Link { id: TaskId, owner: UserId },
}

impl Mutation {
    pub fn task_id(&self) -> &TaskId {
        match self {
            Mutation::Create { id, .. }
            | Mutation::Update { id, .. }
            | Mutation::Delete { id }
            | Mutation::Link { id, .. } => id,
        }
    }
}

/// An atomic batch of mutations
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transaction {
    pub ops: Vec<Mutation>,
}

impl Transaction {
    pub fn new(ops: Vec<Mutation>) -> Self {
        Transaction { ops }
    }

    pub fn single(op: Mutation) -> Self {
        Transaction { ops: vec![op] }
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }
}

/// A live result set. Snapshots arrive through a channel and are drained
/// by the event loop each tick; dropping the subscription stops its feed.
pub struct Subscription {
    rx: mpsc::Receiver<QueryState>,
    stop: Arc<AtomicBool>,
}

impl Subscription {
    /// Create a subscription and the sender half its producer feeds.
    pub fn channel() -> (SnapshotSender, Subscription) {
        let (tx, rx) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));
        (
            SnapshotSender {
                tx,
                stop: Arc::clone(&stop),
            },
            Subscription { rx, stop },
        )
    }

    /// Non-blocking: the most recent pending state, if any arrived.
    pub fn poll(&self) -> Option<QueryState> {
        let mut latest = None;
        while let Ok(state) = self.rx.try_recv() {
            latest = Some(state);
        }
        latest
    }

    /// Block until the next state arrives (CLI use).
    pub fn recv_timeout(&self, timeout: std::time::Duration) -> Option<QueryState> {
        self.rx.recv_timeout(timeout).ok()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

/// Producer half of a [`Subscription`]
#[derive(Clone)]
pub struct SnapshotSender {
    tx: mpsc::Sender<QueryState>,
    stop: Arc<AtomicBool>,
}

impl SnapshotSender {
    /// Returns false once the subscriber is gone.
    pub fn send(&self, state: QueryState) -> bool {
        if self.is_closed() {
            return false;
        }
        self.tx.send(state).is_ok()
    }

    pub fn is_closed(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }
}

/// The hosted data service
pub trait Backend: Send + Sync {
    /// Live query of the user's tasks. Starts out `Loading`.
    fn subscribe(&self, user: &User) -> Result<Subscription, BackendError>;

    /// Submit a batch. Fire-and-forget: an `Ok` means accepted for
    /// delivery, not applied.
    fn transact(&self, user: &User, tx: Transaction) -> Result<(), BackendError>;

    /// Email a one-time code to `email`.
    fn send_code(&self, email: &str) -> Result<(), BackendError>;

    /// Exchange a code for a signed-in user.
    fn verify_code(&self, email: &str, code: &str) -> Result<User, BackendError>;

    fn sign_out(&self, user: &User) -> Result<(), BackendError>;

    /// Wait until queued transactions have been sent. Backends that apply
    /// writes synchronously have nothing to wait for.
    fn flush(&self, _timeout: std::time::Duration) -> Result<(), BackendError> {
        Ok(())
    }
}

/// Build the backend selected by `config`.
pub fn open(config: &AppConfig, config_dir: &Path) -> Result<Arc<dyn Backend>, BackendError> {
    match config.backend.kind {
        BackendKind::Live => {
            let backend = instant::InstantBackend::new(&config.backend)?;
            Ok(Arc::new(backend))
        }
        BackendKind::Fixture => {
            let path = config.fixture.path.as_ref().map(|p| {
                if p.is_absolute() {
                    p.clone()
                } else {
                    config_dir.join(p)
                }
            });
            let backend = memory::MemoryBackend::open(path, &config.fixture.code)?;
            Ok(Arc::new(backend))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poll_returns_latest_state() {
        let (tx, sub) = Subscription::channel();
        assert_eq!(sub.poll(), None);
        tx.send(QueryState::Loading);
        tx.send(QueryState::Ready(Vec::new()));
        assert_eq!(sub.poll(), Some(QueryState::Ready(Vec::new())));
        assert_eq!(sub.poll(), None);
    }

    #[test]
    fn dropping_subscription_closes_sender() {
        let (tx, sub) = Subscription::channel();
        assert!(!tx.is_closed());
        drop(sub);
        assert!(tx.is_closed());
        assert!(!tx.send(QueryState::Loading));
    }

    #[test]
    fn patch_serializes_only_set_fields() {
        let json = serde_json::to_value(TaskPatch::order(3.0)).unwrap();
        assert_eq!(json, serde_json::json!({ "order": 3.0 }));

        let full = TaskPatch {
            title: Some("Ship".into()),
            completed: Some(false),
            order: Some(1.0),
            created_at: Some(42),
        };
        let json = serde_json::to_value(full).unwrap();
        assert_eq!(json["createdAt"], 42);
        assert_eq!(json["title"], "Ship");
    }
}
