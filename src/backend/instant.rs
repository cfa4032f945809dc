use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::model::{BackendConfig, Task, TaskId, User, UserId};

use super::{Backend, BackendError, Mutation, QueryState, Subscription, Transaction};

/// Entity namespace the tasks live under
const TODOS: &str = "todos";

/// Work for the writer thread
enum Job {
    Write { user: User, tx: Transaction },
    /// Acknowledge once every earlier write has been attempted
    Flush(mpsc::Sender<()>),
}

/// Connection settings shared by the request helpers and the worker threads
#[derive(Clone)]
struct Endpoint {
    client: Client,
    api_uri: String,
    app_id: String,
    admin_token: Option<String>,
}

/// The hosted realtime database, reached over its HTTP API.
///
/// Queries are polled on a background thread per subscription; writes go
/// through a single writer thread so they are applied in submission order
/// without blocking the caller.
pub struct InstantBackend {
    endpoint: Endpoint,
    poll_interval: Duration,
    writer: mpsc::Sender<Job>,
}

impl InstantBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;
        let endpoint = Endpoint {
            client,
            api_uri: config.api_uri.trim_end_matches('/').to_string(),
            app_id: config.app_id.clone(),
            admin_token: config.admin_token.clone(),
        };

        let (writer, jobs) = mpsc::channel::<Job>();
        let worker = endpoint.clone();
        thread::Builder::new()
            .name("sprintone-writer".into())
            .spawn(move || {
                for job in jobs {
                    match job {
                        Job::Write { user, tx } => match worker.post_transact(&user, &tx) {
                            Ok(()) => tracing::debug!(ops = tx.len(), "transaction applied"),
                            // Not surfaced: the UI already assumed success.
                            Err(e) => {
                                tracing::warn!(ops = tx.len(), error = %e, "transaction failed")
                            }
                        },
                        Job::Flush(ack) => {
                            let _ = ack.send(());
                        }
                    }
                }
            })
            .map_err(|e| BackendError::Request(format!("could not start writer: {}", e)))?;

        Ok(InstantBackend {
            endpoint,
            poll_interval: Duration::from_millis(config.poll_interval_ms.max(100)),
            writer,
        })
    }
}

impl Endpoint {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_uri, path)
    }

    /// POST a JSON body and return the decoded JSON response.
    fn post(&self, path: &str, body: &Value, user: Option<&User>) -> Result<Value, BackendError> {
        let mut request = self
            .client
            .post(self.url(path))
            .header("app-id", &self.app_id)
            .json(body);
        if let Some(token) = &self.admin_token {
            request = request.bearer_auth(token);
        }
        if let Some(token) = user.and_then(|u| u.refresh_token.as_deref()) {
            request = request.header("as-token", token);
        }

        let response = request.send()?;
        let status = response.status();
        let text = response.text()?;
        if !status.is_success() {
            return Err(BackendError::Api {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| BackendError::Decode(e.to_string()))
    }

    fn query_tasks(&self, user: &User) -> Result<Vec<Task>, BackendError> {
        let body = json!({
            "query": { TODOS: { "$": { "where": { "user.id": user.id.as_str() } } } }
        });
        let value = self.post("/admin/query", &body, Some(user))?;
        decode_tasks(&value, &user.id)
    }

    fn post_transact(&self, user: &User, tx: &Transaction) -> Result<(), BackendError> {
        let body = json!({ "steps": steps(tx) });
        self.post("/admin/transact", &body, Some(user)).map(|_| ())
    }
}

/// Pull the human-readable message out of an error body. The API answers
/// either `{"message": ..}` or `{"body": {"message": ..}}`.
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .or_else(|| value.get("body").and_then(|b| b.get("message")))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Encode a transaction as the API's step tuples.
fn steps(tx: &Transaction) -> Vec<Value> {
    tx.ops
        .iter()
        .map(|op| match op {
            // Creates are upserts on a fresh id.
            Mutation::Create { id, fields } | Mutation::Update { id, fields } => {
                json!(["update", TODOS, id.as_str(), fields])
            }
            Mutation::Delete { id } => json!(["delete", TODOS, id.as_str()]),
            Mutation::Link { id, owner } => {
                json!(["link", TODOS, id.as_str(), { "user": owner.as_str() }])
            }
        })
        .collect()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteTask {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    completed: bool,
    #[serde(default)]
    order: Option<f64>,
    #[serde(default)]
    created_at: Option<i64>,
}

/// Decode a query response. Missing `order` sorts as 0.
fn decode_tasks(value: &Value, owner: &UserId) -> Result<Vec<Task>, BackendError> {
    let rows = match value.get(TODOS) {
        Some(rows) => rows.clone(),
        None => return Ok(Vec::new()),
    };
    let remote: Vec<RemoteTask> =
        serde_json::from_value(rows).map_err(|e| BackendError::Decode(e.to_string()))?;
    Ok(remote
        .into_iter()
        .map(|r| Task {
            id: TaskId::from(r.id),
            title: r.title,
            completed: r.completed,
            order: r.order.unwrap_or(0.0),
            created_at: r
                .created_at
                .and_then(DateTime::from_timestamp_millis)
                .unwrap_or_default(),
            owner: owner.clone(),
        })
        .collect())
}

impl Backend for InstantBackend {
    fn subscribe(&self, user: &User) -> Result<Subscription, BackendError> {
        if user.refresh_token.is_none() && self.endpoint.admin_token.is_none() {
            return Err(BackendError::Unauthenticated);
        }
        let (sender, subscription) = Subscription::channel();
        let endpoint = self.endpoint.clone();
        let user = user.clone();
        let interval = self.poll_interval;

        thread::Builder::new()
            .name("sprintone-query".into())
            .spawn(move || {
                sender.send(QueryState::Loading);
                let mut last: Option<QueryState> = None;
                while !sender.is_closed() {
                    let state = match endpoint.query_tasks(&user) {
                        Ok(tasks) => QueryState::Ready(tasks),
                        Err(e) => {
                            tracing::warn!(error = %e, "task query failed");
                            QueryState::Error(e.to_string())
                        }
                    };
                    if last.as_ref() != Some(&state) {
                        if !sender.send(state.clone()) {
                            break;
                        }
                        last = Some(state);
                    }
                    thread::sleep(interval);
                }
                tracing::debug!("query poller stopped");
            })
            .map_err(|e| BackendError::Request(format!("could not start poller: {}", e)))?;

        Ok(subscription)
    }

    fn transact(&self, user: &User, tx: Transaction) -> Result<(), BackendError> {
        if tx.is_empty() {
            return Ok(());
        }
        self.writer
            .send(Job::Write {
                user: user.clone(),
                tx,
            })
            .map_err(|_| BackendError::Request("writer thread stopped".into()))
    }

    fn flush(&self, timeout: Duration) -> Result<(), BackendError> {
        let (ack, done) = mpsc::channel();
        self.writer
            .send(Job::Flush(ack))
            .map_err(|_| BackendError::Request("writer thread stopped".into()))?;
        done.recv_timeout(timeout)
            .map_err(|_| BackendError::Request("timed out waiting for pending writes".into()))
    }

    fn send_code(&self, email: &str) -> Result<(), BackendError> {
        let body = json!({ "app-id": self.endpoint.app_id, "email": email });
        self.endpoint
            .post("/runtime/auth/send_magic_code", &body, None)
            .map(|_| ())
    }

    fn verify_code(&self, email: &str, code: &str) -> Result<User, BackendError> {
        let body = json!({ "app-id": self.endpoint.app_id, "email": email, "code": code });
        let value = self
            .endpoint
            .post("/runtime/auth/verify_magic_code", &body, None)?;
        let user = value
            .get("user")
            .cloned()
            .ok_or_else(|| BackendError::Decode("response has no user".into()))?;
        serde_json::from_value(user).map_err(|e| BackendError::Decode(e.to_string()))
    }

    fn sign_out(&self, user: &User) -> Result<(), BackendError> {
        let Some(token) = &user.refresh_token else {
            return Ok(());
        };
        let body = json!({ "app_id": self.endpoint.app_id, "refresh_token": token });
        self.endpoint
            .post("/runtime/signout", &body, None)
            .map(|_| ())
    }
}
