//! Who is signed in, and the backend they are signed in to.
//!
//! A [`Session`] is created once at start-up and handed to whatever needs
//! it; there is no global. Signing in persists the user so the next run
//! starts authenticated, signing out tears that down again.

use std::path::PathBuf;
use std::sync::Arc;

use crate::backend::{Backend, BackendError};
use crate::io::session_store::{self, StoredSession};
use crate::model::user::User;

/// Error type for session lifecycle operations
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("could not save session: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

pub struct Session {
    backend: Arc<dyn Backend>,
    app_id: String,
    user: Option<User>,
    /// Where the signed-in user is persisted; `None` keeps it in memory
    store_path: Option<PathBuf>,
}

impl Session {
    /// Start a session, restoring a persisted sign-in for the same app.
    pub fn start(backend: Arc<dyn Backend>, app_id: &str, store_path: Option<PathBuf>) -> Self {
        let user = store_path
            .as_deref()
            .and_then(session_store::read_session)
            .filter(|s| s.app_id == app_id)
            .map(|s| s.user);
        if let Some(user) = &user {
            tracing::info!(user = %user.id, "restored session");
        }
        Session {
            backend,
            app_id: app_id.to_string(),
            user,
            store_path,
        }
    }

    pub fn backend(&self) -> Arc<dyn Backend> {
        Arc::clone(&self.backend)
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }

    pub fn sign_in(&mut self, user: User) -> Result<(), SessionError> {
        if let Some(path) = &self.store_path {
            session_store::write_session(
                path,
                &StoredSession {
                    app_id: self.app_id.clone(),
                    user: user.clone(),
                },
            )?;
        }
        self.user = Some(user);
        Ok(())
    }

    /// Sign out locally and tell the backend. The local state is cleared
    /// even when the backend call fails.
    pub fn sign_out(&mut self) -> Result<(), SessionError> {
        let Some(user) = self.user.take() else {
            return Ok(());
        };
        if let Some(path) = &self.store_path {
            session_store::clear_session(path)?;
        }
        tracing::info!(user = %user.id, "signed out");
        self.backend.sign_out(&user)?;
        Ok(())
    }
}
