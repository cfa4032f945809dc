/// Error type for backend requests
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Request(String),
    /// Non-success response; `message` is the backend's own wording when it sent one
    #[error("backend returned {status}: {}", message.as_deref().unwrap_or("no message"))]
    Api {
        status: u16,
        message: Option<String>,
    },
    #[error("could not decode backend response: {0}")]
    Decode(String),
    /// Rejected credentials (bad code, unknown token)
    #[error("{0}")]
    Rejected(String),
    #[error("not signed in")]
    Unauthenticated,
    #[error("fixture store error: {0}")]
    Fixture(String),
}

impl BackendError {
    /// The backend refused the stored credentials themselves
    pub fn is_auth_rejection(&self) -> bool {
        matches!(
            self,
            BackendError::Unauthenticated | BackendError::Api { status: 401 | 403, .. }
        )
    }

    /// Text to show the user: the backend-provided message, or `fallback`
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            BackendError::Api {
                message: Some(m), ..
            } if !m.trim().is_empty() => m.clone(),
            BackendError::Rejected(m) if !m.trim().is_empty() => m.clone(),
            _ => fallback.to_string(),
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BackendError::Decode(err.to_string())
        } else {
            BackendError::Request(err.to_string())
        }
    }
}
