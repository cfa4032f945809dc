use std::sync::LazyLock;

use regex::Regex;

use crate::backend::Backend;
use crate::model::user::User;
use crate::util::TextInput;

/// Codes are six characters; longer input is cut off as typed.
pub const CODE_LEN: usize = 6;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static email pattern"));

/// `local@domain.tld`, nothing stricter
pub fn is_plausible_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

/// Which form is showing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthStep {
    EmailEntry,
    /// A code was sent to `email`
    CodeVerification { email: String },
}

/// Result of finishing a submission
#[derive(Debug, Clone, PartialEq)]
pub enum AuthOutcome {
    /// Nothing to submit (blank or implausible input)
    Ignored,
    CodeSent,
    SignedIn(User),
    /// The backend refused; the message is in `error`
    Failed,
}

/// The two-step magic-code login form.
///
/// Submitting is split in two so a UI can show the "sending" state
/// before the blocking request runs: [`AuthFlow::begin_submit`] validates
/// and marks the form busy, [`AuthFlow::finish_submit`] talks to the
/// backend.
#[derive(Debug, Clone)]
pub struct AuthFlow {
    pub step: AuthStep,
    pub email: TextInput,
    pub code: TextInput,
    /// Alert to show, already prefixed with `ERROR: `
    pub error: Option<String>,
    busy: bool,
}

impl Default for AuthFlow {
    fn default() -> Self {
        AuthFlow {
            step: AuthStep::EmailEntry,
            email: TextInput::new(),
            code: TextInput::with_max_len(CODE_LEN),
            error: None,
            busy: false,
        }
    }
}

impl AuthFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// The field keystrokes go to
    pub fn active_input(&mut self) -> &mut TextInput {
        match self.step {
            AuthStep::EmailEntry => &mut self.email,
            AuthStep::CodeVerification { .. } => &mut self.code,
        }
    }

    /// Validate the current form. Returns true (and goes busy) if there
    /// is something to send.
    pub fn begin_submit(&mut self) -> bool {
        if self.busy {
            return false;
        }
        let ready = match self.step {
            AuthStep::EmailEntry => {
                !self.email.is_blank() && is_plausible_email(self.email.text())
            }
            AuthStep::CodeVerification { .. } => !self.code.is_blank(),
        };
        self.busy = ready;
        ready
    }

    /// Run the request started by [`AuthFlow::begin_submit`].
    pub fn finish_submit(&mut self, backend: &dyn Backend) -> AuthOutcome {
        if !self.busy {
            return AuthOutcome::Ignored;
        }
        self.busy = false;
        match self.step.clone() {
            AuthStep::EmailEntry => {
                let email = self.email.trimmed().to_string();
                tracing::info!(%email, "sending magic code");
                match backend.send_code(&email) {
                    Ok(()) => {
                        self.error = None;
                        self.code.clear();
                        self.step = AuthStep::CodeVerification { email };
                        AuthOutcome::CodeSent
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "send code failed");
                        self.error = Some(format!("ERROR: {}", e.user_message("Failed to send code")));
                        AuthOutcome::Failed
                    }
                }
            }
            AuthStep::CodeVerification { email } => {
                let code = self.code.trimmed().to_string();
                match backend.verify_code(&email, &code) {
                    Ok(user) => {
                        tracing::info!(user = %user.id, "signed in");
                        self.error = None;
                        AuthOutcome::SignedIn(user)
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "code verification failed");
                        self.code.clear();
                        self.error = Some(format!("ERROR: {}", e.user_message("Invalid code")));
                        AuthOutcome::Failed
                    }
                }
            }
        }
    }

    /// Validate and send in one go.
    pub fn submit(&mut self, backend: &dyn Backend) -> AuthOutcome {
        if !self.begin_submit() {
            return AuthOutcome::Ignored;
        }
        self.finish_submit(backend)
    }

    /// Leave code entry and start over with an empty email.
    pub fn back(&mut self) {
        if self.busy {
            return;
        }
        if matches!(self.step, AuthStep::CodeVerification { .. }) {
            self.step = AuthStep::EmailEntry;
            self.email.clear();
            self.code.clear();
        }
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }
}
