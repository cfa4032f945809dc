use std::fs::{self, OpenOptions};
use std::io::Write;
#[cfg(unix)]
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::model::user::User;

/// Persisted sign-in (written to session.json)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSession {
    /// Backend app the credentials belong to
    pub app_id: String,
    pub user: User,
}

/// Read session.json. Missing or malformed files mean "signed out".
pub fn read_session(path: &Path) -> Option<StoredSession> {
    let content = fs::read_to_string(path).ok()?;
    serde_json::from_str(&content).ok()
}

pub fn write_session(path: &Path, session: &StoredSession) -> Result<(), std::io::Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(session)?;

    // The refresh token is a credential: owner read/write only.
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o600);
    let mut file = options.open(path)?;
    #[cfg(unix)]
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    file.write_all(content.as_bytes())
}

/// Remove session.json; already gone is fine.
pub fn clear_session(path: &Path) -> Result<(), std::io::Error> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> StoredSession {
        StoredSession {
            app_id: "app".into(),
            user: User {
                id: "u1".into(),
                email: "me@example.com".into(),
                refresh_token: Some("tok".into()),
            },
        }
    }

    #[test]
    fn write_and_read_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("session.json");
        write_session(&path, &sample()).unwrap();
        let loaded = read_session(&path).unwrap();
        assert_eq!(loaded.app_id, "app");
        assert_eq!(loaded.user, sample().user);
    }

    #[cfg(unix)]
    #[test]
    fn session_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        // A pre-existing world-readable file is tightened on rewrite.
        fs::write(&path, "{}").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        write_session(&path, &sample()).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o077, 0, "mode was {:o}", mode);
        assert_eq!(read_session(&path).unwrap().user, sample().user);
    }

    #[test]
    fn read_missing_or_malformed_returns_none() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        assert!(read_session(&path).is_none());
        fs::write(&path, "not json {{{").unwrap();
        assert!(read_session(&path).is_none());
    }

    #[test]
    fn clear_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        write_session(&path, &sample()).unwrap();
        clear_session(&path).unwrap();
        assert!(!path.exists());
        clear_session(&path).unwrap();
    }
}
