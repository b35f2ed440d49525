//! JSON file backend for the token pair.
//!
//! The file is read on every access and rewritten whole on every write.
//! A missing or unreadable file is an empty session.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::{Session, SessionStore};

const SESSION_DIR: &str = "blueming";
const SESSION_FILE: &str = "session.json";

/// Session store persisted as a small JSON document on disk.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/blueming/session.json`, or `None` when the platform
    /// has no config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(SESSION_DIR).join(SESSION_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Session {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Session::default(),
            Err(e) => {
                log::warn!("Failed to read session file {:?}: {}", self.path, e);
                return Session::default();
            }
        };
        serde_json::from_slice(&bytes).unwrap_or_else(|e| {
            log::warn!("Ignoring malformed session file {:?}: {}", self.path, e);
            Session::default()
        })
    }

    fn save(&self, session: &Session) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_vec_pretty(session)?;
        fs::write(&self.path, json)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn set_tokens(&self, access_token: &str, refresh_token: &str) {
        let session = Session::new(access_token, refresh_token);
        if let Err(e) = self.save(&session) {
            log::warn!("Failed to write session file {:?}: {}", self.path, e);
        }
    }

    fn access_token(&self) -> Option<String> {
        self.load().access_token
    }

    fn refresh_token(&self) -> Option<String> {
        self.load().refresh_token
    }

    fn clear_tokens(&self) {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("Failed to remove session file {:?}: {}", self.path, e),
        }
    }

    fn name(&self) -> &'static str {
        "file"
    }
}
