//! Runtime configuration: backend address and session backend.
//!
//! Resolution order for the base URL: explicit value > `BLUEMING_API_URL`
//! > `VITE_API_URL` > [`DEFAULT_API_URL`]. Call `dotenvy` before resolving
//! so a `.env` file can supply either variable.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use crate::session::{FileSessionStore, KeychainSessionStore, SessionStore};

pub const DEFAULT_API_URL: &str = "http://bluemingai.ap-northeast-2.elasticbeanstalk.com";

pub const API_URL_ENV: &str = "BLUEMING_API_URL";
pub const VITE_API_URL_ENV: &str = "VITE_API_URL";
pub const SESSION_ENV: &str = "BLUEMING_SESSION";

/// Where the token pair is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionBackend {
    #[default]
    File,
    Keychain,
}

impl FromStr for SessionBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(SessionBackend::File),
            "keychain" | "keyring" => Ok(SessionBackend::Keychain),
            other => Err(format!("unknown session backend `{}` (expected file or keychain)", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_base_url: String,
    pub session_backend: SessionBackend,
    /// Overrides the default session file location.
    pub session_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            session_backend: SessionBackend::default(),
            session_file: None,
        }
    }
}

impl Config {
    /// Resolve from explicit overrides, then the process environment.
    pub fn resolve(api_url: Option<String>, session: Option<SessionBackend>) -> Result<Self, String> {
        Self::resolve_with(api_url, session, |key| std::env::var(key).ok())
    }

    /// As [`Config::resolve`], with an injectable environment lookup.
    pub fn resolve_with<F>(
        api_url: Option<String>,
        session: Option<SessionBackend>,
        env: F,
    ) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |v: String| if v.trim().is_empty() { None } else { Some(v) };

        let api_base_url = api_url
            .and_then(non_empty)
            .or_else(|| env(API_URL_ENV).and_then(non_empty))
            .or_else(|| env(VITE_API_URL_ENV).and_then(non_empty))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let session_backend = match session {
            Some(backend) => backend,
            None => match env(SESSION_ENV).and_then(non_empty) {
                Some(value) => value.parse()?,
                None => SessionBackend::default(),
            },
        };

        Ok(Self {
            api_base_url,
            session_backend,
            session_file: None,
        })
    }

    /// Build the configured session store.
    pub fn session_store(&self) -> Result<Arc<dyn SessionStore>, String> {
        match self.session_backend {
            SessionBackend::Keychain => Ok(Arc::new(KeychainSessionStore::default())),
            SessionBackend::File => {
                let path = self
                    .session_file
                    .clone()
                    .or_else(FileSessionStore::default_path)
                    .ok_or("No config directory available for the session file")?;
                Ok(Arc::new(FileSessionStore::new(path)))
            }
        }
    }
}
