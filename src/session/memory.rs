//! In-memory session store for tests and ephemeral runs.

use std::sync::{Arc, RwLock};

use zeroize::Zeroize;

use super::{Session, SessionStore};

/// Thread-safe in-process token holder. Clones share the same session.
///
/// Token strings are zeroed before being dropped on overwrite or clear.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    inner: Arc<RwLock<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a pre-populated token pair.
    pub fn with_tokens(access_token: &str, refresh_token: &str) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Session::new(access_token, refresh_token))),
        }
    }

    fn read(&self) -> Session {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn replace(&self, session: Session) {
        let mut guard = match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.zeroize();
        *guard = session;
    }
}

impl SessionStore for MemorySessionStore {
    fn set_tokens(&self, access_token: &str, refresh_token: &str) {
        self.replace(Session::new(access_token, refresh_token));
    }

    fn access_token(&self) -> Option<String> {
        self.read().access_token
    }

    fn refresh_token(&self) -> Option<String> {
        self.read().refresh_token
    }

    fn clear_tokens(&self) {
        self.replace(Session::default());
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_empty() {
        let store = MemorySessionStore::new();
        assert_eq!(store.access_token(), None);
        assert_eq!(store.refresh_token(), None);
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_set_get_clear_round_trip() {
        let store = MemorySessionStore::new();
        store.set_tokens("a", "r");
        assert_eq!(store.access_token().as_deref(), Some("a"));
        assert_eq!(store.refresh_token().as_deref(), Some("r"));
        assert!(store.is_authenticated());

        store.clear_tokens();
        assert_eq!(store.access_token(), None);
        assert_eq!(store.refresh_token(), None);
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_last_write_wins_across_clones() {
        let store = MemorySessionStore::with_tokens("a1", "r1");
        let shared = store.clone();

        shared.set_tokens("a2", "r2");
        store.set_tokens("a3", "r3");
        assert_eq!(shared.access_token().as_deref(), Some("a3"));
        assert_eq!(shared.refresh_token().as_deref(), Some("r3"));
    }
}
