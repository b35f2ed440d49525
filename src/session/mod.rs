//! Session storage for the access/refresh token pair.
//!
//! The [`SessionStore`] trait is the single source of truth for the current
//! login state. Every other component receives it as an explicit
//! `Arc<dyn SessionStore>` and reads through it on every use, so an external
//! change (another process logging out) is observed on the next read.
//!
//! Storage is infallible at this interface: backends log their failures and
//! report the value as absent.

mod file;
mod keychain;
mod memory;

use base64::Engine;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

pub use file::FileSessionStore;
pub use keychain::KeychainSessionStore;
pub use memory::MemorySessionStore;

/// Storage key for the access token.
pub const ACCESS_TOKEN_KEY: &str = "accessToken";

/// Storage key for the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// The persisted token pair. Either half may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Zeroize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl Session {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: Some(access_token.into()),
            refresh_token: Some(refresh_token.into()),
        }
    }
}

/// Durable holder of the token pair.
///
/// Writes are unconditional overwrites with no validation of token format or
/// expiry. Concurrent writers race; the last write wins.
pub trait SessionStore: Send + Sync {
    /// Persist both tokens, replacing whatever was stored.
    fn set_tokens(&self, access_token: &str, refresh_token: &str);

    fn access_token(&self) -> Option<String>;

    fn refresh_token(&self) -> Option<String>;

    /// Remove both tokens. Idempotent.
    fn clear_tokens(&self);

    /// Presence check only: no signature or expiry validation.
    fn is_authenticated(&self) -> bool {
        self.access_token().is_some_and(|t| !t.is_empty())
    }

    /// Short backend name for log lines.
    fn name(&self) -> &'static str;
}

/// Extract the `sub` claim from a JWT access token without verifying it.
///
/// Display only; the backend is the authority on token validity.
pub fn token_subject(token: &str) -> Option<String> {
    let mut parts = token.split('.');
    let (_header, payload, _signature) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }

    let decoded = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .ok()?;
    let claims: serde_json::Value = serde_json::from_slice(&decoded).ok()?;
    match &claims["sub"] {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
