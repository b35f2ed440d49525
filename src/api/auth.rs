//! Authentication commands and session lifecycle helpers.
//!
//! Login is a browser redirect handoff: the backend's OAuth flow ends by
//! redirecting to the frontend callback with both tokens in the query
//! string. [`complete_login`] stores them. Refreshing is never automatic;
//! callers invoke [`refresh_session`] (or [`refresh_token`]) explicitly.

use url::Url;

use super::client::{ApiClient, Query};
use super::error::ApiError;
use super::types::{Empty, Envelope, RefreshTokenRequest, TokenPair};
use crate::session::{SessionStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};

/// URL of the backend's Google login entry point.
pub fn login_url(client: &ApiClient) -> String {
    Query::new()
        .push("prompt", "select_account")
        .apply(&client.url("/api/auth/google"))
}

/// Hand the login flow to the system browser. Fire-and-forget.
pub fn open_login(client: &ApiClient) -> std::io::Result<()> {
    let url = login_url(client);
    log::info!("Opening login page in browser");
    open::that(url)
}

/// Error from [`complete_login`] when the redirect lacks a token.
#[derive(Debug, thiserror::Error)]
pub enum CallbackError {
    #[error("Invalid callback URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Callback URL is missing the `{0}` parameter")]
    MissingToken(&'static str),
}

/// Store the token pair carried by the OAuth redirect URL.
pub fn complete_login(session: &dyn SessionStore, callback_url: &str) -> Result<(), CallbackError> {
    let url = Url::parse(callback_url)?;
    let param = |key: &'static str| {
        url.query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
            .filter(|v| !v.is_empty())
            .ok_or(CallbackError::MissingToken(key))
    };

    let access_token = param(ACCESS_TOKEN_KEY)?;
    let refresh_token = param(REFRESH_TOKEN_KEY)?;
    session.set_tokens(&access_token, &refresh_token);
    log::info!("Login complete, tokens stored in {} session", session.name());
    Ok(())
}

/// GET /api/auth/me
pub async fn get_current_user(client: &ApiClient) -> Result<Envelope<serde_json::Value>, ApiError> {
    client.get("/api/auth/me", &Query::new()).await
}

/// POST /api/auth/refresh: exchange a refresh token for a new pair.
///
/// Sent without the bearer header. Does not touch the session store.
pub async fn refresh_token(
    client: &ApiClient,
    refresh_token: &str,
) -> Result<Envelope<TokenPair>, ApiError> {
    let body = RefreshTokenRequest {
        refresh_token: refresh_token.to_string(),
    };
    client.post_unauthenticated("/api/auth/refresh", &body).await
}

/// POST /api/auth/logout: invalidate a refresh token server-side.
pub async fn logout(client: &ApiClient, refresh_token: &str) -> Result<Envelope<Empty>, ApiError> {
    let body = RefreshTokenRequest {
        refresh_token: refresh_token.to_string(),
    };
    client.post("/api/auth/logout", &body).await
}

/// Refresh using the stored refresh token and store the new pair.
///
/// Returns `Ok(false)` without a request when no refresh token is held.
pub async fn refresh_session(client: &ApiClient) -> Result<bool, ApiError> {
    let Some(stored) = client.session().refresh_token().filter(|t| !t.is_empty()) else {
        log::info!("No stored refresh token, refresh skipped");
        return Ok(false);
    };

    let pair = refresh_token(client, &stored).await?.data;
    client
        .session()
        .set_tokens(&pair.access_token, &pair.refresh_token);
    log::info!("Session refreshed");
    Ok(true)
}

/// Best-effort server logout, then clear the local session regardless.
///
/// The server outcome is returned so callers can report it, but local
/// tokens are gone either way.
pub async fn logout_session(client: &ApiClient) -> Result<(), ApiError> {
    log::info!("Logging out");
    let result = match client.session().refresh_token() {
        Some(stored) => logout(client, &stored).await.map(|_| ()),
        None => Ok(()),
    };
    if let Err(ref e) = result {
        log::warn!("Logout request failed (continuing local cleanup): {}", e);
    }

    client.session().clear_tokens();
    log::info!("Logout complete");
    result
}
