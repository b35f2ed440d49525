//! Profile commands.

use super::client::{ApiClient, Query};
use super::error::ApiError;
use super::types::{Envelope, UpdateProfileRequest, User};

pub async fn get_my_profile(client: &ApiClient) -> Result<Envelope<User>, ApiError> {
    client.get("/api/users/me", &Query::new()).await
}

pub async fn update_my_profile(
    client: &ApiClient,
    request: &UpdateProfileRequest,
) -> Result<Envelope<User>, ApiError> {
    client.put("/api/users/me", request).await
}

/// Another user's public profile.
pub async fn get_user_profile(client: &ApiClient, user_id: i64) -> Result<Envelope<User>, ApiError> {
    client
        .get(&format!("/api/users/{}", user_id), &Query::new())
        .await
}
