//! Likes, favorites and comments.
//!
//! Toggles are decided by the server: the returned state is authoritative
//! and the client never predicts it.

use super::client::{ApiClient, PageRequest, Query};
use super::error::ApiError;
use super::types::{
    Comment, CommentLikeState, CreateCommentRequest, Empty, Envelope, FavoriteState, LikeState,
    LoraModel, Page,
};

pub async fn toggle_like(client: &ApiClient, model_id: i64) -> Result<Envelope<LikeState>, ApiError> {
    client
        .post_empty(&format!("/api/models/{}/like", model_id))
        .await
}

pub async fn toggle_favorite(
    client: &ApiClient,
    model_id: i64,
) -> Result<Envelope<FavoriteState>, ApiError> {
    client
        .post_empty(&format!("/api/models/{}/favorite", model_id))
        .await
}

pub async fn toggle_comment_like(
    client: &ApiClient,
    model_id: i64,
    comment_id: i64,
) -> Result<Envelope<CommentLikeState>, ApiError> {
    client
        .post_empty(&format!(
            "/api/models/{}/comments/{}/like",
            model_id, comment_id
        ))
        .await
}

pub async fn get_comments(
    client: &ApiClient,
    model_id: i64,
    page: PageRequest,
) -> Result<Envelope<Page<Comment>>, ApiError> {
    client
        .get(
            &format!("/api/models/{}/comments", model_id),
            &Query::new().page(page),
        )
        .await
}

/// Post a comment, or a reply when `parent_comment_id` is set.
pub async fn create_comment(
    client: &ApiClient,
    model_id: i64,
    content: &str,
    parent_comment_id: Option<i64>,
) -> Result<Envelope<Comment>, ApiError> {
    let body = CreateCommentRequest {
        content: content.to_string(),
        parent_comment_id,
    };
    client
        .post(&format!("/api/models/{}/comments", model_id), &body)
        .await
}

pub async fn delete_comment(
    client: &ApiClient,
    model_id: i64,
    comment_id: i64,
) -> Result<Envelope<Empty>, ApiError> {
    client
        .delete(&format!("/api/models/{}/comments/{}", model_id, comment_id))
        .await
}

pub async fn get_favorite_models(
    client: &ApiClient,
    page: PageRequest,
) -> Result<Envelope<Page<LoraModel>>, ApiError> {
    client
        .get("/api/models/favorites", &Query::new().page(page))
        .await
}

pub async fn get_liked_models(
    client: &ApiClient,
    page: PageRequest,
) -> Result<Envelope<Page<LoraModel>>, ApiError> {
    client
        .get("/api/models/likes", &Query::new().page(page))
        .await
}
