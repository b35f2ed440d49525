//! Tag listing, search and attachment to models.

use super::client::{ApiClient, Query};
use super::error::ApiError;
use super::types::{AddTagRequest, Empty, Envelope, Tag};

pub async fn get_all_tags(client: &ApiClient) -> Result<Envelope<Vec<Tag>>, ApiError> {
    client.get("/api/tags", &Query::new()).await
}

pub async fn get_popular_tags(client: &ApiClient) -> Result<Envelope<Vec<Tag>>, ApiError> {
    client.get("/api/tags/popular", &Query::new()).await
}

pub async fn search_tags(client: &ApiClient, keyword: &str) -> Result<Envelope<Vec<Tag>>, ApiError> {
    client
        .get("/api/tags/search", &Query::new().push("keyword", keyword))
        .await
}

/// Attach a tag by name. The backend creates the tag if it does not exist.
pub async fn add_tag_to_model(
    client: &ApiClient,
    model_id: i64,
    tag_name: &str,
    category: Option<&str>,
) -> Result<Envelope<Empty>, ApiError> {
    let body = AddTagRequest {
        tag_name: tag_name.to_string(),
        category: category.map(str::to_string),
    };
    client
        .post(&format!("/api/tags/models/{}", model_id), &body)
        .await
}

pub async fn remove_tag_from_model(
    client: &ApiClient,
    model_id: i64,
    tag_id: i64,
) -> Result<Envelope<Empty>, ApiError> {
    client
        .delete(&format!("/api/tags/models/{}/tags/{}", model_id, tag_id))
        .await
}
