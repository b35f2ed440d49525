//! Model catalogue commands and per-model prompts.

use super::client::{ApiClient, PageRequest, Query};
use super::error::ApiError;
use super::types::{
    CreateModelRequest, CreatePromptRequest, Empty, Envelope, LoraModel, ModelDetail, Page,
    Prompt, UpdateModelRequest, UpdatePromptRequest,
};

/// Newest first.
pub const DEFAULT_SORT: &str = "createdAt,DESC";

/// GET /api/models: public models, newest first.
pub async fn get_public_models(
    client: &ApiClient,
    page: PageRequest,
) -> Result<Envelope<Page<LoraModel>>, ApiError> {
    let query = Query::new().page(page).push("sort", DEFAULT_SORT);
    client.get("/api/models", &query).await
}

pub async fn get_popular_models(
    client: &ApiClient,
    page: PageRequest,
) -> Result<Envelope<Page<LoraModel>>, ApiError> {
    client
        .get("/api/models/popular", &Query::new().page(page))
        .await
}

/// One model with samples, prompts and tags.
pub async fn get_model_detail(
    client: &ApiClient,
    model_id: i64,
) -> Result<Envelope<ModelDetail>, ApiError> {
    client
        .get(&format!("/api/models/{}", model_id), &Query::new())
        .await
}

/// The caller's own models.
pub async fn get_my_models(
    client: &ApiClient,
    page: PageRequest,
) -> Result<Envelope<Page<LoraModel>>, ApiError> {
    client.get("/api/models/my", &Query::new().page(page)).await
}

pub async fn create_model(
    client: &ApiClient,
    request: &CreateModelRequest,
) -> Result<Envelope<LoraModel>, ApiError> {
    client.post("/api/models", request).await
}

pub async fn update_model(
    client: &ApiClient,
    model_id: i64,
    request: &UpdateModelRequest,
) -> Result<Envelope<LoraModel>, ApiError> {
    client
        .put(&format!("/api/models/{}", model_id), request)
        .await
}

pub async fn delete_model(client: &ApiClient, model_id: i64) -> Result<Envelope<Empty>, ApiError> {
    client.delete(&format!("/api/models/{}", model_id)).await
}

/// GET /api/models/search: full-text search.
pub async fn search_models(
    client: &ApiClient,
    query: &str,
    page: PageRequest,
) -> Result<Envelope<Page<LoraModel>>, ApiError> {
    let query = Query::new().push("query", query).page(page);
    client.get("/api/models/search", &query).await
}

/// GET /api/models/filter: models carrying the given tags.
///
/// Tags are sent as a repeated `tags` parameter in the given order.
pub async fn filter_by_tags<S: AsRef<str>>(
    client: &ApiClient,
    tags: &[S],
    page: PageRequest,
) -> Result<Envelope<Page<LoraModel>>, ApiError> {
    let query = Query::new()
        .repeat("tags", tags.iter().map(|t| t.as_ref()))
        .page(page);
    client.get("/api/models/filter", &query).await
}

// ── Prompts ──────────────────────────────────────────────────────────────

pub async fn create_prompt(
    client: &ApiClient,
    model_id: i64,
    request: &CreatePromptRequest,
) -> Result<Envelope<Prompt>, ApiError> {
    client
        .post(&format!("/api/models/{}/prompts", model_id), request)
        .await
}

pub async fn update_prompt(
    client: &ApiClient,
    model_id: i64,
    prompt_id: i64,
    request: &UpdatePromptRequest,
) -> Result<Envelope<Prompt>, ApiError> {
    client
        .put(
            &format!("/api/models/{}/prompts/{}", model_id, prompt_id),
            request,
        )
        .await
}

pub async fn delete_prompt(
    client: &ApiClient,
    model_id: i64,
    prompt_id: i64,
) -> Result<Envelope<Empty>, ApiError> {
    client
        .delete(&format!("/api/models/{}/prompts/{}", model_id, prompt_id))
        .await
}
