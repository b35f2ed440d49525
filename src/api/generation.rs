//! Image generation jobs.
//!
//! Progress for a submitted job arrives over [`crate::stream::Channel::Generation`].

use super::client::{ApiClient, PageRequest, Query};
use super::error::ApiError;
use super::types::{Envelope, GenerateRequest, Page};

/// POST /api/generate
pub async fn generate_image(
    client: &ApiClient,
    request: &GenerateRequest,
) -> Result<Envelope<serde_json::Value>, ApiError> {
    log::info!(
        "Submitting generation for model {} ({} image(s))",
        request.model_id,
        request.num_images.unwrap_or(1)
    );
    client.post("/api/generate", request).await
}

pub async fn get_my_generation_history(
    client: &ApiClient,
    page: PageRequest,
) -> Result<Envelope<Page<serde_json::Value>>, ApiError> {
    client
        .get("/api/generate/history/my", &Query::new().page(page))
        .await
}
