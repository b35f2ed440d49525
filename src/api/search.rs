//! Cross-entity search.

use super::client::{ApiClient, PageRequest, Query};
use super::error::ApiError;
use super::types::{Envelope, LoraModel, Page, SearchAll, SearchUser};

/// Models and users in one call, paginated independently by the backend.
pub async fn search_all(
    client: &ApiClient,
    query: &str,
    page: PageRequest,
) -> Result<Envelope<SearchAll>, ApiError> {
    client
        .get("/api/search", &Query::new().push("query", query).page(page))
        .await
}

pub async fn search_models(
    client: &ApiClient,
    query: &str,
    page: PageRequest,
) -> Result<Envelope<Page<LoraModel>>, ApiError> {
    client
        .get(
            "/api/search/models",
            &Query::new().push("query", query).page(page),
        )
        .await
}

pub async fn search_users(
    client: &ApiClient,
    query: &str,
    page: PageRequest,
) -> Result<Envelope<Page<SearchUser>>, ApiError> {
    client
        .get(
            "/api/search/users",
            &Query::new().push("query", query).page(page),
        )
        .await
}
