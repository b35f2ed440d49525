//! HTTP client with bearer-token injection and response normalization.
//!
//! Every backend request carries `Content-Type: application/json` and, when
//! the session store holds an access token, `Authorization: Bearer <token>`.
//! The token is read from the store per request, never cached here.
//!
//! One network attempt per call: no retries and no timeouts.

use std::sync::Arc;

use reqwest::header::{ACCEPT, CACHE_CONTROL, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use crate::session::SessionStore;

const JSON_MEDIA_TYPE: &str = "application/json";
const EVENT_STREAM_MEDIA_TYPE: &str = "text/event-stream";

/// Default page size for every paginated command.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Zero-based page index and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// A zero size is raised to 1.
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page,
            size: size.max(1),
        }
    }
}

/// Ordered query-string builder. Repeated keys are kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(&'static str, String)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, key: &'static str, value: impl ToString) -> Self {
        self.pairs.push((key, value.to_string()));
        self
    }

    /// One `key=value` pair per item.
    pub fn repeat<I, V>(mut self, key: &'static str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        self.pairs
            .extend(values.into_iter().map(|v| (key, v.to_string())));
        self
    }

    pub fn page(self, page: PageRequest) -> Self {
        self.push("page", page.page).push("size", page.size)
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Percent-encoded `k=v&k=v` without a leading `?`.
    pub fn encode(&self) -> String {
        self.pairs
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// `path` with this query appended, if any.
    pub fn apply(&self, path: &str) -> String {
        if self.is_empty() {
            path.to_string()
        } else {
            format!("{}?{}", path, self.encode())
        }
    }
}

/// HTTP client wrapper for backend communication.
///
/// Holds the base URL and a shared reference to the session store. Cheap to
/// share behind an `Arc`; concurrent commands do not coordinate.
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: Arc<dyn SessionStore>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("session", &self.session.name())
            .finish()
    }
}

impl ApiClient {
    /// Create a new API client for the given base URL.
    pub fn new(base_url: &str, session: Arc<dyn SessionStore>) -> Self {
        let client = Client::builder()
            .user_agent(concat!("blueming-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    /// Absolute URL for a backend-relative path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attach the bearer header if a non-empty access token is stored.
    pub(crate) fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.session.access_token() {
            Some(token) if !token.is_empty() => builder.bearer_auth(token),
            _ => builder,
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        log::debug!("{} {}", method, path);
        let builder = self
            .client
            .request(method, self.url(path))
            .header(CONTENT_TYPE, JSON_MEDIA_TYPE);
        self.authorize(builder)
    }

    /// Authenticated `GET` of an SSE endpoint. The caller sends it.
    pub(crate) fn event_stream_request(&self, path: &str) -> RequestBuilder {
        log::debug!("GET {} (event stream)", path);
        let builder = self
            .client
            .get(self.url(path))
            .header(ACCEPT, EVENT_STREAM_MEDIA_TYPE)
            .header(CACHE_CONTROL, "no-cache");
        self.authorize(builder)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &Query) -> Result<T, ApiError> {
        let resp = self.request(Method::GET, &query.apply(path)).send().await?;
        handle_response(resp).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self.request(Method::POST, path).json(body).send().await?;
        handle_response(resp).await
    }

    /// `POST` with no request body (toggles, job creation).
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let resp = self.request(Method::POST, path).send().await?;
        handle_response(resp).await
    }

    /// `POST` without the bearer header. Used for the token refresh exchange.
    pub async fn post_unauthenticated<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        log::debug!("POST {} (unauthenticated)", path);
        let resp = self
            .client
            .post(self.url(path))
            .header(CONTENT_TYPE, JSON_MEDIA_TYPE)
            .json(body)
            .send()
            .await?;
        handle_response(resp).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self.request(Method::PUT, path).json(body).send().await?;
        handle_response(resp).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let resp = self.request(Method::DELETE, path).send().await?;
        handle_response(resp).await
    }

    /// `PUT` raw bytes to an absolute pre-signed URL.
    ///
    /// No bearer header: the URL itself carries the authorization.
    pub async fn put_bytes(
        &self,
        url: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), ApiError> {
        let resp = self
            .client
            .put(url)
            .header(CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            log::error!("Pre-signed upload rejected ({})", status);
            return Err(ApiError::Upload {
                status: Some(status.as_u16()),
            });
        }
        Ok(())
    }
}

/// Map a response into the declared type or a normalized failure.
pub(crate) async fn handle_response<T: DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
    let status = resp.status();
    let body = resp.bytes().await?;

    if !status.is_success() {
        let message = error_message(status.as_u16(), &body);
        log::error!("API error response ({}): {}", status, message);
        return Err(ApiError::Http {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_slice(&body).map_err(ApiError::decode)
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// Backend `message`, else backend `error`, else `HTTP Error: <status>`.
fn error_message(status: u16, body: &[u8]) -> String {
    serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|b| {
            b.message
                .filter(|m| !m.is_empty())
                .or(b.error.filter(|e| !e.is_empty()))
        })
        .unwrap_or_else(|| format!("HTTP Error: {}", status))
}
