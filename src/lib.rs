//! Client access layer for the Blueming LoRA model platform.
//!
//! - [`session`]: the persisted access/refresh token pair.
//! - [`api`]: typed commands over HTTP with bearer injection and a
//!   normalized [`api::Envelope`] / [`api::ApiError`] outcome.
//! - [`stream`]: SSE progress channels for training and generation jobs.

pub mod api;
pub mod config;
pub mod session;
pub mod stream;

pub use api::{ApiClient, ApiError, Envelope, Page, PageRequest};
pub use config::Config;
pub use session::SessionStore;
pub use stream::{Channel, ProgressEvent, ProgressStream, Subscription};
