//! API client module.
//!
//! Provides the HTTP client with bearer-token injection and response
//! normalization, plus one module of commands per backend resource group.
//! Every command takes `&ApiClient` and returns an [`Envelope`] or an
//! [`ApiError`].

pub mod auth;
pub mod client;
pub mod community;
pub mod error;
pub mod generation;
pub mod models;
pub mod search;
pub mod tags;
pub mod types;
pub mod upload;
pub mod user;
pub mod training;

#[cfg(test)]
mod tests;

pub use client::{ApiClient, PageRequest, Query, DEFAULT_PAGE_SIZE};
pub use error::{ApiError, ErrorKind};
pub use types::{Empty, Envelope, Page};
