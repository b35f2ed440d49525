//! Server-pushed progress for long-running training and generation jobs.
//!
//! A channel is one persistent SSE connection to a fixed endpoint. No job id
//! is sent; the backend correlates the stream to the caller's active job.
//! There is no reconnect, heartbeat or lifetime limit, and a terminal
//! `status` does not close the channel: closing is always the caller's move.
//!
//! Two ways to consume a channel:
//! - [`ProgressStream::connect`] yields a `Stream` to iterate; drop it to close.
//! - [`subscribe`] spawns a task that feeds a handler and returns a
//!   [`Subscription`] handle whose [`Subscription::close`] tears it down.

mod sse;

use std::fmt;
use std::future::Future;

use futures_util::StreamExt;
use reqwest::RequestBuilder;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};

pub use sse::ProgressStream;

use crate::api::ApiClient;

/// Which job family a channel reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Training,
    Generation,
}

impl Channel {
    pub fn path(self) -> &'static str {
        match self {
            Channel::Training => "/api/training/stream",
            Channel::Generation => "/api/generate/stream",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Training => f.write_str("training"),
            Channel::Generation => f.write_str("generation"),
        }
    }
}

/// One status update for a running job.
///
/// Generation events carry step counts, training events carry epoch
/// counts. Fields this type does not name are kept in `extra`.
///
/// Decoding never rejects a JSON object: `null` or oddly typed values in
/// the named fields read as empty, and a non-object payload is kept whole
/// under `extra["data"]`. Only data that is not JSON ends a channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: String,
    #[serde(
        default,
        alias = "currentStep",
        deserialize_with = "lenient_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub current_step: Option<i64>,
    #[serde(
        default,
        alias = "totalSteps",
        deserialize_with = "lenient_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub total_steps: Option<i64>,
    #[serde(
        default,
        alias = "currentEpoch",
        deserialize_with = "lenient_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub current_epoch: Option<i64>,
    #[serde(
        default,
        alias = "totalEpochs",
        deserialize_with = "lenient_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub total_epochs: Option<i64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub message: String,
    /// Empty until the job completes.
    #[serde(
        default,
        rename = "image_urls",
        alias = "imageUrls",
        alias = "resultUrls",
        deserialize_with = "lenient_urls"
    )]
    pub result_urls: Vec<String>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub error: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProgressEvent {
    /// `completed` or `failed`, case-insensitive. Advisory: the channel
    /// stays open after a terminal event.
    pub fn is_terminal(&self) -> bool {
        self.status.eq_ignore_ascii_case("completed") || self.status.eq_ignore_ascii_case("failed")
    }

    /// Build an event from any parsed JSON value.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        match value {
            Value::Object(_) => serde_json::from_value(value),
            other => {
                let mut extra = Map::new();
                extra.insert("data".to_string(), other);
                Ok(Self {
                    extra,
                    ..Self::default()
                })
            }
        }
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

fn lenient_opt_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}

fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_urls<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(url) => Some(url),
                _ => None,
            })
            .collect(),
        Value::String(url) if !url.is_empty() => vec![url],
        _ => Vec::new(),
    })
}

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("Failed to open progress channel: {0}")]
    Connect(#[source] reqwest::Error),

    #[error("Progress channel rejected (HTTP {status})")]
    Http { status: u16 },

    #[error("Progress channel transport error: {0}")]
    Transport(String),

    /// An event whose data is not JSON. Ends the channel.
    #[error("Failed to decode progress event: {source}")]
    Decode {
        data: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Progress channel task aborted")]
    Aborted,
}

/// Lifecycle of a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Connecting,
    Open,
    Closed,
}

impl ProgressStream {
    /// Open a channel and return its events as a stream.
    pub async fn connect(client: &ApiClient, channel: Channel) -> Result<Self, StreamError> {
        log::info!("Opening {} progress channel", channel);
        open(client.event_stream_request(channel.path())).await
    }
}

async fn open(request: RequestBuilder) -> Result<ProgressStream, StreamError> {
    let resp = request.send().await.map_err(StreamError::Connect)?;
    let status = resp.status();
    if !status.is_success() {
        log::error!("Progress channel rejected ({})", status);
        return Err(StreamError::Http {
            status: status.as_u16(),
        });
    }
    Ok(ProgressStream::from_byte_stream(resp.bytes_stream()))
}

/// Open a channel and deliver every event to `handler`, in send order.
///
/// The bearer token is read once, when the channel opens.
pub fn subscribe<F>(client: &ApiClient, channel: Channel, handler: F) -> Subscription
where
    F: FnMut(ProgressEvent) + Send + 'static,
{
    log::info!("Subscribing to {} progress", channel);
    Subscription::spawn(open(client.event_stream_request(channel.path())), handler)
}

/// Handle to a running subscription. Dropping it closes the channel.
pub struct Subscription {
    state: watch::Receiver<ChannelState>,
    task: JoinHandle<Result<(), StreamError>>,
    guard: DropGuard,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl Subscription {
    /// Run `connect`, then pump its events into `handler` on a new task.
    pub fn spawn<C, F>(connect: C, mut handler: F) -> Self
    where
        C: Future<Output = Result<ProgressStream, StreamError>> + Send + 'static,
        F: FnMut(ProgressEvent) + Send + 'static,
    {
        let (state_tx, state_rx) = watch::channel(ChannelState::Connecting);
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let task = tokio::spawn(async move {
            let result = tokio::select! {
                _ = token.cancelled() => Ok(()),
                result = pump(connect, &mut handler, &state_tx) => result,
            };
            if let Err(ref e) = result {
                log::error!("Progress channel failed: {}", e);
            }
            state_tx.send_replace(ChannelState::Closed);
            result
        });

        Self {
            state: state_rx,
            task,
            guard: cancel.drop_guard(),
        }
    }

    pub fn state(&self) -> ChannelState {
        *self.state.borrow()
    }

    /// Wait until the channel has closed for any reason.
    pub async fn wait_closed(&mut self) {
        let _ = self
            .state
            .wait_for(|state| *state == ChannelState::Closed)
            .await;
    }

    /// Tear the channel down and return how the pump ended.
    ///
    /// `Ok(())` for a clean close; a decode or transport failure that
    /// already ended the channel is returned here.
    pub async fn close(self) -> Result<(), StreamError> {
        let Subscription { task, guard, .. } = self;
        drop(guard);
        task.await.unwrap_or(Err(StreamError::Aborted))
    }

    /// Wait for the channel to end on its own (server or transport).
    pub async fn join(self) -> Result<(), StreamError> {
        let Subscription { task, guard, .. } = self;
        let result = task.await.unwrap_or(Err(StreamError::Aborted));
        drop(guard);
        result
    }
}

async fn pump<C, F>(
    connect: C,
    handler: &mut F,
    state: &watch::Sender<ChannelState>,
) -> Result<(), StreamError>
where
    C: Future<Output = Result<ProgressStream, StreamError>>,
    F: FnMut(ProgressEvent),
{
    let mut events = connect.await?;
    state.send_replace(ChannelState::Open);

    while let Some(event) = events.next().await {
        handler(event?);
    }
    log::info!("Progress channel ended by server");
    Ok(())
}
