//! SSE framing into progress events.

use std::pin::Pin;
use std::task::{Context, Poll};

use eventsource_stream::{Event, Eventsource};
use futures_util::{Stream, StreamExt};

use super::{ProgressEvent, StreamError};

/// The only event type delivered; named events are skipped.
const MESSAGE_EVENT: &str = "message";

type EventResult = Result<ProgressEvent, StreamError>;

/// A push channel's events, in send order.
///
/// Never ends on its own while the transport stays up; a terminal
/// `status` is just another event. Drop the stream to close the channel.
pub struct ProgressStream {
    inner: Pin<Box<dyn Stream<Item = EventResult> + Send>>,
}

impl ProgressStream {
    /// Parse SSE frames out of any byte stream.
    pub fn from_byte_stream<S, B, E>(bytes: S) -> Self
    where
        S: Stream<Item = Result<B, E>> + Send + 'static,
        B: AsRef<[u8]> + Send + 'static,
        E: std::error::Error + Send + Sync + 'static,
    {
        let events = Box::pin(bytes).eventsource().filter_map(|item| async move {
            match item {
                Ok(event) => decode_event(event),
                Err(e) => Some(Err(StreamError::Transport(e.to_string()))),
            }
        });
        Self {
            inner: Box::pin(events),
        }
    }
}

impl Stream for ProgressStream {
    type Item = EventResult;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl std::fmt::Debug for ProgressStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressStream").finish_non_exhaustive()
    }
}

fn decode_event(event: Event) -> Option<EventResult> {
    if !event.event.is_empty() && event.event != MESSAGE_EVENT {
        log::debug!("Skipping SSE event of type {:?}", event.event);
        return None;
    }
    if event.data.is_empty() {
        return None;
    }
    let parsed = serde_json::from_str(&event.data).and_then(ProgressEvent::from_value);
    Some(parsed.map_err(|source| StreamError::Decode {
        data: event.data,
        source,
    }))
}
