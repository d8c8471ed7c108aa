//! Smart contract event listener.
//!
//! Responsibilities:
//! - Register a listener for one contract with an event-name filter.
//! - Read the newline-delimited reply envelopes and decode them into [`ScEvent`]s.
//!
//! Does NOT handle:
//! - Filtering events client-side; the node applies the filter.
//!
//! Invariants:
//! - The first envelope must acknowledge the registration, or registration fails.
//! - The listener yields at most one error, after which it ends.
//! - Listener failures never close the client.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::stream::BoxStream;
use futures::{Stream, StreamExt};
use pcore_config::constants::EVENT_LISTENER_REGISTERED;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::client::{Client, encode_json};
use crate::error::{ClientError, Result};
use crate::metrics::MetricsCollector;
use crate::models::{RegisterEventListenerRequest, ScEvent};
use crate::rpc::{Operation, RequestEnvelope, ResponseEnvelope};

const EVENT_CHANNEL_CAPACITY: usize = 64;

impl Client {
    /// Subscribe to events of smart contract `sc_name` whose names match `event_filter`.
    ///
    /// # Errors
    /// - [`ClientError::InvalidEventFilter`] if the filter is not a valid regular expression.
    /// - [`ClientError::Application`] if the node rejects the registration.
    /// - [`ClientError::InvalidResponse`] if the node does not acknowledge it.
    /// - [`ClientError::Timeout`] if the acknowledgement does not arrive within the client timeout.
    pub async fn register_event_listener(
        &self,
        sc_name: &str,
        event_filter: &str,
    ) -> Result<EventListener> {
        regex::Regex::new(event_filter)?;

        let operation = Operation::REGISTER_EVENT_LISTENER;
        let request = RegisterEventListenerRequest {
            sc_name: sc_name.to_string(),
            event_filter: event_filter.to_string(),
        };
        let body = RequestEnvelope::new(encode_json(operation.name(), &request)?);

        let session = self.snapshot()?;
        let response = session.connection.open_stream(operation, &body).await?;
        let mut envelopes = EnvelopeReader::new(session.connection.endpoint(), response);

        let deadline = session.connection.timeout();
        let acknowledgement = tokio::time::timeout(deadline, envelopes.next_envelope())
            .await
            .map_err(|_| ClientError::Timeout {
                operation: operation.name(),
                endpoint: session.connection.endpoint().to_string(),
                timeout: deadline,
            })??
            .ok_or_else(|| {
                ClientError::StreamClosed(
                    "stream ended before the registration was acknowledged".to_string(),
                )
            })?;
        let reply = acknowledgement.into_reply(operation.name())?;
        if reply.payload != EVENT_LISTENER_REGISTERED.as_bytes() {
            return Err(ClientError::InvalidResponse {
                operation: operation.name(),
                message: format!(
                    "expected {EVENT_LISTENER_REGISTERED:?}, got {:?}",
                    String::from_utf8_lossy(&reply.payload)
                ),
            });
        }
        info!(sc_name, event_filter, endpoint = %session.connection.endpoint(), "Event listener registered");

        let (sender, receiver) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let task = tokio::spawn(forward_events(
            envelopes,
            sender,
            self.options.metrics.clone(),
        ));
        Ok(EventListener {
            sc_name: sc_name.to_string(),
            receiver,
            task,
        })
    }
}

/// Events of one registered listener.
///
/// Implements [`Stream`]; the stream ends after the first error. Dropping the
/// listener stops it.
#[derive(Debug)]
pub struct EventListener {
    sc_name: String,
    receiver: mpsc::Receiver<Result<ScEvent>>,
    task: JoinHandle<()>,
}

impl EventListener {
    pub fn sc_name(&self) -> &str {
        &self.sc_name
    }

    /// The next event, or `None` once the listener has ended.
    pub async fn recv(&mut self) -> Option<Result<ScEvent>> {
        self.receiver.recv().await
    }

    /// Stop listening. Events already received stay readable.
    pub fn close(&mut self) {
        self.task.abort();
        self.receiver.close();
        debug!(sc_name = %self.sc_name, "Event listener closed");
    }
}

impl Stream for EventListener {
    type Item = Result<ScEvent>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

impl Drop for EventListener {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn forward_events(
    mut envelopes: EnvelopeReader,
    sender: mpsc::Sender<Result<ScEvent>>,
    metrics: MetricsCollector,
) {
    let operation = Operation::REGISTER_EVENT_LISTENER.name();
    loop {
        let item = match envelopes.next_envelope().await {
            Ok(Some(envelope)) => envelope.into_reply(operation).and_then(|reply| {
                serde_json::from_slice::<ScEvent>(&reply.payload)
                    .map_err(|source| ClientError::Decode { operation, source })
            }),
            Ok(None) => Err(ClientError::StreamClosed("closed by server".to_string())),
            Err(e) => Err(e),
        };

        let terminal = match item {
            Ok(ref event) => {
                metrics.record_event(&event.sc_name);
                false
            }
            Err(ref e) => {
                warn!(endpoint = %envelopes.endpoint, error = %e, "Event listener ended");
                true
            }
        };
        if sender.send(item).await.is_err() || terminal {
            return;
        }
    }
}

/// Splits a streamed reply body into JSON envelopes, one per line.
struct EnvelopeReader {
    endpoint: String,
    body: BoxStream<'static, reqwest::Result<Vec<u8>>>,
    buffer: Vec<u8>,
}

impl EnvelopeReader {
    fn new(endpoint: &str, response: reqwest::Response) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            body: response
                .bytes_stream()
                .map(|chunk| chunk.map(|bytes| bytes.to_vec()))
                .boxed(),
            buffer: Vec::new(),
        }
    }

    /// The next envelope, or `None` when the server ended the stream.
    async fn next_envelope(&mut self) -> Result<Option<ResponseEnvelope>> {
        loop {
            if let Some(newline) = self.buffer.iter().position(|b| *b == b'\n') {
                let line: Vec<u8> = self.buffer.drain(..=newline).collect();
                if let Some(envelope) = parse_line(&line)? {
                    return Ok(Some(envelope));
                }
                continue;
            }

            match self.body.next().await {
                Some(Ok(chunk)) => self.buffer.extend_from_slice(&chunk),
                Some(Err(source)) => {
                    return Err(ClientError::Transport {
                        operation: Operation::REGISTER_EVENT_LISTENER.name(),
                        endpoint: self.endpoint.clone(),
                        source,
                    });
                }
                None => {
                    let rest = std::mem::take(&mut self.buffer);
                    return parse_line(&rest);
                }
            }
        }
    }
}

fn parse_line(line: &[u8]) -> Result<Option<ResponseEnvelope>> {
    if line.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(line)
        .map(Some)
        .map_err(|e| ClientError::InvalidResponse {
            operation: Operation::REGISTER_EVENT_LISTENER.name(),
            message: format!("malformed stream envelope: {e}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_lines_are_skipped() {
        assert!(parse_line(b"  \r\n").unwrap().is_none());
    }

    #[test]
    fn test_line_parses_into_envelope() {
        let envelope = parse_line(br#"{"payload":"UG9uZw==","error":""}"#)
            .unwrap()
            .unwrap();
        assert_eq!(envelope.payload, b"Pong");
    }

    #[test]
    fn test_garbage_line_is_invalid_response() {
        assert!(matches!(
            parse_line(b"<html>"),
            Err(ClientError::InvalidResponse { .. })
        ));
    }
}
