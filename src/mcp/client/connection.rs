use crate::mcp::error::McpError;
use crate::mcp::transport::sse::{resolve_endpoint, Frame, FrameParser, SseLineBuffer};
use crate::mcp::transport::{
    is_event_stream_content_type, ENDPOINT_EVENT, EVENT_STREAM_CONTENT_TYPE, MESSAGE_EVENT,
};
use futures_util::StreamExt;
use reqwest::Url;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tracing::debug;

/// Channel half that resolves one pending call. Removed from the map on
/// first resolution, so a second resolution attempt for the same id is a
/// no-op by construction.
type ReplySender = oneshot::Sender<Result<Value, McpError>>;
type PendingMap = Arc<Mutex<HashMap<String, ReplySender>>>;

/// One streaming connection with its single background listener.
///
/// The listener is the only reader of the stream and the only resolver of
/// pending entries; the dispatcher registers and unregisters them. Both
/// sides go through the shared pending map, which is never held across an
/// await. Dropping the connection aborts the listener and closes the
/// stream.
pub(crate) struct SseConnection {
    pending: PendingMap,
    endpoint_rx: Option<oneshot::Receiver<Result<Url, McpError>>>,
    listener: JoinHandle<()>,
}

impl SseConnection {
    /// Opens the streaming GET and starts the listener. The session's
    /// static headers are sent alongside the stream negotiation headers.
    pub(crate) async fn open(
        client: &reqwest::Client,
        url: &str,
        headers: &HashMap<String, String>,
    ) -> Result<Self, McpError> {
        let stream_url = Url::parse(url)
            .map_err(|err| McpError::Protocol(format!("invalid server URL {url:?}: {err}")))?;

        let mut request = client
            .get(stream_url.clone())
            .header("Accept", EVENT_STREAM_CONTENT_TYPE)
            .header("Cache-Control", "no-cache");
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request
            .send()
            .await
            .map_err(|err| McpError::Transport(err.to_string()))?;
        if !response.status().is_success() {
            return Err(McpError::Transport(format!(
                "stream request failed with HTTP {}",
                response.status()
            )));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("");
        if !is_event_stream_content_type(content_type) {
            return Err(McpError::Protocol(format!(
                "expected an event stream, got content type {content_type:?}"
            )));
        }

        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
        let (endpoint_tx, endpoint_rx) = oneshot::channel();
        let listener = tokio::spawn(run_listener(
            response,
            stream_url,
            Arc::clone(&pending),
            endpoint_tx,
        ));

        Ok(Self {
            pending,
            endpoint_rx: Some(endpoint_rx),
            listener,
        })
    }

    /// Registers a pending call and returns the channel its reply will
    /// arrive on. Must happen before the call is POSTed.
    pub(crate) async fn register(&self, id: &str) -> oneshot::Receiver<Result<Value, McpError>> {
        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.insert(id.to_string(), tx);
        rx
    }

    /// Abandons a pending call so a late reply is dropped silently.
    pub(crate) async fn unregister(&self, id: &str) {
        self.pending.lock().await.remove(id);
    }

    /// Waits for the listener to resolve the callback endpoint, bounded
    /// by `wait`. Consumed once per connection lifetime.
    pub(crate) async fn endpoint(&mut self, wait: Duration) -> Result<Url, McpError> {
        let Some(rx) = self.endpoint_rx.take() else {
            return Err(McpError::Protocol(
                "endpoint already resolved for this connection".to_string(),
            ));
        };
        match tokio::time::timeout(wait, rx).await {
            Err(_) => Err(McpError::EndpointTimeout(wait)),
            Ok(Err(_)) => Err(McpError::Transport(
                "stream closed before an endpoint event arrived".to_string(),
            )),
            Ok(Ok(resolved)) => resolved,
        }
    }
}

impl Drop for SseConnection {
    fn drop(&mut self) {
        self.listener.abort();
    }
}

async fn run_listener(
    response: reqwest::Response,
    origin: Url,
    pending: PendingMap,
    endpoint_tx: oneshot::Sender<Result<Url, McpError>>,
) {
    let mut endpoint_tx = Some(endpoint_tx);
    let mut stream = response.bytes_stream();
    let mut lines = SseLineBuffer::default();
    let mut frames = FrameParser::default();

    while let Some(chunk) = stream.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(err) => {
                fail_connection(
                    &pending,
                    &mut endpoint_tx,
                    &format!("stream read failed: {err}"),
                )
                .await;
                return;
            }
        };
        for line in lines.push(&chunk) {
            if let Some(frame) = frames.push_line(&line) {
                handle_frame(frame, &origin, &pending, &mut endpoint_tx).await;
            }
        }
    }

    for line in lines.finish() {
        if let Some(frame) = frames.push_line(&line) {
            handle_frame(frame, &origin, &pending, &mut endpoint_tx).await;
        }
    }

    fail_connection(&pending, &mut endpoint_tx, "stream closed by server").await;
}

async fn handle_frame(
    frame: Frame,
    origin: &Url,
    pending: &PendingMap,
    endpoint_tx: &mut Option<oneshot::Sender<Result<Url, McpError>>>,
) {
    match frame.event.as_str() {
        ENDPOINT_EVENT => match endpoint_tx.take() {
            Some(tx) => {
                let _ = tx.send(resolve_endpoint(origin, &frame.data));
            }
            None => debug!("ignoring duplicate endpoint event"),
        },
        MESSAGE_EVENT => {
            let message: Value = match serde_json::from_str(&frame.data) {
                Ok(value) => value,
                Err(err) => {
                    debug!(%err, "dropping unparseable message event");
                    return;
                }
            };
            let Some(id) = message.get("id").and_then(Value::as_str).map(str::to_string) else {
                debug!("dropping message event without a string id");
                return;
            };
            let sender = pending.lock().await.remove(&id);
            match sender {
                Some(tx) => {
                    let _ = tx.send(Ok(message));
                }
                // The call may have timed out and been abandoned already.
                None => debug!(%id, "dropping reply with no pending request"),
            }
        }
        other => debug!(event = other, "ignoring unhandled event type"),
    }
}

/// Fails every still-registered pending call exactly once, and wakes an
/// endpoint waiter that will never be served.
async fn fail_connection(
    pending: &PendingMap,
    endpoint_tx: &mut Option<oneshot::Sender<Result<Url, McpError>>>,
    reason: &str,
) {
    if let Some(tx) = endpoint_tx.take() {
        let _ = tx.send(Err(McpError::Transport(reason.to_string())));
    }
    let senders: Vec<(String, ReplySender)> = pending.lock().await.drain().collect();
    for (id, tx) in senders {
        debug!(%id, reason, "failing pending request");
        let _ = tx.send(Err(McpError::Transport(reason.to_string())));
    }
}
