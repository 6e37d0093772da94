//! Control session for network-level page inspection.

use std::fmt;

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::debug;

use crate::error::{Error, Result};
use crate::identifiers::{InterceptionId, SessionId, StreamHandle};
use crate::protocol::{
    Command, ErrorReason, Event, IoCommand, NetworkCommand, RequestPattern, TargetCommand,
};
use crate::transport::Connection;

// ============================================================================
// StreamChunk
// ============================================================================

/// One read from a response-body stream.
#[derive(Debug, Clone)]
pub struct StreamChunk {
    /// Chunk payload in its transport encoding.
    pub data: String,

    /// Whether `data` is base64-encoded rather than plain text.
    pub base64_encoded: bool,

    /// Whether the stream is exhausted.
    pub eof: bool,
}

// ============================================================================
// ControlSession
// ============================================================================

/// An exclusive, short-lived session bound to one page.
///
/// A control session owns a dedicated protocol channel for inspecting
/// and manipulating the page's network traffic, independent of the
/// page's own script execution. It is created at the start of an
/// interception operation and detached at the end regardless of
/// outcome. Sessions are not shared across concurrent operations on
/// the same page.
#[derive(Clone)]
pub struct ControlSession {
    /// Connection to the debugger endpoint.
    connection: Connection,
    /// Session ID carried on every command.
    session_id: SessionId,
}

impl fmt::Debug for ControlSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlSession")
            .field("session_id", &self.session_id)
            .finish_non_exhaustive()
    }
}

impl ControlSession {
    /// Creates a new control session handle.
    pub(crate) fn new(connection: Connection, session_id: SessionId) -> Self {
        Self {
            connection,
            session_id,
        }
    }

    /// Returns the session ID.
    #[inline]
    #[must_use]
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Subscribes to this session's event feed.
    ///
    /// Events are delivered in the order the browser emits them. The
    /// channel closes when the session is detached.
    #[must_use]
    pub fn subscribe_events(&self) -> mpsc::UnboundedReceiver<Event> {
        self.connection.subscribe(self.session_id.clone())
    }

    /// Sends a session-scoped command and extracts its result.
    async fn call(&self, command: Command) -> Result<Value> {
        let response = self
            .connection
            .send(Some(self.session_id.clone()), command)
            .await?;
        response.into_result()
    }
}

// ============================================================================
// ControlSession - Network
// ============================================================================

impl ControlSession {
    /// Enables network observation for this session.
    pub async fn enable_network(&self) -> Result<()> {
        debug!(session_id = %self.session_id, "Enabling network observation");
        self.call(Command::Network(NetworkCommand::Enable)).await?;
        Ok(())
    }

    /// Arms response interception for a URL pattern.
    ///
    /// Exactly one rule is armed, at the headers-received stage: that is
    /// the only stage where response bodies can be taken as streams.
    /// Traffic not matching the pattern proceeds unintercepted.
    pub async fn set_request_interception(&self, url_pattern: &str) -> Result<()> {
        debug!(session_id = %self.session_id, url_pattern, "Arming request interception");

        let command = Command::Network(NetworkCommand::SetRequestInterception {
            patterns: vec![RequestPattern::headers_received(url_pattern)],
        });

        self.call(command).await?;
        Ok(())
    }

    /// Takes an intercepted response body as a readable stream.
    pub async fn take_response_body_stream(
        &self,
        interception_id: &InterceptionId,
    ) -> Result<StreamHandle> {
        let command = Command::Network(NetworkCommand::TakeResponseBodyAsStream {
            interception_id: interception_id.clone(),
        });

        let result = self.call(command).await?;
        let stream = result
            .get("stream")
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::protocol("No stream handle in response"))?;

        Ok(StreamHandle::new(stream))
    }

    /// Reads the next chunk from a response-body stream.
    pub async fn read_stream_chunk(&self, handle: &StreamHandle) -> Result<StreamChunk> {
        let command = Command::Io(IoCommand::Read {
            handle: handle.clone(),
        });

        let result = self.call(command).await?;

        Ok(StreamChunk {
            data: result
                .get("data")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
            base64_encoded: result
                .get("base64Encoded")
                .and_then(|v| v.as_bool())
                .unwrap_or_default(),
            eof: result
                .get("eof")
                .and_then(|v| v.as_bool())
                .unwrap_or_default(),
        })
    }

    /// Lets an intercepted request proceed unmodified.
    pub async fn continue_request(&self, interception_id: &InterceptionId) -> Result<()> {
        let command = Command::Network(NetworkCommand::ContinueInterceptedRequest {
            interception_id: interception_id.clone(),
            error_reason: None,
        });

        self.call(command).await?;
        Ok(())
    }

    /// Fails an intercepted request with an aborted outcome.
    ///
    /// Used once a response body has been captured as a stream: the page
    /// must not perform the navigation or download itself.
    pub async fn abort_request(&self, interception_id: &InterceptionId) -> Result<()> {
        debug!(session_id = %self.session_id, %interception_id, "Aborting intercepted request");

        let command = Command::Network(NetworkCommand::ContinueInterceptedRequest {
            interception_id: interception_id.clone(),
            error_reason: Some(ErrorReason::Aborted),
        });

        self.call(command).await?;
        Ok(())
    }
}

// ============================================================================
// ControlSession - Teardown
// ============================================================================

impl ControlSession {
    /// Detaches this session from its target.
    ///
    /// Drops the event subscription first, so any worker draining the
    /// event feed observes a closed channel. Detaching is the session's
    /// terminal operation; the handle must not be used afterwards.
    pub async fn detach(&self) -> Result<()> {
        debug!(session_id = %self.session_id, "Detaching control session");

        self.connection.unsubscribe(&self.session_id);

        let command = Command::Target(TargetCommand::DetachFromTarget {
            session_id: self.session_id.clone(),
        });

        // detachFromTarget is root-scoped: it names the session in params.
        let response = self.connection.send(None, command).await?;
        response.into_result()?;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<ControlSession>();
    }

    #[test]
    fn test_stream_chunk_debug() {
        let chunk = StreamChunk {
            data: "Y2Rw".to_string(),
            base64_encoded: true,
            eof: false,
        };
        let rendered = format!("{chunk:?}");
        assert!(rendered.contains("Y2Rw"));
    }
}
