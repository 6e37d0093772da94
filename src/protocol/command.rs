//! Command definitions organized by protocol domain.
//!
//! Commands follow the DevTools `Domain.methodName` format.
//!
//! # Command Domains
//!
//! | Domain | Commands |
//! |--------|----------|
//! | `Network` | Observation, interception, body streaming |
//! | `IO` | Stream reads |
//! | `Target` | Session attach/detach |
//! | `Runtime` | In-page expression evaluation |

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::identifiers::{InterceptionId, SessionId, StreamHandle, TargetId};

// ============================================================================
// Command Wrapper
// ============================================================================

/// All protocol commands organized by domain.
///
/// This enum wraps domain-specific command enums for unified serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Command {
    /// Network domain commands.
    Network(NetworkCommand),
    /// IO domain commands.
    Io(IoCommand),
    /// Target domain commands.
    Target(TargetCommand),
    /// Runtime domain commands.
    Runtime(RuntimeCommand),
}

// ============================================================================
// Network Commands
// ============================================================================

/// Network domain commands for observation and interception.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum NetworkCommand {
    /// Enable network observation for the session.
    #[serde(rename = "Network.enable")]
    Enable,

    /// Arm request interception with a list of patterns.
    #[serde(rename = "Network.setRequestInterception")]
    SetRequestInterception {
        /// Patterns selecting which exchanges are paused for inspection.
        patterns: Vec<RequestPattern>,
    },

    /// Take an intercepted response body as a readable stream.
    #[serde(rename = "Network.takeResponseBodyForInterceptionAsStream")]
    TakeResponseBodyAsStream {
        /// The interception to take the body from.
        #[serde(rename = "interceptionId")]
        interception_id: InterceptionId,
    },

    /// Resolve an intercepted request, optionally failing it.
    #[serde(rename = "Network.continueInterceptedRequest")]
    ContinueInterceptedRequest {
        /// The interception to resolve.
        #[serde(rename = "interceptionId")]
        interception_id: InterceptionId,
        /// Failure outcome; `None` lets the request proceed unmodified.
        #[serde(rename = "errorReason", skip_serializing_if = "Option::is_none")]
        error_reason: Option<ErrorReason>,
    },
}

// ============================================================================
// RequestPattern
// ============================================================================

/// A pattern plus pipeline stage selecting exchanges to intercept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestPattern {
    /// URL glob; `*` matches everything.
    #[serde(rename = "urlPattern")]
    pub url_pattern: String,

    /// Pipeline stage at which matching exchanges pause.
    #[serde(rename = "interceptionStage")]
    pub interception_stage: InterceptionStage,
}

impl RequestPattern {
    /// Creates a pattern intercepting at the headers-received stage.
    ///
    /// Response bodies are only streamable at this stage.
    #[inline]
    #[must_use]
    pub fn headers_received(url_pattern: impl Into<String>) -> Self {
        Self {
            url_pattern: url_pattern.into(),
            interception_stage: InterceptionStage::HeadersReceived,
        }
    }

    /// Creates a match-everything pattern at the headers-received stage.
    #[inline]
    #[must_use]
    pub fn match_all() -> Self {
        Self::headers_received("*")
    }
}

/// Request pipeline stage for interception.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterceptionStage {
    /// Pause before the request is sent.
    Request,
    /// Pause once response headers have been received.
    HeadersReceived,
}

// ============================================================================
// ErrorReason
// ============================================================================

/// Failure outcome for a resolved interception.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorReason {
    /// Generic failure.
    Failed,
    /// Request aborted by the client.
    Aborted,
    /// Request timed out.
    TimedOut,
    /// Request blocked by the client.
    BlockedByClient,
}

// ============================================================================
// IO Commands
// ============================================================================

/// IO domain commands for stream access.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum IoCommand {
    /// Read the next chunk from a stream.
    #[serde(rename = "IO.read")]
    Read {
        /// Stream to read from.
        handle: StreamHandle,
    },

    /// Close a stream.
    #[serde(rename = "IO.close")]
    Close {
        /// Stream to close.
        handle: StreamHandle,
    },
}

// ============================================================================
// Target Commands
// ============================================================================

/// Target domain commands for session management.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum TargetCommand {
    /// Attach a flat session to a target.
    #[serde(rename = "Target.attachToTarget")]
    AttachToTarget {
        /// Target to attach to.
        #[serde(rename = "targetId")]
        target_id: TargetId,
        /// Use the flat session protocol (sessionId on each message).
        flatten: bool,
    },

    /// Detach a session from its target.
    #[serde(rename = "Target.detachFromTarget")]
    DetachFromTarget {
        /// Session to detach.
        #[serde(rename = "sessionId")]
        session_id: SessionId,
    },
}

// ============================================================================
// Runtime Commands
// ============================================================================

/// Runtime domain commands for in-page evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum RuntimeCommand {
    /// Evaluate a JavaScript expression in the page.
    #[serde(rename = "Runtime.evaluate")]
    Evaluate {
        /// Expression to evaluate.
        expression: String,
        /// Return the result by value rather than as a remote reference.
        #[serde(rename = "returnByValue")]
        return_by_value: bool,
    },
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enable_serialization() {
        let command = Command::Network(NetworkCommand::Enable);
        let json = serde_json::to_string(&command).expect("serialize");
        assert_eq!(json, r#"{"method":"Network.enable"}"#);
    }

    #[test]
    fn test_set_request_interception_serialization() {
        let command = Command::Network(NetworkCommand::SetRequestInterception {
            patterns: vec![RequestPattern::match_all()],
        });
        let json = serde_json::to_string(&command).expect("serialize");

        assert!(json.contains(r#""method":"Network.setRequestInterception""#));
        assert!(json.contains(r#""urlPattern":"*""#));
        assert!(json.contains(r#""interceptionStage":"HeadersReceived""#));
    }

    #[test]
    fn test_continue_without_reason_omits_field() {
        let command = Command::Network(NetworkCommand::ContinueInterceptedRequest {
            interception_id: InterceptionId::new("int-1"),
            error_reason: None,
        });
        let json = serde_json::to_string(&command).expect("serialize");

        assert!(json.contains(r#""interceptionId":"int-1""#));
        assert!(!json.contains("errorReason"));
    }

    #[test]
    fn test_continue_with_abort_reason() {
        let command = Command::Network(NetworkCommand::ContinueInterceptedRequest {
            interception_id: InterceptionId::new("int-1"),
            error_reason: Some(ErrorReason::Aborted),
        });
        let json = serde_json::to_string(&command).expect("serialize");

        assert!(json.contains(r#""errorReason":"Aborted""#));
    }

    #[test]
    fn test_io_read_serialization() {
        let command = Command::Io(IoCommand::Read {
            handle: StreamHandle::new("stream-7"),
        });
        let json = serde_json::to_string(&command).expect("serialize");

        assert!(json.contains(r#""method":"IO.read""#));
        assert!(json.contains(r#""handle":"stream-7""#));
    }

    #[test]
    fn test_attach_to_target_serialization() {
        let command = Command::Target(TargetCommand::AttachToTarget {
            target_id: TargetId::new("page-1"),
            flatten: true,
        });
        let json = serde_json::to_string(&command).expect("serialize");

        assert!(json.contains(r#""method":"Target.attachToTarget""#));
        assert!(json.contains(r#""targetId":"page-1""#));
        assert!(json.contains(r#""flatten":true"#));
    }

    #[test]
    fn test_evaluate_serialization() {
        let command = Command::Runtime(RuntimeCommand::Evaluate {
            expression: "1 + 1".to_string(),
            return_by_value: true,
        });
        let json = serde_json::to_string(&command).expect("serialize");

        assert!(json.contains(r#""method":"Runtime.evaluate""#));
        assert!(json.contains(r#""returnByValue":true"#));
    }
}
