//! Request and Response message types.
//!
//! Defines the wire envelope for commands sent to the browser and the
//! responses it returns. Session-scoped messages carry a `sessionId`;
//! root-scoped messages (target attach/detach) omit it.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::identifiers::{CommandId, SessionId};

use super::Command;

// ============================================================================
// Request
// ============================================================================

/// A command request to the browser.
///
/// # Format
///
/// ```json
/// {
///   "id": 12,
///   "sessionId": "8D9A...",
///   "method": "Domain.methodName",
///   "params": { ... }
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct Request {
    /// Unique identifier for request/response correlation.
    pub id: CommandId,

    /// Target session; `None` for root-scoped commands.
    #[serde(rename = "sessionId", skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,

    /// Command with method and params.
    #[serde(flatten)]
    pub command: Command,
}

impl Request {
    /// Creates a new request with auto-generated ID.
    #[inline]
    #[must_use]
    pub fn new(session_id: Option<SessionId>, command: Command) -> Self {
        Self {
            id: CommandId::generate(),
            session_id,
            command,
        }
    }

    /// Creates a new request with a specific ID.
    #[inline]
    #[must_use]
    pub fn with_id(id: CommandId, session_id: Option<SessionId>, command: Command) -> Self {
        Self {
            id,
            session_id,
            command,
        }
    }
}

// ============================================================================
// Response
// ============================================================================

/// A response from the browser.
///
/// # Format
///
/// Success:
/// ```json
/// { "id": 12, "sessionId": "8D9A...", "result": { ... } }
/// ```
///
/// Error:
/// ```json
/// { "id": 12, "error": { "code": -32000, "message": "..." } }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Response {
    /// Matches the command `id`.
    pub id: CommandId,

    /// Session the response belongs to (if session-scoped).
    #[serde(rename = "sessionId", default)]
    pub session_id: Option<SessionId>,

    /// Result data (if success).
    #[serde(default)]
    pub result: Option<Value>,

    /// Error object (if error).
    #[serde(default)]
    pub error: Option<ProtocolError>,
}

impl Response {
    /// Returns `true` if this is a success response.
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Returns `true` if this is an error response.
    #[inline]
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Extracts the result value, returning an error if the browser
    /// reported one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Devtools`] if the response carries an error object.
    pub fn into_result(self) -> Result<Value> {
        match self.error {
            Some(error) => Err(Error::devtools(error.code, error.message)),
            None => Ok(self.result.unwrap_or(Value::Null)),
        }
    }

    /// Gets a string value from the result.
    ///
    /// Returns empty string if key not found or not a string.
    #[inline]
    #[must_use]
    pub fn get_string(&self, key: &str) -> String {
        self.result
            .as_ref()
            .and_then(|v| v.get(key))
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string()
    }

    /// Gets a u64 value from the result.
    ///
    /// Returns 0 if key not found or not a number.
    #[inline]
    #[must_use]
    pub fn get_u64(&self, key: &str) -> u64 {
        self.result
            .as_ref()
            .and_then(|v| v.get(key))
            .and_then(|v| v.as_u64())
            .unwrap_or_default()
    }

    /// Gets a boolean value from the result.
    ///
    /// Returns false if key not found or not a boolean.
    #[inline]
    #[must_use]
    pub fn get_bool(&self, key: &str) -> bool {
        self.result
            .as_ref()
            .and_then(|v| v.get(key))
            .and_then(|v| v.as_bool())
            .unwrap_or_default()
    }
}

// ============================================================================
// ProtocolError
// ============================================================================

/// Error object carried in an error response.
#[derive(Debug, Clone, Deserialize)]
pub struct ProtocolError {
    /// Protocol error code.
    pub code: i64,

    /// Human-readable message.
    pub message: String,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifiers::InterceptionId;
    use crate::protocol::NetworkCommand;

    #[test]
    fn test_request_serialization() {
        let request = Request::with_id(
            CommandId::new(7),
            Some(SessionId::new("SESS")),
            Command::Network(NetworkCommand::TakeResponseBodyAsStream {
                interception_id: InterceptionId::new("int-1"),
            }),
        );
        let json = serde_json::to_string(&request).expect("serialize");

        assert!(json.contains(r#""id":7"#));
        assert!(json.contains(r#""sessionId":"SESS""#));
        assert!(json.contains("Network.takeResponseBodyForInterceptionAsStream"));
    }

    #[test]
    fn test_root_request_omits_session() {
        let request = Request::new(None, Command::Network(NetworkCommand::Enable));
        let json = serde_json::to_string(&request).expect("serialize");
        assert!(!json.contains("sessionId"));
    }

    #[test]
    fn test_success_response() {
        let json_str = r#"{
            "id": 12,
            "sessionId": "SESS",
            "result": {"stream": "stream-1"}
        }"#;

        let response: Response = serde_json::from_str(json_str).expect("parse");
        assert!(response.is_success());
        assert!(!response.is_error());
        assert_eq!(response.get_string("stream"), "stream-1");
    }

    #[test]
    fn test_error_response() {
        let json_str = r#"{
            "id": 12,
            "error": {"code": -32000, "message": "No resource with given identifier"}
        }"#;

        let response: Response = serde_json::from_str(json_str).expect("parse");
        assert!(response.is_error());

        let err = response.into_result().unwrap_err();
        assert!(matches!(err, Error::Devtools { code: -32000, .. }));
    }

    #[test]
    fn test_into_result_success() {
        let json_str = r#"{ "id": 3, "result": {"sessionId": "SESS"} }"#;

        let response: Response = serde_json::from_str(json_str).expect("parse");
        let result = response.into_result().expect("should succeed");
        assert_eq!(
            result.get("sessionId").and_then(|v| v.as_str()),
            Some("SESS")
        );
    }

    #[test]
    fn test_response_get_helpers() {
        let json_str = r#"{
            "id": 4,
            "result": { "data": "Y2Rw", "eof": false, "size": 3 }
        }"#;

        let response: Response = serde_json::from_str(json_str).expect("parse");
        assert_eq!(response.get_string("data"), "Y2Rw");
        assert_eq!(response.get_u64("size"), 3);
        assert!(!response.get_bool("eof"));

        // Missing keys return defaults
        assert_eq!(response.get_string("missing"), "");
        assert_eq!(response.get_u64("missing"), 0);
        assert!(!response.get_bool("missing"));
    }
}
