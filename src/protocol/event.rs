//! Event message types.
//!
//! Events are notifications pushed by the browser when activity occurs
//! on an observed session. Unlike responses they carry no `id`; that is
//! how the two are told apart on the wire.
//!
//! # Event Types
//!
//! | Domain | Events |
//! |--------|--------|
//! | `Network` | `requestIntercepted` |
//! | `Target` | `detachedFromTarget` |

// ============================================================================
// Imports
// ============================================================================

use serde::Deserialize;
use serde_json::Value;

use crate::identifiers::{InterceptionId, SessionId};

// ============================================================================
// Event
// ============================================================================

/// An event notification from the browser.
///
/// # Format
///
/// ```json
/// {
///   "method": "Domain.eventName",
///   "sessionId": "8D9A...",
///   "params": { ... }
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    /// Event name in `Domain.eventName` format.
    pub method: String,

    /// Session the event belongs to (if session-scoped).
    #[serde(rename = "sessionId", default)]
    pub session_id: Option<SessionId>,

    /// Event-specific data.
    #[serde(default)]
    pub params: Value,
}

impl Event {
    /// Returns the domain name from the method.
    #[inline]
    #[must_use]
    pub fn domain(&self) -> &str {
        self.method.split('.').next().unwrap_or_default()
    }

    /// Returns the event name from the method.
    #[inline]
    #[must_use]
    pub fn event_name(&self) -> &str {
        self.method.split('.').nth(1).unwrap_or_default()
    }

    /// Parses the event into a typed variant.
    #[must_use]
    pub fn parse(&self) -> ParsedEvent {
        match self.method.as_str() {
            "Network.requestIntercepted" => ParsedEvent::RequestIntercepted {
                interception_id: InterceptionId::new(self.get_string("interceptionId")),
                url: self
                    .params
                    .get("request")
                    .and_then(|v| v.get("url"))
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string(),
                is_download: self.get_bool("isDownload"),
            },

            "Target.detachedFromTarget" => ParsedEvent::DetachedFromTarget {
                session_id: SessionId::new(self.get_string("sessionId")),
            },

            _ => ParsedEvent::Unknown {
                method: self.method.clone(),
                params: self.params.clone(),
            },
        }
    }

    /// Gets a string from params.
    #[inline]
    fn get_string(&self, key: &str) -> String {
        self.params
            .get(key)
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string()
    }

    /// Gets a boolean from params.
    #[inline]
    fn get_bool(&self, key: &str) -> bool {
        self.params
            .get(key)
            .and_then(|v| v.as_bool())
            .unwrap_or_default()
    }
}

// ============================================================================
// ParsedEvent
// ============================================================================

/// Parsed event types for type-safe handling.
#[derive(Debug, Clone)]
pub enum ParsedEvent {
    /// A network exchange matching an armed pattern was paused.
    ///
    /// Immutable record correlating the interception identifier, the
    /// originating request URL, and whether the response is a download
    /// rather than a navigable document.
    RequestIntercepted {
        /// Interception identifier, unique per event.
        interception_id: InterceptionId,
        /// Originating request URL.
        url: String,
        /// Whether the response would be handed to the download manager.
        is_download: bool,
    },

    /// A session was detached from its target.
    DetachedFromTarget {
        /// The detached session.
        session_id: SessionId,
    },

    /// Unknown event type.
    Unknown {
        /// Event method.
        method: String,
        /// Event params.
        params: Value,
    },
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_intercepted_parsing() {
        let json_str = r#"{
            "method": "Network.requestIntercepted",
            "sessionId": "SESS",
            "params": {
                "interceptionId": "interception-job-1.0",
                "request": { "url": "https://example.com/reports/out.pdf" },
                "isDownload": true
            }
        }"#;

        let event: Event = serde_json::from_str(json_str).expect("parse event");
        assert_eq!(event.domain(), "Network");
        assert_eq!(event.event_name(), "requestIntercepted");

        match event.parse() {
            ParsedEvent::RequestIntercepted {
                interception_id,
                url,
                is_download,
            } => {
                assert_eq!(interception_id.as_str(), "interception-job-1.0");
                assert_eq!(url, "https://example.com/reports/out.pdf");
                assert!(is_download);
            }
            other => panic!("unexpected parsed event: {other:?}"),
        }
    }

    #[test]
    fn test_missing_is_download_defaults_to_false() {
        let json_str = r#"{
            "method": "Network.requestIntercepted",
            "params": {
                "interceptionId": "interception-job-2.0",
                "request": { "url": "https://example.com/page" }
            }
        }"#;

        let event: Event = serde_json::from_str(json_str).expect("parse event");
        match event.parse() {
            ParsedEvent::RequestIntercepted { is_download, .. } => assert!(!is_download),
            other => panic!("unexpected parsed event: {other:?}"),
        }
    }

    #[test]
    fn test_detached_from_target_parsing() {
        let json_str = r#"{
            "method": "Target.detachedFromTarget",
            "params": { "sessionId": "SESS" }
        }"#;

        let event: Event = serde_json::from_str(json_str).expect("parse event");
        match event.parse() {
            ParsedEvent::DetachedFromTarget { session_id } => {
                assert_eq!(session_id.as_str(), "SESS");
            }
            other => panic!("unexpected parsed event: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_event() {
        let json_str = r#"{
            "method": "Page.loadEventFired",
            "params": { "timestamp": 1.0 }
        }"#;

        let event: Event = serde_json::from_str(json_str).expect("parse event");
        match event.parse() {
            ParsedEvent::Unknown { method, .. } => {
                assert_eq!(method, "Page.loadEventFired");
            }
            other => panic!("expected Unknown variant, got {other:?}"),
        }
    }
}
