//! Type-safe identifiers for protocol entities.
//!
//! Newtype wrappers prevent mixing incompatible IDs at compile time.
//!
//! | Type | Wraps | Source |
//! |------|-------|--------|
//! | [`CommandId`] | `u64` | Generated locally, monotonic |
//! | [`SessionId`] | `String` | `Target.attachToTarget` result |
//! | [`TargetId`] | `String` | Caller / target discovery |
//! | [`InterceptionId`] | `String` | `Network.requestIntercepted` event |
//! | [`StreamHandle`] | `String` | `Network.takeResponseBodyForInterceptionAsStream` result |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

// ============================================================================
// CommandId
// ============================================================================

/// Monotonic counter for command IDs.
///
/// The DevTools protocol correlates responses to commands by an integer
/// `id` that must be unique within a connection. A process-wide counter
/// satisfies that for any number of connections.
static NEXT_COMMAND_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for command/response correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandId(u64);

impl CommandId {
    /// Generates the next command ID.
    #[inline]
    #[must_use]
    pub fn generate() -> Self {
        Self(NEXT_COMMAND_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Creates a command ID from a raw value.
    #[inline]
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw value.
    #[inline]
    #[must_use]
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// String Identifiers
// ============================================================================

/// Declares a string-backed identifier newtype.
macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier.
            #[inline]
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Returns the identifier as a string slice.
            #[inline]
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id! {
    /// Identifier of an attached protocol session.
    ///
    /// Obtained from `Target.attachToTarget` and carried in the
    /// `sessionId` field of every session-scoped message.
    SessionId
}

string_id! {
    /// Identifier of a page target.
    TargetId
}

string_id! {
    /// Identifier correlating one intercepted request across the
    /// take-body / continue / abort round-trips.
    ///
    /// Unique per interception event; never reused within a session.
    InterceptionId
}

string_id! {
    /// Handle for incremental retrieval of a response body.
    StreamHandle
}

// ============================================================================
// Tests
// ============================================================================
