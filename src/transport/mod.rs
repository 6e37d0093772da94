//! WebSocket transport layer.
//!
//! This module handles communication with the browser's remote-debugging
//! endpoint.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐                              ┌─────────────────┐
//! │  Page (Rust)    │                              │  Browser        │
//! │                 │         WebSocket            │                 │
//! │  Connection     │◄────────────────────────────►│  Debugger       │
//! │  (event loop)   │     ws://host/devtools/...   │  endpoint       │
//! └─────────────────┘                              └─────────────────┘
//! ```
//!
//! # Connection Lifecycle
//!
//! 1. `Connection::connect` - Dial the browser's debugger URL
//! 2. `Connection::send` - Issue commands, receive correlated responses
//! 3. `Connection::subscribe` - Receive session-scoped events over a channel
//! 4. `Connection::shutdown` - Close the connection

// ============================================================================
// Submodules
// ============================================================================

/// WebSocket connection and event loop.
pub mod connection;

// ============================================================================
// Re-exports
// ============================================================================

pub use connection::Connection;
