//! CDP Capture - In-page download capture over the DevTools Protocol.
//!
//! This library attaches to an already-running Chromium-family browser
//! page and captures the files the page would hand to the operating
//! system's download manager, using the browser's low-level inspection
//! protocol rather than the filesystem. It also ships the declarative
//! CAPTCHA-solving credential record a workflow-automation host registers
//! alongside the browser capability.
//!
//! # Architecture
//!
//! The crate follows a client model against the browser's debugger
//! endpoint:
//!
//! - **Local End (Rust)**: Sends commands, receives responses and events
//!   over one WebSocket connection
//! - **Remote End (Browser)**: Executes commands, pushes network events
//!
//! Key design principles:
//!
//! - Each capture operation owns a dedicated [`ControlSession`], detached
//!   on every exit path
//! - Protocol uses `Domain.methodName` format (DevTools)
//! - Intercepted downloads are drained as protocol streams and aborted,
//!   so the page never performs the download itself
//! - Event-driven: interception events arrive over a channel, each
//!   download spawning a tracked capture task
//!
//! # Quick Start
//!
//! ```no_run
//! use cdp_capture::{DownloadOptions, Page, Result, TargetId};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     // Attach to an already-loaded page
//!     let page = Page::connect(
//!         "ws://127.0.0.1:9222/devtools/browser/abc",
//!         TargetId::new("E2F1..."),
//!     )
//!     .await?;
//!
//!     // Capture whatever the export button downloads
//!     let files = page
//!         .capture_downloads(DownloadOptions::new().click_selector("#export"))
//!         .await?;
//!
//!     for file in files {
//!         println!("{}: {} bytes", file.file_name, file.content.len());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`browser`] | Page and session handles: [`Page`], [`ControlSession`] |
//! | [`capture`] | Download capture: [`DownloadOptions`], [`CapturedFile`] |
//! | [`credentials`] | Declarative credential records for the host |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`protocol`] | DevTools message types (internal) |
//! | [`transport`] | WebSocket transport layer (internal) |

// ============================================================================
// Modules
// ============================================================================

/// Browser entities: Page, ControlSession.
///
/// This module contains the handles for working against a running page:
///
/// - [`Page`] - Handle to one already-loaded page
/// - [`ControlSession`] - Exclusive session for network-level work
pub mod browser;

/// Download capture via response interception.
///
/// Use [`Page::capture_downloads`] with [`DownloadOptions`].
pub mod capture;

/// Credential definitions consumed by the workflow host.
pub mod credentials;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers for protocol entities.
///
/// Newtype wrappers prevent mixing incompatible IDs at compile time.
pub mod identifiers;

/// DevTools protocol message types.
///
/// Internal module defining command/response/event structures.
pub mod protocol;

/// WebSocket transport layer.
///
/// Internal module handling the debugger connection.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Browser types
pub use browser::{ControlSession, Page, StreamChunk};

// Capture types
pub use capture::{CapturedFile, DownloadOptions};

// Credential types
pub use credentials::{CredentialProperty, CredentialType, TypeOptions, two_captcha_api};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{CommandId, InterceptionId, SessionId, StreamHandle, TargetId};
