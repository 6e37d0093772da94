//! Download capture via response interception.
//!
//! A page that hands a file to the browser's download manager never
//! exposes its bytes to scripts. This module captures such files anyway:
//! it pauses matching responses at the headers-received stage, drains
//! each body through a protocol stream, and aborts the paused request so
//! the download manager never runs. The bytes stay in memory.
//!
//! # Module Structure
//!
//! | Module | Description |
//! |--------|-------------|
//! | `downloader` | Capture flow, options, captured-file type |
//! | `chunks` | Encoded chunk accumulation and final decode |
//! | `file_name` | File-name derivation from request URLs |
//!
//! # Example
//!
//! ```no_run
//! use cdp_capture::{DownloadOptions, Page, Result, TargetId};
//!
//! # async fn example() -> Result<()> {
//! let page = Page::connect("ws://127.0.0.1:9222/devtools/browser/abc", TargetId::new("E2F1"))
//!     .await?;
//!
//! let files = page
//!     .capture_downloads(
//!         DownloadOptions::new()
//!             .wait_for_selector("#report-ready")
//!             .click_selector("#export"),
//!     )
//!     .await?;
//!
//! for file in files {
//!     println!("{}: {} bytes", file.file_name, file.content.len());
//! }
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

mod chunks;
mod downloader;
mod file_name;

// ============================================================================
// Re-exports
// ============================================================================

pub use downloader::{CapturedFile, DownloadOptions};
