//! Download capture via response interception.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::browser::{ControlSession, Page};
use crate::capture::chunks::ChunkAssembler;
use crate::capture::file_name::file_name_from_url;
use crate::error::{Error, Result};
use crate::identifiers::InterceptionId;
use crate::protocol::{Event, ParsedEvent};

// ============================================================================
// Constants
// ============================================================================

/// Default settle window after triggering a download.
const DEFAULT_SETTLE_TIMEOUT: Duration = Duration::from_millis(3000);

/// Default bound for the wait-selector phase.
const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(30);

/// Pattern matching all traffic.
const MATCH_ALL_PATTERN: &str = "*";

// ============================================================================
// Types
// ============================================================================

/// Capture tasks in flight, in registration order.
type PendingCaptures = Arc<Mutex<Vec<JoinHandle<Result<CapturedFile>>>>>;

// ============================================================================
// DownloadOptions
// ============================================================================

/// Configuration for one download-capture operation.
///
/// # Example
///
/// ```ignore
/// use std::time::Duration;
/// use cdp_capture::DownloadOptions;
///
/// let options = DownloadOptions::new()
///     .wait_for_selector("#report-ready")
///     .click_selector("#export")
///     .settle_timeout(Duration::from_secs(5));
/// ```
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    /// Selector to click to trigger the download.
    pub click_selector: Option<String>,

    /// Selector that must appear before acting.
    pub wait_for_selector: Option<String>,

    /// Fixed wait after triggering, giving in-flight requests time to be
    /// intercepted. A heuristic upper bound, not a completion signal.
    pub settle_timeout: Duration,

    /// Bound for the wait-selector phase.
    pub wait_timeout: Duration,

    /// URL glob selecting which traffic is intercepted.
    pub url_pattern: String,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            click_selector: None,
            wait_for_selector: None,
            settle_timeout: DEFAULT_SETTLE_TIMEOUT,
            wait_timeout: DEFAULT_WAIT_TIMEOUT,
            url_pattern: MATCH_ALL_PATTERN.to_string(),
        }
    }
}

impl DownloadOptions {
    /// Creates options with defaults: no selectors, 3 s settle window,
    /// match-everything pattern.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the selector to click to trigger the download.
    #[must_use]
    pub fn click_selector(mut self, selector: impl Into<String>) -> Self {
        self.click_selector = Some(selector.into());
        self
    }

    /// Sets the selector that must appear before acting.
    #[must_use]
    pub fn wait_for_selector(mut self, selector: impl Into<String>) -> Self {
        self.wait_for_selector = Some(selector.into());
        self
    }

    /// Sets the settle window.
    #[must_use]
    pub fn settle_timeout(mut self, timeout: Duration) -> Self {
        self.settle_timeout = timeout;
        self
    }

    /// Sets the bound for the wait-selector phase.
    #[must_use]
    pub fn wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout = timeout;
        self
    }

    /// Sets the URL pattern selecting which traffic is intercepted.
    #[must_use]
    pub fn url_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.url_pattern = pattern.into();
        self
    }
}

// ============================================================================
// CapturedFile
// ============================================================================

/// A download captured in memory: derived name plus raw bytes.
///
/// Ownership transfers to the caller; nothing is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedFile {
    /// Name derived from the request URL's final path segment.
    pub file_name: String,

    /// Raw response body.
    pub content: Vec<u8>,
}

// ============================================================================
// Page - Download Capture
// ============================================================================

impl Page {
    /// Captures the downloads a page would hand to the download manager.
    ///
    /// Attaches a dedicated control session, arms response interception
    /// for the configured pattern, optionally waits for and clicks a
    /// selector, then collects every intercepted download body observed
    /// within the settle window. Captured requests are aborted so the
    /// page never performs the download itself; intercepted traffic that
    /// is not a download proceeds unmodified.
    ///
    /// Returns the captured files in the order their downloads were
    /// intercepted. No matching download traffic yields an empty list,
    /// not an error. Any single capture failing fails the whole batch.
    ///
    /// The control session is detached on every exit path; a detach
    /// failure is logged and swallowed, never replacing the primary
    /// outcome.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let files = page
    ///     .capture_downloads(DownloadOptions::new().click_selector("#export"))
    ///     .await?;
    /// for file in files {
    ///     println!("{}: {} bytes", file.file_name, file.content.len());
    /// }
    /// ```
    pub async fn capture_downloads(&self, options: DownloadOptions) -> Result<Vec<CapturedFile>> {
        debug!(
            target_id = %self.target_id(),
            url_pattern = %options.url_pattern,
            "Starting download capture"
        );

        let session = self.create_session().await?;
        let pending: PendingCaptures = Arc::new(Mutex::new(Vec::new()));

        // Subscribe before arming so no event can slip past the worker.
        let events = session.subscribe_events();
        let worker = tokio::spawn(intercept_worker(
            session.clone(),
            events,
            Arc::clone(&pending),
        ));

        let result = run_capture(self, &session, &options, &pending).await;

        worker.abort();
        if result.is_err() {
            // Abandon captures the failed operation will never await.
            for task in pending.lock().drain(..) {
                task.abort();
            }
        }

        if let Err(error) = session.detach().await {
            warn!(%error, "Failed to detach control session");
        }

        result
    }
}

// ============================================================================
// Capture Flow
// ============================================================================

/// Runs the capture flow against an acquired session.
///
/// Split out so the caller can release the session on every outcome.
async fn run_capture(
    page: &Page,
    session: &ControlSession,
    options: &DownloadOptions,
    pending: &PendingCaptures,
) -> Result<Vec<CapturedFile>> {
    session.enable_network().await?;
    session.set_request_interception(&options.url_pattern).await?;

    if let Some(selector) = &options.wait_for_selector {
        page.wait_for_selector_timeout(selector, options.wait_timeout)
            .await?;
    }

    if let Some(selector) = &options.click_selector {
        page.click(selector).await?;
    }

    // Settle window: gives in-flight requests time to be intercepted and
    // their capture tasks to be registered.
    sleep(options.settle_timeout).await;

    let tasks: Vec<_> = pending.lock().drain(..).collect();
    debug!(count = tasks.len(), "Awaiting pending captures");

    let mut files = Vec::with_capacity(tasks.len());
    for joined in join_all(tasks).await {
        let file = joined.map_err(|e| Error::capture_task(e.to_string()))??;
        files.push(file);
    }

    Ok(files)
}

/// Drains the session's event feed, spawning one tracked capture task
/// per intercepted download and continuing everything else unmodified.
///
/// Ends when the feed closes (session detach) or the task is aborted.
async fn intercept_worker(
    session: ControlSession,
    mut events: mpsc::UnboundedReceiver<Event>,
    pending: PendingCaptures,
) {
    while let Some(event) = events.recv().await {
        let ParsedEvent::RequestIntercepted {
            interception_id,
            url,
            is_download,
        } = event.parse()
        else {
            continue;
        };

        if is_download {
            let file_name = file_name_from_url(&url);
            debug!(%interception_id, %file_name, %url, "Download intercepted");

            let task = tokio::spawn(capture_file(
                session.clone(),
                interception_id,
                file_name,
            ));

            // Registered before resolution so the main flow can await it.
            pending.lock().push(task);
        } else if let Err(error) = session.continue_request(&interception_id).await {
            warn!(%interception_id, %error, "Failed to continue intercepted request");
        }
    }
}

/// Captures one intercepted download body.
///
/// Takes the response body as a stream, reads it to exhaustion, decodes
/// the concatenation, then aborts the intercepted request as the
/// terminal protocol step so the page does not perform the download.
async fn capture_file(
    session: ControlSession,
    interception_id: InterceptionId,
    file_name: String,
) -> Result<CapturedFile> {
    let stream = session.take_response_body_stream(&interception_id).await?;

    let mut assembler = ChunkAssembler::new();
    loop {
        let chunk = session.read_stream_chunk(&stream).await?;
        if chunk.eof {
            break;
        }
        assembler.push(&chunk);
    }
    let content = assembler.finish()?;

    session.abort_request(&interception_id).await?;

    debug!(%file_name, bytes = content.len(), "Capture complete");
    Ok(CapturedFile { file_name, content })
}

// ============================================================================
// Tests
// ============================================================================
