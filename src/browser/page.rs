//! Page handle and in-page interaction methods.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::time::{sleep, timeout};
use tracing::debug;

use crate::browser::session::ControlSession;
use crate::error::{Error, Result};
use crate::identifiers::{SessionId, TargetId};
use crate::protocol::{Command, RuntimeCommand, TargetCommand};
use crate::transport::Connection;

// ============================================================================
// Constants
// ============================================================================

/// Default timeout for wait_for_selector (30 seconds).
const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(30);

/// Interval between selector polls.
const SELECTOR_POLL_INTERVAL: Duration = Duration::from_millis(100);

// ============================================================================
// Page
// ============================================================================

/// Internal shared state for a page.
struct PageInner {
    /// Connection to the debugger endpoint.
    connection: Connection,
    /// Page target ID.
    target_id: TargetId,
    /// Main session for page interaction.
    session_id: SessionId,
}

/// A handle to one already-loaded browser page.
///
/// Pages provide selector waiting, clicking, and the ability to attach
/// additional control sessions for network-level work.
#[derive(Clone)]
pub struct Page {
    inner: Arc<PageInner>,
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("target_id", &self.inner.target_id)
            .field("session_id", &self.inner.session_id)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Page - Constructors
// ============================================================================

impl Page {
    /// Connects to a debugger endpoint and attaches to a page target.
    ///
    /// # Arguments
    ///
    /// * `ws_url` - The browser's debugger WebSocket URL
    /// * `target_id` - The page target to attach to
    ///
    /// # Errors
    ///
    /// Returns a connection error if the endpoint is unreachable, or a
    /// protocol error if the target cannot be attached.
    pub async fn connect(ws_url: &str, target_id: TargetId) -> Result<Self> {
        let connection = Connection::connect(ws_url).await?;
        Self::attach(connection, target_id).await
    }

    /// Attaches to a page target over an existing connection.
    pub async fn attach(connection: Connection, target_id: TargetId) -> Result<Self> {
        let session_id = attach_session(&connection, &target_id).await?;
        debug!(%target_id, %session_id, "Attached to page target");

        Ok(Self {
            inner: Arc::new(PageInner {
                connection,
                target_id,
                session_id,
            }),
        })
    }
}

// ============================================================================
// Page - Accessors
// ============================================================================

impl Page {
    /// Returns the page target ID.
    #[inline]
    #[must_use]
    pub fn target_id(&self) -> &TargetId {
        &self.inner.target_id
    }

    /// Returns the main session ID.
    #[inline]
    #[must_use]
    pub fn session_id(&self) -> &SessionId {
        &self.inner.session_id
    }
}

// ============================================================================
// Page - Sessions
// ============================================================================

impl Page {
    /// Attaches a dedicated control session to this page.
    ///
    /// The returned session is exclusively owned by its caller and must
    /// be detached when the work it was created for ends. It is separate
    /// from the page's main session, so network-level work does not
    /// interfere with page interaction.
    pub async fn create_session(&self) -> Result<ControlSession> {
        let session_id = attach_session(&self.inner.connection, &self.inner.target_id).await?;
        debug!(target_id = %self.inner.target_id, %session_id, "Created control session");

        Ok(ControlSession::new(
            self.inner.connection.clone(),
            session_id,
        ))
    }
}

// ============================================================================
// Page - Interaction
// ============================================================================

impl Page {
    /// Waits for an element matching a CSS selector to appear.
    ///
    /// Polls the page until the selector matches. Times out after 30
    /// seconds.
    pub async fn wait_for_selector(&self, selector: &str) -> Result<()> {
        self.wait_for_selector_timeout(selector, DEFAULT_WAIT_TIMEOUT)
            .await
    }

    /// Waits for an element matching a CSS selector with a custom timeout.
    pub async fn wait_for_selector_timeout(
        &self,
        selector: &str,
        wait_timeout: Duration,
    ) -> Result<()> {
        debug!(
            target_id = %self.inner.target_id,
            selector,
            timeout_ms = wait_timeout.as_millis() as u64,
            "Waiting for selector"
        );

        let expression = format!("document.querySelector({}) !== null", js_string(selector));

        let poll = async {
            loop {
                let value = self.evaluate(&expression).await?;
                if value.as_bool() == Some(true) {
                    return Ok(());
                }
                sleep(SELECTOR_POLL_INTERVAL).await;
            }
        };

        match timeout(wait_timeout, poll).await {
            Ok(result) => result,
            Err(_) => Err(Error::timeout(
                format!("wait_for_selector({selector})"),
                wait_timeout.as_millis() as u64,
            )),
        }
    }

    /// Clicks the first element matching a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ElementNotFound`] if the selector matches no
    /// element at click time.
    pub async fn click(&self, selector: &str) -> Result<()> {
        debug!(target_id = %self.inner.target_id, selector, "Clicking element");

        let expression = format!(
            "(() => {{ const el = document.querySelector({}); if (el === null) return false; el.click(); return true; }})()",
            js_string(selector)
        );

        let value = self.evaluate(&expression).await?;
        if value.as_bool() == Some(true) {
            Ok(())
        } else {
            Err(Error::element_not_found(selector))
        }
    }

    /// Evaluates a JavaScript expression in the page, returning its value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ScriptError`] if the expression throws.
    pub async fn evaluate(&self, expression: &str) -> Result<Value> {
        let command = Command::Runtime(RuntimeCommand::Evaluate {
            expression: expression.to_string(),
            return_by_value: true,
        });

        let response = self
            .inner
            .connection
            .send(Some(self.inner.session_id.clone()), command)
            .await?;
        let result = response.into_result()?;

        if let Some(details) = result.get("exceptionDetails") {
            return Err(Error::script_error(exception_text(details)));
        }

        Ok(result
            .get("result")
            .and_then(|r| r.get("value"))
            .cloned()
            .unwrap_or(Value::Null))
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Attaches a flat session to a target and returns its session ID.
async fn attach_session(connection: &Connection, target_id: &TargetId) -> Result<SessionId> {
    let command = Command::Target(TargetCommand::AttachToTarget {
        target_id: target_id.clone(),
        flatten: true,
    });

    let response = connection.send(None, command).await?;
    let result = response.into_result()?;

    let session_id = result
        .get("sessionId")
        .and_then(|v| v.as_str())
        .ok_or_else(|| Error::protocol("No sessionId in attach response"))?;

    Ok(SessionId::new(session_id))
}

/// Renders a string as a JavaScript string literal.
fn js_string(value: &str) -> String {
    Value::String(value.to_string()).to_string()
}

/// Extracts a human-readable message from an exceptionDetails object.
fn exception_text(details: &Value) -> String {
    details
        .get("exception")
        .and_then(|e| e.get("description"))
        .or_else(|| details.get("text"))
        .and_then(|v| v.as_str())
        .unwrap_or("Evaluation failed")
        .to_string()
}

// ============================================================================
// Tests
// ============================================================================
