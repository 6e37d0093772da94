//! End-to-end capture tests against a scripted debugger endpoint.
//!
//! Each test spawns an in-process WebSocket server that speaks enough of
//! the DevTools protocol to play one scenario, then drives the public
//! API against it.

use std::time::Duration;

use anyhow::Result;
use cdp_capture::{DownloadOptions, Error, Page, TargetId};

use mock::{MockBehavior, MockDownload};

// ============================================================================
// Mock Debugger Endpoint
// ============================================================================

mod mock {
    use std::collections::{HashMap, VecDeque};
    use std::sync::Arc;

    use futures_util::{SinkExt, StreamExt};
    use parking_lot::Mutex;
    use serde_json::{Value, json};
    use tokio::net::{TcpListener, TcpStream};
    use tokio_tungstenite::WebSocketStream;
    use tokio_tungstenite::tungstenite::Message;

    /// One download the endpoint will offer for interception.
    #[derive(Clone)]
    pub struct MockDownload {
        pub url: String,
        pub is_download: bool,
        /// Body chunks served one per `IO.read`, already base64-encoded.
        pub chunks: Vec<String>,
    }

    /// Scenario configuration for one endpoint.
    #[derive(Clone)]
    pub struct MockBehavior {
        /// Whether selector polls report the element present.
        pub selector_present: bool,
        /// Whether a click finds its target.
        pub click_succeeds: bool,
        /// Interception events the endpoint emits.
        pub downloads: Vec<MockDownload>,
        /// Emit events on click rather than as soon as interception arms.
        pub emit_on_click: bool,
    }

    impl Default for MockBehavior {
        fn default() -> Self {
            Self {
                selector_present: true,
                click_succeeds: true,
                downloads: Vec::new(),
                emit_on_click: false,
            }
        }
    }

    /// Everything the endpoint observed, for assertions.
    #[derive(Default)]
    pub struct MockLog {
        pub network_enabled: bool,
        pub armed_patterns: Vec<Value>,
        /// `(interceptionId, errorReason)` per continueInterceptedRequest.
        pub continues: Vec<(String, Option<String>)>,
        pub detach_count: usize,
    }

    pub struct MockBrowser {
        pub ws_url: String,
        pub log: Arc<Mutex<MockLog>>,
    }

    /// Spawns an endpoint serving one connection with the given behavior.
    pub async fn spawn(behavior: MockBehavior) -> MockBrowser {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock endpoint");
        let port = listener.local_addr().expect("local addr").port();
        let log = Arc::new(Mutex::new(MockLog::default()));

        let log_clone = Arc::clone(&log);
        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.expect("accept");
            let ws = tokio_tungstenite::accept_async(stream)
                .await
                .expect("websocket upgrade");
            serve(ws, behavior, log_clone).await;
        });

        MockBrowser {
            ws_url: format!("ws://127.0.0.1:{port}"),
            log,
        }
    }

    async fn serve(
        mut ws: WebSocketStream<TcpStream>,
        behavior: MockBehavior,
        log: Arc<Mutex<MockLog>>,
    ) {
        let mut session_counter = 0u32;
        let mut stream_counter = 0u32;
        let mut streams: HashMap<String, VecDeque<String>> = HashMap::new();
        let mut intercept_session: Option<String> = None;
        let mut emitted = false;

        while let Some(message) = ws.next().await {
            let text = match message {
                Ok(Message::Text(text)) => text,
                Ok(Message::Close(_)) | Err(_) => break,
                Ok(_) => continue,
            };

            let request: Value = serde_json::from_str(&text).expect("parse request");
            let id = request["id"].clone();
            let session = request["sessionId"].as_str().map(str::to_string);
            let method = request["method"].as_str().unwrap_or_default().to_string();
            let params = request["params"].clone();

            let result = match method.as_str() {
                "Target.attachToTarget" => {
                    session_counter += 1;
                    json!({ "sessionId": format!("SESSION-{session_counter}") })
                }

                "Target.detachFromTarget" => {
                    log.lock().detach_count += 1;
                    json!({})
                }

                "Network.enable" => {
                    log.lock().network_enabled = true;
                    json!({})
                }

                "Network.setRequestInterception" => {
                    log.lock().armed_patterns.push(params["patterns"].clone());
                    intercept_session = session.clone();

                    respond(&mut ws, &id, session.as_deref(), json!({})).await;
                    if !behavior.emit_on_click && !emitted {
                        emitted = true;
                        emit_interceptions(&mut ws, &behavior, intercept_session.as_deref()).await;
                    }
                    continue;
                }

                "Runtime.evaluate" => {
                    let expression = params["expression"].as_str().unwrap_or_default();
                    if expression.contains("!== null") {
                        json!({ "result": { "type": "boolean", "value": behavior.selector_present } })
                    } else {
                        let clicked = behavior.click_succeeds;
                        respond(
                            &mut ws,
                            &id,
                            session.as_deref(),
                            json!({ "result": { "type": "boolean", "value": clicked } }),
                        )
                        .await;
                        if clicked && behavior.emit_on_click && !emitted {
                            emitted = true;
                            emit_interceptions(&mut ws, &behavior, intercept_session.as_deref())
                                .await;
                        }
                        continue;
                    }
                }

                "Network.takeResponseBodyForInterceptionAsStream" => {
                    let interception_id = params["interceptionId"].as_str().expect("interceptionId");
                    let index: usize = interception_id
                        .trim_start_matches("int-")
                        .parse()
                        .expect("interception index");

                    stream_counter += 1;
                    let handle = format!("stream-{stream_counter}");
                    streams.insert(handle.clone(), behavior.downloads[index].chunks.clone().into());
                    json!({ "stream": handle })
                }

                "IO.read" => {
                    let handle = params["handle"].as_str().expect("handle");
                    match streams.get_mut(handle).and_then(VecDeque::pop_front) {
                        Some(data) => {
                            json!({ "data": data, "base64Encoded": true, "eof": false })
                        }
                        None => json!({ "data": "", "eof": true }),
                    }
                }

                "Network.continueInterceptedRequest" => {
                    log.lock().continues.push((
                        params["interceptionId"]
                            .as_str()
                            .unwrap_or_default()
                            .to_string(),
                        params["errorReason"].as_str().map(str::to_string),
                    ));
                    json!({})
                }

                _ => json!({}),
            };

            respond(&mut ws, &id, session.as_deref(), result).await;
        }
    }

    async fn respond(
        ws: &mut WebSocketStream<TcpStream>,
        id: &Value,
        session: Option<&str>,
        result: Value,
    ) {
        let mut response = json!({ "id": id, "result": result });
        if let Some(session) = session {
            response["sessionId"] = json!(session);
        }

        let text = response.to_string();
        ws.send(Message::Text(text.into())).await.expect("send response");
    }

    async fn emit_interceptions(
        ws: &mut WebSocketStream<TcpStream>,
        behavior: &MockBehavior,
        session: Option<&str>,
    ) {
        for (index, download) in behavior.downloads.iter().enumerate() {
            let event = json!({
                "method": "Network.requestIntercepted",
                "sessionId": session,
                "params": {
                    "interceptionId": format!("int-{index}"),
                    "request": { "url": download.url },
                    "isDownload": download.is_download,
                }
            });

            let text = event.to_string();
            ws.send(Message::Text(text.into())).await.expect("send event");
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Short settle window: the mock answers immediately.
const SETTLE: Duration = Duration::from_millis(500);

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

async fn connect_page(endpoint: &mock::MockBrowser) -> Result<Page> {
    init_tracing();
    Ok(Page::connect(&endpoint.ws_url, TargetId::new("page-1")).await?)
}

fn base64_download(url: &str, chunks: &[&str]) -> MockDownload {
    MockDownload {
        url: url.to_string(),
        is_download: true,
        chunks: chunks.iter().map(|c| (*c).to_string()).collect(),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_no_matching_traffic_yields_empty_list() -> Result<()> {
    let endpoint = mock::spawn(MockBehavior::default()).await;
    let page = connect_page(&endpoint).await?;

    let files = page
        .capture_downloads(DownloadOptions::new().settle_timeout(SETTLE))
        .await?;

    assert!(files.is_empty());

    let log = endpoint.log.lock();
    assert!(log.network_enabled);
    assert_eq!(log.detach_count, 1);
    Ok(())
}

#[tokio::test]
async fn test_default_pattern_arms_single_match_all_rule() -> Result<()> {
    let endpoint = mock::spawn(MockBehavior::default()).await;
    let page = connect_page(&endpoint).await?;

    page.capture_downloads(DownloadOptions::new().settle_timeout(SETTLE))
        .await?;

    let log = endpoint.log.lock();
    assert_eq!(log.armed_patterns.len(), 1);

    let patterns = log.armed_patterns[0].as_array().expect("patterns array");
    assert_eq!(patterns.len(), 1);
    assert_eq!(patterns[0]["urlPattern"], "*");
    assert_eq!(patterns[0]["interceptionStage"], "HeadersReceived");
    Ok(())
}

#[tokio::test]
async fn test_click_triggered_download_is_captured() -> Result<()> {
    // Body chunks split mid-quantum: "Y" + "TVk" decodes to b"a5d".
    let endpoint = mock::spawn(MockBehavior {
        emit_on_click: true,
        downloads: vec![base64_download(
            "https://example.com/export/data.csv",
            &["Y", "TVk", ""],
        )],
        ..MockBehavior::default()
    })
    .await;
    let page = connect_page(&endpoint).await?;

    let files = page
        .capture_downloads(
            DownloadOptions::new()
                .click_selector("#export")
                .settle_timeout(SETTLE),
        )
        .await?;

    assert_eq!(files.len(), 1);
    assert_eq!(files[0].file_name, "data.csv");
    assert_eq!(files[0].content, b"a5d");

    let log = endpoint.log.lock();
    assert_eq!(log.detach_count, 1);
    // The captured request was resolved with an abort outcome.
    assert_eq!(
        log.continues,
        vec![("int-0".to_string(), Some("Aborted".to_string()))]
    );
    Ok(())
}

#[tokio::test]
async fn test_result_preserves_registration_order() -> Result<()> {
    // The first download needs several stream reads, the second one; the
    // result order must follow event order either way.
    let endpoint = mock::spawn(MockBehavior {
        downloads: vec![
            base64_download(
                "https://example.com/reports/first.pdf",
                &["YWJj", "ZGVm", "Z2hp", "amts"],
            ),
            base64_download("https://example.com/reports/second.pdf", &["eHl6"]),
        ],
        ..MockBehavior::default()
    })
    .await;
    let page = connect_page(&endpoint).await?;

    let files = page
        .capture_downloads(DownloadOptions::new().settle_timeout(SETTLE))
        .await?;

    assert_eq!(files.len(), 2);
    assert_eq!(files[0].file_name, "first.pdf");
    assert_eq!(files[0].content, b"abcdefghijkl");
    assert_eq!(files[1].file_name, "second.pdf");
    assert_eq!(files[1].content, b"xyz");
    Ok(())
}

#[tokio::test]
async fn test_non_download_traffic_continues_unmodified() -> Result<()> {
    let endpoint = mock::spawn(MockBehavior {
        downloads: vec![MockDownload {
            url: "https://example.com/app/page".to_string(),
            is_download: false,
            chunks: Vec::new(),
        }],
        ..MockBehavior::default()
    })
    .await;
    let page = connect_page(&endpoint).await?;

    let files = page
        .capture_downloads(DownloadOptions::new().settle_timeout(SETTLE))
        .await?;

    assert!(files.is_empty());

    let log = endpoint.log.lock();
    // Continued once, with no error reason.
    assert_eq!(log.continues, vec![("int-0".to_string(), None)]);
    assert_eq!(log.detach_count, 1);
    Ok(())
}

#[tokio::test]
async fn test_url_without_path_segment_uses_fallback_name() -> Result<()> {
    let endpoint = mock::spawn(MockBehavior {
        downloads: vec![base64_download("https://example.com", &["eHl6"])],
        ..MockBehavior::default()
    })
    .await;
    let page = connect_page(&endpoint).await?;

    let files = page
        .capture_downloads(DownloadOptions::new().settle_timeout(SETTLE))
        .await?;

    assert_eq!(files.len(), 1);
    assert_eq!(files[0].file_name, "downloaded_file");
    Ok(())
}

#[tokio::test]
async fn test_missing_wait_selector_fails_with_timeout() -> Result<()> {
    let endpoint = mock::spawn(MockBehavior {
        selector_present: false,
        ..MockBehavior::default()
    })
    .await;
    let page = connect_page(&endpoint).await?;

    let error = page
        .capture_downloads(
            DownloadOptions::new()
                .wait_for_selector("#never")
                .wait_timeout(Duration::from_millis(250))
                .settle_timeout(SETTLE),
        )
        .await
        .expect_err("capture should fail");

    assert!(error.is_timeout(), "unexpected error: {error}");

    // Teardown still ran exactly once.
    let log = endpoint.log.lock();
    assert_eq!(log.detach_count, 1);
    Ok(())
}

#[tokio::test]
async fn test_missing_click_target_fails_without_captures() -> Result<()> {
    let endpoint = mock::spawn(MockBehavior {
        click_succeeds: false,
        ..MockBehavior::default()
    })
    .await;
    let page = connect_page(&endpoint).await?;

    let error = page
        .capture_downloads(
            DownloadOptions::new()
                .click_selector("#gone")
                .settle_timeout(SETTLE),
        )
        .await
        .expect_err("capture should fail");

    assert!(
        matches!(error, Error::ElementNotFound { .. }),
        "unexpected error: {error}"
    );

    let log = endpoint.log.lock();
    assert_eq!(log.detach_count, 1);
    Ok(())
}

#[tokio::test]
async fn test_wait_then_click_flow() -> Result<()> {
    let endpoint = mock::spawn(MockBehavior {
        emit_on_click: true,
        downloads: vec![base64_download(
            "https://example.com/reports/out.pdf",
            &["cGRm"],
        )],
        ..MockBehavior::default()
    })
    .await;
    let page = connect_page(&endpoint).await?;

    let files = page
        .capture_downloads(
            DownloadOptions::new()
                .wait_for_selector("#report-ready")
                .click_selector("#export")
                .settle_timeout(SETTLE),
        )
        .await?;

    assert_eq!(files.len(), 1);
    assert_eq!(files[0].file_name, "out.pdf");
    assert_eq!(files[0].content, b"pdf");
    Ok(())
}
