use face_scan_submit::config::Config;
use face_scan_submit::infrastructure::ReqwestTransport;
use face_scan_submit::logger;
use face_scan_submit::models::{CompletionReport, SessionResultSnapshot, SessionStatus};
use face_scan_submit::orchestrator::SessionRunner;
use face_scan_submit::services::{CompletionSink, InMemoryEnrollmentStore};
use mockito::{Matcher, Server};
use serde_json::json;
use std::sync::{Arc, Mutex};
use tokio_test::assert_ok;

/// 收集完成报告的接收方
#[derive(Default)]
struct CollectingSink {
    reports: Mutex<Vec<CompletionReport>>,
}

impl CompletionSink for CollectingSink {
    fn on_complete(&self, report: &CompletionReport) {
        self.reports.lock().unwrap().push(report.clone());
    }
}

fn runner_for(base_url: &str, sink: Arc<CollectingSink>) -> SessionRunner {
    let config = Config {
        base_url: base_url.to_string(),
        device_key_identifier: "integration-key".to_string(),
        connect_timeout_secs: 2,
        upload_chunk_size: 64,
        ..Config::default()
    };
    let transport = assert_ok!(ReqwestTransport::new(&config));
    SessionRunner::new(config, Arc::new(transport), sink)
}

fn captured_session(session_id: &str) -> SessionResultSnapshot {
    SessionResultSnapshot::completed(session_id, "ZmFjZXNjYW4tYnl0ZXM=")
        .with_audit_trail("YXVkaXQ=", "bG93")
}

#[tokio::test]
async fn test_processed_scan_completes_enrollment() {
    logger::init();

    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/enrollment-3d")
        .match_header("x-device-key", "integration-key")
        .match_header("content-type", "application/json")
        .match_header(
            "x-user-agent",
            Matcher::Regex(r"^face-scan-submit/.+\|integration-key\|sess-ok$".to_string()),
        )
        .match_body(Matcher::PartialJson(json!({
            "faceScan": "ZmFjZXNjYW4tYnl0ZXM=",
            "auditTrailImage": "YXVkaXQ=",
            "lowQualityAuditTrailImage": "bG93",
            "sessionId": "sess-ok",
            "externalDatabaseRefID": "user-1"
        })))
        .with_status(200)
        .with_body(r#"{"wasProcessed":true,"error":false,"scanResultBlob":"blob-1","callData":{"tid":"t-1"}}"#)
        .create_async()
        .await;

    let sink = Arc::new(CollectingSink::default());
    let runner = runner_for(&server.url(), sink.clone());
    let enrollment = Arc::new(InMemoryEnrollmentStore::with_identifier("it_", "user-1"));

    let report = runner
        .run(captured_session("sess-ok"), enrollment.clone(), 1)
        .await
        .expect("应该产出完成报告");

    mock.assert_async().await;
    assert!(report.success);
    assert_eq!(report.transport_status, 200);
    assert_eq!(report.continuation_data, Some(json!({"tid": "t-1"})));
    assert_eq!(report.session_id.as_deref(), Some("sess-ok"));
    assert_eq!(enrollment.pending_identifier().as_deref(), Some("user-1"));
    assert_eq!(sink.reports.lock().unwrap().as_slice(), &[report]);
}

#[tokio::test]
async fn test_rejected_scan_clears_identifier() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/enrollment-3d")
        .with_status(200)
        .with_body(r#"{"wasProcessed":false,"error":true,"errorMessage":"Liveness was not proven."}"#)
        .create_async()
        .await;

    let sink = Arc::new(CollectingSink::default());
    let runner = runner_for(&server.url(), sink.clone());
    let enrollment = Arc::new(InMemoryEnrollmentStore::new("it_"));

    let report = runner
        .run(captured_session("sess-reject"), enrollment.clone(), 2)
        .await
        .expect("应该产出完成报告");

    assert!(!report.success);
    assert_eq!(report.cancel_reason.as_deref(), Some("Liveness was not proven."));
    assert!(enrollment.pending_identifier().is_none());
    assert_eq!(sink.reports.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_unreadable_response_is_reported_as_failure() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/enrollment-3d")
        .with_status(502)
        .with_body("<html>Bad Gateway</html>")
        .create_async()
        .await;

    let sink = Arc::new(CollectingSink::default());
    let runner = runner_for(&server.url(), sink);

    let report = runner
        .run(captured_session("sess-502"), Arc::new(InMemoryEnrollmentStore::new("it_")), 3)
        .await
        .expect("应该产出完成报告");

    assert!(!report.success);
    assert_eq!(report.transport_status, 502);
    assert_eq!(
        report.cancel_reason.as_deref(),
        Some("Exception while handling API response, cancelling out.")
    );
}

#[tokio::test]
async fn test_unreachable_server_is_reported_as_failure() {
    let sink = Arc::new(CollectingSink::default());
    let runner = runner_for("http://127.0.0.1:1", sink);

    let report = runner
        .run(captured_session("sess-offline"), Arc::new(InMemoryEnrollmentStore::new("it_")), 4)
        .await
        .expect("应该产出完成报告");

    assert!(!report.success);
    assert_eq!(report.transport_status, 0);
    assert!(report
        .cancel_reason
        .as_deref()
        .is_some_and(|reason| reason.starts_with("Network request failed")));
}

#[tokio::test]
async fn test_cancelled_session_never_reaches_server() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/enrollment-3d")
        .expect(0)
        .create_async()
        .await;

    let sink = Arc::new(CollectingSink::default());
    let runner = runner_for(&server.url(), sink);
    let enrollment = Arc::new(InMemoryEnrollmentStore::new("it_"));
    let snapshot = SessionResultSnapshot::without_scan("sess-cancel", SessionStatus::UserCancelled);

    let report = runner
        .run(snapshot, enrollment.clone(), 5)
        .await
        .expect("应该产出完成报告");

    mock.assert_async().await;
    assert!(!report.success);
    assert_eq!(report.transport_status, 0);
    // 未提交的会话不应生成注册标识
    assert!(enrollment.pending_identifier().is_none());
}
