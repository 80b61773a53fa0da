use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wallet_verify::client::{
    FlowError, FlowStatus, HttpTransport, LocalWallet, TransportError, VerificationFlow,
    VerificationTransport,
};
use wallet_verify::protocol::{VerifyRequest, DEFAULT_PROTOCOL_NAME};
use wallet_verify::server::{router, AppState};

#[tokio::test]
async fn test_posts_json_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/verify-wallets"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "address": "0xabc",
            "message": "hello",
            "signature": "0xsig",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "valid": true,
            "recovered": "0xabc",
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let transport = HttpTransport::new(format!("{}/api/verify-wallets", mock_server.uri()));
    let response = transport
        .submit(&VerifyRequest::new("0xabc", "hello", "0xsig"))
        .await
        .unwrap();

    assert!(response.valid);
    assert_eq!(response.recovered.as_deref(), Some("0xabc"));
}

#[tokio::test]
async fn test_error_status_body_is_still_parsed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/verify-wallets"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "valid": false,
            "error": "Invalid signature: non-canonical s",
        })))
        .mount(&mock_server)
        .await;

    let transport = HttpTransport::new(format!("{}/api/verify-wallets", mock_server.uri()));
    let response = transport
        .submit(&VerifyRequest::new("0xabc", "hello", "0xsig"))
        .await
        .unwrap();

    assert!(!response.valid);
    assert_eq!(response.error.as_deref(), Some("Invalid signature: non-canonical s"));
}

#[tokio::test]
async fn test_non_json_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&mock_server)
        .await;

    let transport = HttpTransport::new(format!("{}/api/verify-wallets", mock_server.uri()));
    let result = transport
        .submit(&VerifyRequest::new("0xabc", "hello", "0xsig"))
        .await;

    assert!(matches!(result, Err(TransportError::Response(_))));
}

#[tokio::test]
async fn test_unreachable_endpoint() {
    // Bind then drop a listener to get a port nothing is serving
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let transport = HttpTransport::new(format!("http://{}/api/verify-wallets", addr));
    let result = transport
        .submit(&VerifyRequest::new("0xabc", "hello", "0xsig"))
        .await;

    assert!(matches!(result, Err(TransportError::Request(_))));
}

#[tokio::test]
async fn test_flow_against_live_server() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(AppState::default())).await.unwrap();
    });

    let wallet = LocalWallet::random();
    let mut flow = VerificationFlow::new(
        Some(Arc::new(wallet.clone())),
        Arc::new(HttpTransport::new(format!("http://{}/api/verify-wallets", addr))),
        DEFAULT_PROTOCOL_NAME,
    );

    let address = flow.verify().await.unwrap();
    assert_eq!(address, wallet.address().to_checksum());
    assert_eq!(flow.status(), FlowStatus::Success);
}

#[tokio::test]
async fn test_flow_surfaces_unreadable_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut flow = VerificationFlow::new(
        Some(Arc::new(LocalWallet::random())),
        Arc::new(HttpTransport::new(format!("{}/api/verify-wallets", mock_server.uri()))),
        DEFAULT_PROTOCOL_NAME,
    );

    let err = flow.verify().await.unwrap_err();
    assert!(matches!(err, FlowError::Transport(_)));
    assert_eq!(flow.status(), FlowStatus::Error);
}
