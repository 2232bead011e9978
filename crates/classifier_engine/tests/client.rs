use std::net::TcpListener;
use std::time::Duration;

use classifier_engine::{
    AnalysisClient, ClientSettings, EngineError, FailureKind, ReqwestAnalysisClient, ThreatType,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ReqwestAnalysisClient {
    ReqwestAnalysisClient::new(ClientSettings {
        endpoint: format!("{}/predict", server.uri()),
        ..ClientSettings::default()
    })
    .expect("client")
}

#[tokio::test]
async fn posts_raw_url_and_parses_benign_prediction() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({ "url": "https://example.com" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": "Benign",
            "confidence": 0.97,
            "description": "No known threats",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let report = client_for(&server)
        .analyze("https://example.com")
        .await
        .expect("analysis ok");

    assert_eq!(report.status, 200);
    assert_eq!(report.prediction.threat_type, Some(ThreatType::Benign));
    assert_eq!(report.prediction.confidence, 0.97);
    assert_eq!(report.prediction.description, "No known threats");
    assert!(report.byte_len > 0);
}

#[tokio::test]
async fn input_is_not_trimmed_or_normalized() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .and(body_json(json!({ "url": "  malicious.test/phish " })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": "Phishing",
            "confidence": 0.82,
            "description": "Matches known phishing pattern",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let report = client_for(&server)
        .analyze("  malicious.test/phish ")
        .await
        .expect("analysis ok");
    assert_eq!(report.prediction.threat_type, Some(ThreatType::Phishing));
}

#[tokio::test]
async fn service_error_carries_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(
            ResponseTemplate::new(503).set_body_json(json!({ "detail": "model unavailable" })),
        )
        .mount(&server)
        .await;

    let err = client_for(&server)
        .analyze("https://example.com")
        .await
        .unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::ServiceStatus {
            status: 503,
            detail: Some("model unavailable".to_string()),
        }
    );
}

#[tokio::test]
async fn service_error_without_json_body_has_no_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .analyze("https://example.com")
        .await
        .unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::ServiceStatus {
            status: 502,
            detail: None,
        }
    );
}

#[tokio::test]
async fn malformed_success_payload_is_invalid_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": "Benign",
            "description": "confidence missing",
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .analyze("https://example.com")
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidPayload);
    assert!(err.message.contains("confidence"));
}

#[tokio::test]
async fn non_json_success_body_is_invalid_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .analyze("https://example.com")
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidPayload);
}

#[tokio::test]
async fn unreachable_service_is_network_failure() {
    // Bind then drop to get a port nobody listens on.
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("addr").port()
    };
    let client = ReqwestAnalysisClient::new(ClientSettings {
        endpoint: format!("http://127.0.0.1:{port}/predict"),
        ..ClientSettings::default()
    })
    .expect("client");

    let err = client.analyze("https://example.com").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Network);
}

#[tokio::test]
async fn configured_timeout_is_enforced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(json!({
                    "type": "Benign",
                    "confidence": 0.5,
                    "description": "slow",
                })),
        )
        .mount(&server)
        .await;

    let client = ReqwestAnalysisClient::new(ClientSettings {
        endpoint: format!("{}/predict", server.uri()),
        request_timeout: Some(Duration::from_millis(50)),
        ..ClientSettings::default()
    })
    .expect("client");

    let err = client.analyze("https://example.com").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn oversized_response_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(64)))
        .mount(&server)
        .await;

    let client = ReqwestAnalysisClient::new(ClientSettings {
        endpoint: format!("{}/predict", server.uri()),
        max_response_bytes: 16,
        ..ClientSettings::default()
    })
    .expect("client");

    let err = client.analyze("https://example.com").await.unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::TooLarge {
            max_bytes: 16,
            actual: Some(64),
        }
    );
}

#[test]
fn invalid_endpoint_is_rejected_up_front() {
    let err = ReqwestAnalysisClient::new(ClientSettings {
        endpoint: "not a url".to_string(),
        ..ClientSettings::default()
    })
    .unwrap_err();
    assert!(matches!(err, EngineError::InvalidEndpoint { .. }));
}
