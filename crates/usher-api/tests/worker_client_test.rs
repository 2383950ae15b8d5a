// Integration tests for `WorkerClient` using wiremock.
#![allow(clippy::unwrap_used)]

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use usher_api::{Error, TransportConfig, WorkerClient};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, WorkerClient) {
    let server = MockServer::start().await;
    let client = WorkerClient::from_reqwest(&server.uri(), reqwest::Client::new()).unwrap();
    (server, client)
}

fn qr_body(service: u32) -> serde_json::Value {
    json!({
        "success": true,
        "qrData": "q83vEjRWeJC6ze8S+/==",
        "serviceInfo": {
            "serviceNumber": service,
            "startTime": "2025-01-05T07:00:00.000Z",
            "endTime": "2025-01-05T09:15:00.000Z",
        }
    })
}

// ── Happy-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_generate_qr() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/generate-qr"))
        .respond_with(ResponseTemplate::new(200).set_body_json(qr_body(2)))
        .mount(&server)
        .await;

    let qr = client.generate_qr().await.unwrap();

    assert_eq!(qr.qr_data, "q83vEjRWeJC6ze8S+/==");
    assert_eq!(qr.service_info.service_number, 2);
    assert_eq!(
        qr.service_info.start_time.to_rfc3339(),
        "2025-01-05T07:00:00+00:00"
    );
}

#[tokio::test]
async fn test_generate_qr_for_service_sends_query() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/generate-qr-for-service"))
        .and(query_param("service", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(qr_body(3)))
        .mount(&server)
        .await;

    let qr = client.generate_qr_for_service(3).await.unwrap();
    assert_eq!(qr.service_info.service_number, 3);
}

#[tokio::test]
async fn test_validate_qr_reports_rejections_as_ok() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/validate-qr"))
        .and(body_json(json!({ "qrData": "abc" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "isValid": false,
            "reason": "EXPIRED",
            "payload": { "x": "2025-01-05T05:00:00.000Z", "y": "2025-01-05T07:15:00.000Z", "u": "/qrcode/scan", "s": 1 },
            "validFrom": "2025-01-05T05:00:00.000Z",
            "validUntil": "2025-01-05T07:15:00.000Z",
            "message": "QR code has expired",
        })))
        .mount(&server)
        .await;

    let result = client.validate_qr("abc").await.unwrap();

    assert!(!result.is_valid);
    assert_eq!(result.reason, "EXPIRED");
    assert_eq!(result.payload.unwrap()["s"], 1);
    assert!(result.valid_until.is_some());
}

#[tokio::test]
async fn test_secure_round_trip_bodies() {
    let (server, client) = setup().await;
    let user = json!({ "name": "Amara" });

    Mock::given(method("POST"))
        .and(path("/secure-encrypt"))
        .and(body_json(json!({ "uid": "A", "userData": user })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "encryptedData": "c2VhbGVk",
            "timestamp": "2025-01-05T08:00:00.000Z",
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/secure-decrypt"))
        .and(body_json(json!({ "uid": "A", "encryptedData": "c2VhbGVk" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "decryptedData": user,
        })))
        .mount(&server)
        .await;

    let sealed = client.secure_encrypt("A", &user).await.unwrap();
    assert_eq!(sealed.encrypted_data, "c2VhbGVk");

    let opened = client
        .secure_decrypt("A", &sealed.encrypted_data)
        .await
        .unwrap();
    assert_eq!(opened.decrypted_data, user);
}

#[tokio::test]
async fn test_base_url_prefix_is_preserved() {
    let server = MockServer::start().await;
    let client = WorkerClient::from_reqwest(
        &format!("{}/worker", server.uri()),
        reqwest::Client::new(),
    )
    .unwrap();

    Mock::given(method("GET"))
        .and(path("/worker/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "usher-server",
            "version": "0.1.0",
            "status": "running",
            "endpoints": { "GET /": "Service information" },
        })))
        .mount(&server)
        .await;

    let info = client.info().await.unwrap();
    assert_eq!(info.status, "running");
    assert_eq!(info.endpoints.len(), 1);
}

// ── Error tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_error_body_becomes_api_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/generate-qr"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "success": false,
            "error": "No active service at this time",
        })))
        .mount(&server)
        .await;

    let err = client.generate_qr().await.unwrap_err();
    match err {
        Error::Api { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "No active service at this time");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_non_json_error_uses_status_reason() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/decrypt-user-data"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let err = client.decrypt_user_data("abc").await.unwrap_err();
    match err {
        Error::Api { status, message } => {
            assert_eq!(status, 502);
            assert_eq!(message, "Bad Gateway");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unexpected_body_is_a_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/encrypt-user-data"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client.encrypt_user_data(&json!({ "a": 1 })).await.unwrap_err();
    match err {
        Error::Deserialization { body, .. } => assert_eq!(body, "<html>oops</html>"),
        other => panic!("expected Deserialization error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let server = MockServer::start().await;
    let transport = TransportConfig::default().with_timeout(Duration::from_millis(100));
    let client = WorkerClient::new(&server.uri(), &transport).unwrap();

    Mock::given(method("GET"))
        .and(path("/generate-qr"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(qr_body(1))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let err = client.generate_qr().await.unwrap_err();
    assert!(matches!(err, Error::Timeout { .. }));
}
