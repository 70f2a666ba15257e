use std::sync::Arc;
use std::time::Duration;

use gw_core::error::ApiErrorKind;
use gw_core::evaluation::EvaluationRequest;
use gw_core::grant::GrantContext;
use gw_core::ids::{EvaluationId, GrantId, ProjectId};
use gw_core::payment::{InitializePaymentRequest, PaymentType};
use gw_core::ports::{AuthSessionPort, EvaluationsPort, GrantsPort, PaymentsPort};
use gw_infra::{HttpApiClient, StaticAuthSession};
use mockito::{Matcher, Server};
use url::Url;

fn client(server: &Server, token: Option<&str>) -> HttpApiClient {
    let auth: Arc<dyn AuthSessionPort> =
        Arc::new(StaticAuthSession::new(token.map(str::to_string)));
    let base = Url::parse(&format!("{}/api/", server.url())).unwrap();
    HttpApiClient::new(&base, Duration::from_secs(5), auth).unwrap()
}

#[tokio::test]
async fn create_evaluation_posts_flat_body_with_bearer() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/evaluations")
        .match_header("authorization", "Bearer tok-1")
        .match_body(Matcher::Json(serde_json::json!({
            "grant_url": "https://example.org/g1",
            "grant_name": "G1",
            "project_id": 3
        })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id": 11, "created_at": "2026-03-01T10:00:00", "grant_url": "https://example.org/g1"}"#)
        .create_async()
        .await;

    let request = EvaluationRequest::for_url(
        "https://example.org/g1",
        GrantContext::named("G1"),
        Some(ProjectId::new(3)),
    );
    let evaluation = client(&server, Some("tok-1"))
        .create_evaluation(&request)
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(evaluation.id, EvaluationId::new(11));
    assert!(!evaluation.is_terminal());
}

#[tokio::test]
async fn payment_required_maps_to_its_kind() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api/evaluations")
        .with_status(402)
        .with_body(r#"{"detail": "No credits available"}"#)
        .create_async()
        .await;

    let err = client(&server, Some("t"))
        .create_evaluation(&EvaluationRequest::for_indexed(GrantId::new(42), None))
        .await
        .unwrap_err();

    assert_eq!(err.kind, ApiErrorKind::PaymentRequired);
    assert_eq!(err.message, "No credits available");
}

#[tokio::test]
async fn html_body_is_a_transport_error() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/payments/status")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body("<!DOCTYPE html><html></html>")
        .create_async()
        .await;

    let err = client(&server, None).credit_status().await.unwrap_err();
    assert_eq!(err.kind, ApiErrorKind::Transport);
}

#[tokio::test]
async fn unauthorized_maps_to_auth() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/evaluations/5")
        .with_status(401)
        .with_body(r#"{"detail": "Not authenticated"}"#)
        .create_async()
        .await;

    let err = client(&server, None)
        .get_evaluation(EvaluationId::new(5))
        .await
        .unwrap_err();
    assert!(err.is_auth());
}

#[tokio::test]
async fn extraction_failure_keeps_status() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api/grants/extract")
        .match_body(Matcher::Json(serde_json::json!({"source_url": "https://example.org/g1"})))
        .with_status(403)
        .with_body(r#"{"detail": "Site blocked the request"}"#)
        .create_async()
        .await;

    let err = client(&server, Some("t"))
        .extract_grant(&gw_core::grant::ExtractGrantRequest {
            source_url: "https://example.org/g1".to_string(),
            name: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err.http_status, Some(403));
    assert_eq!(err.message, "Site blocked the request");
}

#[tokio::test]
async fn initialize_payment_sends_type_and_country() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/payments/initialize")
        .match_body(Matcher::Json(serde_json::json!({
            "country_code": "NG",
            "payment_type": "bundle"
        })))
        .with_status(200)
        .with_body(r#"{"authorization_url": "https://pay.test/abc", "reference": "ref-9"}"#)
        .create_async()
        .await;

    let initialized = client(&server, Some("t"))
        .initialize_payment(&InitializePaymentRequest {
            country_code: Some("NG".to_string()),
            payment_type: PaymentType::Bundle,
        })
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(initialized.reference.as_str(), "ref-9");
}
