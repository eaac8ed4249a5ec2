use super::*;
use crate::{
    test_support::{body_json, FakeBackend},
    transport::error_from_response,
};
use axum::http::StatusCode;
use serde_json::json;
use shared::{domain::BodyId, error::ErrorCode, protocol::Body};

#[tokio::test]
async fn fetch_unwraps_data_envelope() {
    let backend = FakeBackend::spawn().await;
    backend.seed_entity("/bodies/4", body_json(4, "AEGEE-Delft"));

    let body: Body = backend.client().fetch("/bodies/4").await.expect("fetch");
    assert_eq!(body.id, Some(BodyId(4)));
    assert_eq!(body.name, "AEGEE-Delft");
}

#[tokio::test]
async fn unprocessable_entity_carries_field_errors() {
    let backend = FakeBackend::spawn().await;
    backend.respond(
        Method::POST,
        "/bodies",
        StatusCode::UNPROCESSABLE_ENTITY,
        json!({ "errors": { "name": "required" } }),
    );

    let err = backend
        .client()
        .create::<_, Body>("/bodies", &json!({ "body": {} }))
        .await
        .expect_err("validation");
    assert_eq!(err.code(), ErrorCode::Validation);
    let fields = err.field_errors().expect("field errors");
    assert_eq!(fields.get("name"), Some("required"));
    assert_eq!(fields.len(), 1);
}

#[tokio::test]
async fn missing_entity_is_not_found() {
    let backend = FakeBackend::spawn().await;

    let err = backend
        .client()
        .fetch::<Body>("/bodies/999")
        .await
        .expect_err("missing");
    assert!(err.is_not_found());
    assert_eq!(err.user_message(), "not found");
}

#[tokio::test]
async fn delete_accepts_empty_success_body() {
    let backend = FakeBackend::spawn().await;
    backend.client().delete("/bodies/4").await.expect("delete");
    assert_eq!(backend.requests_to(Method::DELETE, "/bodies/4").len(), 1);
}

#[tokio::test]
async fn collection_without_payload_is_empty() {
    let backend = FakeBackend::spawn().await;
    backend.respond(Method::GET, "/permissions", StatusCode::OK, json!({ "data": null }));
    backend.respond(Method::GET, "/circles", StatusCode::OK, json!({}));

    let client = backend.client();
    let permissions: Vec<Body> = client
        .fetch_page("/permissions", Vec::new(), None)
        .await
        .expect("permissions");
    let circles: Vec<Body> = client
        .fetch_page("/circles", Vec::new(), None)
        .await
        .expect("circles");
    assert!(permissions.is_empty());
    assert!(circles.is_empty());
}

#[tokio::test]
async fn caller_timeout_yields_timeout_error() {
    let backend = FakeBackend::spawn().await;
    backend.seed_collection("/bodies", vec![body_json(1, "slow")]);
    backend.delay("/bodies", Duration::from_millis(300));

    let err = backend
        .client()
        .fetch_page::<Body>("/bodies", Vec::new(), Some(Duration::from_millis(20)))
        .await
        .expect_err("timeout");
    assert!(matches!(err, RequestError::Timeout));
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let client =
        OmsClient::connect("http://127.0.0.1:9/api", Duration::from_secs(2)).expect("client");
    let err = client.fetch::<Body>("/bodies/1").await.expect_err("offline");
    assert!(matches!(err, RequestError::Transport(_) | RequestError::Timeout));
}

#[test]
fn endpoints_resolve_below_the_api_base() {
    let transport =
        HttpTransport::new("http://oms.example/api/", Duration::from_secs(1)).expect("transport");
    assert_eq!(
        transport.endpoint("/bodies/3/members").expect("url").as_str(),
        "http://oms.example/api/bodies/3/members"
    );
    assert_eq!(
        transport
            .endpoint("confirm_mail/a b?c")
            .expect("url")
            .as_str(),
        "http://oms.example/api/confirm_mail/a%20b%3Fc"
    );
    assert_eq!(
        transport
            .endpoint("https://other.example/x")
            .expect("url")
            .as_str(),
        "https://other.example/x"
    );
}

#[test]
fn invalid_api_url_is_rejected() {
    assert!(matches!(
        HttpTransport::new("not a url", Duration::from_secs(1)),
        Err(RequestError::InvalidEndpoint(_))
    ));
}

#[test]
fn error_bodies_map_to_request_errors() {
    let validation = error_from_response(422, br#"{"errors":{"email":["is invalid"]}}"#);
    assert_eq!(
        validation.field_errors().and_then(|fields| fields.get("email")),
        Some("is invalid")
    );

    let server = error_from_response(502, b"<html>bad gateway</html>");
    assert!(matches!(
        server,
        RequestError::Status { status: 502, ref message } if message.is_empty()
    ));
    assert_eq!(server.user_message(), "Request failed with status 502");
}
