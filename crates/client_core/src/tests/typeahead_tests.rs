use super::*;
use crate::test_support::{body_json, wait_for_requests, FakeBackend};
use axum::http::{Method, StatusCode};
use serde_json::json;

#[tokio::test]
async fn body_suggestions_ask_for_first_eight_matches() {
    let backend = FakeBackend::spawn().await;
    backend.seed_collection(
        "/bodies",
        (1..=12).map(|n| body_json(n, &format!("Antenna {n}"))).collect(),
    );

    let bodies = fetch_bodies(&backend.client(), "antenna", None)
        .await
        .expect("suggestions");
    assert_eq!(bodies.len(), SUGGESTION_LIMIT);

    let request = backend.requests_to(Method::GET, "/bodies").pop().expect("request");
    assert_eq!(request.param("limit"), Some("8"));
    assert_eq!(request.param("offset"), Some("0"));
    assert_eq!(request.param("query"), Some("antenna"));
    assert_eq!(request.param("all"), None);
}

#[tokio::test]
async fn circle_suggestions_cover_all_circles() {
    let backend = FakeBackend::spawn().await;
    backend.seed_collection("/circles", vec![json!({ "id": 3, "name": "Board" })]);

    let circles = fetch_circles(&backend.client(), "bo", None)
        .await
        .expect("suggestions");
    assert_eq!(circles.len(), 1);
    assert_eq!(circles[0].name, "Board");

    let request = backend.requests_to(Method::GET, "/circles").pop().expect("request");
    assert_eq!(request.param("all"), Some("true"));
}

#[tokio::test]
async fn permission_suggestions_without_payload_are_empty() {
    let backend = FakeBackend::spawn().await;
    backend.respond(Method::GET, "/permissions", StatusCode::OK, json!({}));

    let permissions = fetch_permissions(&backend.client(), "view", None)
        .await
        .expect("suggestions");
    assert!(permissions.is_empty());
}

#[tokio::test]
async fn slow_suggestions_time_out() {
    let backend = FakeBackend::spawn().await;
    backend.seed_collection("/bodies", vec![body_json(1, "Slow")]);
    backend.delay("/bodies", Duration::from_millis(300));

    let err = fetch_bodies(&backend.client(), "s", Some(Duration::from_millis(20)))
        .await
        .expect_err("timeout");
    assert!(matches!(err, RequestError::Timeout));
}

#[tokio::test]
async fn newer_keystroke_supersedes_older_answer() {
    let backend = FakeBackend::spawn().await;
    backend.seed_collection(
        "/bodies",
        vec![body_json(1, "Madrid"), body_json(2, "Magdeburg")],
    );
    let release = backend.hold("/bodies");
    let typeahead = std::sync::Arc::new(Typeahead::<shared::protocol::Body>::new(
        backend.client(),
        "/bodies",
        SuggestOptions::default(),
    ));

    let older = tokio::spawn({
        let typeahead = typeahead.clone();
        async move { typeahead.query("ma").await }
    });
    wait_for_requests(&backend, "/bodies", 1).await;

    let newer = typeahead.query("mad").await.expect("newer");
    let newer = newer.expect("latest answer is delivered");
    assert_eq!(newer.len(), 1);
    assert_eq!(newer[0].name, "Madrid");

    release.send(()).expect("release");
    let older = older.await.expect("join").expect("older");
    assert!(older.is_none());
}
