mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use common::{body_json, TestApp};
use eventease::middleware::{ANTIFORGERY_COOKIE, ANTIFORGERY_HEADER};

fn event_type_request() -> axum::http::request::Builder {
    Request::builder()
        .method("POST")
        .uri("/event-types")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
}

#[tokio::test]
async fn token_endpoint_sets_the_cookie() {
    let app = TestApp::new().await;

    let response = app
        .send(Request::builder().uri("/antiforgery").body(Body::empty()).unwrap())
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap().to_string();
    let token = body_json(response).await["token"].as_str().unwrap().to_string();
    assert!(cookie.starts_with(&format!("{ANTIFORGERY_COOKIE}={token};")));
    assert!(cookie.contains("HttpOnly"));
}

#[tokio::test]
async fn mutation_without_token_is_rejected() {
    let app = TestApp::new().await;

    let response = app
        .send(event_type_request().body(Body::from("event_type_name=Gala")).unwrap())
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(app.get("/event-types").await.1.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn header_must_match_cookie() {
    let app = TestApp::new().await;

    let response = app
        .send(
            event_type_request()
                .header(header::COOKIE, format!("{ANTIFORGERY_COOKIE}={}", app.token))
                .header(ANTIFORGERY_HEADER, "forged")
                .body(Body::from("event_type_name=Gala"))
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .send(
            event_type_request()
                .header(ANTIFORGERY_HEADER, &app.token)
                .body(Body::from("event_type_name=Gala"))
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn reads_do_not_need_a_token() {
    let app = TestApp::new().await;
    for uri in ["/venues", "/events", "/event-types", "/bookings", "/bookings/search"] {
        assert_eq!(app.get(uri).await.0, StatusCode::OK, "{uri}");
    }
}

#[tokio::test]
async fn check_can_be_switched_off() {
    let app = TestApp::without_antiforgery().await;

    let response = app
        .send(event_type_request().body(Body::from("event_type_name=Gala")).unwrap())
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn health_endpoints_answer() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");

    let (status, body) = app.get("/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_str().unwrap().starts_with("EventEase"));
}
