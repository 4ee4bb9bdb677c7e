//! End-to-end HTTP tests over the in-memory engine.
//!
//! Each test builds the full router with memory-backed stores and drives it
//! through `tower::ServiceExt::oneshot`, asserting status codes and JSON
//! bodies exactly as a client would observe them.

#![allow(clippy::unwrap_used)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::Utc;
use http_body_util::BodyExt;
use marquee_core::{
    CoordinatorConfig, MemoryBookingLedger, MemoryIdempotencyCache, MemoryInventoryStore, Money,
    MovieId, NoopCacheInvalidator, ReservationCoordinator, SeatLabel, Show, ShowId, UserId,
};
use marquee_web::{AppState, StaticTokenIdentity, build_router};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

const TOKEN: &str = "test-token";
const PRICE_CENTS: u64 = 20_000;

struct TestApp {
    router: Router,
    show_id: ShowId,
}

async fn test_app(seat_labels: &[&str]) -> TestApp {
    let inventory = Arc::new(MemoryInventoryStore::new());
    let show = Show::new(
        ShowId::new(),
        MovieId::new(),
        "Grand Odeon 3",
        "Springfield",
        Utc::now(),
        Money::from_cents(PRICE_CENTS),
        seat_labels.iter().map(|l| SeatLabel::from(*l)).collect(),
    );
    let show_id = show.id;
    inventory.insert_show(show).await.unwrap();

    let ledger = Arc::new(MemoryBookingLedger::new());
    let coordinator = Arc::new(ReservationCoordinator::new(
        inventory,
        ledger.clone(),
        Arc::new(NoopCacheInvalidator),
        Arc::new(MemoryIdempotencyCache::new()),
        CoordinatorConfig::default(),
    ));

    let identity = StaticTokenIdentity::new().with_token(TOKEN, UserId::new());
    let state = AppState::new(coordinator, ledger, Arc::new(identity));

    TestApp {
        router: build_router(state),
        show_id,
    }
}

fn booking_request(show_id: ShowId, seats: &[&str]) -> Request<Body> {
    let body = json!({ "show_id": show_id.as_uuid(), "seats": seats });
    Request::builder()
        .method("POST")
        .uri("/bookings")
        .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_check_is_open() {
    let app = test_app(&["A1"]).await;
    let response = app
        .router
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn booking_requires_authentication() {
    let app = test_app(&["A1"]).await;

    let no_header = Request::builder()
        .method("POST")
        .uri("/bookings")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "show_id": app.show_id.as_uuid(), "seats": ["A1"] }).to_string(),
        ))
        .unwrap();
    let response = app.router.clone().oneshot(no_header).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let bad_token = Request::builder()
        .method("POST")
        .uri("/bookings")
        .header(header::AUTHORIZATION, "Bearer wrong-token")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "show_id": app.show_id.as_uuid(), "seats": ["A1"] }).to_string(),
        ))
        .unwrap();
    let response = app.router.oneshot(bad_token).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn create_booking_returns_created_with_computed_total() {
    let app = test_app(&["A1", "A2", "A3"]).await;

    let response = app
        .router
        .oneshot(booking_request(app.show_id, &["A1", "A3"]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["show_id"], json!(app.show_id.as_uuid()));
    assert_eq!(body["seats"], json!(["A1", "A3"]));
    assert_eq!(body["total_amount_cents"], json!(2 * PRICE_CENTS));
}

#[tokio::test]
async fn taken_seats_are_reported_with_labels() {
    let app = test_app(&["A1", "A2", "A3"]).await;

    let response = app
        .router
        .clone()
        .oneshot(booking_request(app.show_id, &["A2", "A3"]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .router
        .oneshot(booking_request(app.show_id, &["A1", "A2", "A3"]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["code"], "SEATS_UNAVAILABLE");
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("A2") && message.contains("A3"));
    assert!(!message.contains("A1"), "free seats must not be reported");
}

#[tokio::test]
async fn unknown_show_is_not_found() {
    let app = test_app(&["A1"]).await;

    let response = app
        .router
        .oneshot(booking_request(ShowId::new(), &["A1"]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn empty_selection_is_rejected() {
    let app = test_app(&["A1"]).await;

    let response = app
        .router
        .oneshot(booking_request(app.show_id, &[]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn idempotency_key_replays_original_booking() {
    let app = test_app(&["A1", "A2"]).await;

    let request = |app_show: ShowId| {
        Request::builder()
            .method("POST")
            .uri("/bookings")
            .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
            .header(header::CONTENT_TYPE, "application/json")
            .header("idempotency-key", "retry-key-0123456789")
            .body(Body::from(
                json!({ "show_id": app_show.as_uuid(), "seats": ["A1"] }).to_string(),
            ))
            .unwrap()
    };

    let first = app
        .router
        .clone()
        .oneshot(request(app.show_id))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);
    let first_body = json_body(first).await;

    let second = app.router.oneshot(request(app.show_id)).await.unwrap();
    assert_eq!(second.status(), StatusCode::CREATED);
    let second_body = json_body(second).await;

    assert_eq!(first_body["id"], second_body["id"]);
}

#[tokio::test]
async fn short_idempotency_key_is_rejected() {
    let app = test_app(&["A1"]).await;

    let request = Request::builder()
        .method("POST")
        .uri("/bookings")
        .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
        .header(header::CONTENT_TYPE, "application/json")
        .header("idempotency-key", "too-short")
        .body(Body::from(
            json!({ "show_id": app.show_id.as_uuid(), "seats": ["A1"] }).to_string(),
        ))
        .unwrap();

    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn my_bookings_lists_most_recent_first() {
    let app = test_app(&["A1", "A2", "B1"]).await;

    for seats in [&["A1"][..], &["A2"], &["B1"]] {
        let response = app
            .router
            .clone()
            .oneshot(booking_request(app.show_id, seats))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .router
        .oneshot(
            Request::builder()
                .uri("/bookings/me")
                .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let bookings = body.as_array().unwrap();
    assert_eq!(bookings.len(), 3);

    // Most recent first: creation timestamps must be non-increasing.
    let timestamps: Vec<chrono::DateTime<Utc>> = bookings
        .iter()
        .map(|b| b["created_at"].as_str().unwrap().parse().unwrap())
        .collect();
    assert!(timestamps.windows(2).all(|pair| pair[0] >= pair[1]));
}

#[tokio::test]
async fn my_bookings_is_empty_for_fresh_user() {
    let app = test_app(&["A1"]).await;

    let response = app
        .router
        .oneshot(
            Request::builder()
                .uri("/bookings/me")
                .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body, json!([]));
}
