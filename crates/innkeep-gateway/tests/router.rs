use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use innkeep_booking::{BookingService, CatalogService, SeqGenerator};
use innkeep_core::SystemClock;
use innkeep_gateway::{App, AppState};
use innkeep_storage::InMemoryStore;
use serde_json::{json, Value};
use tower::ServiceExt;

fn router() -> Router {
    let store = Arc::new(InMemoryStore::new());
    let catalog = CatalogService::new(
        store.clone(),
        SeqGenerator::with_prefix("ht"),
        SeqGenerator::with_prefix("rm"),
        SystemClock,
    );
    let bookings = BookingService::new(store, SeqGenerator::with_prefix("bk"), SystemClock);
    App::router(AppState::new(Arc::new(catalog), Arc::new(bookings)))
}

enum As<'a> {
    Anonymous,
    Guest(&'a str),
    Staff,
}

async fn send(
    router: &Router,
    method: &str,
    uri: &str,
    caller: As<'_>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    match caller {
        As::Anonymous => {}
        As::Guest(guest) => request = request.header("x-guest-id", guest),
        As::Staff => request = request.header("x-staff", "true"),
    }
    let body = match body {
        Some(body) => {
            request = request.header("content-type", "application/json");
            Body::from(body.to_string())
        }
        None => Body::empty(),
    };

    let response = router
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Creates hotel `ht000000` with room `rm000000` at 100.00 a night.
async fn seeded() -> Router {
    let router = router();

    let (status, hotel) = send(
        &router,
        "POST",
        "/v1/hotels",
        As::Staff,
        Some(json!({ "name": "Harbour View", "city": "Lisbon" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(hotel["id"], "ht000000");

    let (status, room) = send(
        &router,
        "POST",
        "/v1/hotels/ht000000/rooms",
        As::Staff,
        Some(json!({
            "number": "101",
            "kind": "double",
            "capacity": 2,
            "nightly_rate": 10000
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(room["id"], "rm000000");

    router
}

fn booking_body(check_in: &str, check_out: &str) -> Option<Value> {
    Some(json!({
        "room_id": "rm000000",
        "check_in": check_in,
        "check_out": check_out
    }))
}

#[tokio::test]
async fn health_reports_ok() {
    let router = router();

    let (status, body) = send(&router, "GET", "/health", As::Anonymous, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn catalog_writes_are_staff_only() {
    let router = router();

    let (status, body) = send(
        &router,
        "POST",
        "/v1/hotels",
        As::Guest("guest-1"),
        Some(json!({ "name": "Harbour View", "city": "Lisbon" })),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");
}

#[tokio::test]
async fn hotels_can_be_listed_by_city() {
    let router = seeded().await;

    let (status, body) = send(&router, "GET", "/v1/hotels?city=lisbon", As::Anonymous, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["items"][0]["rooms"], json!(["rm000000"]));

    let (_, body) = send(&router, "GET", "/v1/hotels?city=porto", As::Anonymous, None).await;
    assert!(body["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn quote_charges_partial_days_as_full_nights() {
    let router = seeded().await;

    let (status, quote) = send(
        &router,
        "GET",
        "/v1/rooms/rm000000/availability?check_in=2024-03-01T14:00:00Z&check_out=2024-03-02T15:00:00Z",
        As::Anonymous,
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(quote["nights"], 2);
    assert_eq!(quote["total_price"], 20000);
    assert_eq!(quote["available"], true);
}

#[tokio::test]
async fn guest_books_and_staff_confirms() {
    let router = seeded().await;

    let (status, booking) = send(
        &router,
        "POST",
        "/v1/bookings",
        As::Guest("guest-1"),
        booking_body("2024-03-01", "2024-03-05"),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(booking["id"], "bk000000");
    assert_eq!(booking["status"], "pending");
    assert_eq!(booking["nights"], 4);
    assert_eq!(booking["total_price"], 40000);

    let (status, _) = send(
        &router,
        "POST",
        "/v1/bookings/bk000000/confirm",
        As::Guest("guest-1"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, confirmed) = send(
        &router,
        "POST",
        "/v1/bookings/bk000000/confirm",
        As::Staff,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(confirmed["status"], "confirmed");

    let (status, body) = send(
        &router,
        "POST",
        "/v1/bookings",
        As::Guest("guest-2"),
        booking_body("2024-03-04", "2024-03-06"),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");

    let (status, _) = send(
        &router,
        "POST",
        "/v1/bookings",
        As::Guest("guest-2"),
        booking_body("2024-03-05", "2024-03-06"),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn staff_booking_for_guest_starts_confirmed_by_venue() {
    let router = seeded().await;

    let mut body = booking_body("2024-03-01", "2024-03-02").unwrap();
    body["guest"] = json!("guest-1");
    let (status, booking) = send(&router, "POST", "/v1/bookings", As::Staff, Some(body)).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(booking["guest"], "guest-1");
    assert_eq!(booking["status"], "confirmed-by-venue");
}

#[tokio::test]
async fn guest_cannot_book_for_someone_else() {
    let router = seeded().await;

    let mut body = booking_body("2024-03-01", "2024-03-02").unwrap();
    body["guest"] = json!("guest-2");
    let (status, _) = send(&router, "POST", "/v1/bookings", As::Guest("guest-1"), Some(body)).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn booking_requires_identity() {
    let router = seeded().await;

    let (status, body) = send(
        &router,
        "POST",
        "/v1/bookings",
        As::Anonymous,
        booking_body("2024-03-01", "2024-03-02"),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn reversed_stay_is_invalid_input() {
    let router = seeded().await;

    let (status, body) = send(
        &router,
        "POST",
        "/v1/bookings",
        As::Guest("guest-1"),
        booking_body("2024-03-05", "2024-03-01"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_input");
}

#[tokio::test]
async fn time_without_offset_is_invalid_input() {
    let router = seeded().await;

    let (status, body) = send(
        &router,
        "POST",
        "/v1/bookings",
        As::Guest("guest-1"),
        booking_body("2024-03-01T14:00:00", "2024-03-02T15:00:00"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_input");

    let (status, bookings) = send(&router, "GET", "/v1/bookings", As::Guest("guest-1"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(bookings["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn malformed_json_is_invalid_input() {
    let router = seeded().await;

    let (status, body) = send(
        &router,
        "POST",
        "/v1/bookings",
        As::Guest("guest-1"),
        Some(json!({ "room_id": 7 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_input");
}

#[tokio::test]
async fn bookings_are_private_to_their_guest() {
    let router = seeded().await;
    send(
        &router,
        "POST",
        "/v1/bookings",
        As::Guest("guest-1"),
        booking_body("2024-03-01", "2024-03-02"),
    )
    .await;

    let (status, _) = send(
        &router,
        "GET",
        "/v1/bookings/bk000000",
        As::Guest("guest-2"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &router,
        "GET",
        "/v1/bookings/bk000000",
        As::Guest("guest-1"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, mine) = send(&router, "GET", "/v1/bookings", As::Guest("guest-1"), None).await;
    assert_eq!(mine["items"].as_array().unwrap().len(), 1);

    let (_, theirs) = send(&router, "GET", "/v1/bookings", As::Guest("guest-2"), None).await;
    assert!(theirs["items"].as_array().unwrap().is_empty());

    let (status, _) = send(
        &router,
        "GET",
        "/v1/bookings?guest=guest-1",
        As::Guest("guest-2"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn guest_cancels_own_booking_and_frees_the_room() {
    let router = seeded().await;
    let mut body = booking_body("2024-03-01", "2024-03-05").unwrap();
    body["guest"] = json!("guest-1");
    send(&router, "POST", "/v1/bookings", As::Staff, Some(body)).await;

    let (_, quote) = send(
        &router,
        "GET",
        "/v1/rooms/rm000000/availability?check_in=2024-03-02&check_out=2024-03-03",
        As::Anonymous,
        None,
    )
    .await;
    assert_eq!(quote["available"], false);

    let (status, _) = send(
        &router,
        "POST",
        "/v1/bookings/bk000000/cancel",
        As::Guest("guest-2"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, cancelled) = send(
        &router,
        "POST",
        "/v1/bookings/bk000000/cancel",
        As::Guest("guest-1"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled["status"], "cancelled");

    let (_, quote) = send(
        &router,
        "GET",
        "/v1/rooms/rm000000/availability?check_in=2024-03-02&check_out=2024-03-03",
        As::Anonymous,
        None,
    )
    .await;
    assert_eq!(quote["available"], true);

    let (status, body) = send(
        &router,
        "POST",
        "/v1/bookings/bk000000/complete",
        As::Staff,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "invalid_transition");
}

#[tokio::test]
async fn hotel_availability_lists_free_rooms() {
    let router = seeded().await;
    send(
        &router,
        "POST",
        "/v1/hotels/ht000000/rooms",
        As::Staff,
        Some(json!({
            "number": "102",
            "kind": "suite",
            "capacity": 4,
            "nightly_rate": 25000
        })),
    )
    .await;
    let mut body = booking_body("2024-03-01", "2024-03-03").unwrap();
    body["guest"] = json!("guest-1");
    send(&router, "POST", "/v1/bookings", As::Staff, Some(body)).await;

    let (status, quotes) = send(
        &router,
        "GET",
        "/v1/hotels/ht000000/availability?check_in=2024-03-01&check_out=2024-03-03",
        As::Anonymous,
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let items = quotes["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["room_id"], "rm000001");
    assert_eq!(items[0]["total_price"], 50000);
}

#[tokio::test]
async fn room_with_active_booking_cannot_be_deleted() {
    let router = seeded().await;
    send(
        &router,
        "POST",
        "/v1/bookings",
        As::Guest("guest-1"),
        booking_body("2024-03-01", "2024-03-02"),
    )
    .await;

    let (status, body) = send(&router, "DELETE", "/v1/rooms/rm000000", As::Staff, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");

    send(
        &router,
        "POST",
        "/v1/bookings/bk000000/cancel",
        As::Guest("guest-1"),
        None,
    )
    .await;
    let (status, _) = send(&router, "DELETE", "/v1/rooms/rm000000", As::Staff, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&router, "GET", "/v1/rooms/rm000000", As::Anonymous, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_booking_is_not_found() {
    let router = seeded().await;

    let (status, body) = send(&router, "GET", "/v1/bookings/nope", As::Staff, None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}
