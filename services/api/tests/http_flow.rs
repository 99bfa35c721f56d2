//! End-to-end checks of the `/api` surface over the in-memory store.

use api_lib::{
    adapters::PushHub,
    config::Config,
    web::{self, state::AppState},
};
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use ride_share_core::MemoryStore;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn test_app() -> (Router, Arc<AppState>) {
    let config = Config::from_lookup(|key| match key {
        "COOKIE_SECURE" => Some("false".to_string()),
        _ => None,
    })
    .expect("default config");
    let state = Arc::new(AppState::new(
        Arc::new(MemoryStore::new()),
        Arc::new(PushHub::new(8)),
        Arc::new(config),
    ));
    (web::router(state.clone()), state)
}

struct Reply {
    status: StatusCode,
    cookie: Option<String>,
    body: Value,
}

async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> Reply {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    Reply {
        status,
        cookie,
        body,
    }
}

/// Registers a user and returns `(user id, cookie)`.
async fn register(app: &Router, username: &str, name: &str) -> (i64, String) {
    let reply = call(
        app,
        "POST",
        "/api/register",
        None,
        Some(json!({ "username": username, "password": "hunter22", "name": name })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.body);
    let id = reply.body["id"].as_i64().unwrap();
    (id, reply.cookie.expect("session cookie"))
}

fn ride_body(from: &str, to: &str, expires_in: Duration) -> Value {
    json!({
        "from": from,
        "to": to,
        "date": "2026-10-20",
        "time": "09:30",
        "seats": 3,
        "price": 250,
        "expiresAt": (Utc::now() + expires_in).to_rfc3339(),
        "carModel": "Swift",
    })
}

#[tokio::test]
async fn booking_request_and_acceptance_flow() {
    let (app, state) = test_app();
    let (driver_id, driver) = register(&app, "dana", "Dana").await;
    let (rider_id, rider) = register(&app, "riley", "Riley").await;

    // Driver offers a ride; the rider sees it.
    let ride = call(
        &app,
        "POST",
        "/api/rides",
        Some(&driver),
        Some(ride_body("Pune", "Mumbai", Duration::days(1))),
    )
    .await;
    assert_eq!(ride.status, StatusCode::CREATED);
    assert_eq!(ride.body["available"], true);
    assert_eq!(ride.body["driverId"], driver_id);
    let ride_id = ride.body["id"].as_i64().unwrap();

    let listed = call(&app, "GET", "/api/rides", Some(&rider), None).await;
    assert_eq!(listed.status, StatusCode::OK);
    assert_eq!(listed.body.as_array().unwrap().len(), 1);

    // Rider books; the driver is told about it on both channels.
    let (_, mut updates) = state.push_hub.subscribe(driver_id).await;
    let booking = call(
        &app,
        "POST",
        "/api/bookings",
        Some(&rider),
        Some(json!({ "rideId": ride_id })),
    )
    .await;
    assert_eq!(booking.status, StatusCode::CREATED);
    assert_eq!(booking.body["status"], "pending");
    assert_eq!(booking.body["isParcel"], false);
    let booking_id = booking.body["id"].as_i64().unwrap();

    let inbox = call(&app, "GET", "/api/notifications", Some(&driver), None).await;
    let inbox = inbox.body.as_array().unwrap().clone();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0]["title"], "New Ride Request");
    assert_eq!(
        inbox[0]["message"],
        "Riley wants to book your ride from Pune to Mumbai",
    );
    assert_eq!(inbox[0]["type"], "ride_request");
    assert_eq!(inbox[0]["relatedBookingId"], booking_id);
    assert_eq!(inbox[0]["read"], false);

    let pushed = updates.recv().await.unwrap();
    assert_eq!(pushed.len(), 1);
    assert_eq!(pushed[0].record.title, "New Ride Request");

    // Driver accepts; the ride leaves the listing and the rider hears back.
    let accepted = call(
        &app,
        "PATCH",
        &format!("/api/bookings/{}/status", booking_id),
        Some(&driver),
        Some(json!({ "status": "accepted" })),
    )
    .await;
    assert_eq!(accepted.status, StatusCode::OK);
    assert_eq!(accepted.body["status"], "accepted");

    let listed = call(&app, "GET", "/api/rides", Some(&rider), None).await;
    assert!(listed.body.as_array().unwrap().is_empty());

    let inbox = call(&app, "GET", "/api/notifications", Some(&rider), None).await;
    assert_eq!(inbox.body[0]["title"], "Ride Request Accepted");
    assert_eq!(inbox.body[0]["type"], "ride_response");
    assert_eq!(state.push_hub.snapshot(rider_id).await.len(), 1);

    // Both sides see it in their history.
    let history = call(&app, "GET", "/api/bookings/history", Some(&rider), None).await;
    assert_eq!(history.status, StatusCode::OK);
    assert_eq!(history.body["bookings"][0]["status"], "accepted");
    assert_eq!(history.body["bookings"][0]["ride"]["from"], "Pune");
    assert_eq!(history.body["bookings"][0]["ride"]["available"], false);

    let history = call(&app, "GET", "/api/bookings/history", Some(&driver), None).await;
    assert!(history.body["bookings"].as_array().unwrap().is_empty());
    assert_eq!(history.body["offeredRides"][0]["id"], ride_id);
}

#[tokio::test]
async fn rejection_keeps_the_ride_listed() {
    let (app, _) = test_app();
    let (_, driver) = register(&app, "dana", "Dana").await;
    let (_, rider) = register(&app, "riley", "Riley").await;

    let ride = call(
        &app,
        "POST",
        "/api/rides",
        Some(&driver),
        Some(ride_body("Goa", "Pune", Duration::hours(6))),
    )
    .await;
    let ride_id = ride.body["id"].as_i64().unwrap();
    let booking = call(
        &app,
        "POST",
        "/api/bookings",
        Some(&rider),
        Some(json!({ "rideId": ride_id, "isParcel": true })),
    )
    .await;
    let booking_id = booking.body["id"].as_i64().unwrap();

    let rejected = call(
        &app,
        "PATCH",
        &format!("/api/bookings/{}/status", booking_id),
        Some(&driver),
        Some(json!({ "status": "rejected" })),
    )
    .await;
    assert_eq!(rejected.status, StatusCode::OK);
    assert_eq!(rejected.body["status"], "rejected");
    assert_eq!(rejected.body["isParcel"], true);

    let listed = call(&app, "GET", "/api/rides", Some(&rider), None).await;
    assert_eq!(listed.body.as_array().unwrap().len(), 1);

    let inbox = call(&app, "GET", "/api/notifications", Some(&rider), None).await;
    assert_eq!(inbox.body[0]["title"], "Ride Request Rejected");
    assert_eq!(
        inbox.body[0]["message"],
        "Sorry, your ride request has been declined.",
    );
}

#[tokio::test]
async fn booking_decisions_are_validated() {
    let (app, _) = test_app();
    let (_, driver) = register(&app, "dana", "Dana").await;
    let (_, rider) = register(&app, "riley", "Riley").await;
    let (_, stranger) = register(&app, "sam", "Sam").await;

    let ride = call(
        &app,
        "POST",
        "/api/rides",
        Some(&driver),
        Some(ride_body("A", "B", Duration::days(1))),
    )
    .await;
    let ride_id = ride.body["id"].as_i64().unwrap();
    let booking = call(
        &app,
        "POST",
        "/api/bookings",
        Some(&rider),
        Some(json!({ "rideId": ride_id })),
    )
    .await;
    let uri = format!("/api/bookings/{}/status", booking.body["id"]);

    let bad = call(
        &app,
        "PATCH",
        &uri,
        Some(&driver),
        Some(json!({ "status": "maybe" })),
    )
    .await;
    assert_eq!(bad.status, StatusCode::BAD_REQUEST);
    assert!(bad.body["error"].is_string());

    let pending = call(
        &app,
        "PATCH",
        &uri,
        Some(&driver),
        Some(json!({ "status": "pending" })),
    )
    .await;
    assert_eq!(pending.status, StatusCode::BAD_REQUEST);

    let forbidden = call(
        &app,
        "PATCH",
        &uri,
        Some(&stranger),
        Some(json!({ "status": "accepted" })),
    )
    .await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);

    let missing = call(
        &app,
        "PATCH",
        "/api/bookings/999/status",
        Some(&driver),
        Some(json!({ "status": "accepted" })),
    )
    .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);

    let no_ride = call(
        &app,
        "POST",
        "/api/bookings",
        Some(&rider),
        Some(json!({ "rideId": 999 })),
    )
    .await;
    assert_eq!(no_ride.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn expired_and_invalid_rides() {
    let (app, _) = test_app();
    let (_, driver) = register(&app, "dana", "Dana").await;

    let expired = call(
        &app,
        "POST",
        "/api/rides",
        Some(&driver),
        Some(ride_body("A", "B", -Duration::hours(1))),
    )
    .await;
    assert_eq!(expired.status, StatusCode::CREATED);
    let listed = call(&app, "GET", "/api/rides", Some(&driver), None).await;
    assert!(listed.body.as_array().unwrap().is_empty());

    let mut no_seats = ride_body("A", "B", Duration::days(1));
    no_seats["seats"] = json!(0);
    let reply = call(&app, "POST", "/api/rides", Some(&driver), Some(no_seats)).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    let malformed = call(
        &app,
        "POST",
        "/api/rides",
        Some(&driver),
        Some(json!({ "from": "A" })),
    )
    .await;
    assert_eq!(malformed.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn marking_read_is_idempotent() {
    let (app, _) = test_app();
    let (_, driver) = register(&app, "dana", "Dana").await;
    let (_, rider) = register(&app, "riley", "Riley").await;

    let ride = call(
        &app,
        "POST",
        "/api/rides",
        Some(&driver),
        Some(ride_body("A", "B", Duration::days(1))),
    )
    .await;
    call(
        &app,
        "POST",
        "/api/bookings",
        Some(&rider),
        Some(json!({ "rideId": ride.body["id"] })),
    )
    .await;

    let inbox = call(&app, "GET", "/api/notifications", Some(&driver), None).await;
    let uri = format!("/api/notifications/{}/read", inbox.body[0]["id"]);
    for _ in 0..2 {
        let reply = call(&app, "PATCH", &uri, Some(&driver), None).await;
        assert_eq!(reply.status, StatusCode::OK);
    }
    let unknown = call(
        &app,
        "PATCH",
        "/api/notifications/4242/read",
        Some(&driver),
        None,
    )
    .await;
    assert_eq!(unknown.status, StatusCode::OK);

    let inbox = call(&app, "GET", "/api/notifications", Some(&driver), None).await;
    assert_eq!(inbox.body[0]["read"], true);
}

#[tokio::test]
async fn sessions_guard_the_api() {
    let (app, _) = test_app();

    for uri in [
        "/api/rides",
        "/api/notifications",
        "/api/bookings/history",
        "/api/notifications/live",
    ] {
        let reply = call(&app, "GET", uri, None, None).await;
        assert_eq!(reply.status, StatusCode::UNAUTHORIZED, "{}", uri);
    }
    let bogus = call(&app, "GET", "/api/user", Some("session=nope"), None).await;
    assert_eq!(bogus.status, StatusCode::UNAUTHORIZED);

    let (user_id, cookie) = register(&app, "dana", "Dana").await;
    let duplicate = call(
        &app,
        "POST",
        "/api/register",
        None,
        Some(json!({ "username": "dana", "password": "x" })),
    )
    .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);

    let wrong = call(
        &app,
        "POST",
        "/api/login",
        None,
        Some(json!({ "username": "dana", "password": "nope" })),
    )
    .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    let login = call(
        &app,
        "POST",
        "/api/login",
        None,
        Some(json!({ "username": "dana", "password": "hunter22" })),
    )
    .await;
    assert_eq!(login.status, StatusCode::OK);
    assert!(login.cookie.is_some());

    let me = call(&app, "GET", "/api/user", Some(&cookie), None).await;
    assert_eq!(me.body["id"], user_id);
    assert_eq!(me.body["theme"], "dark");

    let logout = call(&app, "POST", "/api/logout", Some(&cookie), None).await;
    assert_eq!(logout.status, StatusCode::OK);
    let after = call(&app, "GET", "/api/user", Some(&cookie), None).await;
    assert_eq!(after.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn profile_theme_and_locations() {
    let (app, _) = test_app();
    let (_, cookie) = register(&app, "dana", "Dana").await;

    let updated = call(
        &app,
        "PATCH",
        "/api/profile",
        Some(&cookie),
        Some(json!({ "phone": "555-0100" })),
    )
    .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["phone"], "555-0100");
    assert_eq!(updated.body["name"], "Dana");

    let theme = call(
        &app,
        "PATCH",
        "/api/profile/theme",
        Some(&cookie),
        Some(json!({ "theme": "light" })),
    )
    .await;
    assert_eq!(theme.body["theme"], "light");
    let bad_theme = call(
        &app,
        "PATCH",
        "/api/profile/theme",
        Some(&cookie),
        Some(json!({ "theme": "neon" })),
    )
    .await;
    assert_eq!(bad_theme.status, StatusCode::BAD_REQUEST);

    let saved = call(
        &app,
        "POST",
        "/api/locations",
        Some(&cookie),
        Some(json!({ "name": "Home", "address": "12 Hill Rd", "type": "home" })),
    )
    .await;
    assert_eq!(saved.status, StatusCode::CREATED);
    let listed = call(&app, "GET", "/api/locations", Some(&cookie), None).await;
    assert_eq!(listed.body[0]["type"], "home");
}

#[tokio::test]
async fn usernames_are_trimmed_on_register_and_login() {
    let (app, _) = test_app();
    let registered = call(
        &app,
        "POST",
        "/api/register",
        None,
        Some(json!({ "username": "dana ", "password": "hunter22" })),
    )
    .await;
    assert_eq!(registered.status, StatusCode::CREATED);
    assert_eq!(registered.body["username"], "dana");

    for username in ["dana", "dana ", " dana"] {
        let login = call(
            &app,
            "POST",
            "/api/login",
            None,
            Some(json!({ "username": username, "password": "hunter22" })),
        )
        .await;
        assert_eq!(login.status, StatusCode::OK, "{:?}", username);
    }
}
