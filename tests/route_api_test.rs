mod common;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use common::*;
use serde_json::json;
use std::collections::HashMap;
use tokio::net::TcpListener;

/// Serves a canned routing answer chosen by the first stop's latitude.
async fn fake_calculate_route(
    Path(locations): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    assert_eq!(query.get("key").map(String::as_str), Some("tt-test"));
    assert_eq!(query.get("computeBestOrder").map(String::as_str), Some("true"));
    assert_eq!(query.get("language").map(String::as_str), Some("fr-FR"));

    let first_lat = locations.split(',').next().unwrap_or_default();
    match first_lat {
        "10" => (StatusCode::OK, Json(json!({ "routes": [] }))).into_response(),
        "20" => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
        _ => Json(json!({
            "routes": [{
                "summary": { "lengthInMeters": 12345, "travelTimeInSeconds": 5100 },
                "legs": [
                    { "points": [ { "latitude": 48.85, "longitude": 2.35 }, { "latitude": 48.86, "longitude": 2.36 } ] },
                    { "points": [ { "latitude": 48.87, "longitude": 2.37 } ] }
                ]
            }]
        }))
        .into_response(),
    }
}

async fn spawn_provider() -> String {
    let app = Router::new().route(
        "/routing/1/calculateRoute/:locations/json",
        get(fake_calculate_route),
    );
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn bearer_for(state: &sales_zones_backend::AppState) -> String {
    let user = sales_zones_backend::models::user::User {
        id: 1,
        email: "rep@example.com".into(),
        hashed_password: String::new(),
        is_active: true,
        created_at: chrono::Utc::now(),
    };
    let session = state.auth_service.issue_session_token(&user).unwrap();
    format!("Bearer {}", session.access_token)
}

fn stops(first_lat: f64) -> serde_json::Value {
    json!([
        { "latitude": first_lat, "longitude": 2.35 },
        { "latitude": 48.87, "longitude": 2.37 }
    ])
}

#[tokio::test]
async fn best_route_is_normalized() {
    let base = spawn_provider().await;
    let (app, state) = offline_app(&base);
    let bearer = bearer_for(&state).await;

    let resp = send(
        &app,
        json_request("POST", "/calculate-best-route", Some(&bearer), &stops(48.85)),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["distance_km"], 12.3);
    assert_eq!(body["duration_str"], "1h 25min");
    assert_eq!(body["route_points"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn route_requires_a_session_token() {
    let base = spawn_provider().await;
    let (app, _) = offline_app(&base);

    let resp = send(
        &app,
        json_request("POST", "/calculate-best-route", None, &stops(48.85)),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = send(
        &app,
        json_request(
            "POST",
            "/calculate-best-route",
            Some(&admin_basic()),
            &stops(48.85),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn fewer_than_two_points_is_a_bad_request() {
    // Nothing listens here; the request must fail before any network call.
    let (app, state) = offline_app("http://127.0.0.1:9");
    let bearer = bearer_for(&state).await;

    for body in [json!([]), json!([{ "latitude": 48.85, "longitude": 2.35 }])] {
        let resp = send(
            &app,
            json_request("POST", "/calculate-best-route", Some(&bearer), &body),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn provider_outcomes_map_to_distinct_statuses() {
    let base = spawn_provider().await;
    let (app, state) = offline_app(&base);
    let bearer = bearer_for(&state).await;

    let resp = send(
        &app,
        json_request("POST", "/calculate-best-route", Some(&bearer), &stops(10.0)),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = send(
        &app,
        json_request("POST", "/calculate-best-route", Some(&bearer), &stops(20.0)),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(resp).await;
    assert!(!body["error"].as_str().unwrap().contains("boom"));

    let (unreachable, state) = offline_app("http://127.0.0.1:9");
    let bearer = bearer_for(&state).await;
    let resp = send(
        &unreachable,
        json_request("POST", "/calculate-best-route", Some(&bearer), &stops(48.85)),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
}
