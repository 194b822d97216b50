mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::{Duration, Utc};
use common::TestApp;
use serde_json::{Value, json};
use tower::ServiceExt;

async fn parse_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn event_payload(slug: &str) -> Value {
    json!({
        "slug": slug,
        "localizations": {
            "en": { "title": "Youth Night", "description": "Games and pizza" }
        },
        "date": (Utc::now() + Duration::days(14)).to_rfc3339(),
        "recurring": "weekly",
        "max_published": 3,
        "location_address": "12 Chapel Street"
    })
}

async fn post_event(app: &TestApp, token: &str, payload: &Value) -> axum::response::Response {
    app.router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/events")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn test_create_event_materializes_instances() {
    let app = TestApp::new().await;
    let token = app.admin_token();

    let res = post_event(&app, &token, &event_payload("youth-night")).await;
    assert_eq!(res.status(), StatusCode::OK);
    let event = parse_body(res).await;
    let event_id = event["id"].as_str().unwrap();

    let res = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(format!("/api/v1/events/{event_id}/instances"))
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let page = parse_body(res).await;
    assert_eq!(page["total"].as_i64().unwrap(), 3);
    let indices: Vec<i64> = page["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["series_index"].as_i64().unwrap())
        .collect();
    assert_eq!(indices, vec![0, 1, 2]);
}

#[tokio::test]
async fn test_create_event_requires_auth_and_capability() {
    let app = TestApp::new().await;

    let res = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/events")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(event_payload("anon").to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let weak_token = app.token_with_caps(&["registrations:manage"]);
    let res = post_event(&app, &weak_token, &event_payload("weak")).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_duplicate_slug_is_a_conflict() {
    let app = TestApp::new().await;
    let token = app.admin_token();

    let res = post_event(&app, &token, &event_payload("bible-study")).await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = post_event(&app, &token, &event_payload("bible-study")).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_end_date_must_follow_date() {
    let app = TestApp::new().await;
    let token = app.admin_token();

    let mut payload = event_payload("backwards");
    payload["end_date"] = json!((Utc::now() + Duration::days(13)).to_rfc3339());

    let res = post_event(&app, &token, &payload).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = parse_body(res).await;
    let fields: Vec<&str> = body["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"end_date"));
}

#[tokio::test]
async fn test_one_off_event_forces_single_instance() {
    let app = TestApp::new().await;
    let token = app.admin_token();

    let mut payload = event_payload("harvest-dinner");
    payload["recurring"] = json!("never");
    payload["max_published"] = json!(5);

    let res = post_event(&app, &token, &payload).await;
    assert_eq!(res.status(), StatusCode::OK);
    let event = parse_body(res).await;

    // Corrected silently, not rejected.
    assert_eq!(event["max_published"].as_i64().unwrap(), 1);

    let event_id = event["id"].as_str().unwrap();
    let res = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(format!("/api/v1/events/{event_id}/instances"))
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let page = parse_body(res).await;
    assert_eq!(page["total"].as_i64().unwrap(), 1);
}

#[tokio::test]
async fn test_delete_event_cascades_to_instances() {
    let app = TestApp::new().await;
    let token = app.admin_token();

    let res = post_event(&app, &token, &event_payload("mens-breakfast")).await;
    let event = parse_body(res).await;
    let event_id = event["id"].as_str().unwrap().to_string();

    let res = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/v1/events/{event_id}"))
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let remaining: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM event_instances WHERE event_id = ?")
            .bind(&event_id)
            .fetch_one(&app.pool)
            .await
            .unwrap();
    assert_eq!(remaining, 0);

    let res = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(format!("/api/v1/events/{event_id}"))
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_pausing_publication_stops_materialization() {
    let app = TestApp::new().await;
    let token = app.admin_token();

    let res = post_event(&app, &token, &event_payload("choir-practice")).await;
    let event = parse_body(res).await;
    let event_id = event["id"].as_str().unwrap();

    // Pause, then raise the window: no new instances may appear.
    let res = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/api/v1/events/{event_id}"))
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({ "currently_publishing": false, "max_published": 6 }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(format!("/api/v1/events/{event_id}/instances"))
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let page = parse_body(res).await;
    assert_eq!(page["total"].as_i64().unwrap(), 3);

    // Resuming tops the window back up.
    let res = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/api/v1/events/{event_id}"))
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({ "currently_publishing": true }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(format!("/api/v1/events/{event_id}/instances"))
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let page = parse_body(res).await;
    assert_eq!(page["total"].as_i64().unwrap(), 6);
}
