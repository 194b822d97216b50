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

async fn seed_event(app: &TestApp, token: &str) -> String {
    let payload = json!({
        "slug": "midweek-service",
        "localizations": {
            "en": { "title": "Midweek Service", "description": "Weekly service" },
            "de": { "title": "Wochengottesdienst", "description": "Wöchentlicher Gottesdienst" }
        },
        "date": (Utc::now() + Duration::days(10)).to_rfc3339(),
        "recurring": "weekly",
        "max_published": 3,
        "location_address": "Main Hall"
    });

    let res = app
        .router
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
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    parse_body(res).await["id"].as_str().unwrap().to_string()
}

async fn put_instance(
    app: &TestApp,
    token: &str,
    event_id: &str,
    series_index: i32,
    payload: Value,
) -> axum::response::Response {
    app.router
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/api/v1/events/{event_id}/instances/{series_index}"))
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn get_effective(app: &TestApp, event_id: &str, series_index: i32) -> Value {
    let res = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(format!(
                    "/api/v1/events/{event_id}/instances/{series_index}/effective"
                ))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    parse_body(res).await
}

#[tokio::test]
async fn test_untouched_instance_inherits_everything() {
    let app = TestApp::new().await;
    let token = app.admin_token();
    let event_id = seed_event(&app, &token).await;

    let eff = get_effective(&app, &event_id, 1).await;
    assert_eq!(eff["location_address"].as_str().unwrap(), "Main Hall");
    assert_eq!(
        eff["localizations"]["en"]["title"].as_str().unwrap(),
        "Midweek Service"
    );
    assert_eq!(eff["hidden"].as_bool().unwrap(), false);
}

#[tokio::test]
async fn test_location_override_applies_without_touching_other_groups() {
    let app = TestApp::new().await;
    let token = app.admin_token();
    let event_id = seed_event(&app, &token).await;

    let res = put_instance(
        &app,
        &token,
        &event_id,
        1,
        json!({
            "overrides_tracker": [false, true, false, false, false, false, false],
            "overrides": { "location": { "location_address": "Fellowship Hall" } }
        }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let eff = get_effective(&app, &event_id, 1).await;
    assert_eq!(eff["location_address"].as_str().unwrap(), "Fellowship Hall");
    // The rest still inherits.
    assert_eq!(
        eff["localizations"]["en"]["title"].as_str().unwrap(),
        "Midweek Service"
    );

    // Sibling instances are untouched.
    let eff = get_effective(&app, &event_id, 2).await;
    assert_eq!(eff["location_address"].as_str().unwrap(), "Main Hall");
}

#[tokio::test]
async fn test_localization_override_replaces_the_whole_map() {
    let app = TestApp::new().await;
    let token = app.admin_token();
    let event_id = seed_event(&app, &token).await;

    // The base event carries en + de; the override supplies only en. The map
    // is replaced wholesale, so no de entry survives.
    let res = put_instance(
        &app,
        &token,
        &event_id,
        0,
        json!({
            "overrides_tracker": [true, false, false, false, false, false, false],
            "overrides": {
                "localizations": {
                    "en": { "title": "Special Midweek Service", "description": "Guest speaker" }
                }
            }
        }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let eff = get_effective(&app, &event_id, 0).await;
    let localizations = eff["localizations"].as_object().unwrap();
    assert_eq!(localizations.len(), 1);
    assert_eq!(
        localizations["en"]["title"].as_str().unwrap(),
        "Special Midweek Service"
    );
    assert!(!localizations.contains_key("de"));
}

#[tokio::test]
async fn test_tracker_must_have_seven_flags() {
    let app = TestApp::new().await;
    let token = app.admin_token();
    let event_id = seed_event(&app, &token).await;

    let res = put_instance(
        &app,
        &token,
        &event_id,
        0,
        json!({ "overrides_tracker": [true, false, false] }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = parse_body(res).await;
    assert_eq!(
        body["fields"][0]["field"].as_str().unwrap(),
        "overrides_tracker"
    );
}

#[tokio::test]
async fn test_flag_without_data_is_rejected() {
    let app = TestApp::new().await;
    let token = app.admin_token();
    let event_id = seed_event(&app, &token).await;

    let res = put_instance(
        &app,
        &token,
        &event_id,
        0,
        json!({
            "overrides_tracker": [false, false, false, false, false, false, true],
            "overrides": {}
        }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = parse_body(res).await;
    assert_eq!(
        body["fields"][0]["field"].as_str().unwrap(),
        "overrides.visibility"
    );
}

#[tokio::test]
async fn test_soft_revert_keeps_override_values() {
    let app = TestApp::new().await;
    let token = app.admin_token();
    let event_id = seed_event(&app, &token).await;

    let res = put_instance(
        &app,
        &token,
        &event_id,
        1,
        json!({
            "overrides_tracker": [false, true, false, false, false, false, false],
            "overrides": { "location": { "location_address": "Youth Annex" } }
        }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    // Toggle the flag off without resubmitting any values.
    let res = put_instance(
        &app,
        &token,
        &event_id,
        1,
        json!({ "overrides_tracker": [false, false, false, false, false, false, false] }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let eff = get_effective(&app, &event_id, 1).await;
    assert_eq!(eff["location_address"].as_str().unwrap(), "Main Hall");

    // The stored payload survived the toggle.
    let res = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(format!("/api/v1/events/{event_id}/instances/1"))
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let stored = parse_body(res).await;
    assert_eq!(
        stored["overrides"]["location"]["location_address"]
            .as_str()
            .unwrap(),
        "Youth Annex"
    );
    assert_eq!(stored["overrides_tracker"][1].as_bool().unwrap(), false);

    // Toggling back on restores the previous effective value.
    let res = put_instance(
        &app,
        &token,
        &event_id,
        1,
        json!({ "overrides_tracker": [false, true, false, false, false, false, false] }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let eff = get_effective(&app, &event_id, 1).await;
    assert_eq!(eff["location_address"].as_str().unwrap(), "Youth Annex");
}

#[tokio::test]
async fn test_hidden_override_hides_instance_from_public() {
    let app = TestApp::new().await;
    let token = app.admin_token();
    let event_id = seed_event(&app, &token).await;

    let res = put_instance(
        &app,
        &token,
        &event_id,
        0,
        json!({
            "overrides_tracker": [false, false, false, false, false, false, true],
            "overrides": { "visibility": { "hidden": true } }
        }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(format!("/api/v1/events/{event_id}/instances/0/effective"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // Admins still see it.
    let res = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(format!("/api/v1/events/{event_id}/instances/0/effective"))
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let eff = parse_body(res).await;
    assert_eq!(eff["hidden"].as_bool().unwrap(), true);
}

#[tokio::test]
async fn test_image_override_resolves_to_url() {
    let app = TestApp::new().await;
    let token = app.admin_token();
    let event_id = seed_event(&app, &token).await;

    let eff = get_effective(&app, &event_id, 0).await;
    assert!(eff["image_url"].is_null());

    let res = put_instance(
        &app,
        &token,
        &event_id,
        0,
        json!({
            "overrides_tracker": [false, false, true, false, false, false, false],
            "overrides": { "image": { "image_id": "asset-42" } }
        }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let eff = get_effective(&app, &event_id, 0).await;
    assert_eq!(eff["image_url"].as_str().unwrap(), "https://cdn.test/asset-42");
}
