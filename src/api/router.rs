use axum::{
    Router,
    body::Body,
    extract::Request,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{classify::ServerErrorsFailureClass, trace::TraceLayer};
use tracing::{Span, error, info, info_span};
use uuid::Uuid;

use crate::api::handlers::{event, health, instance, registration};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Events
        .route(
            "/api/v1/events",
            post(event::create_event).get(event::list_events),
        )
        .route(
            "/api/v1/events/{event_id}",
            get(event::get_event)
                .put(event::update_event)
                .delete(event::delete_event),
        )

        // Instances & overrides
        .route(
            "/api/v1/events/{event_id}/instances",
            get(instance::list_instances),
        )
        .route(
            "/api/v1/events/{event_id}/instances/{series_index}",
            get(instance::get_instance).put(instance::update_instance),
        )
        .route(
            "/api/v1/events/{event_id}/instances/{series_index}/effective",
            get(instance::get_effective),
        )
        .route(
            "/api/v1/events/{event_id}/instances/{series_index}/calendar.ics",
            get(instance::get_instance_ics),
        )

        // Registrations
        .route(
            "/api/v1/events/{event_id}/instances/{series_index}/registrations",
            post(registration::create_registration).get(registration::list_registrations),
        )
        .route(
            "/api/v1/events/{event_id}/instances/{series_index}/registrations/summary",
            get(registration::registration_summary),
        )
        .route(
            "/api/v1/registrations/{registration_id}",
            delete(registration::cancel_registration),
        )

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        user_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!(
                        "started processing request: {} {}",
                        request.method(),
                        request.uri().path()
                    );
                })
                .on_response(
                    |response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                        info!(
                            status = response.status().as_u16(),
                            latency_ms = latency.as_millis(),
                            "finished processing request"
                        );
                    },
                )
                .on_failure(
                    |error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                        error!("request failed: {:?}", error);
                    },
                ),
        )
        .with_state(state)
}
