use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::api::dtos::requests::{CreateEventRequest, UpdateEventRequest};
use crate::api::extractors::auth::{AuthUser, require};
use crate::domain::models::auth::Capability;
use crate::domain::models::event::{Event, Gender};
use crate::domain::services::materializer::plan_materialization;
use crate::domain::services::propagation::propagated_dates;
use crate::domain::services::validation::{normalize_event, validate_event};
use crate::error::AppError;
use crate::state::AppState;

pub async fn create_event(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Json(payload): Json<CreateEventRequest>,
) -> Result<impl IntoResponse, AppError> {
    require(&state, &actor, &[Capability::ManageEvents]).await?;
    info!("Creating event: {}", payload.slug);

    if state.event_repo.find_by_slug(&payload.slug).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "An event with slug '{}' already exists",
            payload.slug
        )));
    }

    let mut event = Event {
        id: Uuid::new_v4().to_string(),
        slug: payload.slug,
        localizations: payload.localizations,
        date: payload.date,
        end_date: payload.end_date,
        recurring: payload.recurring,
        max_published: payload.max_published.unwrap_or(1),
        currently_publishing: payload.currently_publishing.unwrap_or(true),
        registration_allowed: payload.registration_allowed.unwrap_or(false),
        rsvp_required: payload.rsvp_required.unwrap_or(false),
        registration_opens: payload.registration_opens,
        registration_deadline: payload.registration_deadline,
        automatic_refund_deadline: payload.automatic_refund_deadline,
        max_spots: payload.max_spots,
        price: payload.price.unwrap_or(0),
        member_price: payload.member_price,
        payment_options: payload.payment_options.unwrap_or_default(),
        members_only: payload.members_only.unwrap_or(false),
        min_age: payload.min_age,
        max_age: payload.max_age,
        gender: payload.gender.unwrap_or(Gender::All),
        ministries: payload.ministries.unwrap_or_default(),
        location_address: payload.location_address.unwrap_or_default(),
        image_id: payload.image_id,
        hidden: payload.hidden.unwrap_or(false),
        created_at: Utc::now(),
    };

    normalize_event(&mut event);
    validate_event(&event)?;

    let created = state.event_repo.create(&event).await?;

    let planned = plan_materialization(&created, &[], Utc::now());
    for instance in &planned {
        state.instance_repo.create(instance).await?;
    }
    info!(
        "Event {} created with {} materialized instance(s)",
        created.slug,
        planned.len()
    );

    Ok(Json(created))
}

pub async fn list_events(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let events = state.event_repo.list().await?;
    Ok(Json(events))
}

pub async fn get_event(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let event = state
        .event_repo
        .find_by_id(&event_id)
        .await?
        .ok_or(AppError::NotFound("Event not found".into()))?;

    Ok(Json(event))
}

pub async fn update_event(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path(event_id): Path<String>,
    Json(payload): Json<UpdateEventRequest>,
) -> Result<impl IntoResponse, AppError> {
    require(&state, &actor, &[Capability::ManageEvents]).await?;

    let mut event = state
        .event_repo
        .find_by_id(&event_id)
        .await?
        .ok_or(AppError::NotFound("Event not found".into()))?;

    if let Some(val) = payload.slug {
        if val != event.slug {
            if state.event_repo.find_by_slug(&val).await?.is_some() {
                return Err(AppError::Conflict(format!(
                    "An event with slug '{val}' already exists"
                )));
            }
            event.slug = val;
        }
    }
    if let Some(val) = payload.localizations {
        event.localizations = val;
    }
    if let Some(val) = payload.date {
        event.date = val;
    }
    if let Some(val) = payload.end_date {
        event.end_date = Some(val);
    }
    if let Some(val) = payload.recurring {
        event.recurring = val;
    }
    if let Some(val) = payload.max_published {
        event.max_published = val;
    }
    if let Some(val) = payload.currently_publishing {
        event.currently_publishing = val;
    }
    if let Some(val) = payload.registration_allowed {
        event.registration_allowed = val;
    }
    if let Some(val) = payload.rsvp_required {
        event.rsvp_required = val;
    }
    if let Some(val) = payload.registration_opens {
        event.registration_opens = Some(val);
    }
    if let Some(val) = payload.registration_deadline {
        event.registration_deadline = Some(val);
    }
    if let Some(val) = payload.automatic_refund_deadline {
        event.automatic_refund_deadline = Some(val);
    }
    if let Some(val) = payload.max_spots {
        event.max_spots = Some(val);
    }
    if let Some(val) = payload.price {
        event.price = val;
    }
    if let Some(val) = payload.member_price {
        event.member_price = Some(val);
    }
    if let Some(val) = payload.payment_options {
        event.payment_options = val;
    }
    if let Some(val) = payload.members_only {
        event.members_only = val;
    }
    if let Some(val) = payload.min_age {
        event.min_age = Some(val);
    }
    if let Some(val) = payload.max_age {
        event.max_age = Some(val);
    }
    if let Some(val) = payload.gender {
        event.gender = val;
    }
    if let Some(val) = payload.ministries {
        event.ministries = val;
    }
    if let Some(val) = payload.location_address {
        event.location_address = val;
    }
    if let Some(val) = payload.image_id {
        event.image_id = Some(val);
    }
    if let Some(val) = payload.hidden {
        event.hidden = val;
    }

    normalize_event(&mut event);
    validate_event(&event)?;

    let updated = state.event_repo.update(&event).await?;

    // Existing instances track the template: refresh the theoretical
    // occurrence dates, then top up the materialized window.
    let now = Utc::now();
    let mut instances = state.instance_repo.list_by_event(&updated.id).await?;
    for instance in &mut instances {
        let target = propagated_dates(&updated, instance.series_index).target_date;
        if target != instance.target_date {
            instance.target_date = target;
            instance.updated_at = now;
            state.instance_repo.update(instance).await?;
        }
    }
    let planned = plan_materialization(&updated, &instances, now);
    for instance in &planned {
        state.instance_repo.create(instance).await?;
    }

    info!("Event updated: {}", updated.slug);
    Ok(Json(updated))
}

pub async fn delete_event(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    require(&state, &actor, &[Capability::ManageEvents]).await?;

    let event = state
        .event_repo
        .find_by_id(&event_id)
        .await?
        .ok_or(AppError::NotFound("Event not found".into()))?;

    state.event_repo.delete(&event.id).await?;
    info!("Event deleted: {}", event.slug);
    Ok(Json(serde_json::json!({"status": "deleted"})))
}
