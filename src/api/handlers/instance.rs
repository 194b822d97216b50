use axum::{
    Json,
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

use crate::api::dtos::requests::{InstanceListQuery, InstanceOverridePayload, UpdateInstanceRequest};
use crate::api::dtos::responses::{
    EffectiveInstanceResponse, InstancePageResponse, InstanceResponse,
};
use crate::api::extractors::auth::{AuthUser, MaybeAuthUser, require};
use crate::domain::models::auth::Capability;
use crate::domain::models::event::Event;
use crate::domain::models::instance::{
    EventInstance, GroupState, InstanceFilter, InstanceOverrides, OverridesTracker,
};
use crate::domain::services::calendar::generate_ics;
use crate::domain::services::resolution::{EffectiveOccurrence, resolve};
use crate::domain::services::validation::{ValidationErrors, normalize_instance, validate_instance};
use crate::error::AppError;
use crate::state::AppState;

async fn load_event(state: &AppState, event_id: &str) -> Result<Event, AppError> {
    state
        .event_repo
        .find_by_id(event_id)
        .await?
        .ok_or(AppError::NotFound("Event not found".into()))
}

async fn load_instance(
    state: &AppState,
    event_id: &str,
    series_index: i32,
) -> Result<EventInstance, AppError> {
    state
        .instance_repo
        .find(event_id, series_index)
        .await?
        .ok_or(AppError::NotFound("Instance not found".into()))
}

pub async fn list_instances(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(event_id): Path<String>,
    Query(query): Query<InstanceListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let event = load_event(&state, &event_id).await?;

    let status = query
        .status
        .as_deref()
        .unwrap_or("all")
        .parse()
        .map_err(AppError::BadRequest)?;
    let sort = query
        .sort
        .as_deref()
        .unwrap_or("asc")
        .parse()
        .map_err(AppError::BadRequest)?;
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).clamp(1, 100);

    let result = state
        .instance_repo
        .list_page(
            &event.id,
            InstanceFilter {
                status,
                // Single reference instant for the whole listing.
                reference: Utc::now(),
                sort,
                page,
                limit,
            },
        )
        .await?;

    Ok(Json(InstancePageResponse {
        items: result.items.iter().map(InstanceResponse::from_domain).collect(),
        page,
        limit,
        total: result.total,
    }))
}

pub async fn get_instance(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path((event_id, series_index)): Path<(String, i32)>,
) -> Result<impl IntoResponse, AppError> {
    let event = load_event(&state, &event_id).await?;
    let instance = load_instance(&state, &event.id, series_index).await?;
    Ok(Json(InstanceResponse::from_domain(&instance)))
}

async fn resolved_for_viewer(
    state: &AppState,
    event_id: &str,
    series_index: i32,
    is_admin: bool,
) -> Result<EffectiveOccurrence, AppError> {
    let event = load_event(state, event_id).await?;
    let instance = load_instance(state, &event.id, series_index).await?;
    let eff = resolve(&event, &instance);

    if eff.hidden && !is_admin {
        return Err(AppError::NotFound("Instance not found".into()));
    }
    Ok(eff)
}

pub async fn get_effective(
    State(state): State<Arc<AppState>>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path((event_id, series_index)): Path<(String, i32)>,
) -> Result<impl IntoResponse, AppError> {
    let eff = resolved_for_viewer(&state, &event_id, series_index, viewer.is_some()).await?;

    let image_url = match &eff.image_id {
        Some(asset_id) => Some(state.media_resolver.resolve_url(asset_id).await),
        None => None,
    };

    Ok(Json(EffectiveInstanceResponse {
        occurrence: eff,
        image_url,
    }))
}

pub async fn get_instance_ics(
    State(state): State<Arc<AppState>>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path((event_id, series_index)): Path<(String, i32)>,
) -> Result<impl IntoResponse, AppError> {
    let eff = resolved_for_viewer(&state, &event_id, series_index, viewer.is_some()).await?;
    let ics = generate_ics(&eff);

    Ok((
        [(header::CONTENT_TYPE, "text/calendar; charset=utf-8")],
        ics,
    ))
}

fn merge_group<T: Clone>(
    current: &GroupState<T>,
    incoming: Option<T>,
    flagged: bool,
    field: &str,
    errs: &mut ValidationErrors,
) -> GroupState<T> {
    // An incoming payload replaces the stored one; otherwise the stored
    // payload survives flag toggles (soft revert).
    let data = incoming.or_else(|| current.stored().cloned());
    match GroupState::from_parts(data, flagged) {
        Ok(next) => next,
        Err(_) => {
            errs.push(field, "override enabled but no override values present");
            GroupState::Inherited
        }
    }
}

fn apply_override_update(
    current: &InstanceOverrides,
    payload: InstanceOverridePayload,
    tracker: &OverridesTracker,
) -> Result<InstanceOverrides, ValidationErrors> {
    use crate::domain::models::instance::AttributeGroup as G;

    let mut errs = ValidationErrors::new();
    let next = InstanceOverrides {
        localizations: merge_group(
            &current.localizations,
            payload.localizations,
            tracker.is_overridden(G::Localizations),
            "overrides.localizations",
            &mut errs,
        ),
        location: merge_group(
            &current.location,
            payload.location,
            tracker.is_overridden(G::Location),
            "overrides.location",
            &mut errs,
        ),
        image: merge_group(
            &current.image,
            payload.image,
            tracker.is_overridden(G::Image),
            "overrides.image",
            &mut errs,
        ),
        schedule: merge_group(
            &current.schedule,
            payload.schedule,
            tracker.is_overridden(G::Schedule),
            "overrides.schedule",
            &mut errs,
        ),
        registration: merge_group(
            &current.registration,
            payload.registration,
            tracker.is_overridden(G::Registration),
            "overrides.registration",
            &mut errs,
        ),
        eligibility: merge_group(
            &current.eligibility,
            payload.eligibility,
            tracker.is_overridden(G::Eligibility),
            "overrides.eligibility",
            &mut errs,
        ),
        visibility: merge_group(
            &current.visibility,
            payload.visibility,
            tracker.is_overridden(G::Visibility),
            "overrides.visibility",
            &mut errs,
        ),
    };

    errs.into_result()?;
    Ok(next)
}

pub async fn update_instance(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path((event_id, series_index)): Path<(String, i32)>,
    Json(payload): Json<UpdateInstanceRequest>,
) -> Result<impl IntoResponse, AppError> {
    require(&state, &actor, &[Capability::ManageEvents]).await?;

    let event = load_event(&state, &event_id).await?;
    let mut instance = load_instance(&state, &event.id, series_index).await?;

    let tracker = OverridesTracker::try_from(payload.overrides_tracker.as_slice())
        .map_err(|e| ValidationErrors::single("overrides_tracker", e))?;

    instance.overrides = apply_override_update(&instance.overrides, payload.overrides, &tracker)?;
    normalize_instance(&mut instance);
    validate_instance(&event, &instance)?;

    instance.updated_at = Utc::now();
    let saved = state.instance_repo.update(&instance).await?;

    info!(
        "Updated overrides for event {} instance {}",
        event.slug, series_index
    );
    Ok(Json(InstanceResponse::from_domain(&saved)))
}
