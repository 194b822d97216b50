use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::dtos::requests::CreateRegistrationRequest;
use crate::api::dtos::responses::RegistrationSummaryResponse;
use crate::api::extractors::auth::{AuthUser, require};
use crate::domain::models::auth::Capability;
use crate::domain::models::registration::{NewRegistrationParams, Registration};
use crate::domain::services::admission::{
    AdmissionDenied, AttendeeProfile, amount_due, check_admission, check_payment_option,
};
use crate::domain::services::resolution::{EffectiveOccurrence, resolve};
use crate::domain::services::validation::ValidationErrors;
use crate::error::AppError;
use crate::state::AppState;

fn admission_error(denied: AdmissionDenied) -> AppError {
    match denied {
        AdmissionDenied::Full => AppError::Conflict("This occurrence is fully booked".into()),
        AdmissionDenied::RegistrationDisabled => {
            AppError::Forbidden("Registration is not available for this event".into())
        }
        AdmissionDenied::Hidden => AppError::NotFound("Instance not found".into()),
        AdmissionDenied::MembersOnly => {
            AppError::Forbidden("This event is open to members only".into())
        }
        AdmissionDenied::NotOpenYet => AppError::Validation(ValidationErrors::single(
            "registration_opens",
            "registration has not opened yet",
        )),
        AdmissionDenied::Closed => AppError::Validation(ValidationErrors::single(
            "registration_deadline",
            "registration has closed",
        )),
        AdmissionDenied::BelowMinAge => AppError::Validation(ValidationErrors::single(
            "age",
            "attendee is below the minimum age",
        )),
        AdmissionDenied::AboveMaxAge => AppError::Validation(ValidationErrors::single(
            "age",
            "attendee is above the maximum age",
        )),
        AdmissionDenied::GenderRestricted => AppError::Validation(ValidationErrors::single(
            "gender",
            "attendee does not match the event's audience",
        )),
        AdmissionDenied::PaymentOptionRequired => AppError::Validation(ValidationErrors::single(
            "payment_option",
            "a payment option is required for a priced event",
        )),
        AdmissionDenied::PaymentOptionNotOffered(option) => {
            AppError::Validation(ValidationErrors::single(
                "payment_option",
                format!("payment option '{}' is not offered", option.as_str()),
            ))
        }
    }
}

pub async fn create_registration(
    State(state): State<Arc<AppState>>,
    Path((event_id, series_index)): Path<(String, i32)>,
    Json(payload): Json<CreateRegistrationRequest>,
) -> Result<impl IntoResponse, AppError> {
    let event = state
        .event_repo
        .find_by_id(&event_id)
        .await?
        .ok_or(AppError::NotFound("Event not found".into()))?;
    let instance = state
        .instance_repo
        .find(&event.id, series_index)
        .await?
        .ok_or(AppError::NotFound("Instance not found".into()))?;

    let eff = resolve(&event, &instance);
    let now = Utc::now();

    let attendee = AttendeeProfile {
        member: payload.member.unwrap_or(false),
        age: payload.age,
        gender: payload.gender,
    };
    let seats_filled = state
        .registration_repo
        .count_confirmed(&event.id, series_index)
        .await?;

    check_admission(&eff, &attendee, seats_filled, now).map_err(admission_error)?;

    let owed = amount_due(&eff, attendee.member);
    check_payment_option(&eff, owed, payload.payment_option).map_err(admission_error)?;

    let registration = Registration::new(NewRegistrationParams {
        event_id: event.id.clone(),
        series_index,
        attendee_name: payload.name,
        attendee_email: payload.email,
        member: attendee.member,
        age: attendee.age,
        gender: attendee.gender,
        payment_option: if owed > 0 { payload.payment_option } else { None },
        amount_due: owed,
    });

    let saved = state.registration_repo.create(&registration).await?;
    info!(
        "Registration {} created for event {} instance {}",
        saved.id, event.slug, series_index
    );

    send_confirmation(&state, &eff, &saved).await;

    Ok(Json(saved))
}

/// Best effort: a failed confirmation never fails the registration, and is
/// never retried automatically.
async fn send_confirmation(state: &AppState, eff: &EffectiveOccurrence, saved: &Registration) {
    let title = eff
        .localizations
        .get("en")
        .or_else(|| eff.localizations.values().next())
        .map(|l| l.title.clone())
        .unwrap_or_default();

    let mut context = tera::Context::new();
    context.insert("attendee_name", &saved.attendee_name);
    context.insert("event_title", &title);
    context.insert("event_date", &eff.date.to_rfc3339());
    context.insert("location_address", &eff.location_address);
    context.insert("amount_due", &saved.amount_due);
    context.insert(
        "amount_due_formatted",
        &format!("{}.{:02}", saved.amount_due / 100, saved.amount_due % 100),
    );

    let body = match state
        .templates
        .render("registration_confirmation.html", &context)
    {
        Ok(html) => html,
        Err(e) => {
            warn!("Failed to render confirmation template: {}", e);
            return;
        }
    };

    let subject = format!("Registration confirmed: {title}");
    if let Err(e) = state
        .email_service
        .send(&saved.attendee_email, &subject, &body)
        .await
    {
        warn!("Confirmation email to {} failed: {}", saved.attendee_email, e);
    }
}

pub async fn list_registrations(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path((event_id, series_index)): Path<(String, i32)>,
) -> Result<impl IntoResponse, AppError> {
    require(&state, &actor, &[Capability::ManageRegistrations]).await?;

    let registrations = state
        .registration_repo
        .list_by_instance(&event_id, series_index)
        .await?;
    Ok(Json(registrations))
}

pub async fn registration_summary(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path((event_id, series_index)): Path<(String, i32)>,
) -> Result<impl IntoResponse, AppError> {
    require(&state, &actor, &[Capability::ManageRegistrations]).await?;

    let event = state
        .event_repo
        .find_by_id(&event_id)
        .await?
        .ok_or(AppError::NotFound("Event not found".into()))?;
    let instance = state
        .instance_repo
        .find(&event.id, series_index)
        .await?
        .ok_or(AppError::NotFound("Instance not found".into()))?;

    let eff = resolve(&event, &instance);
    let summary = state
        .registration_repo
        .summarize(&event.id, series_index)
        .await?;

    Ok(Json(RegistrationSummaryResponse {
        seats_filled: summary.seats_filled,
        max_spots: eff.max_spots,
        amount_due_total: summary.amount_due_total,
        amount_paid_total: summary.amount_paid_total,
    }))
}

pub async fn cancel_registration(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path(registration_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    require(&state, &actor, &[Capability::ManageRegistrations]).await?;

    state.registration_repo.cancel(&registration_id).await?;
    info!("Registration cancelled: {}", registration_id);
    Ok(Json(serde_json::json!({"status": "cancelled"})))
}
