use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::dtos::requests::InstanceOverridePayload;
use crate::domain::models::instance::EventInstance;
use crate::domain::services::resolution::EffectiveOccurrence;

#[derive(Serialize)]
pub struct InstanceResponse {
    pub id: String,
    pub event_id: String,
    pub series_index: i32,
    pub target_date: DateTime<Utc>,
    pub overrides_tracker: Vec<bool>,
    pub overrides: InstanceOverridePayload,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InstanceResponse {
    pub fn from_domain(instance: &EventInstance) -> Self {
        let ov = &instance.overrides;
        Self {
            id: instance.id.clone(),
            event_id: instance.event_id.clone(),
            series_index: instance.series_index,
            target_date: instance.target_date,
            overrides_tracker: instance.overrides.tracker().flags().to_vec(),
            overrides: InstanceOverridePayload {
                localizations: ov.localizations.stored().cloned(),
                location: ov.location.stored().cloned(),
                image: ov.image.stored().cloned(),
                schedule: ov.schedule.stored().cloned(),
                registration: ov.registration.stored().cloned(),
                eligibility: ov.eligibility.stored().cloned(),
                visibility: ov.visibility.stored().cloned(),
            },
            created_at: instance.created_at,
            updated_at: instance.updated_at,
        }
    }
}

#[derive(Serialize)]
pub struct InstancePageResponse {
    pub items: Vec<InstanceResponse>,
    pub page: i64,
    pub limit: i64,
    pub total: i64,
}

#[derive(Serialize)]
pub struct EffectiveInstanceResponse {
    #[serde(flatten)]
    pub occurrence: EffectiveOccurrence,
    pub image_url: Option<String>,
}

#[derive(Serialize)]
pub struct RegistrationSummaryResponse {
    pub seats_filled: i64,
    pub max_spots: Option<i32>,
    pub amount_due_total: i64,
    pub amount_paid_total: i64,
}
