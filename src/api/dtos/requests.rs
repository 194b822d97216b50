use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::domain::models::event::{
    EligibilityFields, Gender, ImageFields, LocalizationMap, LocationFields, PaymentOption,
    Recurrence, RegistrationFields, ScheduleFields, VisibilityFields,
};

#[derive(Deserialize)]
pub struct CreateEventRequest {
    pub slug: String,
    pub localizations: LocalizationMap,
    pub date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub recurring: Recurrence,
    pub max_published: Option<i32>,
    pub currently_publishing: Option<bool>,
    pub registration_allowed: Option<bool>,
    pub rsvp_required: Option<bool>,
    pub registration_opens: Option<DateTime<Utc>>,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub automatic_refund_deadline: Option<DateTime<Utc>>,
    pub max_spots: Option<i32>,
    pub price: Option<i64>,
    pub member_price: Option<i64>,
    pub payment_options: Option<BTreeSet<PaymentOption>>,
    pub members_only: Option<bool>,
    pub min_age: Option<i32>,
    pub max_age: Option<i32>,
    pub gender: Option<Gender>,
    pub ministries: Option<BTreeSet<String>>,
    pub location_address: Option<String>,
    pub image_id: Option<String>,
    pub hidden: Option<bool>,
}

#[derive(Deserialize)]
pub struct UpdateEventRequest {
    pub slug: Option<String>,
    pub localizations: Option<LocalizationMap>,
    pub date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub recurring: Option<Recurrence>,
    pub max_published: Option<i32>,
    pub currently_publishing: Option<bool>,
    pub registration_allowed: Option<bool>,
    pub rsvp_required: Option<bool>,
    pub registration_opens: Option<DateTime<Utc>>,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub automatic_refund_deadline: Option<DateTime<Utc>>,
    pub max_spots: Option<i32>,
    pub price: Option<i64>,
    pub member_price: Option<i64>,
    pub payment_options: Option<BTreeSet<PaymentOption>>,
    pub members_only: Option<bool>,
    pub min_age: Option<i32>,
    pub max_age: Option<i32>,
    pub gender: Option<Gender>,
    pub ministries: Option<BTreeSet<String>>,
    pub location_address: Option<String>,
    pub image_id: Option<String>,
    pub hidden: Option<bool>,
}

/// Per-group override payloads. Absent groups carry no data; whether a present
/// group is applied or merely retained is decided by the tracker vector.
#[derive(Serialize, Deserialize, Default, Clone)]
#[serde(default)]
pub struct InstanceOverridePayload {
    pub localizations: Option<LocalizationMap>,
    pub location: Option<LocationFields>,
    pub image: Option<ImageFields>,
    pub schedule: Option<ScheduleFields>,
    pub registration: Option<RegistrationFields>,
    pub eligibility: Option<EligibilityFields>,
    pub visibility: Option<VisibilityFields>,
}

#[derive(Deserialize)]
pub struct UpdateInstanceRequest {
    /// Exactly seven flags, one per attribute group, in schema order.
    pub overrides_tracker: Vec<bool>,
    #[serde(default)]
    pub overrides: InstanceOverridePayload,
}

#[derive(Deserialize)]
pub struct InstanceListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<String>,
    pub sort: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateRegistrationRequest {
    pub name: String,
    pub email: String,
    pub member: Option<bool>,
    pub age: Option<i32>,
    pub gender: Option<Gender>,
    pub payment_option: Option<PaymentOption>,
}
