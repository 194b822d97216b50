use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;

use crate::domain::models::event::{
    Event, Gender, LocalizationMap, PaymentOption, RegistrationFields,
};
use crate::domain::models::instance::EventInstance;
use crate::domain::services::propagation::{PropagatedDates, propagated_dates};

/// The flattened view of one occurrence after merging base and override data.
/// Consumers cannot tell which side a field came from.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct EffectiveOccurrence {
    pub event_id: String,
    pub series_index: i32,
    pub target_date: DateTime<Utc>,
    pub slug: String,
    pub localizations: LocalizationMap,
    pub location_address: String,
    pub image_id: Option<String>,
    pub date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub registration_allowed: bool,
    pub rsvp_required: bool,
    pub registration_opens: Option<DateTime<Utc>>,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub automatic_refund_deadline: Option<DateTime<Utc>>,
    pub max_spots: Option<i32>,
    pub price: i64,
    pub member_price: Option<i64>,
    pub payment_options: BTreeSet<PaymentOption>,
    pub members_only: bool,
    pub min_age: Option<i32>,
    pub max_age: Option<i32>,
    pub gender: Gender,
    pub ministries: BTreeSet<String>,
    pub hidden: bool,
}

impl EffectiveOccurrence {
    /// The base event viewed as its own first occurrence. Used to validate
    /// event saves with the same rules that govern instance saves.
    pub fn from_event(event: &Event) -> Self {
        base_view(event, 0)
    }
}

/// Merges a base event with one instance's overrides into the effective view.
///
/// Per group: an active override wins wholesale, otherwise the base event's
/// value is used — with the date-valued fields taken from the propagated dates
/// for this series index, so inherited schedules and registration windows track
/// the recurrence. Localizations replace the entire map; there is no
/// per-language merge.
pub fn resolve(event: &Event, instance: &EventInstance) -> EffectiveOccurrence {
    let mut eff = base_view(event, instance.series_index);
    let ov = &instance.overrides;

    if let Some(localizations) = ov.localizations.active() {
        eff.localizations = localizations.clone();
    }
    if let Some(location) = ov.location.active() {
        eff.location_address = location.location_address.clone();
    }
    if let Some(image) = ov.image.active() {
        eff.image_id = image.image_id.clone();
    }
    if let Some(schedule) = ov.schedule.active() {
        eff.date = schedule.date;
        eff.end_date = schedule.end_date;
    }
    if let Some(registration) = ov.registration.active() {
        apply_registration(&mut eff, registration);
    }
    if let Some(eligibility) = ov.eligibility.active() {
        eff.members_only = eligibility.members_only;
        eff.min_age = eligibility.min_age;
        eff.max_age = eligibility.max_age;
        eff.gender = eligibility.gender;
        eff.ministries = eligibility.ministries.clone();
    }
    if let Some(visibility) = ov.visibility.active() {
        eff.hidden = visibility.hidden;
    }

    eff
}

/// The inherited view for a given series index: every field from the base
/// event, dates propagated along the recurrence.
fn base_view(event: &Event, series_index: i32) -> EffectiveOccurrence {
    let PropagatedDates {
        target_date,
        end_date,
        registration_opens,
        registration_deadline,
        automatic_refund_deadline,
    } = propagated_dates(event, series_index);

    EffectiveOccurrence {
        event_id: event.id.clone(),
        series_index,
        target_date,
        slug: event.slug.clone(),
        localizations: event.localizations.clone(),
        location_address: event.location_address.clone(),
        image_id: event.image_id.clone(),
        date: target_date,
        end_date,
        registration_allowed: event.registration_allowed,
        rsvp_required: event.rsvp_required,
        registration_opens,
        registration_deadline,
        automatic_refund_deadline,
        max_spots: event.max_spots,
        price: event.price,
        member_price: event.member_price,
        payment_options: event.payment_options.clone(),
        members_only: event.members_only,
        min_age: event.min_age,
        max_age: event.max_age,
        gender: event.gender,
        ministries: event.ministries.clone(),
        hidden: event.hidden,
    }
}

fn apply_registration(eff: &mut EffectiveOccurrence, registration: &RegistrationFields) {
    eff.registration_allowed = registration.registration_allowed;
    eff.rsvp_required = registration.rsvp_required;
    eff.registration_opens = registration.registration_opens;
    eff.registration_deadline = registration.registration_deadline;
    eff.automatic_refund_deadline = registration.automatic_refund_deadline;
    eff.max_spots = registration.max_spots;
    eff.price = registration.price;
    eff.member_price = registration.member_price;
    eff.payment_options = registration.payment_options.clone();
}
