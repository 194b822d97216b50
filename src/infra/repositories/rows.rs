use chrono::{DateTime, Utc};
use serde::{Serialize, de::DeserializeOwned};
use sqlx::FromRow;

use crate::domain::models::event::Event;
use crate::domain::models::instance::{
    AttributeGroup, EventInstance, GroupState, InstanceOverrides, OverridesTracker,
};
use crate::domain::models::registration::{Registration, RegistrationSummary};
use crate::error::AppError;

/// Storage representation of an event. Collection-valued fields are JSON text;
/// enums are their wire strings. Shared by the SQLite and Postgres repos.
#[derive(Debug, FromRow, Clone)]
pub struct EventRow {
    pub id: String,
    pub slug: String,
    pub localizations: String,
    pub date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub recurring: String,
    pub max_published: i32,
    pub currently_publishing: bool,
    pub registration_allowed: bool,
    pub rsvp_required: bool,
    pub registration_opens: Option<DateTime<Utc>>,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub automatic_refund_deadline: Option<DateTime<Utc>>,
    pub max_spots: Option<i32>,
    pub price: i64,
    pub member_price: Option<i64>,
    pub payment_options: String,
    pub members_only: bool,
    pub min_age: Option<i32>,
    pub max_age: Option<i32>,
    pub gender: String,
    pub ministries: String,
    pub location_address: String,
    pub image_id: Option<String>,
    pub hidden: bool,
    pub created_at: DateTime<Utc>,
}

fn to_json<T: Serialize>(value: &T) -> Result<String, AppError> {
    serde_json::to_string(value).map_err(|e| AppError::InternalWithMsg(format!("serialize: {e}")))
}

fn parse_json<T: DeserializeOwned>(raw: &str, what: &str) -> Result<T, AppError> {
    serde_json::from_str(raw)
        .map_err(|e| AppError::InternalWithMsg(format!("corrupt {what} column: {e}")))
}

fn parse_enum<T: std::str::FromStr<Err = String>>(raw: &str, what: &str) -> Result<T, AppError> {
    raw.parse()
        .map_err(|e| AppError::InternalWithMsg(format!("corrupt {what} column: {e}")))
}

impl EventRow {
    pub fn from_domain(event: &Event) -> Result<Self, AppError> {
        Ok(Self {
            id: event.id.clone(),
            slug: event.slug.clone(),
            localizations: to_json(&event.localizations)?,
            date: event.date,
            end_date: event.end_date,
            recurring: event.recurring.as_str().to_string(),
            max_published: event.max_published,
            currently_publishing: event.currently_publishing,
            registration_allowed: event.registration_allowed,
            rsvp_required: event.rsvp_required,
            registration_opens: event.registration_opens,
            registration_deadline: event.registration_deadline,
            automatic_refund_deadline: event.automatic_refund_deadline,
            max_spots: event.max_spots,
            price: event.price,
            member_price: event.member_price,
            payment_options: to_json(&event.payment_options)?,
            members_only: event.members_only,
            min_age: event.min_age,
            max_age: event.max_age,
            gender: event.gender.as_str().to_string(),
            ministries: to_json(&event.ministries)?,
            location_address: event.location_address.clone(),
            image_id: event.image_id.clone(),
            hidden: event.hidden,
            created_at: event.created_at,
        })
    }

    pub fn into_domain(self) -> Result<Event, AppError> {
        Ok(Event {
            localizations: parse_json(&self.localizations, "localizations")?,
            recurring: parse_enum(&self.recurring, "recurring")?,
            payment_options: parse_json(&self.payment_options, "payment_options")?,
            gender: parse_enum(&self.gender, "gender")?,
            ministries: parse_json(&self.ministries, "ministries")?,
            id: self.id,
            slug: self.slug,
            date: self.date,
            end_date: self.end_date,
            max_published: self.max_published,
            currently_publishing: self.currently_publishing,
            registration_allowed: self.registration_allowed,
            rsvp_required: self.rsvp_required,
            registration_opens: self.registration_opens,
            registration_deadline: self.registration_deadline,
            automatic_refund_deadline: self.automatic_refund_deadline,
            max_spots: self.max_spots,
            price: self.price,
            member_price: self.member_price,
            members_only: self.members_only,
            min_age: self.min_age,
            max_age: self.max_age,
            location_address: self.location_address,
            image_id: self.image_id,
            hidden: self.hidden,
            created_at: self.created_at,
        })
    }
}

/// Storage representation of an instance: one JSON column per attribute group
/// (NULL when nothing is stored) plus the tracker bitmask. Bit i of the mask
/// corresponds to group i; a stored payload with its bit clear is retained
/// but inactive.
#[derive(Debug, FromRow, Clone)]
pub struct InstanceRow {
    pub id: String,
    pub event_id: String,
    pub series_index: i32,
    pub target_date: DateTime<Utc>,
    pub overrides_mask: i32,
    pub localizations: Option<String>,
    pub location: Option<String>,
    pub image: Option<String>,
    pub schedule: Option<String>,
    pub registration: Option<String>,
    pub eligibility: Option<String>,
    pub visibility: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn group_to_column<T: Serialize>(state: &GroupState<T>) -> Result<Option<String>, AppError> {
    match state.stored() {
        Some(data) => Ok(Some(to_json(data)?)),
        None => Ok(None),
    }
}

fn group_from_column<T: DeserializeOwned>(
    raw: &Option<String>,
    flagged: bool,
    what: &str,
) -> Result<GroupState<T>, AppError> {
    let data = match raw {
        Some(json) => Some(parse_json(json, what)?),
        None => None,
    };
    GroupState::from_parts(data, flagged)
        .map_err(|_| AppError::InternalWithMsg(format!("corrupt instance row: {what} flagged without data")))
}

impl InstanceRow {
    pub fn from_domain(instance: &EventInstance) -> Result<Self, AppError> {
        let ov = &instance.overrides;
        Ok(Self {
            id: instance.id.clone(),
            event_id: instance.event_id.clone(),
            series_index: instance.series_index,
            target_date: instance.target_date,
            overrides_mask: ov.tracker().to_mask(),
            localizations: group_to_column(&ov.localizations)?,
            location: group_to_column(&ov.location)?,
            image: group_to_column(&ov.image)?,
            schedule: group_to_column(&ov.schedule)?,
            registration: group_to_column(&ov.registration)?,
            eligibility: group_to_column(&ov.eligibility)?,
            visibility: group_to_column(&ov.visibility)?,
            created_at: instance.created_at,
            updated_at: instance.updated_at,
        })
    }

    pub fn into_domain(self) -> Result<EventInstance, AppError> {
        let tracker = OverridesTracker::from_mask(self.overrides_mask);
        let flag = |group: AttributeGroup| tracker.is_overridden(group);

        let overrides = InstanceOverrides {
            localizations: group_from_column(
                &self.localizations,
                flag(AttributeGroup::Localizations),
                "localizations",
            )?,
            location: group_from_column(&self.location, flag(AttributeGroup::Location), "location")?,
            image: group_from_column(&self.image, flag(AttributeGroup::Image), "image")?,
            schedule: group_from_column(&self.schedule, flag(AttributeGroup::Schedule), "schedule")?,
            registration: group_from_column(
                &self.registration,
                flag(AttributeGroup::Registration),
                "registration",
            )?,
            eligibility: group_from_column(
                &self.eligibility,
                flag(AttributeGroup::Eligibility),
                "eligibility",
            )?,
            visibility: group_from_column(
                &self.visibility,
                flag(AttributeGroup::Visibility),
                "visibility",
            )?,
        };

        Ok(EventInstance {
            id: self.id,
            event_id: self.event_id,
            series_index: self.series_index,
            target_date: self.target_date,
            overrides,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, FromRow, Clone)]
pub struct RegistrationRow {
    pub id: String,
    pub event_id: String,
    pub series_index: i32,
    pub attendee_name: String,
    pub attendee_email: String,
    pub member: bool,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub status: String,
    pub payment_status: String,
    pub payment_option: Option<String>,
    pub amount_due: i64,
    pub amount_paid: i64,
    pub management_token: String,
    pub created_at: DateTime<Utc>,
}

impl RegistrationRow {
    pub fn from_domain(registration: &Registration) -> Self {
        Self {
            id: registration.id.clone(),
            event_id: registration.event_id.clone(),
            series_index: registration.series_index,
            attendee_name: registration.attendee_name.clone(),
            attendee_email: registration.attendee_email.clone(),
            member: registration.member,
            age: registration.age,
            gender: registration.gender.map(|g| g.as_str().to_string()),
            status: registration.status.as_str().to_string(),
            payment_status: registration.payment_status.as_str().to_string(),
            payment_option: registration.payment_option.map(|p| p.as_str().to_string()),
            amount_due: registration.amount_due,
            amount_paid: registration.amount_paid,
            management_token: registration.management_token.clone(),
            created_at: registration.created_at,
        }
    }

    pub fn into_domain(self) -> Result<Registration, AppError> {
        Ok(Registration {
            gender: self
                .gender
                .as_deref()
                .map(|g| parse_enum(g, "gender"))
                .transpose()?,
            status: parse_enum(&self.status, "status")?,
            payment_status: parse_enum(&self.payment_status, "payment_status")?,
            payment_option: self
                .payment_option
                .as_deref()
                .map(|p| parse_enum(p, "payment_option"))
                .transpose()?,
            id: self.id,
            event_id: self.event_id,
            series_index: self.series_index,
            attendee_name: self.attendee_name,
            attendee_email: self.attendee_email,
            member: self.member,
            age: self.age,
            amount_due: self.amount_due,
            amount_paid: self.amount_paid,
            management_token: self.management_token,
            created_at: self.created_at,
        })
    }
}

/// Aggregate row for the registration summary query.
#[derive(Debug, FromRow, Clone)]
pub struct SummaryRow {
    pub seats_filled: i64,
    pub amount_due_total: i64,
    pub amount_paid_total: i64,
}

impl From<SummaryRow> for RegistrationSummary {
    fn from(row: SummaryRow) -> Self {
        RegistrationSummary {
            seats_filled: row.seats_filled,
            amount_due_total: row.amount_due_total,
            amount_paid_total: row.amount_paid_total,
        }
    }
}
