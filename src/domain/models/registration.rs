use chrono::{DateTime, Utc};
use rand::{Rng, distributions::Alphanumeric};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use super::event::{Gender, PaymentOption};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    Confirmed,
    Cancelled,
}

impl RegistrationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationStatus::Confirmed => "confirmed",
            RegistrationStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for RegistrationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confirmed" => Ok(RegistrationStatus::Confirmed),
            "cancelled" => Ok(RegistrationStatus::Cancelled),
            other => Err(format!("unknown registration status '{other}'")),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    NotRequired,
    Pending,
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::NotRequired => "not_required",
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_required" => Ok(PaymentStatus::NotRequired),
            "pending" => Ok(PaymentStatus::Pending),
            "paid" => Ok(PaymentStatus::Paid),
            other => Err(format!("unknown payment status '{other}'")),
        }
    }
}

/// Per-attendee per-instance registration record.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Registration {
    pub id: String,
    pub event_id: String,
    pub series_index: i32,
    pub attendee_name: String,
    pub attendee_email: String,
    pub member: bool,
    pub age: Option<i32>,
    pub gender: Option<Gender>,
    pub status: RegistrationStatus,
    pub payment_status: PaymentStatus,
    pub payment_option: Option<PaymentOption>,
    /// Cents owed at registration time, from the resolved price.
    pub amount_due: i64,
    pub amount_paid: i64,
    pub management_token: String,
    pub created_at: DateTime<Utc>,
}

pub struct NewRegistrationParams {
    pub event_id: String,
    pub series_index: i32,
    pub attendee_name: String,
    pub attendee_email: String,
    pub member: bool,
    pub age: Option<i32>,
    pub gender: Option<Gender>,
    pub payment_option: Option<PaymentOption>,
    pub amount_due: i64,
}

impl Registration {
    pub fn new(params: NewRegistrationParams) -> Self {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(48)
            .map(char::from)
            .collect();

        let payment_status = if params.amount_due > 0 {
            PaymentStatus::Pending
        } else {
            PaymentStatus::NotRequired
        };

        Self {
            id: Uuid::new_v4().to_string(),
            event_id: params.event_id,
            series_index: params.series_index,
            attendee_name: params.attendee_name,
            attendee_email: params.attendee_email,
            member: params.member,
            age: params.age,
            gender: params.gender,
            status: RegistrationStatus::Confirmed,
            payment_status,
            payment_option: params.payment_option,
            amount_due: params.amount_due,
            amount_paid: 0,
            management_token: token,
            created_at: Utc::now(),
        }
    }
}

/// Seats-filled and revenue aggregates for one instance.
#[derive(Debug, Serialize, Clone, Copy, Default)]
pub struct RegistrationSummary {
    pub seats_filled: i64,
    pub amount_due_total: i64,
    pub amount_paid_total: i64,
}
