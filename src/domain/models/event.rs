use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Recurrence {
    Never,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Recurrence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recurrence::Never => "never",
            Recurrence::Daily => "daily",
            Recurrence::Weekly => "weekly",
            Recurrence::Monthly => "monthly",
            Recurrence::Yearly => "yearly",
        }
    }
}

impl FromStr for Recurrence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "never" => Ok(Recurrence::Never),
            "daily" => Ok(Recurrence::Daily),
            "weekly" => Ok(Recurrence::Weekly),
            "monthly" => Ok(Recurrence::Monthly),
            "yearly" => Ok(Recurrence::Yearly),
            other => Err(format!("unknown recurrence '{other}'")),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    #[default]
    All,
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::All => "all",
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Gender::All),
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            other => Err(format!("unknown gender '{other}'")),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum PaymentOption {
    Paypal,
    Door,
}

impl PaymentOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentOption::Paypal => "paypal",
            PaymentOption::Door => "door",
        }
    }
}

impl FromStr for PaymentOption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "paypal" => Ok(PaymentOption::Paypal),
            "door" => Ok(PaymentOption::Door),
            other => Err(format!("unknown payment option '{other}'")),
        }
    }
}

/// Per-language text for an event. Keyed by language code in [`LocalizationMap`].
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct LocalizationEntry {
    pub title: String,
    pub description: String,
    pub location_info: Option<String>,
}

/// Ordered language code -> text mapping. Ordering is stable so listings render
/// languages consistently regardless of payload order.
pub type LocalizationMap = BTreeMap<String, LocalizationEntry>;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ScheduleFields {
    pub date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
}

/// Registration and pricing settings. Prices are integer cents.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct RegistrationFields {
    pub registration_allowed: bool,
    pub rsvp_required: bool,
    pub registration_opens: Option<DateTime<Utc>>,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub automatic_refund_deadline: Option<DateTime<Utc>>,
    pub max_spots: Option<i32>,
    pub price: i64,
    pub member_price: Option<i64>,
    pub payment_options: BTreeSet<PaymentOption>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct EligibilityFields {
    pub members_only: bool,
    pub min_age: Option<i32>,
    pub max_age: Option<i32>,
    pub gender: Gender,
    pub ministries: BTreeSet<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct LocationFields {
    pub location_address: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct ImageFields {
    pub image_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(default)]
pub struct VisibilityFields {
    pub hidden: bool,
}

/// The recurring template record from which instances are generated.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Event {
    pub id: String,
    pub slug: String,
    pub localizations: LocalizationMap,
    pub date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub recurring: Recurrence,
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
    pub payment_options: BTreeSet<PaymentOption>,
    pub members_only: bool,
    pub min_age: Option<i32>,
    pub max_age: Option<i32>,
    pub gender: Gender,
    pub ministries: BTreeSet<String>,
    pub location_address: String,
    pub image_id: Option<String>,
    pub hidden: bool,
    pub created_at: DateTime<Utc>,
}

impl Event {
    pub fn schedule(&self) -> ScheduleFields {
        ScheduleFields {
            date: self.date,
            end_date: self.end_date,
        }
    }

    pub fn registration(&self) -> RegistrationFields {
        RegistrationFields {
            registration_allowed: self.registration_allowed,
            rsvp_required: self.rsvp_required,
            registration_opens: self.registration_opens,
            registration_deadline: self.registration_deadline,
            automatic_refund_deadline: self.automatic_refund_deadline,
            max_spots: self.max_spots,
            price: self.price,
            member_price: self.member_price,
            payment_options: self.payment_options.clone(),
        }
    }

    pub fn eligibility(&self) -> EligibilityFields {
        EligibilityFields {
            members_only: self.members_only,
            min_age: self.min_age,
            max_age: self.max_age,
            gender: self.gender,
            ministries: self.ministries.clone(),
        }
    }

    pub fn location(&self) -> LocationFields {
        LocationFields {
            location_address: self.location_address.clone(),
        }
    }

    pub fn image(&self) -> ImageFields {
        ImageFields {
            image_id: self.image_id.clone(),
        }
    }

    pub fn visibility(&self) -> VisibilityFields {
        VisibilityFields { hidden: self.hidden }
    }
}
