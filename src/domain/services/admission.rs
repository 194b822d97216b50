use chrono::{DateTime, Utc};

use crate::domain::models::event::{Gender, PaymentOption};
use crate::domain::services::resolution::EffectiveOccurrence;

/// Attendee facts the eligibility rules are checked against.
#[derive(Debug, Clone, Default)]
pub struct AttendeeProfile {
    pub member: bool,
    pub age: Option<i32>,
    pub gender: Option<Gender>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdmissionDenied {
    RegistrationDisabled,
    Hidden,
    NotOpenYet,
    Closed,
    Full,
    MembersOnly,
    BelowMinAge,
    AboveMaxAge,
    GenderRestricted,
    PaymentOptionRequired,
    PaymentOptionNotOffered(PaymentOption),
}

/// Admission check for one registration attempt, evaluated entirely against
/// the resolved record. `now` is supplied by the caller; this function never
/// reads a clock.
pub fn check_admission(
    eff: &EffectiveOccurrence,
    attendee: &AttendeeProfile,
    seats_filled: i64,
    now: DateTime<Utc>,
) -> Result<(), AdmissionDenied> {
    if !eff.registration_allowed {
        return Err(AdmissionDenied::RegistrationDisabled);
    }
    if eff.hidden {
        return Err(AdmissionDenied::Hidden);
    }

    if let Some(opens) = eff.registration_opens {
        if now < opens {
            return Err(AdmissionDenied::NotOpenYet);
        }
    }
    if let Some(deadline) = eff.registration_deadline {
        if now > deadline {
            return Err(AdmissionDenied::Closed);
        }
    }
    if now > eff.date {
        return Err(AdmissionDenied::Closed);
    }

    if let Some(max_spots) = eff.max_spots {
        if seats_filled >= max_spots as i64 {
            return Err(AdmissionDenied::Full);
        }
    }

    if eff.members_only && !attendee.member {
        return Err(AdmissionDenied::MembersOnly);
    }
    if let (Some(min_age), Some(age)) = (eff.min_age, attendee.age) {
        if age < min_age {
            return Err(AdmissionDenied::BelowMinAge);
        }
    }
    if let (Some(max_age), Some(age)) = (eff.max_age, attendee.age) {
        if age > max_age {
            return Err(AdmissionDenied::AboveMaxAge);
        }
    }
    if eff.gender != Gender::All {
        match attendee.gender {
            Some(g) if g == eff.gender => {}
            _ => return Err(AdmissionDenied::GenderRestricted),
        }
    }

    Ok(())
}

/// Cents owed by this attendee, from the resolved price fields.
pub fn amount_due(eff: &EffectiveOccurrence, member: bool) -> i64 {
    if member {
        eff.member_price.unwrap_or(eff.price)
    } else {
        eff.price
    }
}

/// Checks the chosen payment option against the resolved offer. `None` is only
/// acceptable when nothing is owed.
pub fn check_payment_option(
    eff: &EffectiveOccurrence,
    owed: i64,
    chosen: Option<PaymentOption>,
) -> Result<(), AdmissionDenied> {
    if owed == 0 {
        return Ok(());
    }
    match chosen {
        None => Err(AdmissionDenied::PaymentOptionRequired),
        Some(option) if !eff.payment_options.contains(&option) => {
            Err(AdmissionDenied::PaymentOptionNotOffered(option))
        }
        Some(_) => Ok(()),
    }
}
