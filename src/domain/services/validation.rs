use serde::Serialize;
use std::fmt;

use crate::domain::models::event::{Event, Recurrence, RegistrationFields};
use crate::domain::models::instance::{EventInstance, GroupState};
use crate::domain::services::resolution::{EffectiveOccurrence, resolve};

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub reason: String,
}

/// Field-level validation failures. A save with any entry here is aborted
/// atomically; nothing is persisted.
#[derive(Debug, Serialize, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: impl Into<String>, reason: impl Into<String>) -> Self {
        let mut errs = Self::new();
        errs.push(field, reason);
        errs
    }

    pub fn push(&mut self, field: impl Into<String>, reason: impl Into<String>) {
        self.0.push(FieldError {
            field: field.into(),
            reason: reason.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for err in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", err.field, err.reason)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Without RSVP there is no registration window; the dependent fields are
/// cleared rather than rejected.
pub fn normalize_registration(reg: &mut RegistrationFields) {
    if !reg.rsvp_required {
        reg.registration_opens = None;
        reg.registration_deadline = None;
        reg.automatic_refund_deadline = None;
        reg.max_spots = None;
        reg.price = 0;
        reg.member_price = None;
        reg.payment_options.clear();
    }
}

/// Silent corrections applied to a base event before the rule checks run.
pub fn normalize_event(event: &mut Event) {
    if event.recurring == Recurrence::Never {
        event.max_published = 1;
    }
    if !event.rsvp_required {
        event.registration_opens = None;
        event.registration_deadline = None;
        event.automatic_refund_deadline = None;
        event.max_spots = None;
        event.price = 0;
        event.member_price = None;
        event.payment_options.clear();
    }
}

/// Same corrections for an instance's stored registration payload, whether or
/// not its flag is currently on.
pub fn normalize_instance(instance: &mut EventInstance) {
    match &mut instance.overrides.registration {
        GroupState::Active(reg) | GroupState::Retained(reg) => normalize_registration(reg),
        GroupState::Inherited => {}
    }
}

pub fn validate_event(event: &Event) -> Result<(), ValidationErrors> {
    let mut errs = ValidationErrors::new();

    if event.max_published < 1 {
        errs.push("max_published", "must be at least 1");
    }
    if event.localizations.is_empty() {
        errs.push("localizations", "at least one language is required");
    }

    check_resolved(&EffectiveOccurrence::from_event(event), &mut errs);
    errs.into_result()
}

/// Validates one instance against the fully resolved record, so cross-field
/// checks see the same values downstream consumers will.
pub fn validate_instance(event: &Event, instance: &EventInstance) -> Result<(), ValidationErrors> {
    let mut errs = ValidationErrors::new();
    check_resolved(&resolve(event, instance), &mut errs);
    errs.into_result()
}

fn check_resolved(eff: &EffectiveOccurrence, errs: &mut ValidationErrors) {
    if let Some(end) = eff.end_date {
        if end <= eff.date {
            errs.push("end_date", "must be after the event date");
        }
    }

    if eff.price < 0 {
        errs.push("price", "must not be negative");
    }
    if let Some(member_price) = eff.member_price {
        if member_price < 0 {
            errs.push("member_price", "must not be negative");
        }
    }
    if eff.price > 0 && eff.payment_options.is_empty() {
        errs.push(
            "payment_options",
            "at least one payment option is required for a priced event",
        );
    }

    if let Some(deadline) = eff.registration_deadline {
        if deadline > eff.date {
            errs.push("registration_deadline", "must be on or before the event date");
        }
        if let Some(opens) = eff.registration_opens {
            if opens > deadline {
                errs.push(
                    "registration_opens",
                    "must be on or before the registration deadline",
                );
            }
        }
    }

    if let Some(refund) = eff.automatic_refund_deadline {
        if refund >= eff.date {
            errs.push("automatic_refund_deadline", "must be before the event date");
        }
        if let Some(opens) = eff.registration_opens {
            if refund < opens {
                errs.push(
                    "automatic_refund_deadline",
                    "must not be earlier than the registration opening",
                );
            }
        }
        if let Some(deadline) = eff.registration_deadline {
            if refund < deadline {
                errs.push(
                    "automatic_refund_deadline",
                    "must not be earlier than the registration deadline",
                );
            }
        }
    }

    if let Some(max_spots) = eff.max_spots {
        if max_spots < 1 {
            errs.push("max_spots", "must be at least 1");
        }
    }

    if let Some(min_age) = eff.min_age {
        if min_age < 0 {
            errs.push("min_age", "must not be negative");
        }
    }
    if let Some(max_age) = eff.max_age {
        if max_age < 0 {
            errs.push("max_age", "must not be negative");
        }
    }
    if let (Some(min_age), Some(max_age)) = (eff.min_age, eff.max_age) {
        if min_age > max_age {
            errs.push("min_age", "must not exceed max_age");
        }
    }
}
