use chrono::{DateTime, Months, Utc};

use crate::domain::models::event::{Event, Recurrence};

/// Steps an instant forward by `steps` recurrence periods. Monthly keeps the
/// day-of-month, clamped to the end of shorter months; yearly keeps the date
/// (Feb 29 clamps on non-leap years).
pub fn advance(recurring: Recurrence, from: DateTime<Utc>, steps: u32) -> DateTime<Utc> {
    if steps == 0 {
        return from;
    }
    match recurring {
        Recurrence::Never => from,
        Recurrence::Daily => from + chrono::Duration::days(steps as i64),
        Recurrence::Weekly => from + chrono::Duration::days(7 * steps as i64),
        Recurrence::Monthly => from.checked_add_months(Months::new(steps)).unwrap_or(from),
        Recurrence::Yearly => from
            .checked_add_months(Months::new(12 * steps))
            .unwrap_or(from),
    }
}

/// The base event's dates carried forward to one occurrence. Window dates keep
/// their fixed duration offset from the event date, so "opens two weeks
/// before" stays true for every occurrence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropagatedDates {
    pub target_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub registration_opens: Option<DateTime<Utc>>,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub automatic_refund_deadline: Option<DateTime<Utc>>,
}

pub fn propagated_dates(event: &Event, series_index: i32) -> PropagatedDates {
    let steps = series_index.max(0) as u32;
    let target_date = advance(event.recurring, event.date, steps);
    let shift = |window: Option<DateTime<Utc>>| window.map(|w| target_date - (event.date - w));

    PropagatedDates {
        target_date,
        end_date: shift(event.end_date),
        registration_opens: shift(event.registration_opens),
        registration_deadline: shift(event.registration_deadline),
        automatic_refund_deadline: shift(event.automatic_refund_deadline),
    }
}
