use chrono::{DateTime, Utc};

use crate::domain::models::event::{Event, Recurrence};
use crate::domain::models::instance::EventInstance;
use crate::domain::services::propagation::advance;

/// Hard cap on recurrence steps scanned per planning pass, so a stale event
/// far in the past cannot spin the worker.
const MAX_SCAN_STEPS: i32 = 10_000;

/// Decides which new instances an event needs, given the ones that already
/// exist and an explicit reference instant. Pure; the caller persists the
/// returned instances.
///
/// A non-recurring event gets exactly one instance. A recurring event keeps up
/// to `max_published` future instances materialized while publishing is on;
/// pausing stops new materialization but leaves existing instances alone.
pub fn plan_materialization(
    event: &Event,
    existing: &[EventInstance],
    now: DateTime<Utc>,
) -> Vec<EventInstance> {
    if event.recurring == Recurrence::Never {
        if existing.is_empty() {
            return vec![EventInstance::new(event.id.clone(), 0, event.date)];
        }
        return Vec::new();
    }

    if !event.currently_publishing {
        return Vec::new();
    }

    let mut future = existing
        .iter()
        .filter(|i| i.target_date >= now)
        .count() as i32;
    let mut next_index = existing.iter().map(|i| i.series_index + 1).max().unwrap_or(0);

    let mut planned = Vec::new();
    while future < event.max_published && next_index < MAX_SCAN_STEPS {
        let target = advance(event.recurring, event.date, next_index as u32);
        if target >= now {
            planned.push(EventInstance::new(event.id.clone(), next_index, target));
            future += 1;
        }
        next_index += 1;
    }

    planned
}
