use icalendar::{Calendar, Component, Event as IcalEvent, EventLike};

use crate::domain::services::resolution::EffectiveOccurrence;

/// Generates an iCalendar (.ics) string for a resolved occurrence.
pub fn generate_ics(eff: &EffectiveOccurrence) -> String {
    let text = eff
        .localizations
        .get("en")
        .or_else(|| eff.localizations.values().next())
        .cloned()
        .unwrap_or_default();

    let mut ical_event = IcalEvent::new();
    ical_event
        .summary(&text.title)
        .description(&text.description)
        .location(&eff.location_address)
        .starts(eff.date)
        .uid(&format!("{}-{}", eff.event_id, eff.series_index));

    if let Some(end) = eff.end_date {
        ical_event.ends(end);
    }

    let mut calendar = Calendar::new();
    calendar.push(ical_event.done());
    calendar.to_string()
}
