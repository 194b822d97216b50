use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::{BTreeMap, BTreeSet};

use parish_backend::domain::models::event::{
    Event, Gender, LocalizationEntry, LocalizationMap, LocationFields, PaymentOption, Recurrence,
    RegistrationFields, ScheduleFields,
};
use parish_backend::domain::models::instance::{
    AttributeGroup, EventInstance, GroupState, OverridesTracker,
};
use parish_backend::domain::services::resolution::resolve;

fn localizations(entries: &[(&str, &str)]) -> LocalizationMap {
    let mut map = BTreeMap::new();
    for (lang, title) in entries {
        map.insert(
            lang.to_string(),
            LocalizationEntry {
                title: title.to_string(),
                description: format!("{title} description"),
                location_info: None,
            },
        );
    }
    map
}

fn ts(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 18, 30, 0).unwrap()
}

fn base_event() -> Event {
    Event {
        id: "evt-1".to_string(),
        slug: "weekly-service".to_string(),
        localizations: localizations(&[("en", "Weekly Service"), ("de", "Gottesdienst")]),
        date: ts(2024, 5, 5),
        end_date: Some(ts(2024, 5, 5) + Duration::hours(2)),
        recurring: Recurrence::Weekly,
        max_published: 4,
        currently_publishing: true,
        registration_allowed: true,
        rsvp_required: true,
        registration_opens: Some(ts(2024, 4, 28)),
        registration_deadline: Some(ts(2024, 5, 4)),
        automatic_refund_deadline: None,
        max_spots: Some(80),
        price: 1200,
        member_price: Some(800),
        payment_options: BTreeSet::from([PaymentOption::Paypal, PaymentOption::Door]),
        members_only: false,
        min_age: None,
        max_age: None,
        gender: Gender::All,
        ministries: BTreeSet::from(["youth".to_string()]),
        location_address: "Main Hall".to_string(),
        image_id: Some("asset-1".to_string()),
        hidden: false,
        created_at: ts(2024, 4, 1),
    }
}

fn untouched_instance(event: &Event, series_index: i32) -> EventInstance {
    EventInstance::new(event.id.clone(), series_index, event.date)
}

#[test]
fn first_occurrence_inherits_exactly() {
    let event = base_event();
    let instance = untouched_instance(&event, 0);

    let eff = resolve(&event, &instance);
    assert_eq!(eff.localizations, event.localizations);
    assert_eq!(eff.location_address, event.location_address);
    assert_eq!(eff.image_id, event.image_id);
    assert_eq!(eff.date, event.date);
    assert_eq!(eff.end_date, event.end_date);
    assert_eq!(eff.registration_opens, event.registration_opens);
    assert_eq!(eff.max_spots, event.max_spots);
    assert_eq!(eff.price, event.price);
    assert_eq!(eff.payment_options, event.payment_options);
    assert_eq!(eff.ministries, event.ministries);
    assert_eq!(eff.hidden, event.hidden);
}

#[test]
fn later_occurrences_inherit_propagated_dates() {
    let event = base_event();
    let instance = untouched_instance(&event, 1);

    let eff = resolve(&event, &instance);
    assert_eq!(eff.date, event.date + Duration::days(7));
    assert_eq!(eff.end_date, event.end_date.map(|e| e + Duration::days(7)));
    assert_eq!(
        eff.registration_opens,
        event.registration_opens.map(|w| w + Duration::days(7))
    );
    assert_eq!(
        eff.registration_deadline,
        event.registration_deadline.map(|w| w + Duration::days(7))
    );
    // Non-date registration fields come through untouched.
    assert_eq!(eff.price, event.price);
    assert_eq!(eff.max_spots, event.max_spots);
}

#[test]
fn active_override_wins_wholesale() {
    let event = base_event();
    let mut instance = untouched_instance(&event, 0);

    instance.overrides.registration = GroupState::Active(RegistrationFields {
        registration_allowed: true,
        rsvp_required: true,
        registration_opens: None,
        registration_deadline: None,
        automatic_refund_deadline: None,
        max_spots: Some(12),
        price: 0,
        member_price: None,
        payment_options: BTreeSet::new(),
    });

    let eff = resolve(&event, &instance);
    // Every field of the group comes from the override, even the blank ones.
    assert_eq!(eff.max_spots, Some(12));
    assert_eq!(eff.price, 0);
    assert_eq!(eff.registration_opens, None);
    assert!(eff.payment_options.is_empty());
    // Other groups still inherit.
    assert_eq!(eff.location_address, event.location_address);
}

#[test]
fn localization_override_replaces_the_entire_map() {
    let event = base_event();
    let mut instance = untouched_instance(&event, 0);
    instance.overrides.localizations =
        GroupState::Active(localizations(&[("en", "Special Service")]));

    let eff = resolve(&event, &instance);
    assert_eq!(eff.localizations.len(), 1);
    assert_eq!(eff.localizations["en"].title, "Special Service");
    assert!(!eff.localizations.contains_key("de"));
}

#[test]
fn schedule_override_beats_propagation() {
    let event = base_event();
    let mut instance = untouched_instance(&event, 2);
    let moved = ts(2024, 5, 21);
    instance.overrides.schedule = GroupState::Active(ScheduleFields {
        date: moved,
        end_date: None,
    });

    let eff = resolve(&event, &instance);
    assert_eq!(eff.date, moved);
    assert_eq!(eff.end_date, None);
    // The theoretical occurrence date is unaffected by the override.
    assert_eq!(eff.target_date, event.date + Duration::days(14));
}

#[test]
fn resolution_is_a_pure_function() {
    let event = base_event();
    let mut instance = untouched_instance(&event, 1);
    instance.overrides.location = GroupState::Active(LocationFields {
        location_address: "Chapel".to_string(),
    });

    assert_eq!(resolve(&event, &instance), resolve(&event, &instance));
}

#[test]
fn toggling_a_flag_off_and_on_restores_the_effective_value() {
    let event = base_event();
    let mut instance = untouched_instance(&event, 0);
    let annex = LocationFields {
        location_address: "Annex".to_string(),
    };

    instance.overrides.location = GroupState::Active(annex.clone());
    let with_override = resolve(&event, &instance);
    assert_eq!(with_override.location_address, "Annex");

    instance.overrides.location = GroupState::Retained(annex.clone());
    let reverted = resolve(&event, &instance);
    assert_eq!(reverted.location_address, "Main Hall");

    instance.overrides.location = GroupState::Active(annex);
    let restored = resolve(&event, &instance);
    assert_eq!(restored.location_address, with_override.location_address);
}

#[test]
fn tracker_is_derived_from_group_states() {
    let event = base_event();
    let mut instance = untouched_instance(&event, 0);
    instance.overrides.image = GroupState::Active(Default::default());
    instance.overrides.location = GroupState::Retained(LocationFields::default());

    let tracker = instance.overrides.tracker();
    assert!(tracker.is_overridden(AttributeGroup::Image));
    assert!(!tracker.is_overridden(AttributeGroup::Location));
    assert_eq!(tracker.to_mask(), 1 << AttributeGroup::Image.index());
    assert_eq!(OverridesTracker::from_mask(tracker.to_mask()), tracker);
}

#[test]
fn tracker_rejects_wrong_lengths() {
    assert!(OverridesTracker::try_from([true; 6].as_slice()).is_err());
    assert!(OverridesTracker::try_from([true; 8].as_slice()).is_err());
    assert!(OverridesTracker::try_from([false; 7].as_slice()).is_ok());
}

#[test]
fn flagged_group_without_data_is_unrepresentable() {
    assert!(GroupState::<LocationFields>::from_parts(None, true).is_err());
    assert!(matches!(
        GroupState::<LocationFields>::from_parts(None, false),
        Ok(GroupState::Inherited)
    ));
}
