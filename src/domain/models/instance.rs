use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use super::event::{
    EligibilityFields, ImageFields, LocalizationMap, LocationFields, RegistrationFields,
    ScheduleFields, VisibilityFields,
};

/// The seven attribute groups an instance can override atomically.
/// The discriminant order is the wire order of the tracker vector.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AttributeGroup {
    Localizations,
    Location,
    Image,
    Schedule,
    Registration,
    Eligibility,
    Visibility,
}

impl AttributeGroup {
    pub const COUNT: usize = 7;

    pub const ALL: [AttributeGroup; Self::COUNT] = [
        AttributeGroup::Localizations,
        AttributeGroup::Location,
        AttributeGroup::Image,
        AttributeGroup::Schedule,
        AttributeGroup::Registration,
        AttributeGroup::Eligibility,
        AttributeGroup::Visibility,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Fixed 7-flag vector recording which groups an instance customizes.
/// Only constructible from exactly seven flags; anything else is rejected
/// here rather than surfacing as an out-of-bounds group at use sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OverridesTracker([bool; AttributeGroup::COUNT]);

impl OverridesTracker {
    pub fn inherit_all() -> Self {
        Self::default()
    }

    pub fn is_overridden(&self, group: AttributeGroup) -> bool {
        self.0[group.index()]
    }

    pub fn set(&mut self, group: AttributeGroup, overridden: bool) {
        self.0[group.index()] = overridden;
    }

    pub fn flags(&self) -> [bool; AttributeGroup::COUNT] {
        self.0
    }

    pub fn to_mask(&self) -> i32 {
        self.0
            .iter()
            .enumerate()
            .fold(0, |mask, (i, &on)| if on { mask | (1 << i) } else { mask })
    }

    pub fn from_mask(mask: i32) -> Self {
        let mut flags = [false; AttributeGroup::COUNT];
        for (i, flag) in flags.iter_mut().enumerate() {
            *flag = mask & (1 << i) != 0;
        }
        Self(flags)
    }
}

impl TryFrom<&[bool]> for OverridesTracker {
    type Error = String;

    fn try_from(flags: &[bool]) -> Result<Self, Self::Error> {
        let flags: [bool; AttributeGroup::COUNT] = flags.try_into().map_err(|_| {
            format!(
                "overrides tracker must have exactly {} flags, got {}",
                AttributeGroup::COUNT,
                flags.len()
            )
        })?;
        Ok(Self(flags))
    }
}

/// State of one attribute group on an instance.
///
/// `Retained` keeps an edited payload around while the flag is off, so turning
/// the override back on restores the previous values. A set flag without a
/// payload is unrepresentable.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum GroupState<T> {
    Inherited,
    Retained(T),
    Active(T),
}

#[derive(Debug, thiserror::Error)]
#[error("override flag set but no override values supplied")]
pub struct MissingOverrideData;

impl<T> GroupState<T> {
    pub fn from_parts(data: Option<T>, flagged: bool) -> Result<Self, MissingOverrideData> {
        match (data, flagged) {
            (Some(d), true) => Ok(GroupState::Active(d)),
            (Some(d), false) => Ok(GroupState::Retained(d)),
            (None, false) => Ok(GroupState::Inherited),
            (None, true) => Err(MissingOverrideData),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, GroupState::Active(_))
    }

    /// The payload that takes precedence over the base event, if any.
    pub fn active(&self) -> Option<&T> {
        match self {
            GroupState::Active(d) => Some(d),
            _ => None,
        }
    }

    /// The stored payload regardless of whether the flag is on.
    pub fn stored(&self) -> Option<&T> {
        match self {
            GroupState::Active(d) | GroupState::Retained(d) => Some(d),
            GroupState::Inherited => None,
        }
    }
}

/// All seven group states of one instance.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct InstanceOverrides {
    pub localizations: GroupState<LocalizationMap>,
    pub location: GroupState<LocationFields>,
    pub image: GroupState<ImageFields>,
    pub schedule: GroupState<ScheduleFields>,
    pub registration: GroupState<RegistrationFields>,
    pub eligibility: GroupState<EligibilityFields>,
    pub visibility: GroupState<VisibilityFields>,
}

impl InstanceOverrides {
    pub fn inherit_all() -> Self {
        Self {
            localizations: GroupState::Inherited,
            location: GroupState::Inherited,
            image: GroupState::Inherited,
            schedule: GroupState::Inherited,
            registration: GroupState::Inherited,
            eligibility: GroupState::Inherited,
            visibility: GroupState::Inherited,
        }
    }

    pub fn is_overridden(&self, group: AttributeGroup) -> bool {
        match group {
            AttributeGroup::Localizations => self.localizations.is_active(),
            AttributeGroup::Location => self.location.is_active(),
            AttributeGroup::Image => self.image.is_active(),
            AttributeGroup::Schedule => self.schedule.is_active(),
            AttributeGroup::Registration => self.registration.is_active(),
            AttributeGroup::Eligibility => self.eligibility.is_active(),
            AttributeGroup::Visibility => self.visibility.is_active(),
        }
    }

    pub fn tracker(&self) -> OverridesTracker {
        let mut tracker = OverridesTracker::inherit_all();
        for group in AttributeGroup::ALL {
            tracker.set(group, self.is_overridden(group));
        }
        tracker
    }
}

/// One materialized occurrence of a recurring event.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct EventInstance {
    pub id: String,
    pub event_id: String,
    pub series_index: i32,
    /// The theoretical occurrence date before any override.
    pub target_date: DateTime<Utc>,
    pub overrides: InstanceOverrides,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EventInstance {
    pub fn new(event_id: String, series_index: i32, target_date: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            event_id,
            series_index,
            target_date,
            overrides: InstanceOverrides::inherit_all(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Filter for paged instance listings. `reference` is the instant "upcoming"
/// and "past" are judged against; callers supply it, the repositories never
/// read the clock.
#[derive(Debug, Clone, Copy)]
pub struct InstanceFilter {
    pub status: InstanceStatus,
    pub reference: DateTime<Utc>,
    pub sort: SortOrder,
    pub page: i64,
    pub limit: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InstanceStatus {
    #[default]
    All,
    Upcoming,
    Past,
}

impl FromStr for InstanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(InstanceStatus::All),
            "upcoming" => Ok(InstanceStatus::Upcoming),
            "past" => Ok(InstanceStatus::Past),
            other => Err(format!("unknown status '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("unknown sort order '{other}'")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct InstancePage {
    pub items: Vec<EventInstance>,
    pub total: i64,
}
