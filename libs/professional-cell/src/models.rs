use std::collections::BTreeMap;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeField {
    Start,
    End,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AvailabilityError {
    #[error("No time range {index} on {day:?} (day has {len})")]
    RangeOutOfBounds { day: DayOfWeek, index: usize, len: usize },

    #[error("Invalid time of day: {0:?}")]
    InvalidTime(String),
}

/// Parses editor text into a time of day. Empty text means "unset".
///
/// Only the leading `HH:MM` is read, so persisted `HH:MM:SS` values load as-is.
pub fn parse_clock(text: &str) -> Result<Option<NaiveTime>, AvailabilityError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }

    let hh_mm = text.get(..5).unwrap_or(text);
    NaiveTime::parse_from_str(hh_mm, "%H:%M")
        .map(Some)
        .map_err(|_| AvailabilityError::InvalidTime(text.to_string()))
}

pub fn format_clock(time: Option<NaiveTime>) -> String {
    time.map(|t| t.format("%H:%M").to_string()).unwrap_or_default()
}

/// Wire form sent to the clinic backend; seconds are always `:00`.
pub fn format_wire_time(time: NaiveTime) -> String {
    time.format("%H:%M:00").to_string()
}

mod clock_text {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_clock(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveTime>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(text) => super::parse_clock(&text).map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}

/// One editable row. Either bound may be unset; start <= end is not enforced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    #[serde(with = "clock_text", default)]
    pub start: Option<NaiveTime>,
    #[serde(with = "clock_text", default)]
    pub end: Option<NaiveTime>,
}

impl TimeRange {
    pub fn new(start: Option<NaiveTime>, end: Option<NaiveTime>) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Both bounds, when both are set.
    pub fn bounds(&self) -> Option<(NaiveTime, NaiveTime)> {
        self.start.zip(self.end)
    }

    pub fn set(&mut self, field: RangeField, value: Option<NaiveTime>) {
        match field {
            RangeField::Start => self.start = value,
            RangeField::End => self.end = value,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Ranges of one weekday. Never empty: an empty list is replaced by one blank range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<TimeRange>", into = "Vec<TimeRange>")]
pub struct DaySchedule(Vec<TimeRange>);

impl DaySchedule {
    pub fn new() -> Self {
        Self(vec![TimeRange::default()])
    }

    pub fn from_ranges(ranges: Vec<TimeRange>) -> Self {
        if ranges.is_empty() {
            Self::new()
        } else {
            Self(ranges)
        }
    }

    pub fn ranges(&self) -> &[TimeRange] {
        &self.0
    }

    pub fn range_count(&self) -> usize {
        self.0.len()
    }

    pub fn range_mut(&mut self, index: usize) -> Option<&mut TimeRange> {
        self.0.get_mut(index)
    }

    pub fn push_empty(&mut self) {
        self.0.push(TimeRange::default());
    }

    /// Removes the range at `index`, reinserting a blank one if the day would go empty.
    pub fn remove(&mut self, index: usize) -> Option<TimeRange> {
        if index >= self.0.len() {
            return None;
        }

        let removed = self.0.remove(index);
        if self.0.is_empty() {
            self.0.push(TimeRange::default());
        }
        Some(removed)
    }
}

impl Default for DaySchedule {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vec<TimeRange>> for DaySchedule {
    fn from(ranges: Vec<TimeRange>) -> Self {
        Self::from_ranges(ranges)
    }
}

impl From<DaySchedule> for Vec<TimeRange> {
    fn from(schedule: DaySchedule) -> Self {
        schedule.0
    }
}

/// All seven days, always present. Serialized as a map keyed by day name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<DayOfWeek, DaySchedule>",
    into = "BTreeMap<DayOfWeek, DaySchedule>"
)]
pub struct WeeklyAvailability {
    days: [DaySchedule; 7],
}

impl WeeklyAvailability {
    pub fn new() -> Self {
        Self {
            days: std::array::from_fn(|_| DaySchedule::new()),
        }
    }

    pub fn day(&self, day: DayOfWeek) -> &DaySchedule {
        &self.days[day.index()]
    }

    pub fn day_mut(&mut self, day: DayOfWeek) -> &mut DaySchedule {
        &mut self.days[day.index()]
    }

    pub fn replace_day(&mut self, day: DayOfWeek, schedule: DaySchedule) {
        self.days[day.index()] = schedule;
    }

    /// Days in Monday..Sunday order.
    pub fn iter(&self) -> impl Iterator<Item = (DayOfWeek, &DaySchedule)> {
        DayOfWeek::ALL.into_iter().zip(self.days.iter())
    }
}

impl Default for WeeklyAvailability {
    fn default() -> Self {
        Self::new()
    }
}

impl From<BTreeMap<DayOfWeek, DaySchedule>> for WeeklyAvailability {
    fn from(map: BTreeMap<DayOfWeek, DaySchedule>) -> Self {
        let mut availability = Self::new();
        for (day, schedule) in map {
            availability.replace_day(day, schedule);
        }
        availability
    }
}

impl From<WeeklyAvailability> for BTreeMap<DayOfWeek, DaySchedule> {
    fn from(availability: WeeklyAvailability) -> Self {
        DayOfWeek::ALL.into_iter().zip(availability.days).collect()
    }
}

/// Flattened schedule row submitted to the clinic backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub professional_id: Option<i64>,
    pub day_of_week: DayOfWeek,
    pub start_time: String,
    pub end_time: String,
}

/// Schedule row as returned by the clinic backend (`HH:MM:SS` or longer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSchedule {
    pub day_of_week: DayOfWeek,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Professional {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub specialty: Option<String>,
    #[serde(default)]
    pub schedules: Vec<PersistedSchedule>,
    /// Fields the console does not interpret, echoed back untouched on update.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Professional {
    pub fn into_payload(self, schedules: Vec<AvailabilityEntry>) -> ProfessionalPayload {
        ProfessionalPayload {
            id: self.id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            specialty: self.specialty,
            schedules,
            extra: self.extra,
        }
    }
}

/// Create/update body for the clinic backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfessionalPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub specialty: Option<String>,
    pub schedules: Vec<AvailabilityEntry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProfessionalRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub specialty: Option<String>,
    #[serde(default)]
    pub availability: WeeklyAvailability,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CreateProfessionalRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Name is required".to_string());
        }
        let email = self.email.trim();
        if email.is_empty() {
            return Err("Email is required".to_string());
        }
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
            _ => Err(format!("Invalid email address: {}", email)),
        }
    }
}

/// Editor operations, addressable by day and row index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditCommand {
    SetRange {
        day: DayOfWeek,
        index: usize,
        field: RangeField,
        /// `HH:MM`, or empty to unset.
        value: String,
    },
    AddRange {
        day: DayOfWeek,
    },
    RemoveRange {
        day: DayOfWeek,
        index: usize,
    },
    ClearRange {
        day: DayOfWeek,
        index: usize,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditAvailabilityRequest {
    #[serde(default)]
    pub professional_id: Option<i64>,
    pub availability: WeeklyAvailability,
    pub command: EditCommand,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportAvailabilityRequest {
    #[serde(default)]
    pub professional_id: Option<i64>,
    pub availability: WeeklyAvailability,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveAvailabilityRequest {
    pub availability: WeeklyAvailability,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    pub professional_id: Option<i64>,
    pub availability: WeeklyAvailability,
    /// Per-day flag mirroring the editor's "remove" button state.
    pub removable: BTreeMap<DayOfWeek, bool>,
}
