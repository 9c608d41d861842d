use std::collections::BTreeMap;

use chrono::NaiveTime;
use tracing::{debug, warn};

use crate::models::{
    format_wire_time, parse_clock, AvailabilityEntry, AvailabilityError, DayOfWeek, DaySchedule,
    EditCommand, PersistedSchedule, RangeField, TimeRange, WeeklyAvailability,
};

/// Weekly availability editor for one professional.
///
/// Holds the editable grid only; loading and saving go through
/// [`ProfessionalService`](crate::services::ProfessionalService).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityGrid {
    professional_id: Option<i64>,
    availability: WeeklyAvailability,
}

impl AvailabilityGrid {
    /// Blank grid: one empty range per day.
    pub fn new(professional_id: Option<i64>) -> Self {
        Self::with_availability(professional_id, WeeklyAvailability::new())
    }

    pub fn with_availability(professional_id: Option<i64>, availability: WeeklyAvailability) -> Self {
        Self {
            professional_id,
            availability,
        }
    }

    /// Groups persisted schedule rows by day, keeping only `HH:MM` of each time.
    pub fn from_schedules(professional_id: i64, schedules: &[PersistedSchedule]) -> Self {
        let mut grouped: BTreeMap<DayOfWeek, Vec<TimeRange>> = BTreeMap::new();

        for schedule in schedules {
            let (start, end) = match (parse_clock(&schedule.start_time), parse_clock(&schedule.end_time)) {
                (Ok(start), Ok(end)) => (start, end),
                (Err(e), _) | (_, Err(e)) => {
                    warn!(
                        "Skipping unreadable {:?} schedule for professional {}: {}",
                        schedule.day_of_week, professional_id, e
                    );
                    continue;
                }
            };

            grouped
                .entry(schedule.day_of_week)
                .or_default()
                .push(TimeRange::new(start, end));
        }

        let mut availability = WeeklyAvailability::new();
        for (day, ranges) in grouped {
            availability.replace_day(day, DaySchedule::from_ranges(ranges));
        }

        debug!("Loaded {} schedule rows for professional {}", schedules.len(), professional_id);
        Self::with_availability(Some(professional_id), availability)
    }

    pub fn professional_id(&self) -> Option<i64> {
        self.professional_id
    }

    pub fn availability(&self) -> &WeeklyAvailability {
        &self.availability
    }

    pub fn into_availability(self) -> WeeklyAvailability {
        self.availability
    }

    pub fn day(&self, day: DayOfWeek) -> &DaySchedule {
        self.availability.day(day)
    }

    /// Whether the remove action is offered for `day` (more than one row).
    pub fn can_remove(&self, day: DayOfWeek) -> bool {
        self.day(day).range_count() > 1
    }

    fn range_mut(&mut self, day: DayOfWeek, index: usize) -> Result<&mut TimeRange, AvailabilityError> {
        let schedule = self.availability.day_mut(day);
        let len = schedule.range_count();
        schedule
            .range_mut(index)
            .ok_or(AvailabilityError::RangeOutOfBounds { day, index, len })
    }

    pub fn set_range(
        &mut self,
        day: DayOfWeek,
        index: usize,
        field: RangeField,
        value: Option<NaiveTime>,
    ) -> Result<(), AvailabilityError> {
        self.range_mut(day, index)?.set(field, value);
        debug!("Set {:?} of {:?}[{}] to {:?}", field, day, index, value);
        Ok(())
    }

    pub fn add_range(&mut self, day: DayOfWeek) {
        self.availability.day_mut(day).push_empty();
        debug!("Added range to {:?}", day);
    }

    pub fn remove_range(&mut self, day: DayOfWeek, index: usize) -> Result<(), AvailabilityError> {
        let schedule = self.availability.day_mut(day);
        let len = schedule.range_count();
        schedule
            .remove(index)
            .ok_or(AvailabilityError::RangeOutOfBounds { day, index, len })?;
        debug!("Removed {:?}[{}]", day, index);
        Ok(())
    }

    pub fn clear_range(&mut self, day: DayOfWeek, index: usize) -> Result<(), AvailabilityError> {
        self.range_mut(day, index)?.clear();
        debug!("Cleared {:?}[{}]", day, index);
        Ok(())
    }

    /// Applies one editor command. On error the grid is unchanged.
    pub fn apply(&mut self, command: EditCommand) -> Result<(), AvailabilityError> {
        match command {
            EditCommand::SetRange { day, index, field, value } => {
                let value = parse_clock(&value)?;
                self.set_range(day, index, field, value)
            }
            EditCommand::AddRange { day } => {
                self.add_range(day);
                Ok(())
            }
            EditCommand::RemoveRange { day, index } => self.remove_range(day, index),
            EditCommand::ClearRange { day, index } => self.clear_range(day, index),
        }
    }

    /// Flattens complete ranges, Monday first. Rows missing a bound are skipped.
    pub fn export(&self) -> Vec<AvailabilityEntry> {
        self.availability
            .iter()
            .flat_map(|(day, schedule)| {
                schedule.ranges().iter().filter_map(move |range| {
                    range.bounds().map(|(start, end)| AvailabilityEntry {
                        professional_id: self.professional_id,
                        day_of_week: day,
                        start_time: format_wire_time(start),
                        end_time: format_wire_time(end),
                    })
                })
            })
            .collect()
    }
}
