//! # Schedule Module
//!
//! Calendar of admission activities: registration, verification, tests,
//! announcements and orientation.
//!
//! Events are listed in creation order; the calendar helpers compute a
//! month grid (Sunday first) and the short "upcoming" panel.

use crate::{
    EventStatus, EventType, Notice, Outcome, PpdbError, FieldErrors,
    listing::{Filter, Searchable},
    primitives::{ID_WIDTH, MAX_TEXT_LENGTH, UPCOMING_LIMIT},
    store::{Record, Store},
};
use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

// =============================================================================
// EVENT
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: Option<NaiveTime>,
    pub location: String,
    pub event_type: EventType,
    pub status: EventStatus,
    pub participants: Option<u32>,
}

impl Record for Event {
    const KIND: &'static str = "Event";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Searchable for Event {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.location.as_str()]
    }
}

/// Input of the "add event" dialog. Date and times arrive as text
/// (`2024-02-10`, `08:00`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub location: String,
    pub event_type: Option<EventType>,
    pub participants: Option<u32>,
}

struct ParsedEvent {
    date: NaiveDate,
    start_time: NaiveTime,
    end_time: Option<NaiveTime>,
}

impl NewEvent {
    fn parse(&self) -> Result<ParsedEvent, PpdbError> {
        if self.title.trim().is_empty()
            || self.date.trim().is_empty()
            || self.start_time.trim().is_empty()
        {
            return Err(PpdbError::field(
                "title",
                "Judul, tanggal, dan waktu mulai harus diisi",
            ));
        }

        let mut errors = FieldErrors::new();
        if self.description.len() > MAX_TEXT_LENGTH {
            errors.insert(
                "description".into(),
                format!("Maksimal {MAX_TEXT_LENGTH} karakter"),
            );
        }
        let date = NaiveDate::parse_from_str(self.date.trim(), DATE_FORMAT);
        if date.is_err() {
            errors.insert("date".into(), "Tanggal tidak valid".into());
        }
        let start_time = NaiveTime::parse_from_str(self.start_time.trim(), TIME_FORMAT);
        if start_time.is_err() {
            errors.insert("start_time".into(), "Waktu mulai tidak valid".into());
        }
        let end_time = match self.end_time.trim() {
            "" => Ok(None),
            text => NaiveTime::parse_from_str(text, TIME_FORMAT).map(Some),
        };
        if end_time.is_err() {
            errors.insert("end_time".into(), "Waktu selesai tidak valid".into());
        }

        match (date, start_time, end_time) {
            (Ok(date), Ok(start_time), Ok(end_time)) if errors.is_empty() => {
                if end_time.is_some_and(|end| end < start_time) {
                    return Err(PpdbError::field(
                        "end_time",
                        "Waktu selesai harus setelah waktu mulai",
                    ));
                }
                Ok(ParsedEvent {
                    date,
                    start_time,
                    end_time,
                })
            }
            _ => Err(PpdbError::Validation(errors)),
        }
    }
}

// =============================================================================
// CALENDAR
// =============================================================================

/// One day cell of the month grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDay {
    pub day: u32,
    pub event_ids: Vec<String>,
}

/// Month grid: `first_weekday` is the column of day 1 (Sunday = 0).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthView {
    pub year: i32,
    pub month: u32,
    pub days_in_month: u32,
    pub first_weekday: u32,
    pub days: Vec<CalendarDay>,
}

/// Number of days of a month and the weekday of its first day.
pub fn month_shape(year: i32, month: u32) -> Result<(u32, u32), PpdbError> {
    let invalid = || PpdbError::InvalidFilter(format!("{year}-{month}"));
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year.saturating_add(1), 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(invalid)?;
    let days = next.signed_duration_since(first).num_days() as u32;
    Ok((days, first.weekday().num_days_from_sunday()))
}

/// Search and type filter of the schedule screen.
#[derive(Debug, Clone, Default)]
pub struct EventQuery {
    pub search: String,
    pub event_type: Filter<EventType>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleStats {
    pub total: usize,
    pub upcoming: usize,
    pub ongoing: usize,
    pub completed: usize,
    pub participants: u64,
}

// =============================================================================
// SCHEDULE
// =============================================================================

/// State container of the schedule screen.
#[derive(Debug, Clone, Default)]
pub struct Schedule {
    store: Store<Event>,
}

impl Schedule {
    #[must_use]
    pub fn new(records: Vec<Event>) -> Self {
        Self {
            store: Store::from_records(records),
        }
    }

    #[must_use]
    pub fn store(&self) -> &Store<Event> {
        &self.store
    }

    pub fn get(&self, id: &str) -> Result<&Event, PpdbError> {
        self.store.require(id)
    }

    pub fn create(&mut self, input: NewEvent) -> Result<Outcome<Event>, PpdbError> {
        let parsed = input.parse()?;
        let event = Event {
            id: self.store.next_id("EVT", ID_WIDTH),
            title: input.title.trim().to_string(),
            description: input.description.trim().to_string(),
            date: parsed.date,
            start_time: parsed.start_time,
            end_time: parsed.end_time,
            location: input.location.trim().to_string(),
            event_type: input.event_type.unwrap_or(EventType::Registration),
            status: EventStatus::Upcoming,
            participants: input.participants,
        };
        self.store.push(event.clone());
        Ok(Outcome::new(
            event,
            Notice::success("Jadwal Dibuat", "Kegiatan berhasil ditambahkan ke jadwal"),
        ))
    }

    pub fn delete(&mut self, id: &str) -> Result<Outcome<Event>, PpdbError> {
        let removed = self.store.remove(id)?;
        Ok(Outcome::new(
            removed,
            Notice::success("Jadwal Dihapus", "Kegiatan berhasil dihapus dari jadwal"),
        ))
    }

    #[must_use]
    pub fn list(&self, query: &EventQuery) -> Vec<&Event> {
        self.store
            .iter()
            .filter(|e| e.matches(&query.search))
            .filter(|e| query.event_type.accepts(e.event_type))
            .collect()
    }

    /// Events on one calendar day, earliest start first.
    #[must_use]
    pub fn on_date(&self, date: NaiveDate) -> Vec<&Event> {
        let mut events: Vec<&Event> = self.store.iter().filter(|e| e.date == date).collect();
        events.sort_by_key(|e| e.start_time);
        events
    }

    pub fn month(&self, year: i32, month: u32) -> Result<MonthView, PpdbError> {
        let (days_in_month, first_weekday) = month_shape(year, month)?;
        let days = (1..=days_in_month)
            .map(|day| CalendarDay {
                day,
                event_ids: NaiveDate::from_ymd_opt(year, month, day)
                    .map(|date| {
                        self.on_date(date)
                            .into_iter()
                            .map(|e| e.id.clone())
                            .collect()
                    })
                    .unwrap_or_default(),
            })
            .collect();
        Ok(MonthView {
            year,
            month,
            days_in_month,
            first_weekday,
            days,
        })
    }

    /// Upcoming and ongoing events by date, at most `UPCOMING_LIMIT`.
    #[must_use]
    pub fn upcoming(&self) -> Vec<&Event> {
        let mut events: Vec<&Event> = self
            .store
            .iter()
            .filter(|e| matches!(e.status, EventStatus::Upcoming | EventStatus::Ongoing))
            .collect();
        events.sort_by_key(|e| (e.date, e.start_time));
        events.truncate(UPCOMING_LIMIT);
        events
    }

    #[must_use]
    pub fn stats(&self) -> ScheduleStats {
        self.store.iter().fold(ScheduleStats::default(), |mut stats, e| {
            stats.total += 1;
            stats.participants += u64::from(e.participants.unwrap_or(0));
            match e.status {
                EventStatus::Upcoming => stats.upcoming += 1,
                EventStatus::Ongoing => stats.ongoing += 1,
                EventStatus::Completed => stats.completed += 1,
            }
            stats
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
