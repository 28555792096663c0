use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::day::Day;
use crate::models::reference::{Room, Subject, TimeSlot};
use crate::models::teacher::{Teacher, TeacherResponse};
use crate::models::time::{Period, TimeOfDay};
use crate::models::validate;
use crate::services::time_resolver;

pub const SEMESTER_MAX_LEN: usize = 20;
pub const YEAR_MAX_LEN: usize = 10;

/// A schedule entry with its teacher, room, subject and time slot resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    pub id: String,
    pub teacher: Teacher,
    pub room: Room,
    pub subject: Subject,
    pub time_slot: TimeSlot,
    pub day: Day,
    pub semester: Option<String>,
    pub year: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleResponse {
    pub id: String,
    pub teacher: TeacherResponse,
    pub room: Room,
    pub subject: Subject,
    pub time_slot: TimeSlot,
    pub day: Day,
    pub semester: Option<String>,
    pub year: Option<String>,
    pub duration_minutes: i32,
    pub period_label: String,
    pub time_range: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Schedule> for ScheduleResponse {
    fn from(schedule: &Schedule) -> Self {
        let slot = &schedule.time_slot;
        Self {
            id: schedule.id.clone(),
            teacher: TeacherResponse::from(&schedule.teacher),
            room: schedule.room.clone(),
            subject: schedule.subject.clone(),
            time_slot: slot.clone(),
            day: schedule.day,
            semester: schedule.semester.clone(),
            year: schedule.year.clone(),
            duration_minutes: time_resolver::duration_minutes(slot),
            period_label: slot.period.label(),
            time_range: format!("{} - {}", slot.start_time, slot.end_time),
            created_at: schedule.created_at,
            updated_at: schedule.updated_at,
        }
    }
}

/// Outcome of the "what is happening right now" query. Both arms are
/// ordinary results.
#[derive(Debug, Clone, PartialEq)]
pub enum CurrentClass {
    InSession(Box<Schedule>),
    NoClass { message: String },
}

impl CurrentClass {
    pub fn sunday() -> Self {
        CurrentClass::NoClass {
            message: "No class is currently in session (Sunday is not a school day)".to_string(),
        }
    }

    pub fn none() -> Self {
        CurrentClass::NoClass {
            message: "No class is currently in session".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentClassResponse {
    pub in_session: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<ScheduleResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<&CurrentClass> for CurrentClassResponse {
    fn from(current: &CurrentClass) -> Self {
        match current {
            CurrentClass::InSession(schedule) => Self {
                in_session: true,
                schedule: Some(ScheduleResponse::from(schedule.as_ref())),
                message: None,
            },
            CurrentClass::NoClass { message } => Self {
                in_session: false,
                schedule: None,
                message: Some(message.clone()),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewScheduleRequest {
    pub teacher_name: String,
    pub room: String,
    pub start_time: String,
    pub end_time: String,
    pub day: String,
    pub subject: String,
    #[serde(default)]
    pub subject_name: Option<String>,
    #[serde(default)]
    pub semester: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
}

/// A create request that passed boundary validation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSchedule {
    pub teacher_name: String,
    pub room: String,
    pub subject: String,
    pub subject_name: Option<String>,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub day: Day,
    pub semester: Option<String>,
    pub year: Option<String>,
}

impl NewScheduleRequest {
    pub fn validate(self) -> Result<NewSchedule, AppError> {
        let start_time = parse_start_time(&self.start_time)?;
        let end_time = parse_end_time(&self.end_time)?;
        canonical_period(start_time, end_time)?;

        Ok(NewSchedule {
            teacher_name: validate::required("teacherName", &self.teacher_name, 2)?,
            room: validate::required("room", &self.room, 1)?,
            subject: validate::required("subject", &self.subject, 1)?,
            subject_name: validate::optional_non_empty("subjectName", self.subject_name)?,
            start_time,
            end_time,
            day: parse_day(&self.day)?,
            semester: validate::bounded("semester", self.semester, SEMESTER_MAX_LEN)?,
            year: validate::bounded("year", self.year, YEAR_MAX_LEN)?,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateScheduleRequest {
    pub teacher_name: Option<String>,
    pub room: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub day: Option<String>,
    pub subject: Option<String>,
    pub semester: Option<String>,
    pub year: Option<String>,
}

/// Validated partial update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScheduleChanges {
    pub teacher_name: Option<String>,
    pub room: Option<String>,
    pub subject: Option<String>,
    pub start_time: Option<TimeOfDay>,
    pub end_time: Option<TimeOfDay>,
    pub day: Option<Day>,
    pub semester: Option<String>,
    pub year: Option<String>,
}

impl UpdateScheduleRequest {
    pub fn validate(self) -> Result<ScheduleChanges, AppError> {
        let teacher_name = match self.teacher_name {
            Some(name) => Some(validate::required("teacherName", &name, 2)?),
            None => None,
        };

        Ok(ScheduleChanges {
            teacher_name,
            room: validate::optional_non_empty("room", self.room)?,
            subject: validate::optional_non_empty("subject", self.subject)?,
            start_time: self.start_time.as_deref().map(parse_start_time).transpose()?,
            end_time: self.end_time.as_deref().map(parse_end_time).transpose()?,
            day: self.day.as_deref().map(parse_day).transpose()?,
            semester: validate::bounded("semester", self.semester, SEMESTER_MAX_LEN)?,
            year: validate::bounded("year", self.year, YEAR_MAX_LEN)?,
        })
    }
}

fn join_times(times: impl Iterator<Item = TimeOfDay>) -> String {
    times.map(|t| t.to_string()).collect::<Vec<_>>().join(", ")
}

pub fn parse_start_time(raw: &str) -> Result<TimeOfDay, AppError> {
    let time: TimeOfDay = raw.parse().map_err(|_| {
        AppError::Validation("Start time must be in the format HH:MM (24-hour format)".to_string())
    })?;
    if !Period::ALL.iter().any(|p| p.start() == time) {
        return Err(AppError::Validation(format!(
            "Start time must be one of the following: {}",
            join_times(Period::ALL.iter().map(|p| p.start()))
        )));
    }
    Ok(time)
}

pub fn parse_end_time(raw: &str) -> Result<TimeOfDay, AppError> {
    let time: TimeOfDay = raw.parse().map_err(|_| {
        AppError::Validation("End time must be in the format HH:MM (24-hour format)".to_string())
    })?;
    if !Period::ALL.iter().any(|p| p.end() == time) {
        return Err(AppError::Validation(format!(
            "End time must be one of the following: {}",
            join_times(Period::ALL.iter().map(|p| p.end()))
        )));
    }
    Ok(time)
}

/// The start/end pair must be exactly one of the canonical slots.
pub fn canonical_period(start: TimeOfDay, end: TimeOfDay) -> Result<Period, AppError> {
    Period::from_bounds(start, end).ok_or_else(|| {
        AppError::Validation(format!(
            "Time slot {} - {} does not match any period",
            start, end
        ))
    })
}

fn parse_day(raw: &str) -> Result<Day, AppError> {
    raw.parse::<Day>().map_err(|e| AppError::Validation(e.to_string()))
}
