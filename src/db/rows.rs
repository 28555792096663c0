//! Raw SQLite rows and their checked conversion into domain types.
//!
//! A row that does not decode (bad timestamp, unknown day or period, bad
//! time text) is rejected with `sqlx::Error::Decode` instead of being
//! passed through.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use thiserror::Error;

use crate::models::{Day, Period, Room, Schedule, Subject, Teacher, TimeOfDay, TimeSlot};

#[derive(Debug, Error)]
#[error("malformed {column} value '{value}'")]
pub struct MalformedRow {
    pub column: &'static str,
    pub value: String,
}

impl From<MalformedRow> for sqlx::Error {
    fn from(err: MalformedRow) -> Self {
        sqlx::Error::Decode(Box::new(err))
    }
}

fn malformed(column: &'static str, value: &str) -> MalformedRow {
    MalformedRow {
        column,
        value: value.to_string(),
    }
}

fn timestamp(column: &'static str, value: &str) -> Result<DateTime<Utc>, MalformedRow> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| malformed(column, value))
}

fn time(column: &'static str, value: &str) -> Result<TimeOfDay, MalformedRow> {
    value.parse().map_err(|_| malformed(column, value))
}

fn non_empty(column: &'static str, value: String) -> Result<String, MalformedRow> {
    if value.trim().is_empty() {
        Err(malformed(column, &value))
    } else {
        Ok(value)
    }
}

#[derive(Debug, FromRow)]
pub struct TeacherRow {
    pub id: String,
    pub name: String,
    pub avatar: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<TeacherRow> for Teacher {
    type Error = MalformedRow;

    fn try_from(row: TeacherRow) -> Result<Self, Self::Error> {
        Ok(Teacher {
            created_at: timestamp("teachers.created_at", &row.created_at)?,
            updated_at: timestamp("teachers.updated_at", &row.updated_at)?,
            name: non_empty("teachers.name", row.name)?,
            id: row.id,
            avatar: row.avatar,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct RoomRow {
    pub id: String,
    pub number: String,
    pub building: Option<String>,
    pub capacity: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<RoomRow> for Room {
    type Error = MalformedRow;

    fn try_from(row: RoomRow) -> Result<Self, Self::Error> {
        Ok(Room {
            created_at: timestamp("rooms.created_at", &row.created_at)?,
            updated_at: timestamp("rooms.updated_at", &row.updated_at)?,
            number: non_empty("rooms.number", row.number)?,
            id: row.id,
            building: row.building,
            capacity: row.capacity,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct SubjectRow {
    pub id: String,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub credit_hours: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<SubjectRow> for Subject {
    type Error = MalformedRow;

    fn try_from(row: SubjectRow) -> Result<Self, Self::Error> {
        Ok(Subject {
            created_at: timestamp("subjects.created_at", &row.created_at)?,
            updated_at: timestamp("subjects.updated_at", &row.updated_at)?,
            code: non_empty("subjects.code", row.code)?,
            id: row.id,
            name: row.name,
            description: row.description,
            credit_hours: row.credit_hours,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct TimeSlotRow {
    pub id: String,
    pub start_time: String,
    pub end_time: String,
    pub period: String,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<TimeSlotRow> for TimeSlot {
    type Error = MalformedRow;

    fn try_from(row: TimeSlotRow) -> Result<Self, Self::Error> {
        Ok(TimeSlot {
            start_time: time("time_slots.start_time", &row.start_time)?,
            end_time: time("time_slots.end_time", &row.end_time)?,
            period: row
                .period
                .parse::<Period>()
                .map_err(|_| malformed("time_slots.period", &row.period))?,
            created_at: timestamp("time_slots.created_at", &row.created_at)?,
            updated_at: timestamp("time_slots.updated_at", &row.updated_at)?,
            id: row.id,
        })
    }
}

/// One schedule joined with its four reference rows.
#[derive(Debug, FromRow)]
pub struct ScheduleRow {
    pub id: String,
    pub day: String,
    pub semester: Option<String>,
    pub year: Option<String>,
    pub created_at: String,
    pub updated_at: String,

    pub teacher_id: String,
    pub teacher_name: String,
    pub teacher_avatar: Option<String>,
    pub teacher_created_at: String,
    pub teacher_updated_at: String,

    pub room_id: String,
    pub room_number: String,
    pub room_building: Option<String>,
    pub room_capacity: Option<i64>,
    pub room_created_at: String,
    pub room_updated_at: String,

    pub subject_id: String,
    pub subject_code: String,
    pub subject_name: String,
    pub subject_description: Option<String>,
    pub subject_credit_hours: Option<i64>,
    pub subject_created_at: String,
    pub subject_updated_at: String,

    pub time_slot_id: String,
    pub time_slot_start_time: String,
    pub time_slot_end_time: String,
    pub time_slot_period: String,
    pub time_slot_created_at: String,
    pub time_slot_updated_at: String,
}

impl TryFrom<ScheduleRow> for Schedule {
    type Error = MalformedRow;

    fn try_from(row: ScheduleRow) -> Result<Self, Self::Error> {
        let teacher = Teacher::try_from(TeacherRow {
            id: row.teacher_id,
            name: row.teacher_name,
            avatar: row.teacher_avatar,
            created_at: row.teacher_created_at,
            updated_at: row.teacher_updated_at,
        })?;
        let room = Room::try_from(RoomRow {
            id: row.room_id,
            number: row.room_number,
            building: row.room_building,
            capacity: row.room_capacity,
            created_at: row.room_created_at,
            updated_at: row.room_updated_at,
        })?;
        let subject = Subject::try_from(SubjectRow {
            id: row.subject_id,
            code: row.subject_code,
            name: row.subject_name,
            description: row.subject_description,
            credit_hours: row.subject_credit_hours,
            created_at: row.subject_created_at,
            updated_at: row.subject_updated_at,
        })?;
        let time_slot = TimeSlot::try_from(TimeSlotRow {
            id: row.time_slot_id,
            start_time: row.time_slot_start_time,
            end_time: row.time_slot_end_time,
            period: row.time_slot_period,
            created_at: row.time_slot_created_at,
            updated_at: row.time_slot_updated_at,
        })?;

        Ok(Schedule {
            day: row.day.parse::<Day>().map_err(|_| malformed("schedules.day", &row.day))?,
            created_at: timestamp("schedules.created_at", &row.created_at)?,
            updated_at: timestamp("schedules.updated_at", &row.updated_at)?,
            id: row.id,
            teacher,
            room,
            subject,
            time_slot,
            semester: row.semester,
            year: row.year,
        })
    }
}
