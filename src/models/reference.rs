use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::time::{Period, TimeOfDay};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    pub number: String,
    pub building: Option<String>,
    pub capacity: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: String,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub credit_hours: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    pub id: String,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub period: Period,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Canonical slot description served to clients choosing a period.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodInfo {
    pub period: Period,
    pub label: String,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
}

impl From<Period> for PeriodInfo {
    fn from(period: Period) -> Self {
        Self {
            period,
            label: period.label(),
            start_time: period.start(),
            end_time: period.end(),
        }
    }
}
