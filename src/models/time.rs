use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Wall-clock time of day with minute precision, stored as minutes since
/// midnight.
///
/// Parses `H:MM` and `HH:MM` (24-hour). Always renders as `H:MM` so that
/// `05:45` and `5:45` share one canonical text form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(u16);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid time '{0}': expected H:MM or HH:MM (24-hour format)")]
pub struct InvalidTime(pub String);

impl TimeOfDay {
    pub const fn from_hm(hour: u16, minute: u16) -> Self {
        Self(hour * 60 + minute)
    }

    pub fn minutes(self) -> u16 {
        self.0
    }

    pub fn hour(self) -> u16 {
        self.0 / 60
    }

    pub fn minute(self) -> u16 {
        self.0 % 60
    }
}

impl FromStr for TimeOfDay {
    type Err = InvalidTime;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidTime(s.to_string());

        let (hour, minute) = s.split_once(':').ok_or_else(invalid)?;
        let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());

        if !(1..=2).contains(&hour.len()) || !all_digits(hour) {
            return Err(invalid());
        }
        if minute.len() != 2 || !all_digits(minute) {
            return Err(invalid());
        }

        let hour: u16 = hour.parse().map_err(|_| invalid())?;
        let minute: u16 = minute.parse().map_err(|_| invalid())?;
        if hour > 23 || minute > 59 {
            return Err(invalid());
        }

        Ok(Self::from_hm(hour, minute))
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = InvalidTime;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

impl From<NaiveTime> for TimeOfDay {
    fn from(value: NaiveTime) -> Self {
        Self::from_hm(value.hour() as u16, value.minute() as u16)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}", self.hour(), self.minute())
    }
}

/// One of the three fixed daily periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "FIRST_PERIOD")]
    First,
    #[serde(rename = "SECOND_PERIOD")]
    Second,
    #[serde(rename = "THIRD_PERIOD")]
    Third,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown period: {0}")]
pub struct InvalidPeriod(pub String);

impl Period {
    pub const ALL: [Period; 3] = [Period::First, Period::Second, Period::Third];

    pub fn ordinal(self) -> u8 {
        match self {
            Period::First => 1,
            Period::Second => 2,
            Period::Third => 3,
        }
    }

    pub fn start(self) -> TimeOfDay {
        match self {
            Period::First => TimeOfDay::from_hm(5, 45),
            Period::Second => TimeOfDay::from_hm(6, 45),
            Period::Third => TimeOfDay::from_hm(7, 45),
        }
    }

    pub fn end(self) -> TimeOfDay {
        match self {
            Period::First => TimeOfDay::from_hm(6, 45),
            Period::Second => TimeOfDay::from_hm(7, 45),
            Period::Third => TimeOfDay::from_hm(8, 45),
        }
    }

    pub fn as_db(self) -> &'static str {
        match self {
            Period::First => "FIRST_PERIOD",
            Period::Second => "SECOND_PERIOD",
            Period::Third => "THIRD_PERIOD",
        }
    }

    pub fn label(self) -> String {
        let name = match self {
            Period::First => "First",
            Period::Second => "Second",
            Period::Third => "Third",
        };
        format!("{} Period ({} - {})", name, self.start(), self.end())
    }

    /// The canonical period whose boundaries are exactly `(start, end)`.
    pub fn from_bounds(start: TimeOfDay, end: TimeOfDay) -> Option<Period> {
        Period::ALL
            .into_iter()
            .find(|period| period.start() == start && period.end() == end)
    }
}

impl FromStr for Period {
    type Err = InvalidPeriod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Period::ALL
            .into_iter()
            .find(|period| period.as_db() == s)
            .ok_or_else(|| InvalidPeriod(s.to_string()))
    }
}
