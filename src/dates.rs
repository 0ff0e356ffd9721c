// Calendar-only date handling shared by search, pricing and booking submission

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use thiserror::Error;

pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    #[error("Check-out date must be after check-in date.")]
    CheckOutNotAfterCheckIn {
        check_in: NaiveDate,
        check_out: NaiveDate,
    },

    #[error("Invalid date: {0}")]
    Unparseable(String),
}

/// A stay expressed as two calendar dates, check-in strictly before check-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    check_in: NaiveDate,
    check_out: NaiveDate,
}

impl DateRange {
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> Result<Self, DateError> {
        if check_in >= check_out {
            return Err(DateError::CheckOutNotAfterCheckIn {
                check_in,
                check_out,
            });
        }
        Ok(Self {
            check_in,
            check_out,
        })
    }

    pub fn check_in(&self) -> NaiveDate {
        self.check_in
    }

    pub fn check_out(&self) -> NaiveDate {
        self.check_out
    }

    /// Plain day difference; a one-night stay yields 1.
    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }

    // Check-out day is free for the next guest
    pub fn overlaps_dates(&self, other_in: NaiveDate, other_out: NaiveDate) -> bool {
        self.check_in < other_out && other_in < self.check_out
    }
}

/// The calendar date the user picked, as seen in their own timezone.
///
/// Formatting a picker value through UTC shifts it by a day for users east of
/// Greenwich picking midnight; taking the local date avoids that.
pub fn calendar_date<Tz: TimeZone>(moment: &DateTime<Tz>) -> NaiveDate {
    moment.naive_local().date()
}

pub fn format_iso(date: NaiveDate) -> String {
    date.format(ISO_DATE_FORMAT).to_string()
}

/// Parses `YYYY-MM-DD`, also accepting a full timestamp and keeping its date part.
pub fn parse_iso(raw: &str) -> Result<NaiveDate, DateError> {
    let trimmed = raw.trim();
    let date_part = trimmed
        .split(|c: char| c == 'T' || c == ' ')
        .next()
        .unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, ISO_DATE_FORMAT)
        .map_err(|_| DateError::Unparseable(raw.to_string()))
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(moment) = DateTime::parse_from_rfc3339(raw) {
        return Some(moment.with_timezone(&Utc));
    }
    // Backends serializing LocalDateTime omit the offset
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Serde adapter writing `YYYY-MM-DD` and reading either a date or a timestamp.
pub mod iso_date {
    use super::*;
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_iso(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_iso(&raw).map_err(D::Error::custom)
    }
}

/// Serde adapter for optional creation timestamps with or without an offset.
pub mod lenient_timestamp {
    use super::*;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        moment: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match moment {
            Some(moment) => serializer.serialize_str(&moment.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(parse_timestamp))
    }
}
