use bytes::Bytes;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::dates::{self, DateRange};

// Backend identifiers arrive as JSON numbers or strings depending on the endpoint
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Id(String);

impl Id {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Id {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<u64> for Id {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Signed(i64),
            Unsigned(u64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(text) => Id(text),
            RawId::Signed(n) => Id(n.to_string()),
            RawId::Unsigned(n) => Id(n.to_string()),
        })
    }
}

/// Jackson writes absent values as `null`; read those as the field's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Envelope wrapping every backend reply.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub status_code: u16,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub booking_confirmation_code: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: Id,
    #[serde(alias = "type", default, deserialize_with = "null_as_default")]
    pub room_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(alias = "roomDescription", default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(alias = "roomPrice", default, deserialize_with = "null_as_default")]
    pub price: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub capacity: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub amenities: Vec<String>,
    #[serde(alias = "roomPhotoUrl", alias = "imageUrl", default)]
    pub photo_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub bookings: Vec<BookedRange>,
}

impl Room {
    /// A room is free when none of the bookings it carries overlap `range`.
    /// Rooms fetched without their booking list are treated as free.
    pub fn is_free_during(&self, range: &DateRange) -> bool {
        self.bookings.iter().all(|booked| {
            !range.overlaps_dates(booked.check_in_date, booked.check_out_date)
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookedRange {
    #[serde(default)]
    pub id: Option<Id>,
    #[serde(with = "dates::iso_date")]
    pub check_in_date: NaiveDate,
    #[serde(with = "dates::iso_date")]
    pub check_out_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[default]
    #[serde(alias = "PENDING")]
    Pending,
    #[serde(alias = "CONFIRMED")]
    Confirmed,
    #[serde(alias = "CANCELLED")]
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    /// Pending and confirmed bookings still hold their room.
    pub fn is_active(&self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            other => Err(format!("unknown booking status '{}'", other)),
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Id,
    #[serde(default)]
    pub room_id: Option<Id>,
    #[serde(default)]
    pub user_id: Option<Id>,
    #[serde(alias = "startDate", with = "dates::iso_date")]
    pub check_in_date: NaiveDate,
    #[serde(alias = "endDate", with = "dates::iso_date")]
    pub check_out_date: NaiveDate,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: BookingStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_price: f64,
    #[serde(default, with = "dates::lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub room_name: String,
    #[serde(alias = "bookingConfirmationCode", default)]
    pub confirmation_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Id,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub phone_number: String,
    #[serde(default)]
    pub role: Option<Role>,
}

// Request bodies

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone_number: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub name: String,
    pub email: String,
    pub phone_number: String,
}

#[derive(Debug, Clone)]
pub struct RoomPhoto {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDraft {
    pub name: String,
    #[serde(rename = "type")]
    pub room_type: String,
    pub description: String,
    pub price: f64,
    pub capacity: u32,
    pub amenities: Vec<String>,
    #[serde(skip)]
    pub photo: Option<RoomPhoto>,
}

impl RoomDraft {
    /// Splits a comma separated amenity list the way the admin form enters it.
    pub fn parse_amenities(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingSubmission {
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub num_of_adults: i32,
    pub num_of_children: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_in_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_out_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<BookingStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingReceipt {
    #[serde(default)]
    pub booking_confirmation_code: Option<String>,
}
