// Form validation, booking lookup and admin console helpers

use futures::future;
use std::collections::HashSet;
use thiserror::Error;
use tracing::warn;

use crate::api_client::{ApiError, HotelApi};
use crate::models::{
    Booking, BookingStatus, BookingUpdate, Credentials, ProfileUpdate, Registration, Room,
    RoomDraft,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please fill in all fields.")]
    MissingFields,

    #[error("Please enter a valid email address.")]
    InvalidEmail,

    #[error("Check-out date must be after check-in date.")]
    InvalidDateOrder,

    #[error("Please enter either a booking ID or email address.")]
    MissingLookupKey,

    #[error("Please enter a valid price.")]
    InvalidPrice,

    #[error("Please enter a valid capacity.")]
    InvalidCapacity,
}

#[derive(Error, Debug)]
pub enum LookupError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{}", .0.server_message().unwrap_or("Booking not found. Please check your details."))]
    Request(#[from] ApiError),
}

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

pub fn validate_registration(registration: &Registration) -> Result<(), ValidationError> {
    if blank(&registration.name)
        || blank(&registration.email)
        || blank(&registration.password)
        || blank(&registration.phone_number)
    {
        return Err(ValidationError::MissingFields);
    }
    if !is_valid_email(&registration.email) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

pub fn validate_credentials(credentials: &Credentials) -> Result<(), ValidationError> {
    if blank(&credentials.email) || blank(&credentials.password) {
        return Err(ValidationError::MissingFields);
    }
    Ok(())
}

pub fn validate_profile_update(update: &ProfileUpdate) -> Result<(), ValidationError> {
    if blank(&update.name) || blank(&update.email) || blank(&update.phone_number) {
        return Err(ValidationError::MissingFields);
    }
    if !is_valid_email(&update.email) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

pub fn validate_room_draft(draft: &RoomDraft) -> Result<(), ValidationError> {
    if blank(&draft.room_type) || blank(&draft.description) {
        return Err(ValidationError::MissingFields);
    }
    if !draft.price.is_finite() || draft.price <= 0.0 {
        return Err(ValidationError::InvalidPrice);
    }
    if draft.capacity == 0 {
        return Err(ValidationError::InvalidCapacity);
    }
    Ok(())
}

pub fn validate_booking_update(update: &BookingUpdate) -> Result<(), ValidationError> {
    match (update.check_in_date, update.check_out_date, update.status) {
        (Some(check_in), Some(check_out), Some(_)) if check_in >= check_out => {
            Err(ValidationError::InvalidDateOrder)
        }
        (Some(_), Some(_), Some(_)) => Ok(()),
        _ => Err(ValidationError::MissingFields),
    }
}

pub fn validate_lookup(booking_id: &str, email: &str) -> Result<(), ValidationError> {
    if blank(booking_id) && blank(email) {
        return Err(ValidationError::MissingLookupKey);
    }
    Ok(())
}

/// Finds a booking by id or by the guest's email.
pub async fn lookup_booking<A: HotelApi + ?Sized>(
    api: &A,
    booking_id: &str,
    email: &str,
) -> Result<Booking, LookupError> {
    validate_lookup(booking_id, email)?;
    Ok(api.find_booking(booking_id.trim(), email.trim()).await?)
}

#[derive(Debug, Clone, Default)]
pub struct BookingFilter {
    pub search_term: Option<String>,
    pub status: Option<BookingStatus>,
}

impl BookingFilter {
    pub fn apply(&self, bookings: &[Booking]) -> Vec<Booking> {
        let term = self
            .search_term
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase);

        bookings
            .iter()
            .filter(|booking| {
                term.as_ref().map_or(true, |term| {
                    [
                        booking.id.as_str(),
                        booking.user_name.as_str(),
                        booking.room_name.as_str(),
                        booking.user_email.as_str(),
                    ]
                    .iter()
                    .any(|field| field.to_lowercase().contains(term))
                })
            })
            .filter(|booking| self.status.map_or(true, |status| booking.status == status))
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub admin_name: Option<String>,
    pub total_rooms: usize,
    pub total_bookings: usize,
    pub active_bookings: usize,
    pub total_users: usize,
}

impl DashboardStats {
    pub fn from_data(rooms: &[Room], bookings: &[Booking]) -> Self {
        let users: HashSet<_> = bookings.iter().filter_map(|b| b.user_id.as_ref()).collect();
        Self {
            admin_name: None,
            total_rooms: rooms.len(),
            total_bookings: bookings.len(),
            active_bookings: bookings.iter().filter(|b| b.status.is_active()).count(),
            total_users: users.len(),
        }
    }

    /// Loads the admin landing page figures; each source that fails counts as empty.
    pub async fn load<A: HotelApi + ?Sized>(api: &A) -> Self {
        let (profile, rooms, bookings) =
            future::join3(api.profile(), api.all_rooms(), api.all_bookings()).await;

        let rooms = rooms.unwrap_or_else(|e| {
            warn!(error = %e, "dashboard could not fetch rooms");
            Vec::new()
        });
        let bookings = bookings.unwrap_or_else(|e| {
            warn!(error = %e, "dashboard could not fetch bookings");
            Vec::new()
        });

        let mut stats = Self::from_data(&rooms, &bookings);
        stats.admin_name = match profile {
            Ok(user) => Some(user.name),
            Err(e) => {
                warn!(error = %e, "dashboard could not fetch profile");
                None
            }
        };
        stats
    }
}
