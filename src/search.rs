// Availability search and room catalog browsing

use chrono::NaiveDate;
use futures::future;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api_client::{ApiError, HotelApi};
use crate::dates::{DateError, DateRange};
use crate::models::Room;
use crate::notice::{Banner, FlowTimings, NoticeKind};

pub const NO_AVAILABILITY_MESSAGE: &str =
    "Room not currently available for this date range on the selected room type.";
pub const DEFAULT_ROOMS_PER_PAGE: usize = 5;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Please select all fields")]
    MissingFields,

    #[error(transparent)]
    InvalidRange(#[from] DateError),

    #[error("Unknown error occurred: {}", .0.user_message())]
    Request(#[from] ApiError),
}

impl SearchError {
    pub fn is_validation(&self) -> bool {
        !matches!(self, SearchError::Request(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchCriteria {
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
    pub room_type: String,
}

impl SearchCriteria {
    fn validated(&self) -> Result<(DateRange, &str), SearchError> {
        let room_type = self.room_type.trim();
        match (self.check_in, self.check_out) {
            (Some(check_in), Some(check_out)) if !room_type.is_empty() => {
                Ok((DateRange::new(check_in, check_out)?, room_type))
            }
            _ => Err(SearchError::MissingFields),
        }
    }
}

/// An empty result is a normal outcome, kept apart from request failures.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Rooms(Vec<Room>),
    NoAvailability,
}

impl SearchOutcome {
    pub fn rooms(&self) -> &[Room] {
        match self {
            SearchOutcome::Rooms(rooms) => rooms,
            SearchOutcome::NoAvailability => &[],
        }
    }
}

/// Queries rooms of `criteria.room_type` free for the whole range.
///
/// Validation failures return before any request is made. The server's answer
/// is narrowed again to exact type matches and to rooms whose listed bookings
/// leave the range free.
pub async fn search_available_rooms<A: HotelApi + ?Sized>(
    api: &A,
    criteria: &SearchCriteria,
) -> Result<SearchOutcome, SearchError> {
    let (range, room_type) = criteria.validated()?;
    debug!(
        check_in = %range.check_in(),
        check_out = %range.check_out(),
        room_type,
        "searching available rooms"
    );

    let rooms: Vec<Room> = api
        .available_rooms(range.check_in(), range.check_out(), room_type)
        .await?
        .into_iter()
        .filter(|room| room.room_type == room_type && room.is_free_during(&range))
        .collect();

    if rooms.is_empty() {
        return Ok(SearchOutcome::NoAvailability);
    }
    info!(count = rooms.len(), "rooms available");
    Ok(SearchOutcome::Rooms(rooms))
}

/// The search form: selected values, the room type options and its banner.
pub struct RoomSearch {
    pub criteria: SearchCriteria,
    room_types: Vec<String>,
    banner: Banner,
}

impl RoomSearch {
    pub fn new(timings: FlowTimings) -> Self {
        Self {
            criteria: SearchCriteria::default(),
            room_types: Vec::new(),
            banner: Banner::new(timings),
        }
    }

    /// A failure leaves the type list empty; the form stays usable.
    pub async fn load_room_types<A: HotelApi + ?Sized>(&mut self, api: &A) {
        self.room_types = match api.room_types().await {
            Ok(types) => types,
            Err(e) => {
                warn!(error = %e, "could not fetch room types");
                Vec::new()
            }
        };
    }

    pub fn room_types(&self) -> &[String] {
        &self.room_types
    }

    /// Earliest selectable check-out: the chosen check-in, if any.
    pub fn min_check_out(&self) -> Option<NaiveDate> {
        self.criteria.check_in
    }

    /// Runs the search and reports problems through the banner. Returns the
    /// rooms only when there are some.
    pub async fn submit<A: HotelApi + ?Sized>(&mut self, api: &A) -> Option<Vec<Room>> {
        match search_available_rooms(api, &self.criteria).await {
            Ok(SearchOutcome::Rooms(rooms)) => {
                self.banner.clear();
                Some(rooms)
            }
            Ok(SearchOutcome::NoAvailability) => {
                self.banner.show(NoticeKind::Error, NO_AVAILABILITY_MESSAGE);
                None
            }
            Err(e) => {
                self.banner.show(NoticeKind::Error, e.to_string());
                None
            }
        }
    }

    pub fn banner(&self) -> &Banner {
        &self.banner
    }

    pub fn close(&mut self) {
        self.banner.close();
    }
}

#[derive(Debug, Clone, Default)]
pub struct RoomFilter {
    pub room_type: Option<String>,
    pub search_term: Option<String>,
    pub max_price: Option<f64>,
    pub min_capacity: Option<u32>,
}

impl RoomFilter {
    pub fn apply(&self, rooms: &[Room]) -> Vec<Room> {
        let term = self
            .search_term
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase);
        let mut filtered = Vec::new();

        for room in rooms {
            if !self
                .room_type
                .as_ref()
                .map_or(true, |wanted| wanted.is_empty() || &room.room_type == wanted)
            {
                continue;
            }

            if !term.as_ref().map_or(true, |term| {
                room.name.to_lowercase().contains(term)
                    || room.description.to_lowercase().contains(term)
            }) {
                continue;
            }

            if !self.max_price.map_or(true, |max| room.price <= max) {
                continue;
            }

            if !self.min_capacity.map_or(true, |min| room.capacity >= min) {
                continue;
            }

            filtered.push(room.clone());
        }

        filtered
    }
}

/// Number of pages needed to show `total` items.
pub fn page_count(total: usize, per_page: usize) -> usize {
    if per_page == 0 {
        return 0;
    }
    (total + per_page - 1) / per_page
}

/// One-based page slice; out of range pages are empty.
pub fn paginate<T>(items: &[T], page: usize, per_page: usize) -> &[T] {
    if page == 0 || per_page == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(per_page);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(per_page).min(items.len());
    &items[start..end]
}

/// Rooms and room types for the listing page, fetched together.
#[derive(Debug, Clone, Default)]
pub struct RoomCatalog {
    pub rooms: Vec<Room>,
    pub room_types: Vec<String>,
}

impl RoomCatalog {
    /// Each fetch fails independently into an empty list.
    pub async fn load<A: HotelApi + ?Sized>(api: &A) -> Self {
        let (rooms, room_types) = future::join(api.all_rooms(), api.room_types()).await;

        let rooms = rooms.unwrap_or_else(|e| {
            warn!(error = %e, "could not fetch rooms");
            Vec::new()
        });
        let room_types = room_types.unwrap_or_else(|e| {
            warn!(error = %e, "could not fetch room types");
            Vec::new()
        });
        Self { rooms, room_types }
    }
}
