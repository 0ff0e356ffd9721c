// Booking confirmation flow for a single room:
// Browsing -> DateSelection -> PricePreview -> Submitting -> Confirmed
// with Error reachable from date selection and price preview

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, TimeZone};
use futures::future;
use parking_lot::Mutex;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::api_client::{ApiError, HotelApi};
use crate::dates::{calendar_date, DateError};
use crate::models::{BookingSubmission, Id, Room};
use crate::notice::{Banner, FlowTimings, Notice, NoticeKind, ScheduledTask};
use crate::pricing::{compute_booking, BookingQuote, PricingError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Rooms,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BookingConfirmation {
    pub confirmation_code: String,
    pub room_id: Id,
    pub submission: BookingSubmission,
    pub quote: BookingQuote,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FlowState {
    Browsing,
    DateSelection,
    PricePreview(BookingQuote),
    Submitting,
    Confirmed(BookingConfirmation),
    Error { message: String },
    Left(Route),
}

impl FlowState {
    pub fn name(&self) -> &'static str {
        match self {
            FlowState::Browsing => "browsing",
            FlowState::DateSelection => "date selection",
            FlowState::PricePreview(_) => "price preview",
            FlowState::Submitting => "submitting",
            FlowState::Confirmed(_) => "confirmed",
            FlowState::Error { .. } => "error",
            FlowState::Left(_) => "left",
        }
    }
}

#[derive(Error, Debug)]
pub enum FlowError {
    #[error("Cannot {action} while in {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error(transparent)]
    Dates(#[from] DateError),

    #[error("Please log in to book a room.")]
    NotLoggedIn,

    #[error("{}", .0.user_message())]
    Api(#[from] ApiError),
}

struct StateCell {
    generation: u64,
    state: FlowState,
}

/// One booking attempt on a room details page.
///
/// Timers armed by the flow (error revert, post-confirmation redirect) are
/// cancelled by [`BookingFlow::close`] or when the flow is dropped.
pub struct BookingFlow<A: HotelApi> {
    api: Arc<A>,
    room: Room,
    user_id: Option<Id>,
    cell: Arc<Mutex<StateCell>>,
    check_in: Option<DateTime<FixedOffset>>,
    check_out: Option<DateTime<FixedOffset>>,
    adults: Option<i32>,
    children: Option<i32>,
    banner: Banner,
    timer: Option<ScheduledTask>,
    timings: FlowTimings,
}

impl<A: HotelApi> BookingFlow<A> {
    /// Loads the room and the visitor's profile concurrently. Only the room is
    /// required; without a profile the flow still renders but cannot submit.
    pub async fn open(api: Arc<A>, room_id: &Id, timings: FlowTimings) -> Result<Self, ApiError> {
        let (room, profile) = future::join(api.room_by_id(room_id), api.profile()).await;
        let room = room?;
        let user_id = match profile {
            Ok(user) => Some(user.id),
            Err(e) => {
                warn!(error = %e, "profile unavailable, booking will require login");
                None
            }
        };
        Ok(Self::new(api, room, user_id, timings))
    }

    pub fn new(api: Arc<A>, room: Room, user_id: Option<Id>, timings: FlowTimings) -> Self {
        Self {
            api,
            room,
            user_id,
            cell: Arc::new(Mutex::new(StateCell {
                generation: 0,
                state: FlowState::Browsing,
            })),
            check_in: None,
            check_out: None,
            adults: Some(1),
            children: Some(0),
            banner: Banner::new(timings),
            timer: None,
            timings,
        }
    }

    pub fn room(&self) -> &Room {
        &self.room
    }

    pub fn user_id(&self) -> Option<&Id> {
        self.user_id.as_ref()
    }

    pub fn state(&self) -> FlowState {
        self.cell.lock().state.clone()
    }

    pub fn notice(&self) -> Option<Notice> {
        self.banner.current()
    }

    /// "Book Now": opens date selection.
    pub fn book_now(&mut self) -> Result<(), FlowError> {
        match self.state() {
            FlowState::Browsing
            | FlowState::DateSelection
            | FlowState::PricePreview(_)
            | FlowState::Error { .. } => {
                self.transition(FlowState::DateSelection);
                Ok(())
            }
            other => Err(self.invalid("open date selection", &other)),
        }
    }

    /// "Go Back": hides date selection and any preview.
    pub fn go_back(&mut self) -> Result<(), FlowError> {
        match self.state() {
            FlowState::DateSelection | FlowState::PricePreview(_) | FlowState::Error { .. } => {
                self.transition(FlowState::Browsing);
                Ok(())
            }
            other => Err(self.invalid("go back", &other)),
        }
    }

    pub fn select_check_in<Tz: TimeZone>(
        &mut self,
        picked: Option<DateTime<Tz>>,
    ) -> Result<(), FlowError> {
        self.ensure_editable("change dates")?;
        self.check_in = picked.map(to_fixed);
        // A check-out before the new check-in is no longer selectable
        if let (Some(check_in), Some(check_out)) = (&self.check_in, &self.check_out) {
            if calendar_date(check_out) < calendar_date(check_in) {
                self.check_out = None;
            }
        }
        self.invalidate_preview();
        Ok(())
    }

    pub fn select_check_out<Tz: TimeZone>(
        &mut self,
        picked: Option<DateTime<Tz>>,
    ) -> Result<(), FlowError> {
        self.ensure_editable("change dates")?;
        let picked = picked.map(to_fixed);
        if let (Some(min), Some(check_out)) = (self.min_check_out(), &picked) {
            let chosen = calendar_date(check_out);
            if chosen < min {
                return Err(DateError::CheckOutNotAfterCheckIn {
                    check_in: min,
                    check_out: chosen,
                }
                .into());
            }
        }
        self.check_out = picked;
        self.invalidate_preview();
        Ok(())
    }

    /// Earliest check-out the date picker offers.
    pub fn min_check_out(&self) -> Option<NaiveDate> {
        self.check_in.as_ref().map(calendar_date)
    }

    pub fn set_occupancy(&mut self, adults: i32, children: i32) -> Result<(), FlowError> {
        self.ensure_editable("change guests")?;
        self.adults = Some(adults);
        self.children = Some(children);
        self.invalidate_preview();
        Ok(())
    }

    /// Takes the raw form text; unparseable counts are rejected on confirm.
    pub fn set_guest_counts(&mut self, adults: &str, children: &str) -> Result<(), FlowError> {
        self.ensure_editable("change guests")?;
        self.adults = adults.trim().parse().ok();
        self.children = children.trim().parse().ok();
        self.invalidate_preview();
        Ok(())
    }

    /// "Confirm Booking": prices the stay and shows the preview. On invalid
    /// input the flow shows the error and falls back to date selection once
    /// the message times out.
    pub fn confirm_booking(&mut self) -> Result<BookingQuote, FlowError> {
        let state = self.state();
        if !matches!(
            state,
            FlowState::DateSelection | FlowState::PricePreview(_) | FlowState::Error { .. }
        ) {
            return Err(self.invalid("confirm booking", &state));
        }

        let check_in = self.check_in.as_ref().map(calendar_date);
        let check_out = self.check_out.as_ref().map(calendar_date);
        let quote = match (check_in, check_out, self.adults, self.children) {
            (Some(_), Some(_), Some(adults), Some(children)) => {
                compute_booking(self.room.price, check_in, check_out, adults, children)
            }
            (Some(_), Some(_), _, _) => Err(PricingError::InvalidOccupancy),
            _ => Err(PricingError::InvalidDates),
        };

        match quote {
            Ok(quote) => {
                self.banner.clear();
                self.transition(FlowState::PricePreview(quote));
                Ok(quote)
            }
            Err(e) => {
                self.enter_error(e.to_string());
                Err(e.into())
            }
        }
    }

    /// "Accept Booking": submits the previewed stay. Failures return to the
    /// preview with the server's message so the user can retry as is.
    pub async fn accept_booking(&mut self) -> Result<BookingConfirmation, FlowError> {
        let quote = match self.state() {
            FlowState::PricePreview(quote) => quote,
            other => return Err(self.invalid("accept booking", &other)),
        };
        let user_id = match self.user_id.clone() {
            Some(user_id) => user_id,
            None => {
                let err = FlowError::NotLoggedIn;
                self.banner.show(NoticeKind::Error, err.to_string());
                return Err(err);
            }
        };
        let submission = self.submission()?;

        self.transition(FlowState::Submitting);
        let result = self
            .api
            .book_room(&self.room.id, &user_id, &submission)
            .await;

        match result {
            Ok(confirmation_code) => {
                let confirmation = BookingConfirmation {
                    confirmation_code,
                    room_id: self.room.id.clone(),
                    submission,
                    quote,
                };
                info!(
                    room_id = %self.room.id,
                    code = %confirmation.confirmation_code,
                    "booking confirmed"
                );
                self.banner.show(
                    NoticeKind::Confirmation,
                    format!(
                        "Booking successful! Confirmation code: {}. An SMS and email of your booking details have been sent to you.",
                        confirmation.confirmation_code
                    ),
                );
                let generation = self.transition(FlowState::Confirmed(confirmation.clone()));
                self.schedule_state(self.timings.confirmation, generation, FlowState::Left(Route::Rooms));
                Ok(confirmation)
            }
            Err(e) => {
                warn!(error = %e, "booking submission failed");
                self.banner.show(NoticeKind::Error, e.user_message());
                self.transition(FlowState::PricePreview(quote));
                Err(e.into())
            }
        }
    }

    /// Teardown on navigation: no timer fires after this.
    pub fn close(&mut self) {
        self.timer = None;
        self.banner.close();
    }

    fn submission(&self) -> Result<BookingSubmission, FlowError> {
        let (check_in, check_out) = match (&self.check_in, &self.check_out) {
            (Some(check_in), Some(check_out)) => (calendar_date(check_in), calendar_date(check_out)),
            _ => return Err(PricingError::InvalidDates.into()),
        };
        let (adults, children) = match (self.adults, self.children) {
            (Some(adults), Some(children)) => (adults, children),
            _ => return Err(PricingError::InvalidOccupancy.into()),
        };
        Ok(BookingSubmission {
            check_in_date: check_in,
            check_out_date: check_out,
            num_of_adults: adults,
            num_of_children: children,
        })
    }

    fn ensure_editable(&self, action: &'static str) -> Result<(), FlowError> {
        match self.state() {
            FlowState::DateSelection | FlowState::PricePreview(_) | FlowState::Error { .. } => Ok(()),
            other => Err(self.invalid(action, &other)),
        }
    }

    // Edited inputs make a shown price stale
    fn invalidate_preview(&mut self) {
        if matches!(self.state(), FlowState::PricePreview(_)) {
            self.transition(FlowState::DateSelection);
        }
    }

    fn enter_error(&mut self, message: String) {
        self.banner.show(NoticeKind::Error, message.clone());
        let generation = self.transition(FlowState::Error { message });
        self.schedule_state(self.timings.error, generation, FlowState::DateSelection);
    }

    /// Replaces the state and cancels any timer armed for the previous one.
    fn transition(&mut self, next: FlowState) -> u64 {
        self.timer = None;
        let mut cell = self.cell.lock();
        info!(from = cell.state.name(), to = next.name(), "booking flow transition");
        cell.generation += 1;
        cell.state = next;
        cell.generation
    }

    fn schedule_state(&mut self, delay: std::time::Duration, generation: u64, next: FlowState) {
        let cell = Arc::clone(&self.cell);
        self.timer = Some(ScheduledTask::schedule(delay, move || {
            let mut cell = cell.lock();
            if cell.generation == generation {
                info!(from = cell.state.name(), to = next.name(), "booking flow timer");
                cell.generation += 1;
                cell.state = next;
            }
        }));
    }

    fn invalid(&self, action: &'static str, state: &FlowState) -> FlowError {
        FlowError::InvalidTransition {
            action,
            state: state.name(),
        }
    }
}

fn to_fixed<Tz: TimeZone>(moment: DateTime<Tz>) -> DateTime<FixedOffset> {
    let offset = moment.offset().fix();
    moment.with_timezone(&offset)
}
