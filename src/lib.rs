// Client library for the hotel booking service

pub mod admin;
pub mod api_client;
pub mod booking_flow;
pub mod dates;
pub mod models;
pub mod notice;
pub mod pricing;
pub mod search;
pub mod session;

// Re-export key types for convenience
pub use admin::{BookingFilter, DashboardStats, LookupError, ValidationError};
pub use api_client::{
    ApiError, ClientConfig, ClientError, ClientStats, HotelApi, HttpHotelApi,
};
pub use booking_flow::{BookingConfirmation, BookingFlow, FlowError, FlowState, Route};
pub use dates::{DateError, DateRange};
pub use models::{
    Booking, BookingStatus, BookingSubmission, Id, Role, Room, RoomDraft, User,
};
pub use notice::{Banner, FlowTimings, Notice, NoticeKind, ScheduledTask};
pub use pricing::{compute_booking, BookingQuote, Occupancy, PricingError};
pub use search::{RoomCatalog, RoomFilter, RoomSearch, SearchCriteria, SearchError, SearchOutcome};
pub use session::{Session, SessionContext, SessionError};
