// HTTP client wrapper for the hotel booking REST backend
// Every page-level component talks to the backend through the HotelApi trait

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::Mutex;
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

use crate::dates::format_iso;
use crate::models::{
    ApiResponse, Booking, BookingReceipt, BookingSubmission, BookingUpdate, Credentials, Id,
    ProfileUpdate, Registration, Room, RoomDraft, User,
};
use crate::session::{Session, SessionContext};

pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    #[error("API error: {status_code} - {}", .message.as_deref().unwrap_or(UNKNOWN_ERROR_MESSAGE))]
    ApiResponseError {
        status_code: u16,
        message: Option<String>,
    },

    #[error("Not found: {}", .0.as_deref().unwrap_or("resource"))]
    NotFound(Option<String>),

    #[error("Not logged in")]
    Unauthenticated,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// The `message` field of the backend's error body, when it sent one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::ApiResponseError { message, .. } | ApiError::NotFound(message) => {
                message.as_deref()
            }
            _ => None,
        }
    }

    /// Text for an inline error banner.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Unauthenticated => "Please log in to continue.".to_string(),
            _ => self
                .server_message()
                .unwrap_or(UNKNOWN_ERROR_MESSAGE)
                .to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Initialization error: {0}")]
    InitError(String),
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:4040".to_string(),
            timeout_ms: 10_000,
            user_agent: concat!("hotel_booking_client/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ClientConfig {
    pub const BASE_URL_VAR: &'static str = "HOTEL_API_BASE_URL";
    pub const TIMEOUT_VAR: &'static str = "HOTEL_API_TIMEOUT_MS";

    /// Defaults overridden by `HOTEL_API_BASE_URL` and `HOTEL_API_TIMEOUT_MS`.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ClientError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(url) = lookup(Self::BASE_URL_VAR) {
            config.base_url = url.trim().to_string();
        }
        if let Some(raw) = lookup(Self::TIMEOUT_VAR) {
            config.timeout_ms = raw.trim().parse().map_err(|_| {
                ClientError::ConfigError(format!("{} must be a number, got '{}'", Self::TIMEOUT_VAR, raw))
            })?;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ClientError::ConfigError(format!(
                "base url must start with http:// or https://, got '{}'",
                self.base_url
            )));
        }
        if self.timeout_ms == 0 {
            return Err(ClientError::ConfigError("timeout must be positive".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct ClientStats {
    pub requests_sent: usize,
    pub requests_succeeded: usize,
    pub requests_failed: usize,
    pub average_response_time_ms: f64,
    pub max_response_time_ms: f64,
}

impl ClientStats {
    fn record(&mut self, elapsed: Duration, succeeded: bool) {
        let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
        self.requests_sent += 1;
        if succeeded {
            self.requests_succeeded += 1;
        } else {
            self.requests_failed += 1;
        }
        self.average_response_time_ms +=
            (elapsed_ms - self.average_response_time_ms) / self.requests_sent as f64;
        self.max_response_time_ms = self.max_response_time_ms.max(elapsed_ms);
    }
}

#[async_trait]
pub trait HotelApi: Send + Sync + 'static {
    // Auth
    async fn register(&self, registration: &Registration) -> Result<String, ApiError>;
    async fn login(&self, credentials: &Credentials) -> Result<Session, ApiError>;
    fn logout(&self);

    // Rooms
    async fn room_types(&self) -> Result<Vec<String>, ApiError>;
    async fn all_rooms(&self) -> Result<Vec<Room>, ApiError>;
    async fn all_available_rooms(&self) -> Result<Vec<Room>, ApiError>;
    async fn room_by_id(&self, room_id: &Id) -> Result<Room, ApiError>;
    async fn available_rooms(
        &self,
        check_in: NaiveDate,
        check_out: NaiveDate,
        room_type: &str,
    ) -> Result<Vec<Room>, ApiError>;
    async fn add_room(&self, draft: &RoomDraft) -> Result<String, ApiError>;
    async fn update_room(&self, room_id: &Id, draft: &RoomDraft) -> Result<String, ApiError>;
    async fn delete_room(&self, room_id: &Id) -> Result<String, ApiError>;

    // Bookings
    /// Returns the server-issued confirmation code.
    async fn book_room(
        &self,
        room_id: &Id,
        user_id: &Id,
        submission: &BookingSubmission,
    ) -> Result<String, ApiError>;
    async fn all_bookings(&self) -> Result<Vec<Booking>, ApiError>;
    async fn booking_by_id(&self, booking_id: &Id) -> Result<Booking, ApiError>;
    async fn booking_by_confirmation_code(&self, code: &str) -> Result<Booking, ApiError>;
    async fn update_booking(&self, booking_id: &Id, update: &BookingUpdate)
        -> Result<String, ApiError>;
    async fn cancel_booking(&self, booking_id: &Id) -> Result<String, ApiError>;
    async fn delete_booking(&self, booking_id: &Id) -> Result<String, ApiError>;
    async fn find_booking(&self, booking_id: &str, email: &str) -> Result<Booking, ApiError>;

    // Users
    async fn profile(&self) -> Result<User, ApiError>;
    async fn update_profile(&self, update: &ProfileUpdate) -> Result<String, ApiError>;
    async fn all_users(&self) -> Result<Vec<User>, ApiError>;
    async fn user_bookings(&self, user_id: &Id) -> Result<Vec<Booking>, ApiError>;
    async fn delete_user(&self, user_id: &Id) -> Result<String, ApiError>;

    fn stats(&self) -> ClientStats;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Auth {
    Public,
    Bearer,
}

/// Splits a reply into the envelope or the matching [`ApiError`].
pub fn decode_envelope<T: DeserializeOwned>(
    status: u16,
    body: &str,
) -> Result<ApiResponse<T>, ApiError> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_str::<ApiResponse<serde_json::Value>>(body)
            .ok()
            .and_then(|envelope| envelope.message)
            .filter(|m| !m.is_empty());
        return Err(status_error(status, message));
    }

    if body.trim().is_empty() {
        return Ok(ApiResponse {
            status_code: status,
            message: None,
            data: None,
            token: None,
            role: None,
            booking_confirmation_code: None,
        });
    }

    let envelope: ApiResponse<T> =
        serde_json::from_str(body).map_err(|e| ApiError::InvalidResponse(e.to_string()))?;

    // Some endpoints answer 200 with the real outcome in the envelope
    if envelope.status_code != 0 && !(200..300).contains(&envelope.status_code) {
        return Err(status_error(
            envelope.status_code,
            envelope.message.filter(|m| !m.is_empty()),
        ));
    }
    Ok(envelope)
}

fn status_error(status_code: u16, message: Option<String>) -> ApiError {
    if status_code == 404 {
        ApiError::NotFound(message)
    } else {
        ApiError::ApiResponseError {
            status_code,
            message,
        }
    }
}

fn require_data<T>(envelope: ApiResponse<T>) -> Result<T, ApiError> {
    envelope
        .data
        .ok_or_else(|| ApiError::InvalidResponse("response carried no data".to_string()))
}

fn room_form(draft: &RoomDraft) -> Result<Form, ApiError> {
    let mut form = Form::new()
        .text("name", draft.name.clone())
        .text("roomType", draft.room_type.clone())
        .text("roomPrice", draft.price.to_string())
        .text("roomDescription", draft.description.clone())
        .text("capacity", draft.capacity.to_string())
        .text("amenities", draft.amenities.join(","));

    if let Some(photo) = &draft.photo {
        let part = Part::bytes(photo.bytes.to_vec())
            .file_name(photo.file_name.clone())
            .mime_str(&photo.content_type)
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
        form = form.part("photo", part);
    }
    Ok(form)
}

/// [`HotelApi`] over HTTP. Authenticated calls read the bearer token from the
/// shared [`SessionContext`] at call time.
pub struct HttpHotelApi {
    config: ClientConfig,
    http: reqwest::Client,
    session: Arc<SessionContext>,
    stats: Mutex<ClientStats>,
}

impl HttpHotelApi {
    pub fn new(config: ClientConfig, session: Arc<SessionContext>) -> Result<Self, ClientError> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ClientError::InitError(e.to_string()))?;

        Ok(Self {
            config,
            http,
            session,
            stats: Mutex::new(ClientStats::default()),
        })
    }

    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn request(&self, method: Method, path: &str, auth: Auth) -> Result<RequestBuilder, ApiError> {
        debug!(%method, path, "preparing request");
        let builder = self.http.request(method, self.url(path));
        match auth {
            Auth::Public => Ok(builder),
            Auth::Bearer => {
                let token = self.session.token().ok_or(ApiError::Unauthenticated)?;
                Ok(builder.bearer_auth(token))
            }
        }
    }

    fn available_rooms_request(
        &self,
        check_in: NaiveDate,
        check_out: NaiveDate,
        room_type: &str,
    ) -> Result<RequestBuilder, ApiError> {
        Ok(self
            .request(
                Method::GET,
                "/rooms/available-rooms-by-date-and-type",
                Auth::Public,
            )?
            .query(&[
                ("checkInDate", format_iso(check_in)),
                ("checkOutDate", format_iso(check_out)),
                ("roomType", room_type.to_string()),
            ]))
    }

    fn book_room_request(
        &self,
        room_id: &Id,
        user_id: &Id,
        submission: &BookingSubmission,
    ) -> Result<RequestBuilder, ApiError> {
        Ok(self
            .request(
                Method::POST,
                &format!("/bookings/book-room/{}/{}", room_id, user_id),
                Auth::Bearer,
            )?
            .json(submission))
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<ApiResponse<T>, ApiError> {
        let started = Instant::now();
        let result = self.roundtrip(builder).await;
        let elapsed = started.elapsed();
        self.stats.lock().record(elapsed, result.is_ok());

        match &result {
            Ok(_) => debug!(elapsed_ms = elapsed.as_millis() as u64, "request succeeded"),
            Err(e) => debug!(error = %e, "request failed"),
        }
        result
    }

    async fn roundtrip<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<ApiResponse<T>, ApiError> {
        let response = builder.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        decode_envelope(status, &body)
    }

    fn transport_error(&self, e: reqwest::Error) -> ApiError {
        if e.is_timeout() {
            ApiError::Timeout(self.config.timeout_ms)
        } else {
            ApiError::NetworkError(e.to_string())
        }
    }

    async fn fetch_list<T: DeserializeOwned>(
        &self,
        path: &str,
        auth: Auth,
    ) -> Result<Vec<T>, ApiError> {
        let envelope = self
            .execute::<Vec<T>>(self.request(Method::GET, path, auth)?)
            .await?;
        Ok(envelope.data.unwrap_or_default())
    }

    async fn fetch_one<T: DeserializeOwned>(&self, path: &str, auth: Auth) -> Result<T, ApiError> {
        let envelope = self.execute::<T>(self.request(Method::GET, path, auth)?).await?;
        require_data(envelope)
    }

    async fn message_of(&self, builder: RequestBuilder) -> Result<String, ApiError> {
        let envelope = self.execute::<serde_json::Value>(builder).await?;
        Ok(envelope.message.unwrap_or_default())
    }
}

#[async_trait]
impl HotelApi for HttpHotelApi {
    async fn register(&self, registration: &Registration) -> Result<String, ApiError> {
        let builder = self
            .request(Method::POST, "/auth/register", Auth::Public)?
            .json(registration);
        self.message_of(builder).await
    }

    async fn login(&self, credentials: &Credentials) -> Result<Session, ApiError> {
        let builder = self
            .request(Method::POST, "/auth/login", Auth::Public)?
            .json(credentials);
        let envelope = self.execute::<serde_json::Value>(builder).await?;
        let token = envelope
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::InvalidResponse("login reply carried no token".to_string()))?;

        self.session.establish(token.clone(), envelope.role);
        Ok(Session {
            token,
            role: envelope.role,
        })
    }

    fn logout(&self) {
        self.session.clear();
    }

    async fn room_types(&self) -> Result<Vec<String>, ApiError> {
        self.fetch_list("/rooms/types", Auth::Public).await
    }

    async fn all_rooms(&self) -> Result<Vec<Room>, ApiError> {
        self.fetch_list("/rooms/all", Auth::Public).await
    }

    async fn all_available_rooms(&self) -> Result<Vec<Room>, ApiError> {
        self.fetch_list("/rooms/all-available-rooms", Auth::Public)
            .await
    }

    async fn room_by_id(&self, room_id: &Id) -> Result<Room, ApiError> {
        self.fetch_one(&format!("/rooms/room-by-id/{}", room_id), Auth::Public)
            .await
    }

    async fn available_rooms(
        &self,
        check_in: NaiveDate,
        check_out: NaiveDate,
        room_type: &str,
    ) -> Result<Vec<Room>, ApiError> {
        let builder = self.available_rooms_request(check_in, check_out, room_type)?;
        let envelope = self.execute::<Vec<Room>>(builder).await?;
        Ok(envelope.data.unwrap_or_default())
    }

    async fn add_room(&self, draft: &RoomDraft) -> Result<String, ApiError> {
        let builder = self
            .request(Method::POST, "/rooms/add", Auth::Bearer)?
            .multipart(room_form(draft)?);
        self.message_of(builder).await
    }

    async fn update_room(&self, room_id: &Id, draft: &RoomDraft) -> Result<String, ApiError> {
        let builder = self.request(
            Method::PUT,
            &format!("/rooms/update/{}", room_id),
            Auth::Bearer,
        )?;
        // A new photo forces multipart; plain edits go as JSON
        let builder = if draft.photo.is_some() {
            builder.multipart(room_form(draft)?)
        } else {
            builder.json(draft)
        };
        self.message_of(builder).await
    }

    async fn delete_room(&self, room_id: &Id) -> Result<String, ApiError> {
        let builder = self.request(
            Method::DELETE,
            &format!("/rooms/delete/{}", room_id),
            Auth::Bearer,
        )?;
        self.message_of(builder).await
    }

    async fn book_room(
        &self,
        room_id: &Id,
        user_id: &Id,
        submission: &BookingSubmission,
    ) -> Result<String, ApiError> {
        let builder = self.book_room_request(room_id, user_id, submission)?;
        let envelope = self.execute::<BookingReceipt>(builder).await?;

        let code = envelope
            .booking_confirmation_code
            .or_else(|| envelope.data.and_then(|d| d.booking_confirmation_code))
            .unwrap_or_default();
        if code.is_empty() {
            warn!(%room_id, "booking accepted without a confirmation code");
        }
        Ok(code)
    }

    async fn all_bookings(&self) -> Result<Vec<Booking>, ApiError> {
        self.fetch_list("/bookings/all", Auth::Bearer).await
    }

    async fn booking_by_id(&self, booking_id: &Id) -> Result<Booking, ApiError> {
        self.fetch_one(&format!("/bookings/get-by-id/{}", booking_id), Auth::Bearer)
            .await
    }

    async fn booking_by_confirmation_code(&self, code: &str) -> Result<Booking, ApiError> {
        self.fetch_one(
            &format!("/bookings/get-by-confirmation-code/{}", code),
            Auth::Public,
        )
        .await
    }

    async fn update_booking(
        &self,
        booking_id: &Id,
        update: &BookingUpdate,
    ) -> Result<String, ApiError> {
        let builder = self
            .request(
                Method::PUT,
                &format!("/bookings/update/{}", booking_id),
                Auth::Bearer,
            )?
            .json(update);
        self.message_of(builder).await
    }

    async fn cancel_booking(&self, booking_id: &Id) -> Result<String, ApiError> {
        let builder = self.request(
            Method::DELETE,
            &format!("/bookings/cancel/{}", booking_id),
            Auth::Bearer,
        )?;
        self.message_of(builder).await
    }

    async fn delete_booking(&self, booking_id: &Id) -> Result<String, ApiError> {
        let builder = self.request(
            Method::DELETE,
            &format!("/bookings/delete/{}", booking_id),
            Auth::Bearer,
        )?;
        self.message_of(builder).await
    }

    async fn find_booking(&self, booking_id: &str, email: &str) -> Result<Booking, ApiError> {
        let builder = self
            .request(Method::GET, "/bookings/find", Auth::Public)?
            .query(&[("bookingId", booking_id), ("email", email)]);
        let envelope = self.execute::<Booking>(builder).await?;
        require_data(envelope)
    }

    async fn profile(&self) -> Result<User, ApiError> {
        self.fetch_one("/users/get-logged-in-profile-info", Auth::Bearer)
            .await
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<String, ApiError> {
        let builder = self
            .request(Method::PUT, "/users/update-profile", Auth::Bearer)?
            .json(update);
        self.message_of(builder).await
    }

    async fn all_users(&self) -> Result<Vec<User>, ApiError> {
        self.fetch_list("/users/all", Auth::Bearer).await
    }

    async fn user_bookings(&self, user_id: &Id) -> Result<Vec<Booking>, ApiError> {
        self.fetch_list(
            &format!("/users/get-user-bookings/{}", user_id),
            Auth::Bearer,
        )
        .await
    }

    async fn delete_user(&self, user_id: &Id) -> Result<String, ApiError> {
        let builder = self.request(
            Method::DELETE,
            &format!("/users/delete/{}", user_id),
            Auth::Bearer,
        )?;
        self.message_of(builder).await
    }

    fn stats(&self) -> ClientStats {
        self.stats.lock().clone()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use reqwest::header::AUTHORIZATION;
    use test_case::test_case;
    use tokio_test::{assert_err, assert_ok};

    fn client_with(session: SessionContext) -> HttpHotelApi {
        HttpHotelApi::new(ClientConfig::default(), Arc::new(session)).unwrap()
    }

    #[test]
    fn test_decode_success_envelope() {
        let body = r#"{"statusCode":200,"message":"successful","data":["single","deluxe"]}"#;
        let envelope = assert_ok!(decode_envelope::<Vec<String>>(200, body));
        assert_eq!(envelope.data.unwrap(), vec!["single", "deluxe"]);
        assert_eq!(envelope.message.as_deref(), Some("successful"));
    }

    #[test]
    fn test_decode_login_envelope() {
        let body = r#"{"statusCode":200,"message":"ok","token":"jwt","role":"ADMIN"}"#;
        let envelope = assert_ok!(decode_envelope::<serde_json::Value>(200, body));
        assert_eq!(envelope.token.as_deref(), Some("jwt"));
        assert_eq!(envelope.role, Some(Role::Admin));
    }

    #[test]
    fn test_decode_envelope_without_data() {
        let envelope = assert_ok!(decode_envelope::<Vec<Room>>(
            200,
            r#"{"statusCode":200,"message":"successful"}"#
        ));
        assert!(envelope.data.is_none());
    }

    #[test]
    fn test_decode_lists_with_null_fields() {
        let body = r#"{"statusCode":200,"data":[
            {"id":1,"roomType":"deluxe","roomPrice":200.0,"roomDescription":null},
            {"id":2,"roomType":"standard","roomPrice":90.0,"roomDescription":"Garden view"}
        ]}"#;
        let rooms = assert_ok!(decode_envelope::<Vec<Room>>(200, body)).data.unwrap();
        assert_eq!(rooms.len(), 2);
        assert_eq!(rooms[0].description, "");

        let body = r#"{"statusCode":200,"data":[
            {"id":4,"checkInDate":"2024-06-01","checkOutDate":"2024-06-03","userName":null,"status":"CONFIRMED"}
        ]}"#;
        let bookings = assert_ok!(decode_envelope::<Vec<Booking>>(200, body)).data.unwrap();
        assert_eq!(bookings[0].user_name, "");
    }

    #[test]
    fn test_decode_empty_success_body() {
        let envelope = assert_ok!(decode_envelope::<Vec<Room>>(204, ""));
        assert!(envelope.data.is_none());
    }

    #[test_case(500, r#"{"statusCode":500,"message":"Room is not available"}"#, Some("Room is not available"); "#1 server message surfaces")]
    #[test_case(502, "<html>Bad Gateway</html>", None; "#2 unparseable body falls back")]
    #[test_case(400, r#"{"statusCode":400,"message":""}"#, None; "#3 empty message falls back")]
    fn test_decode_error_status(status: u16, body: &str, expected: Option<&str>) {
        let err = assert_err!(decode_envelope::<serde_json::Value>(status, body));
        match &err {
            ApiError::ApiResponseError {
                status_code,
                message,
            } => {
                assert_eq!(*status_code, status);
                assert_eq!(message.as_deref(), expected);
            }
            other => panic!("Expected ApiResponseError, got {:?}", other),
        }
        assert_eq!(
            err.user_message(),
            expected.unwrap_or(UNKNOWN_ERROR_MESSAGE)
        );
    }

    #[test]
    fn test_decode_not_found() {
        let err = assert_err!(decode_envelope::<Room>(
            404,
            r#"{"statusCode":404,"message":"Room Not Found"}"#
        ));
        assert!(err.is_not_found());
        assert_eq!(err.user_message(), "Room Not Found");
    }

    #[test]
    fn test_decode_envelope_status_overrides_transport_status() {
        let body = r#"{"statusCode":409,"message":"Booking overlaps"}"#;
        let err = assert_err!(decode_envelope::<BookingReceipt>(200, body));
        assert_eq!(err.server_message(), Some("Booking overlaps"));
    }

    #[test]
    fn test_decode_malformed_success_body() {
        let err = assert_err!(decode_envelope::<Vec<Room>>(200, "not json"));
        assert!(matches!(err, ApiError::InvalidResponse(_)));
    }

    #[test]
    fn test_network_error_uses_generic_message() {
        let err = ApiError::NetworkError("connection refused".to_string());
        assert_eq!(err.user_message(), UNKNOWN_ERROR_MESSAGE);
    }

    #[test]
    fn test_url_joining() {
        let config = ClientConfig {
            base_url: "https://hotel.example.com/api/".to_string(),
            ..ClientConfig::default()
        };
        let client = HttpHotelApi::new(config, Arc::new(SessionContext::new())).unwrap();
        assert_eq!(
            client.url("/rooms/all"),
            "https://hotel.example.com/api/rooms/all"
        );
    }

    #[test]
    fn test_config_from_lookup() {
        let config = ClientConfig::from_lookup(|key| match key {
            "HOTEL_API_BASE_URL" => Some("https://booking.example.org".to_string()),
            "HOTEL_API_TIMEOUT_MS" => Some("2500".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.base_url, "https://booking.example.org");
        assert_eq!(config.timeout_ms, 2500);

        let defaults = ClientConfig::from_lookup(|_| None).unwrap();
        assert_eq!(defaults.base_url, "http://localhost:4040");
    }

    #[test_case("HOTEL_API_TIMEOUT_MS", "soon"; "#1 non numeric timeout")]
    #[test_case("HOTEL_API_TIMEOUT_MS", "0"; "#2 zero timeout")]
    #[test_case("HOTEL_API_BASE_URL", "localhost:4040"; "#3 missing scheme")]
    fn test_config_rejects_bad_values(var: &'static str, value: &'static str) {
        let result = ClientConfig::from_lookup(|key| (key == var).then(|| value.to_string()));
        assert!(matches!(result, Err(ClientError::ConfigError(_))));
    }

    #[tokio::test]
    async fn test_authenticated_call_without_session_skips_network() {
        let client = client_with(SessionContext::new());
        let err = assert_err!(client.profile().await);
        assert!(matches!(err, ApiError::Unauthenticated));
        assert_eq!(client.stats().requests_sent, 0);
    }

    #[test]
    fn test_availability_request_query() {
        let client = client_with(SessionContext::new());
        let request = client
            .available_rooms_request(
                NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
                "deluxe",
            )
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(request.method(), &Method::GET);
        assert_eq!(request.url().path(), "/rooms/available-rooms-by-date-and-type");
        assert_eq!(
            request.url().query(),
            Some("checkInDate=2024-06-01&checkOutDate=2024-06-03&roomType=deluxe")
        );
        assert!(request.headers().get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_book_room_request_carries_bearer_and_body() {
        let session = SessionContext::new();
        session.establish("jwt-123", Some(Role::User));
        let client = client_with(session);
        let submission = BookingSubmission {
            check_in_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            check_out_date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            num_of_adults: 2,
            num_of_children: 1,
        };

        let request = client
            .book_room_request(&Id::from(7), &Id::from(3), &submission)
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(request.method(), &Method::POST);
        assert_eq!(
            request.url().as_str(),
            "http://localhost:4040/bookings/book-room/7/3"
        );
        assert_eq!(
            request.headers().get(AUTHORIZATION).unwrap(),
            "Bearer jwt-123"
        );
        let body: serde_json::Value =
            serde_json::from_slice(request.body().unwrap().as_bytes().unwrap()).unwrap();
        assert_eq!(body["checkInDate"], "2024-06-01");
        assert_eq!(body["numOfAdults"], 2);
    }

    #[test]
    fn test_book_room_request_requires_session() {
        let client = client_with(SessionContext::new());
        let submission = BookingSubmission {
            check_in_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            check_out_date: NaiveDate::from_ymd_opt(2024, 6, 2).unwrap(),
            num_of_adults: 1,
            num_of_children: 0,
        };
        assert!(matches!(
            client.book_room_request(&Id::from(7), &Id::from(3), &submission),
            Err(ApiError::Unauthenticated)
        ));
    }

    #[test]
    fn test_logout_clears_shared_session() {
        let session = SessionContext::new();
        session.establish("tok", Some(Role::User));
        let client = client_with(session);
        assert!(client.session().is_authenticated());
        client.logout();
        assert!(!client.session().is_authenticated());
    }

    #[test]
    fn test_stats_running_average() {
        let mut stats = ClientStats::default();
        stats.record(Duration::from_millis(100), true);
        stats.record(Duration::from_millis(300), false);
        assert_eq!(stats.requests_sent, 2);
        assert_eq!(stats.requests_succeeded, 1);
        assert_eq!(stats.requests_failed, 1);
        assert!((stats.average_response_time_ms - 200.0).abs() < 1e-6);
        assert!((stats.max_response_time_ms - 300.0).abs() < 1e-6);
    }

    #[test]
    fn test_room_form_rejects_bad_mime() {
        let draft = RoomDraft {
            photo: Some(crate::models::RoomPhoto {
                file_name: "room.png".to_string(),
                content_type: "not a mime".to_string(),
                bytes: bytes::Bytes::from_static(b"\x89PNG"),
            }),
            ..RoomDraft::default()
        };
        assert!(matches!(room_form(&draft), Err(ApiError::InvalidRequest(_))));
    }
}
