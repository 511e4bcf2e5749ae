use reqwest::{header, multipart, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::api::dto::{
    AuthResponse, CreateBookingRequest, HealthResponse, IdentityTokenRequest, LoginRequest,
    RegisterRequest, StatusUpdateRequest, Upload,
};
use crate::error::{ApiError, ApiResult};
use crate::models::{
    Booking, BookingStatus, BookingType, DashboardSnapshot, Event, NewEvent, SmtpSettings, User,
    UserRole,
};

/// Thin typed wrapper over the booking backend.
///
/// The bearer credential is owned by the session manager; it is the only
/// caller of [`ApiClient::set_bearer`]. No timeout and no retry: a hung
/// backend leaves the caller waiting.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    bearer: Option<String>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base", &self.base.as_str())
            .field("bearer", &self.bearer.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl ApiClient {
    /// `base_url` already includes the API prefix, e.g. `http://host:8001/api`.
    pub fn new(base_url: &str) -> ApiResult<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| ApiError::Invalid(format!("invalid backend url `{base_url}`: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::Invalid(format!("backend url `{base_url}` cannot be a base")));
        }
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            base,
            bearer: None,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }

    pub fn has_bearer(&self) -> bool {
        self.bearer.is_some()
    }

    pub(crate) fn set_bearer(&mut self, token: Option<String>) {
        self.bearer = token.filter(|t| !t.is_empty());
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let url = self.endpoint(segments);
        debug!(%method, %url, authorized = self.bearer.is_some(), "api request");
        let builder = self.http.request(method, url);
        match &self.bearer {
            Some(token) => builder.header(header::AUTHORIZATION, format!("Bearer {token}")),
            None => builder,
        }
    }

    async fn send_raw(&self, builder: RequestBuilder) -> ApiResult<bytes::Bytes> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            let err = ApiError::from_status(status, &body);
            warn!(%status, error = %err, "api request failed");
            return Err(err);
        }
        Ok(body)
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ApiResult<T> {
        let body = self.send_raw(builder).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
    ) -> ApiResult<T> {
        self.send(self.request(method, segments).json(body)).await
    }

    fn file_part(upload: &Upload) -> ApiResult<multipart::Part> {
        Ok(multipart::Part::bytes(upload.body.to_vec())
            .file_name(upload.file_name.clone())
            .mime_str(&upload.content_type)?)
    }

    // --- system ---

    pub async fn health(&self) -> ApiResult<HealthResponse> {
        self.send(self.request(Method::GET, &["health"])).await
    }

    // --- auth ---

    pub async fn current_user(&self) -> ApiResult<User> {
        self.send(self.request(Method::GET, &["users", "me"])).await
    }

    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<AuthResponse> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.send_json(Method::POST, &["auth", "login"], &body).await
    }

    #[instrument(skip(self, password))]
    pub async fn register(&self, name: &str, email: &str, password: &str) -> ApiResult<AuthResponse> {
        let body = RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        self.send_json(Method::POST, &["auth", "register"], &body).await
    }

    #[instrument(skip_all)]
    pub async fn exchange_identity_token(&self, token: &str) -> ApiResult<AuthResponse> {
        let body = IdentityTokenRequest {
            token: token.to_string(),
        };
        self.send_json(Method::POST, &["auth", "google"], &body).await
    }

    // --- events ---

    pub async fn list_events(&self) -> ApiResult<Vec<Event>> {
        self.send(self.request(Method::GET, &["events"])).await
    }

    pub async fn get_event(&self, id: &str) -> ApiResult<Event> {
        self.send(self.request(Method::GET, &["events", id])).await
    }

    #[instrument(skip(self, event), fields(title = %event.title))]
    pub async fn create_event(&self, event: &NewEvent) -> ApiResult<Event> {
        self.send_json(Method::POST, &["events"], event).await
    }

    #[instrument(skip(self, file), fields(file = %file.file_name))]
    pub async fn upload_event_qr(&self, event_id: &str, file: &Upload) -> ApiResult<()> {
        let form = multipart::Form::new().part("file", Self::file_part(file)?);
        let builder = self
            .request(Method::POST, &["events", event_id, "qr-code"])
            .multipart(form);
        self.send_raw(builder).await.map(|_| ())
    }

    // --- bookings ---

    #[instrument(skip(self))]
    pub async fn create_booking(&self, event_id: &str, booking_type: BookingType) -> ApiResult<Booking> {
        let body = CreateBookingRequest {
            event_id: event_id.to_string(),
            booking_type,
        };
        self.send_json(Method::POST, &["bookings"], &body).await
    }

    #[instrument(skip(self, file), fields(file = %file.file_name))]
    pub async fn upload_payment_proof(&self, booking_id: &str, file: &Upload, utr_number: &str) -> ApiResult<()> {
        let form = multipart::Form::new()
            .part("file", Self::file_part(file)?)
            .text("utr_number", utr_number.to_string());
        let builder = self
            .request(Method::POST, &["bookings", booking_id, "payment-proof"])
            .multipart(form);
        self.send_raw(builder).await.map(|_| ())
    }

    pub async fn list_bookings(&self) -> ApiResult<Vec<Booking>> {
        self.send(self.request(Method::GET, &["bookings"])).await
    }

    #[instrument(skip(self))]
    pub async fn update_booking_status(
        &self,
        booking_id: &str,
        status: BookingStatus,
        admin_notes: Option<String>,
    ) -> ApiResult<()> {
        let body = StatusUpdateRequest { status, admin_notes };
        let builder = self
            .request(Method::PUT, &["bookings", booking_id, "status"])
            .json(&body);
        self.send_raw(builder).await.map(|_| ())
    }

    // --- users ---

    pub async fn list_users(&self) -> ApiResult<Vec<User>> {
        self.send(self.request(Method::GET, &["users"])).await
    }

    #[instrument(skip(self))]
    pub async fn update_user_role(&self, user_id: &str, role: UserRole) -> ApiResult<()> {
        let builder = self
            .request(Method::PUT, &["users", user_id, "role"])
            .query(&[("role", role.as_str())]);
        self.send_raw(builder).await.map(|_| ())
    }

    // --- admin ---

    pub async fn admin_dashboard(&self) -> ApiResult<DashboardSnapshot> {
        self.send(self.request(Method::GET, &["admin", "dashboard"])).await
    }

    pub async fn smtp_settings(&self) -> ApiResult<SmtpSettings> {
        self.send(self.request(Method::GET, &["admin", "smtp-settings"])).await
    }

    #[instrument(skip_all, fields(host = %settings.host))]
    pub async fn update_smtp_settings(&self, settings: &SmtpSettings) -> ApiResult<()> {
        let builder = self
            .request(Method::POST, &["admin", "smtp-settings"])
            .json(settings);
        self.send_raw(builder).await.map(|_| ())
    }
}
