//! In-process stand-in for the booking backend, served by axum on an
//! ephemeral port. It keeps everything in memory and records each request
//! with its `Authorization` header so tests can assert on traffic.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::{Multipart, Path, Query, Request, State};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use base64::Engine;
use serde::Deserialize;
use serde_json::{json, Value};
use time::OffsetDateTime;
use tower_http::trace::TraceLayer;

use vibrant_yoga::models::{
    Booking, BookingStatus, BookingType, DashboardSnapshot, Event, NewEvent, SmtpSettings, User,
    UserRole,
};
use vibrant_yoga::session::{MemoryTokenStore, TokenStore};
use vibrant_yoga::{ApiClient, SessionManager};

pub const ADMIN_TOKEN: &str = "admin-token";
pub const MEMBER_TOKEN: &str = "member-token";
pub const GOOGLE_TOKEN: &str = "google-id-token";
pub const MEMBER_PASSWORD: &str = "namaste123";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub authorization: Option<String>,
}

#[derive(Default)]
pub struct MockState {
    pub users: Vec<User>,
    pub passwords: HashMap<String, String>,
    /// bearer token -> user id
    pub tokens: HashMap<String, String>,
    pub events: Vec<Event>,
    pub bookings: Vec<Booking>,
    pub smtp: Option<SmtpSettings>,
    pub requests: Vec<Recorded>,
    /// `"METHOD /api/path"` routes answering 500 regardless of input
    pub failing: HashSet<String>,
}

type Shared = Arc<Mutex<MockState>>;
type Reject = (StatusCode, Json<Value>);

fn reject(status: StatusCode, detail: &str) -> Reject {
    (status, Json(json!({ "detail": detail })))
}

fn lock(state: &Shared) -> MutexGuard<'_, MockState> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn user(id: &str, name: &str, email: &str, role: UserRole) -> User {
    User {
        id: id.into(),
        name: name.into(),
        email: email.into(),
        role,
        status: "active".into(),
        created_at: Some(OffsetDateTime::now_utc()),
    }
}

pub fn sample_event(id: &str, title: &str) -> Event {
    Event {
        id: id.into(),
        title: title.into(),
        description: "Gentle vinyasa to start the day".into(),
        date: "2024-05-01".into(),
        time: "07:00".into(),
        price: 500.0,
        delivery_mode: Default::default(),
        capacity: 20,
        session_link: Some("https://meet.example/flow".into()),
        qr_code_base64: None,
        upi_id: Some("studio@upi".into()),
        is_online: true,
        created_at: Some(OffsetDateTime::now_utc()),
    }
}

pub fn sample_booking(id: &str, user_id: &str, event_id: &str, status: BookingStatus) -> Booking {
    Booking {
        id: id.into(),
        user_id: user_id.into(),
        event_id: event_id.into(),
        booking_type: BookingType::Single,
        status,
        utr_number: None,
        payment_proof_base64: None,
        admin_notes: None,
        created_at: OffsetDateTime::now_utc(),
        approved_at: None,
    }
}

impl MockState {
    /// One admin, one member, no events.
    pub fn seeded() -> Self {
        let mut state = MockState::default();
        state.users.push(user(
            "admin_user_id",
            "Admin User",
            "admin@vibrantyoga.com",
            UserRole::Admin,
        ));
        state.users.push(user("member-1", "Asha", "asha@example.com", UserRole::User));
        state
            .passwords
            .insert("asha@example.com".into(), MEMBER_PASSWORD.into());
        state.tokens.insert(ADMIN_TOKEN.into(), "admin_user_id".into());
        state.tokens.insert(MEMBER_TOKEN.into(), "member-1".into());
        state
    }

    fn caller(&self, headers: &HeaderMap) -> Result<User, Reject> {
        let token = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| reject(StatusCode::FORBIDDEN, "Not authenticated"))?;
        self.tokens
            .get(token)
            .and_then(|id| self.users.iter().find(|u| &u.id == id))
            .cloned()
            .ok_or_else(|| reject(StatusCode::UNAUTHORIZED, "Invalid token"))
    }

    fn admin(&self, headers: &HeaderMap) -> Result<User, Reject> {
        let user = self.caller(headers)?;
        if user.role != UserRole::Admin {
            return Err(reject(StatusCode::FORBIDDEN, "Admin access required"));
        }
        Ok(user)
    }

    fn issue(&mut self, user: &User) -> Value {
        let token = format!("token-{}", new_id());
        self.tokens.insert(token.clone(), user.id.clone());
        json!({ "access_token": token, "token_type": "bearer", "user": user })
    }
}

pub struct MockBackend {
    pub addr: SocketAddr,
    pub state: Shared,
}

impl MockBackend {
    pub async fn start(state: MockState) -> Self {
        let state = Arc::new(Mutex::new(state));
        let app = router(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock backend");
        });
        Self { addr, state }
    }

    pub fn api_base(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    pub fn client(&self) -> ApiClient {
        ApiClient::new(&self.api_base()).expect("client")
    }

    /// A session whose store already holds `token`; not yet restored.
    pub fn session_with(&self, token: Option<&str>) -> (SessionManager, Arc<MemoryTokenStore>) {
        let store = Arc::new(match token {
            Some(t) => MemoryTokenStore::with_token(t),
            None => MemoryTokenStore::default(),
        });
        let dyn_store: Arc<dyn TokenStore> = store.clone();
        (SessionManager::new(self.client(), dyn_store), store)
    }

    /// A restored session signed in with `token`.
    pub async fn signed_in(&self, token: &str) -> SessionManager {
        let (mut session, _) = self.session_with(Some(token));
        session.restore().await;
        assert!(session.is_authenticated(), "token {token} should restore");
        session
    }

    pub fn state(&self) -> MutexGuard<'_, MockState> {
        lock(&self.state)
    }

    pub fn fail(&self, route: &str) {
        self.state().failing.insert(route.to_string());
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state().requests.clone()
    }

    pub fn clear_requests(&self) {
        self.state().requests.clear();
    }

    /// Requests whose path matches exactly, with the given method.
    pub fn count(&self, method: Method, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }
}

fn router(state: Shared) -> Router {
    let api = Router::new()
        .route("/health", get(|| async { Json(json!({ "status": "healthy" })) }))
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/google", post(google))
        .route("/users/me", get(me))
        .route("/users", get(list_users))
        .route("/users/:id/role", put(update_role))
        .route("/events", get(list_events).post(create_event))
        .route("/events/:id", get(get_event))
        .route("/events/:id/qr-code", post(upload_qr))
        .route("/bookings", get(list_bookings).post(create_booking))
        .route("/bookings/:id/payment-proof", post(upload_proof))
        .route("/bookings/:id/status", put(update_status))
        .route("/admin/dashboard", get(dashboard))
        .route("/admin/smtp-settings", get(get_smtp).post(set_smtp));

    Router::new()
        .nest("/api", api)
        .layer(middleware::from_fn_with_state(state.clone(), record))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn record(State(state): State<Shared>, req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let authorization = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let forced = {
        let mut s = lock(&state);
        s.requests.push(Recorded {
            method: method.clone(),
            path: path.clone(),
            authorization,
        });
        s.failing.contains(&format!("{method} {path}"))
    };
    if forced {
        return axum::response::IntoResponse::into_response((
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal Server Error",
        ));
    }
    next.run(req).await
}

#[derive(Deserialize)]
struct Credentials {
    email: String,
    password: String,
}

async fn login(State(state): State<Shared>, Json(body): Json<Credentials>) -> Result<Json<Value>, Reject> {
    let mut s = lock(&state);
    let ok = s.passwords.get(&body.email).is_some_and(|p| *p == body.password);
    let found = s.users.iter().find(|u| u.email == body.email).cloned();
    match found {
        Some(user) if ok => Ok(Json(s.issue(&user))),
        _ => Err(reject(StatusCode::UNAUTHORIZED, "Invalid email or password")),
    }
}

#[derive(Deserialize)]
struct Registration {
    name: String,
    email: String,
    password: String,
}

async fn register(State(state): State<Shared>, Json(body): Json<Registration>) -> Result<Json<Value>, Reject> {
    let mut s = lock(&state);
    if s.users.iter().any(|u| u.email == body.email) {
        return Err(reject(StatusCode::BAD_REQUEST, "Email already registered"));
    }
    let created = user(&new_id(), &body.name, &body.email, UserRole::User);
    s.users.push(created.clone());
    s.passwords.insert(body.email, body.password);
    Ok(Json(s.issue(&created)))
}

#[derive(Deserialize)]
struct ProviderToken {
    token: String,
}

async fn google(State(state): State<Shared>, Json(body): Json<ProviderToken>) -> Result<Json<Value>, Reject> {
    let mut s = lock(&state);
    if body.token != GOOGLE_TOKEN {
        return Err(reject(StatusCode::UNAUTHORIZED, "Invalid Google token"));
    }
    let existing = s.users.iter().find(|u| u.email == "google@example.com").cloned();
    let account = match existing {
        Some(u) => u,
        None => {
            let u = user(&new_id(), "Google Yogi", "google@example.com", UserRole::User);
            s.users.push(u.clone());
            u
        }
    };
    Ok(Json(s.issue(&account)))
}

async fn me(State(state): State<Shared>, headers: HeaderMap) -> Result<Json<User>, Reject> {
    lock(&state).caller(&headers).map(Json)
}

async fn list_users(State(state): State<Shared>, headers: HeaderMap) -> Result<Json<Vec<User>>, Reject> {
    let s = lock(&state);
    s.admin(&headers)?;
    Ok(Json(s.users.clone()))
}

#[derive(Deserialize)]
struct RoleQuery {
    role: UserRole,
}

async fn update_role(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Query(q): Query<RoleQuery>,
) -> Result<Json<Value>, Reject> {
    let mut s = lock(&state);
    s.admin(&headers)?;
    let target = s
        .users
        .iter_mut()
        .find(|u| u.id == id)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "User not found"))?;
    target.role = q.role;
    Ok(Json(json!({ "message": "User role updated successfully" })))
}

async fn list_events(State(state): State<Shared>) -> Json<Vec<Event>> {
    Json(lock(&state).events.clone())
}

async fn get_event(State(state): State<Shared>, Path(id): Path<String>) -> Result<Json<Event>, Reject> {
    lock(&state)
        .events
        .iter()
        .find(|e| e.id == id)
        .cloned()
        .map(Json)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Event not found"))
}

async fn create_event(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<NewEvent>,
) -> Result<Json<Event>, Reject> {
    let mut s = lock(&state);
    s.admin(&headers)?;
    let event = Event {
        id: new_id(),
        title: body.title,
        description: body.description,
        date: body.date,
        time: body.time,
        price: body.price,
        delivery_mode: body.delivery_mode,
        capacity: body.capacity,
        session_link: body.session_link,
        qr_code_base64: None,
        upi_id: body.upi_id,
        is_online: body.is_online,
        created_at: Some(OffsetDateTime::now_utc()),
    };
    s.events.push(event.clone());
    Ok(Json(event))
}

/// Collects text fields and the `file` part of a multipart body.
async fn read_form(mut form: Multipart) -> Result<(HashMap<String, String>, Option<Vec<u8>>), Reject> {
    let mut fields = HashMap::new();
    let mut file = None;
    while let Some(field) = form
        .next_field()
        .await
        .map_err(|e| reject(StatusCode::BAD_REQUEST, &e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| reject(StatusCode::BAD_REQUEST, &e.to_string()))?;
            file = Some(bytes.to_vec());
        } else {
            let text = field
                .text()
                .await
                .map_err(|e| reject(StatusCode::BAD_REQUEST, &e.to_string()))?;
            fields.insert(name, text);
        }
    }
    Ok((fields, file))
}

fn data_url(bytes: &[u8]) -> String {
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

async fn upload_qr(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    form: Multipart,
) -> Result<Json<Value>, Reject> {
    lock(&state).admin(&headers)?;
    let (_, file) = read_form(form).await?;
    let file = file.ok_or_else(|| reject(StatusCode::UNPROCESSABLE_ENTITY, "file is required"))?;
    let mut s = lock(&state);
    let event = s
        .events
        .iter_mut()
        .find(|e| e.id == id)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Event not found"))?;
    event.qr_code_base64 = Some(data_url(&file));
    Ok(Json(json!({ "message": "QR code uploaded successfully" })))
}

#[derive(Deserialize)]
struct NewBooking {
    event_id: String,
    booking_type: BookingType,
}

async fn create_booking(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<NewBooking>,
) -> Result<Json<Booking>, Reject> {
    let mut s = lock(&state);
    let caller = s.caller(&headers)?;
    if !s.events.iter().any(|e| e.id == body.event_id) {
        return Err(reject(StatusCode::NOT_FOUND, "Event not found"));
    }
    let mut booking = sample_booking(&new_id(), &caller.id, &body.event_id, BookingStatus::Pending);
    booking.booking_type = body.booking_type;
    s.bookings.push(booking.clone());
    Ok(Json(booking))
}

async fn upload_proof(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    form: Multipart,
) -> Result<Json<Value>, Reject> {
    let caller = lock(&state).caller(&headers)?;
    let (fields, file) = read_form(form).await?;
    let (Some(file), Some(utr)) = (file, fields.get("utr_number")) else {
        return Err(reject(StatusCode::UNPROCESSABLE_ENTITY, "file and utr_number are required"));
    };
    let mut s = lock(&state);
    let booking = s
        .bookings
        .iter_mut()
        .find(|b| b.id == id && b.user_id == caller.id)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Booking not found"))?;
    booking.payment_proof_base64 = Some(data_url(&file));
    booking.utr_number = Some(utr.clone());
    Ok(Json(json!({ "message": "Payment proof uploaded successfully" })))
}

async fn list_bookings(State(state): State<Shared>, headers: HeaderMap) -> Result<Json<Vec<Booking>>, Reject> {
    let s = lock(&state);
    let caller = s.caller(&headers)?;
    let visible = s
        .bookings
        .iter()
        .filter(|b| caller.is_admin() || b.user_id == caller.id)
        .cloned()
        .collect();
    Ok(Json(visible))
}

#[derive(Deserialize)]
struct StatusBody {
    status: BookingStatus,
    admin_notes: Option<String>,
}

async fn update_status(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<StatusBody>,
) -> Result<Json<Value>, Reject> {
    let mut s = lock(&state);
    s.admin(&headers)?;
    let booking = s
        .bookings
        .iter_mut()
        .find(|b| b.id == id)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Booking not found"))?;
    booking.status = body.status;
    booking.admin_notes = body.admin_notes;
    if body.status == BookingStatus::Approved {
        booking.approved_at = Some(OffsetDateTime::now_utc());
    }
    Ok(Json(json!({ "message": "Booking status updated successfully" })))
}

async fn dashboard(State(state): State<Shared>, headers: HeaderMap) -> Result<Json<DashboardSnapshot>, Reject> {
    let s = lock(&state);
    s.admin(&headers)?;
    let count = |status: BookingStatus| s.bookings.iter().filter(|b| b.status == status).count() as u64;
    let mut recent = s.bookings.clone();
    recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    recent.truncate(10);
    Ok(Json(DashboardSnapshot {
        total_users: s.users.len() as u64,
        total_events: s.events.len() as u64,
        total_bookings: s.bookings.len() as u64,
        pending_bookings: count(BookingStatus::Pending),
        approved_bookings: Some(count(BookingStatus::Approved)),
        recent_bookings: recent,
    }))
}

async fn get_smtp(State(state): State<Shared>, headers: HeaderMap) -> Result<Json<SmtpSettings>, Reject> {
    let s = lock(&state);
    s.admin(&headers)?;
    Ok(Json(s.smtp.clone().unwrap_or_default()))
}

async fn set_smtp(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<SmtpSettings>,
) -> Result<Json<Value>, Reject> {
    let mut s = lock(&state);
    s.admin(&headers)?;
    s.smtp = Some(body);
    Ok(Json(json!({ "message": "SMTP settings updated successfully" })))
}
