//! Client-side copies of the records the booking backend owns.
//!
//! Nothing here is authoritative: the backend decides booking transitions,
//! roles and capacity. These types only carry what the views render and the
//! few UI-side rules (delivery-mode fields, pending-only review actions).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

pub mod timestamp {
    //! The backend emits naive ISO-8601 timestamps (`2024-05-01T09:30:00.123456`);
    //! RFC 3339 with an offset is accepted too. Naive values are taken as UTC.

    use serde::{de, Deserialize, Deserializer, Serializer};
    use time::format_description::well_known::Rfc3339;
    use time::macros::format_description;
    use time::{OffsetDateTime, PrimitiveDateTime};

    pub fn parse(raw: &str) -> Option<OffsetDateTime> {
        let naive = format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]"
        );
        OffsetDateTime::parse(raw, &Rfc3339).ok().or_else(|| {
            PrimitiveDateTime::parse(raw, naive)
                .ok()
                .map(PrimitiveDateTime::assume_utc)
        })
    }

    /// Short calendar date, e.g. `May 1, 2024`.
    pub fn display_date(value: &OffsetDateTime) -> String {
        let fmt = format_description!("[month repr:short] [day padding:none], [year]");
        value.format(fmt).unwrap_or_else(|_| value.date().to_string())
    }

    pub fn serialize<S: Serializer>(value: &OffsetDateTime, s: S) -> Result<S::Ok, S::Error> {
        let raw = value.format(&Rfc3339).map_err(serde::ser::Error::custom)?;
        s.serialize_str(&raw)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<OffsetDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid timestamp `{raw}`")))
    }

    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(
            value: &Option<OffsetDateTime>,
            s: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(v) => super::serialize(v, s),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            d: D,
        ) -> Result<Option<OffsetDateTime>, D::Error> {
            match Option::<String>::deserialize(d)? {
                Some(raw) => parse(&raw)
                    .map(Some)
                    .ok_or_else(|| de::Error::custom(format!("invalid timestamp `{raw}`"))),
                None => Ok(None),
            }
        }
    }
}

fn unknown(kind: &str, raw: &str) -> String {
    format!("unknown {kind} `{raw}`")
}

// --- users ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    User,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(UserRole::User),
            "admin" => Ok(UserRole::Admin),
            other => Err(unknown("role", other)),
        }
    }
}

fn default_status() -> String {
    "active".into()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default, with = "timestamp::option")]
    pub created_at: Option<OffsetDateTime>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn is_active(&self) -> bool {
        self.status == "active"
    }
}

// --- events ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    #[default]
    Online,
    Offline,
    Hybrid,
}

/// How a form field behaves for a given delivery mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    Required,
    Optional,
    Hidden,
}

/// Per-mode field configuration. The event form and the catalog consult this
/// instead of branching on the mode themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryFields {
    pub session_link: FieldRule,
    pub is_online: bool,
}

impl DeliveryMode {
    pub const ALL: [DeliveryMode; 3] = [DeliveryMode::Online, DeliveryMode::Offline, DeliveryMode::Hybrid];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryMode::Online => "online",
            DeliveryMode::Offline => "offline",
            DeliveryMode::Hybrid => "hybrid",
        }
    }

    pub fn fields(&self) -> DeliveryFields {
        match self {
            DeliveryMode::Online | DeliveryMode::Hybrid => DeliveryFields {
                session_link: FieldRule::Optional,
                is_online: true,
            },
            DeliveryMode::Offline => DeliveryFields {
                session_link: FieldRule::Hidden,
                is_online: false,
            },
        }
    }
}

impl fmt::Display for DeliveryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeliveryMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "online" => Ok(DeliveryMode::Online),
            "offline" => Ok(DeliveryMode::Offline),
            "hybrid" => Ok(DeliveryMode::Hybrid),
            other => Err(unknown("delivery mode", other)),
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub date: String,
    pub time: String,
    pub price: f64,
    #[serde(default)]
    pub delivery_mode: DeliveryMode,
    pub capacity: u32,
    #[serde(default)]
    pub session_link: Option<String>,
    #[serde(default)]
    pub qr_code_base64: Option<String>,
    #[serde(default)]
    pub upi_id: Option<String>,
    #[serde(default = "default_true")]
    pub is_online: bool,
    #[serde(default, with = "timestamp::option")]
    pub created_at: Option<OffsetDateTime>,
}

impl Event {
    pub fn has_payment_qr(&self) -> bool {
        self.qr_code_base64.as_deref().is_some_and(|q| !q.is_empty())
    }
}

/// Body of `POST /events`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub date: String,
    pub time: String,
    pub price: f64,
    pub capacity: u32,
    pub delivery_mode: DeliveryMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upi_id: Option<String>,
    pub is_online: bool,
}

// --- bookings ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BookingType {
    #[default]
    Single,
    Weekly,
    Monthly,
}

impl BookingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingType::Single => "single",
            BookingType::Weekly => "weekly",
            BookingType::Monthly => "monthly",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Approved => "approved",
            BookingStatus::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, BookingStatus::Pending)
    }

    /// The only transitions this client ever issues.
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (BookingStatus::Pending, BookingStatus::Approved)
                | (BookingStatus::Pending, BookingStatus::Rejected)
        )
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(BookingStatus::Pending),
            "approved" => Ok(BookingStatus::Approved),
            "rejected" => Ok(BookingStatus::Rejected),
            other => Err(unknown("booking status", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub user_id: String,
    pub event_id: String,
    #[serde(default)]
    pub booking_type: BookingType,
    #[serde(default)]
    pub status: BookingStatus,
    #[serde(default)]
    pub utr_number: Option<String>,
    #[serde(default)]
    pub payment_proof_base64: Option<String>,
    #[serde(default)]
    pub admin_notes: Option<String>,
    #[serde(with = "timestamp")]
    pub created_at: OffsetDateTime,
    #[serde(default, with = "timestamp::option")]
    pub approved_at: Option<OffsetDateTime>,
}

impl Booking {
    pub fn has_proof(&self) -> bool {
        self.payment_proof_base64.as_deref().is_some_and(|p| !p.is_empty())
    }

    /// Proof and reference attached, decision still pending.
    pub fn is_awaiting_review(&self) -> bool {
        self.status == BookingStatus::Pending
            && self.has_proof()
            && self.utr_number.as_deref().is_some_and(|u| !u.trim().is_empty())
    }
}

// --- admin ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub total_users: u64,
    pub total_events: u64,
    pub total_bookings: u64,
    pub pending_bookings: u64,
    #[serde(default)]
    pub approved_bookings: Option<u64>,
    #[serde(default)]
    pub recent_bookings: Vec<Booking>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Encryption {
    #[default]
    #[serde(rename = "SSL")]
    Ssl,
    #[serde(rename = "TLS")]
    Tls,
    #[serde(rename = "None")]
    None,
}

impl FromStr for Encryption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SSL" => Ok(Encryption::Ssl),
            "TLS" => Ok(Encryption::Tls),
            "NONE" => Ok(Encryption::None),
            other => Err(unknown("encryption", other)),
        }
    }
}

impl fmt::Display for Encryption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Encryption::Ssl => "SSL",
            Encryption::Tls => "TLS",
            Encryption::None => "None",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmtpSettings {
    pub mailer_name: String,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub encryption: Encryption,
    #[serde(default)]
    pub password: String,
}

impl Default for SmtpSettings {
    fn default() -> Self {
        Self {
            mailer_name: "Vibrant Yoga".into(),
            host: String::new(),
            port: 465,
            username: String::new(),
            email: String::new(),
            encryption: Encryption::Ssl,
            password: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn naive_backend_timestamp_parses_as_utc() {
        let ts = timestamp::parse("2024-05-01T09:30:00.123456").expect("naive timestamp");
        assert_eq!(ts.offset(), time::UtcOffset::UTC);
        assert_eq!(timestamp::display_date(&ts), "May 1, 2024");
        assert!(timestamp::parse("2024-05-01T09:30:00Z").is_some());
        assert!(timestamp::parse("yesterday").is_none());
    }

    #[test]
    fn booking_deserializes_from_backend_shape() {
        let raw = r#"{
            "id": "b-1", "user_id": "u-1", "event_id": "e-1",
            "booking_type": "single", "payment_proof_base64": null,
            "utr_number": null, "status": "pending", "admin_notes": null,
            "created_at": "2024-05-01T09:30:00.5", "approved_at": null
        }"#;
        let booking: Booking = serde_json::from_str(raw).unwrap();
        assert_eq!(booking.status, BookingStatus::Pending);
        assert!(!booking.has_proof());
        assert!(!booking.is_awaiting_review());
    }

    #[test]
    fn offline_hides_session_link() {
        assert_eq!(DeliveryMode::Offline.fields().session_link, FieldRule::Hidden);
        assert!(!DeliveryMode::Offline.fields().is_online);
        assert_eq!(DeliveryMode::Hybrid.fields().session_link, FieldRule::Optional);
        assert!(DeliveryMode::Hybrid.fields().is_online);
    }

    #[test]
    fn only_pending_transitions_are_allowed() {
        assert!(BookingStatus::Pending.can_transition_to(BookingStatus::Approved));
        assert!(BookingStatus::Pending.can_transition_to(BookingStatus::Rejected));
        assert!(!BookingStatus::Approved.can_transition_to(BookingStatus::Rejected));
        assert!(!BookingStatus::Rejected.can_transition_to(BookingStatus::Pending));
        assert!(BookingStatus::Approved.is_terminal());
    }

    #[test]
    fn user_defaults_fill_missing_fields() {
        let user: User =
            serde_json::from_str(r#"{"id":"admin_user_id","name":"Admin User","email":"a@b.co","role":"admin"}"#)
                .unwrap();
        assert!(user.is_admin());
        assert!(user.is_active());
        assert!(user.created_at.is_none());
    }

    #[test]
    fn encryption_round_trips_backend_spelling() {
        let json = serde_json::to_string(&SmtpSettings::default()).unwrap();
        assert!(json.contains(r#""encryption":"SSL""#));
        assert_eq!("tls".parse::<Encryption>().unwrap(), Encryption::Tls);
    }
}
