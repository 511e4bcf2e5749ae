//! Page controllers. Each view fetches on mount, keeps its own state, and
//! renders plain text. Request failures become toasts and never propagate.

pub mod admin;
pub mod auth;
pub mod booking;
pub mod catalog;
pub mod dashboard;
pub mod home;

use std::fmt;

use base64::Engine;

use crate::api::ApiClient;
use crate::models::BookingStatus;
use crate::notify::Toaster;
use crate::session::SessionManager;

/// Read-only handle every view receives: the session and the toast queue.
#[derive(Clone, Copy)]
pub struct ViewContext<'a> {
    pub session: &'a SessionManager,
    pub toasts: &'a Toaster,
}

impl<'a> ViewContext<'a> {
    pub fn new(session: &'a SessionManager, toasts: &'a Toaster) -> Self {
        Self { session, toasts }
    }

    pub fn api(&self) -> &'a ApiClient {
        self.session.api()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeColor {
    Green,
    Red,
    Yellow,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub label: String,
    pub color: BadgeColor,
}

impl fmt::Display for Badge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.label)
    }
}

pub fn status_badge(status: BookingStatus) -> Badge {
    let color = match status {
        BookingStatus::Approved => BadgeColor::Green,
        BookingStatus::Rejected => BadgeColor::Red,
        BookingStatus::Pending => BadgeColor::Yellow,
    };
    Badge {
        label: status.to_string(),
        color,
    }
}

/// First eight characters of an id, as shown in admin tables.
pub fn short_id(id: &str) -> String {
    match id.char_indices().nth(8) {
        Some((cut, _)) => format!("{}...", &id[..cut]),
        None => id.to_string(),
    }
}

pub fn format_price(price: f64) -> String {
    if price.fract() == 0.0 {
        format!("₹{price:.0}")
    } else {
        format!("₹{price:.2}")
    }
}

pub(crate) fn truncate(s: &str, len: usize) -> String {
    if s.chars().count() <= len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(len.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}

/// Image stored by the backend as a `data:` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl InlineImage {
    pub fn extension(&self) -> &'static str {
        match self.content_type.as_str() {
            "image/jpeg" | "image/jpg" => "jpg",
            "image/png" => "png",
            "image/webp" => "webp",
            "image/gif" => "gif",
            _ => "bin",
        }
    }
}

pub fn decode_data_url(raw: &str) -> Option<InlineImage> {
    let rest = raw.strip_prefix("data:")?;
    let (meta, payload) = rest.split_once(',')?;
    let content_type = meta.strip_suffix(";base64")?;
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .ok()?;
    Some(InlineImage {
        content_type: if content_type.is_empty() {
            "application/octet-stream".into()
        } else {
            content_type.to_string()
        },
        bytes,
    })
}
