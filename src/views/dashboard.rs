use std::fmt::Write;

use tracing::{instrument, warn};

use super::{status_badge, ViewContext};
use crate::models::{timestamp, Booking, BookingStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BookingCounts {
    pub total: usize,
    pub approved: usize,
    pub pending: usize,
}

impl BookingCounts {
    pub fn of(bookings: &[Booking]) -> Self {
        let by = |status: BookingStatus| bookings.iter().filter(|b| b.status == status).count();
        Self {
            total: bookings.len(),
            approved: by(BookingStatus::Approved),
            pending: by(BookingStatus::Pending),
        }
    }
}

/// The signed-in user's own bookings.
#[derive(Debug, Clone)]
pub struct DashboardView {
    bookings: Vec<Booking>,
}

impl DashboardView {
    /// Fetches on every mount.
    #[instrument(skip_all)]
    pub async fn mount(ctx: ViewContext<'_>) -> Self {
        let bookings = match ctx.api().list_bookings().await {
            Ok(bookings) => bookings,
            Err(e) => {
                warn!(error = %e, "booking list fetch failed");
                ctx.toasts.error("Failed to fetch bookings");
                Vec::new()
            }
        };
        Self { bookings }
    }

    pub fn bookings(&self) -> &[Booking] {
        &self.bookings
    }

    pub fn counts(&self) -> BookingCounts {
        BookingCounts::of(&self.bookings)
    }

    pub fn render(&self, user_name: Option<&str>) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Welcome back, {}!", user_name.unwrap_or("yogi"));
        let counts = self.counts();
        let _ = writeln!(
            out,
            "Total Bookings: {}  Approved: {}  Pending: {}",
            counts.total, counts.approved, counts.pending
        );
        let _ = writeln!(out);
        if self.bookings.is_empty() {
            let _ = writeln!(out, "No bookings yet. Book your first class!");
            return out;
        }
        let _ = writeln!(out, "{:<36} {:<8} {:<10} {:<14} DATE", "BOOKING", "TYPE", "STATUS", "UTR");
        for b in &self.bookings {
            let _ = writeln!(
                out,
                "{:<36} {:<8} {:<10} {:<14} {}",
                b.id,
                b.booking_type.as_str(),
                status_badge(b.status).to_string(),
                b.utr_number.as_deref().unwrap_or("N/A"),
                timestamp::display_date(&b.created_at)
            );
        }
        out
    }
}
