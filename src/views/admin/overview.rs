use std::fmt::Write;

use tracing::warn;

use crate::models::{timestamp, Booking, DashboardSnapshot};
use crate::views::{short_id, status_badge, ViewContext};

const RECENT_LIMIT: usize = 5;

/// Read-only platform totals.
#[derive(Debug, Clone, Default)]
pub struct OverviewTab {
    snapshot: Option<DashboardSnapshot>,
}

impl OverviewTab {
    pub async fn mount(ctx: ViewContext<'_>) -> Self {
        match ctx.api().admin_dashboard().await {
            Ok(snapshot) => Self {
                snapshot: Some(snapshot),
            },
            Err(e) => {
                warn!(error = %e, "admin snapshot fetch failed");
                ctx.toasts.error("Failed to fetch dashboard data");
                Self::default()
            }
        }
    }

    pub fn snapshot(&self) -> Option<&DashboardSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn recent(&self) -> &[Booking] {
        match &self.snapshot {
            Some(s) => &s.recent_bookings[..s.recent_bookings.len().min(RECENT_LIMIT)],
            None => &[],
        }
    }

    pub fn render(&self) -> String {
        let Some(s) = &self.snapshot else {
            return "No dashboard data.\n".into();
        };
        let mut out = String::new();
        let _ = writeln!(out, "Total Users:      {}", s.total_users);
        let _ = writeln!(out, "Total Events:     {}", s.total_events);
        let _ = writeln!(out, "Total Bookings:   {}", s.total_bookings);
        let _ = writeln!(out, "Pending Bookings: {}", s.pending_bookings);
        if let Some(approved) = s.approved_bookings {
            let _ = writeln!(out, "Approved:         {approved}");
        }
        let _ = writeln!(out, "\nRecent Bookings");
        if self.recent().is_empty() {
            let _ = writeln!(out, "  none");
        }
        for b in self.recent() {
            let _ = writeln!(
                out,
                "  {:<12} {:<10} {}",
                short_id(&b.id),
                status_badge(b.status).to_string(),
                timestamp::display_date(&b.created_at)
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use time::OffsetDateTime;

    use super::*;
    use crate::models::{BookingStatus, BookingType};

    fn booking(n: usize) -> Booking {
        Booking {
            id: format!("booking-{n:04}"),
            user_id: "u".into(),
            event_id: "e".into(),
            booking_type: BookingType::Single,
            status: BookingStatus::Pending,
            utr_number: None,
            payment_proof_base64: None,
            admin_notes: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
            approved_at: None,
        }
    }

    #[test]
    fn recent_is_capped_at_five() {
        let tab = OverviewTab {
            snapshot: Some(DashboardSnapshot {
                total_users: 3,
                total_events: 2,
                total_bookings: 8,
                pending_bookings: 8,
                approved_bookings: None,
                recent_bookings: (0..8).map(booking).collect(),
            }),
        };
        assert_eq!(tab.recent().len(), 5);
        assert_eq!(tab.recent()[0].id, "booking-0000");
        assert!(tab.render().contains("Total Bookings:   8"));
        assert!(OverviewTab::default().recent().is_empty());
    }
}
