use std::fmt::Write;
use std::path::{Path, PathBuf};

use tracing::{info, instrument, warn};

use crate::models::{timestamp, Booking, BookingStatus};
use crate::views::{decode_data_url, short_id, status_badge, InlineImage, ViewContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewAction {
    Approve,
    Reject,
    ViewProof,
}

impl ReviewAction {
    pub fn label(&self) -> &'static str {
        match self {
            ReviewAction::Approve => "approve",
            ReviewAction::Reject => "reject",
            ReviewAction::ViewProof => "view proof",
        }
    }
}

/// Controls offered on a booking row. Approve and reject only for pending.
pub fn actions_for(booking: &Booking) -> Vec<ReviewAction> {
    let mut actions = Vec::new();
    if booking.has_proof() {
        actions.push(ReviewAction::ViewProof);
    }
    if !booking.status.is_terminal() {
        actions.push(ReviewAction::Approve);
        actions.push(ReviewAction::Reject);
    }
    actions
}

#[derive(Debug, Clone, Default)]
pub struct BookingsTab {
    bookings: Vec<Booking>,
}

impl BookingsTab {
    pub async fn mount(ctx: ViewContext<'_>) -> Self {
        let mut tab = Self::default();
        tab.refresh(ctx).await;
        tab
    }

    async fn refresh(&mut self, ctx: ViewContext<'_>) {
        match ctx.api().list_bookings().await {
            Ok(bookings) => self.bookings = bookings,
            Err(e) => {
                warn!(error = %e, "booking list fetch failed");
                ctx.toasts.error("Failed to fetch bookings");
                self.bookings.clear();
            }
        }
    }

    pub fn bookings(&self) -> &[Booking] {
        &self.bookings
    }

    fn find(&self, booking_id: &str) -> Option<&Booking> {
        self.bookings.iter().find(|b| b.id == booking_id)
    }

    /// Approves or rejects a pending booking, then refetches the list.
    /// Returns whether the update went through.
    #[instrument(skip(self, ctx, notes))]
    pub async fn review(
        &mut self,
        ctx: ViewContext<'_>,
        booking_id: &str,
        decision: BookingStatus,
        notes: Option<String>,
    ) -> bool {
        let allowed = self
            .find(booking_id)
            .is_some_and(|b| b.status.can_transition_to(decision));
        if !allowed {
            warn!("booking is not pending or not listed");
            ctx.toasts.error("Only pending bookings can be approved or rejected");
            return false;
        }

        let ok = match ctx
            .api()
            .update_booking_status(booking_id, decision, notes)
            .await
        {
            Ok(()) => {
                info!(status = %decision, "booking reviewed");
                ctx.toasts.success("Booking status updated successfully");
                true
            }
            Err(e) => {
                warn!(error = %e, "booking status update failed");
                ctx.toasts.error("Failed to update booking status");
                false
            }
        };
        if ok {
            self.refresh(ctx).await;
        }
        ok
    }

    pub fn proof(&self, booking_id: &str) -> Option<InlineImage> {
        self.find(booking_id)
            .and_then(|b| b.payment_proof_base64.as_deref())
            .and_then(decode_data_url)
    }

    /// Writes the decoded proof image into `dir` as `proof-<id>.<ext>`.
    pub async fn save_proof(&self, ctx: ViewContext<'_>, booking_id: &str, dir: &Path) -> Option<PathBuf> {
        let Some(image) = self.proof(booking_id) else {
            ctx.toasts.error("No payment proof for this booking");
            return None;
        };
        let path = dir.join(format!("proof-{}.{}", booking_id, image.extension()));
        match tokio::fs::write(&path, &image.bytes).await {
            Ok(()) => Some(path),
            Err(e) => {
                warn!(error = %e, path = %path.display(), "could not write proof image");
                ctx.toasts.error(format!("Could not save payment proof: {e}"));
                None
            }
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::from("Bookings Management\n\n");
        if self.bookings.is_empty() {
            out.push_str("No bookings yet.\n");
            return out;
        }
        let awaiting = self.bookings.iter().filter(|b| b.is_awaiting_review()).count();
        let _ = writeln!(out, "{} bookings, {awaiting} awaiting review\n", self.bookings.len());
        let _ = writeln!(
            out,
            "{:<12} {:<12} {:<10} {:<14} {:<13} ACTIONS",
            "BOOKING", "USER", "STATUS", "UTR", "DATE"
        );
        for b in &self.bookings {
            let actions: Vec<&str> = actions_for(b).iter().map(ReviewAction::label).collect();
            let _ = writeln!(
                out,
                "{:<12} {:<12} {:<10} {:<14} {:<13} {}",
                short_id(&b.id),
                short_id(&b.user_id),
                status_badge(b.status).to_string(),
                b.utr_number.as_deref().unwrap_or("N/A"),
                timestamp::display_date(&b.created_at),
                actions.join(", ")
            );
        }
        out
    }
}
