//! Two-stage booking: create a booking for an event, then attach the
//! payment screenshot and UTR for manual review.

use std::fmt::Write;
use std::path::{Path, PathBuf};

use tracing::{info, instrument, warn};

use super::{decode_data_url, format_price, InlineImage, ViewContext};
use crate::api::Upload;
use crate::models::{BookingType, Event};
use crate::router::{Navigation, Route};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingStage {
    /// No booking yet; "Create booking" is offered.
    Create,
    /// Booking exists; waiting for proof and UTR.
    AttachProof,
}

#[derive(Debug)]
pub struct BookingFlow {
    event_id: String,
    event: Option<Event>,
    loading: bool,
    booking_id: Option<String>,
    proof: Option<Upload>,
    utr: String,
}

impl BookingFlow {
    fn new(event_id: &str) -> Self {
        Self {
            event_id: event_id.to_string(),
            event: None,
            loading: true,
            booking_id: None,
            proof: None,
            utr: String::new(),
        }
    }

    /// Loads the event. Anonymous callers get a navigation to sign in
    /// instead of a view.
    #[instrument(skip(ctx))]
    pub async fn mount(ctx: ViewContext<'_>, event_id: &str) -> Result<Self, Navigation> {
        if !ctx.session.is_authenticated() {
            return Err(Navigation::push(Route::Login));
        }
        let mut flow = Self::new(event_id);
        match ctx.api().get_event(event_id).await {
            Ok(event) => flow.event = Some(event),
            Err(e) => {
                warn!(error = %e, "event detail fetch failed");
                ctx.toasts.error("Failed to fetch event details");
            }
        }
        flow.loading = false;
        Ok(flow)
    }

    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn event(&self) -> Option<&Event> {
        self.event.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn booking_id(&self) -> Option<&str> {
        self.booking_id.as_deref()
    }

    pub fn stage(&self) -> BookingStage {
        if self.booking_id.is_some() {
            BookingStage::AttachProof
        } else {
            BookingStage::Create
        }
    }

    pub fn select_proof(&mut self, file: Upload) {
        self.proof = Some(file);
    }

    pub fn set_utr(&mut self, utr: impl Into<String>) {
        self.utr = utr.into();
    }

    /// Stage 1. Once a booking exists a second submission issues no request.
    /// The exclusive borrow rules out two creations in flight, and a request
    /// dropped mid-flight leaves the flow back at [`BookingStage::Create`].
    #[instrument(skip(self, ctx), fields(event_id = %self.event_id))]
    pub async fn create_booking(&mut self, ctx: ViewContext<'_>) -> Option<Navigation> {
        if !ctx.session.is_authenticated() {
            return Some(Navigation::push(Route::Login));
        }
        let Some(event) = self.event.as_ref() else {
            return None;
        };
        if self.booking_id.is_some() {
            ctx.toasts
                .info("Booking already created. Please upload payment proof.");
            return None;
        }

        let event_id = event.id.clone();
        match ctx.api().create_booking(&event_id, BookingType::Single).await {
            Ok(booking) => {
                info!(booking_id = %booking.id, "booking created");
                self.booking_id = Some(booking.id);
                ctx.toasts
                    .success("Booking created successfully! Please upload payment proof.");
            }
            Err(e) => {
                warn!(error = %e, "booking creation failed");
                ctx.toasts.error(e.user_message("Booking failed"));
            }
        }
        None
    }

    /// Stage 2. Returns the navigation to the dashboard on success.
    #[instrument(skip(self, ctx), fields(booking_id = ?self.booking_id))]
    pub async fn submit_proof(&mut self, ctx: ViewContext<'_>) -> Option<Navigation> {
        let utr = self.utr.trim();
        let (Some(file), Some(booking_id), false) =
            (self.proof.as_ref(), self.booking_id.as_deref(), utr.is_empty())
        else {
            ctx.toasts
                .error("Please select payment proof and enter UTR number");
            return None;
        };
        if !file.is_image() {
            ctx.toasts.error("Payment proof must be an image");
            return None;
        }

        match ctx.api().upload_payment_proof(booking_id, file, utr).await {
            Ok(()) => {
                info!("payment proof uploaded");
                ctx.toasts.success(
                    "Payment proof uploaded successfully! Your booking is now pending approval.",
                );
                Some(Navigation::push(Route::Dashboard))
            }
            Err(e) => {
                warn!(error = %e, "payment proof upload failed");
                ctx.toasts.error(e.user_message("Upload failed"));
                None
            }
        }
    }

    pub fn payment_qr(&self) -> Option<InlineImage> {
        self.event
            .as_ref()
            .and_then(|e| e.qr_code_base64.as_deref())
            .and_then(decode_data_url)
    }

    /// Writes the event's payment QR into `dir` as `qr-<event id>.<ext>`.
    pub async fn save_qr(&self, ctx: ViewContext<'_>, dir: &Path) -> Option<PathBuf> {
        let Some(image) = self.payment_qr() else {
            ctx.toasts.error("No payment QR code for this class");
            return None;
        };
        let path = dir.join(format!("qr-{}.{}", self.event_id, image.extension()));
        match tokio::fs::write(&path, &image.bytes).await {
            Ok(()) => Some(path),
            Err(e) => {
                warn!(error = %e, path = %path.display(), "could not write payment qr");
                ctx.toasts.error(format!("Could not save payment QR code: {e}"));
                None
            }
        }
    }

    pub fn render(&self) -> String {
        if self.loading {
            return "Loading...\n".into();
        }
        let Some(event) = self.event.as_ref() else {
            return "Event not found\n".into();
        };

        let mut out = String::new();
        let _ = writeln!(out, "Book Class: {}", event.title);
        let _ = writeln!(out, "  Date: {}  Time: {}", event.date, event.time);
        let _ = writeln!(out, "  Price: {}", format_price(event.price));
        let _ = writeln!(out, "  Mode: {}", event.delivery_mode);
        let _ = writeln!(out);
        match self.stage() {
            BookingStage::Create => {
                let _ = writeln!(out, "Step 1: create your booking (`book {}`)", event.id);
            }
            BookingStage::AttachProof => {
                let _ = writeln!(out, "Payment Details");
                let _ = writeln!(out, "  Amount: {}", format_price(event.price));
                if let Some(upi) = event.upi_id.as_deref().filter(|u| !u.is_empty()) {
                    let _ = writeln!(out, "  UPI ID: {upi}");
                }
                if event.has_payment_qr() {
                    let _ = writeln!(
                        out,
                        "  Scan the QR code to pay (save it with `book {} --save-qr <dir>`)",
                        event.id
                    );
                }
                let _ = writeln!(out, "Step 2: upload payment proof and enter the UTR number");
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_follows_booking_id() {
        let mut flow = BookingFlow::new("e-1");
        assert_eq!(flow.stage(), BookingStage::Create);
        flow.booking_id = Some("b-1".into());
        assert_eq!(flow.stage(), BookingStage::AttachProof);
    }

    #[test]
    fn payment_qr_decodes_from_event() {
        let mut flow = BookingFlow::new("e-1");
        assert!(flow.payment_qr().is_none());
        flow.event = Some(Event {
            id: "e-1".into(),
            title: "Morning Flow".into(),
            description: String::new(),
            date: "2024-05-01".into(),
            time: "07:00".into(),
            price: 500.0,
            delivery_mode: Default::default(),
            capacity: 20,
            session_link: None,
            qr_code_base64: Some("data:image/png;base64,iVBORw==".into()),
            upi_id: None,
            is_online: true,
            created_at: None,
        });
        flow.booking_id = Some("b-1".into());
        assert_eq!(flow.payment_qr().unwrap().extension(), "png");
        assert!(flow.render().contains("--save-qr"));
    }

    #[test]
    fn render_without_event() {
        let mut flow = BookingFlow::new("e-1");
        assert_eq!(flow.render(), "Loading...\n");
        flow.loading = false;
        assert_eq!(flow.render(), "Event not found\n");
    }
}
