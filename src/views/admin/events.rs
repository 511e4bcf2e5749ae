use std::fmt::Write;

use time::macros::format_description;
use time::{Date, Time};
use tracing::{info, instrument, warn};

use crate::api::Upload;
use crate::models::{DeliveryMode, Event, FieldRule, NewEvent};
use crate::views::{format_price, short_id, truncate, ViewContext};

/// Inputs of the "Create New Event" form, as typed.
#[derive(Debug, Clone, PartialEq)]
pub struct EventForm {
    pub title: String,
    pub description: String,
    pub date: String,
    pub time: String,
    pub price: String,
    pub capacity: String,
    pub delivery_mode: DeliveryMode,
    pub session_link: String,
    pub upi_id: String,
}

impl Default for EventForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            date: String::new(),
            time: String::new(),
            price: String::new(),
            capacity: "50".into(),
            delivery_mode: DeliveryMode::Online,
            session_link: String::new(),
            upi_id: String::new(),
        }
    }
}

impl EventForm {
    /// Whether the session link input is shown for the selected mode.
    pub fn shows_session_link(&self) -> bool {
        self.delivery_mode.fields().session_link != FieldRule::Hidden
    }

    /// Changes the delivery mode. A mode that hides the session link clears it.
    pub fn set_delivery_mode(&mut self, mode: DeliveryMode) {
        self.delivery_mode = mode;
        if !self.shows_session_link() {
            self.session_link.clear();
        }
    }

    /// Validates the inputs and builds the request body.
    pub fn to_new_event(&self) -> Result<NewEvent, String> {
        let required = [
            ("title", &self.title),
            ("description", &self.description),
            ("date", &self.date),
            ("time", &self.time),
            ("price", &self.price),
            ("capacity", &self.capacity),
        ];
        if let Some((name, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(format!("Please fill in the {name} field"));
        }

        let date = self.date.trim();
        Date::parse(date, format_description!("[year]-[month]-[day]"))
            .map_err(|_| format!("Invalid date `{date}`, expected YYYY-MM-DD"))?;
        let time = self.time.trim();
        Time::parse(time, format_description!("[hour]:[minute]"))
            .map_err(|_| format!("Invalid time `{time}`, expected HH:MM"))?;

        let price = self
            .price
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|p| p.is_finite() && *p >= 0.0)
            .ok_or_else(|| format!("Invalid price `{}`", self.price.trim()))?;
        let capacity = self
            .capacity
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|c| *c > 0)
            .ok_or_else(|| format!("Invalid capacity `{}`", self.capacity.trim()))?;

        let fields = self.delivery_mode.fields();
        let link = self.session_link.trim();
        let session_link = match fields.session_link {
            FieldRule::Hidden => None,
            FieldRule::Optional => (!link.is_empty()).then(|| link.to_string()),
            FieldRule::Required if link.is_empty() => {
                return Err("Please fill in the session link field".into())
            }
            FieldRule::Required => Some(link.to_string()),
        };
        let upi = self.upi_id.trim();

        Ok(NewEvent {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            date: date.to_string(),
            time: time.to_string(),
            price,
            capacity,
            delivery_mode: self.delivery_mode,
            session_link,
            upi_id: (!upi.is_empty()).then(|| upi.to_string()),
            is_online: fields.is_online,
        })
    }
}

/// Row controls that have no backend endpoint yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventAction {
    Edit,
    Delete,
}

impl EventAction {
    pub fn label(&self) -> &'static str {
        match self {
            EventAction::Edit => "Edit",
            EventAction::Delete => "Delete",
        }
    }

    pub fn is_available(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, Default)]
pub struct EventsTab {
    events: Vec<Event>,
}

impl EventsTab {
    pub async fn mount(ctx: ViewContext<'_>) -> Self {
        let mut tab = Self::default();
        tab.refresh(ctx).await;
        tab
    }

    async fn refresh(&mut self, ctx: ViewContext<'_>) {
        match ctx.api().list_events().await {
            Ok(events) => self.events = events,
            Err(e) => {
                warn!(error = %e, "event list fetch failed");
                ctx.toasts.error("Failed to fetch events");
                self.events.clear();
            }
        }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Creates the event, then uploads the QR image against the new id when
    /// one was picked. Returns whether the event was created.
    #[instrument(skip_all, fields(title = %form.title))]
    pub async fn create(&mut self, ctx: ViewContext<'_>, form: &EventForm, qr: Option<Upload>) -> bool {
        let body = match form.to_new_event() {
            Ok(body) => body,
            Err(msg) => {
                ctx.toasts.error(msg);
                return false;
            }
        };
        if let Some(file) = qr.as_ref().filter(|f| !f.is_image()) {
            ctx.toasts
                .error(format!("QR code must be an image, got {}", file.content_type));
            return false;
        }

        let event = match ctx.api().create_event(&body).await {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, "event creation failed");
                ctx.toasts.error(e.user_message("Failed to create event"));
                return false;
            }
        };
        info!(event_id = %event.id, "event created");

        if let Some(file) = qr {
            if let Err(e) = ctx.api().upload_event_qr(&event.id, &file).await {
                warn!(error = %e, event_id = %event.id, "qr upload failed");
                ctx.toasts.error(e.user_message("Failed to create event"));
                self.refresh(ctx).await;
                return true;
            }
        }

        ctx.toasts.success("Event created successfully!");
        self.refresh(ctx).await;
        true
    }

    /// Edit and delete are shown but issue no request.
    pub fn invoke(&self, ctx: ViewContext<'_>, action: EventAction, event_id: &str) {
        warn!(action = action.label(), event_id, "event action not supported");
        ctx.toasts
            .info(format!("{} is not supported yet", action.label()));
    }

    pub fn render(&self) -> String {
        let mut out = String::from("Events Management\n\n");
        if self.events.is_empty() {
            out.push_str("No events yet.\n");
            return out;
        }
        let _ = writeln!(
            out,
            "{:<12} {:<24} {:<12} {:<6} {:<8} {:<8} ACTIONS",
            "ID", "TITLE", "DATE", "TIME", "PRICE", "MODE"
        );
        for e in &self.events {
            let actions: Vec<String> = [EventAction::Edit, EventAction::Delete]
                .iter()
                .map(|a| format!("{} (unavailable)", a.label()))
                .collect();
            let _ = writeln!(
                out,
                "{:<12} {:<24} {:<12} {:<6} {:<8} {:<8} {}",
                short_id(&e.id),
                truncate(&e.title, 24),
                e.date,
                e.time,
                format_price(e.price),
                e.delivery_mode.as_str(),
                actions.join(", ")
            );
        }
        out
    }
}
