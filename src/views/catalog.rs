use std::fmt::Write;

use tracing::{instrument, warn};

use super::{format_price, ViewContext};
use crate::models::Event;
use crate::router::{Navigation, Route};

/// Public class listing. Session links are never shown here; they belong
/// to paid bookings.
#[derive(Debug, Clone)]
pub struct CatalogView {
    loading: bool,
    events: Vec<Event>,
}

impl Default for CatalogView {
    fn default() -> Self {
        Self {
            loading: true,
            events: Vec::new(),
        }
    }
}

impl CatalogView {
    /// Fetches the listing once.
    #[instrument(skip_all)]
    pub async fn mount(ctx: ViewContext<'_>) -> Self {
        let mut view = Self::default();
        match ctx.api().list_events().await {
            Ok(events) => view.events = events,
            Err(e) => {
                warn!(error = %e, "event list fetch failed");
                ctx.toasts.error("Failed to fetch events");
            }
        }
        view.loading = false;
        view
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// "Book now" on a card. Anonymous visitors are sent to sign in first.
    pub fn choose(&self, ctx: ViewContext<'_>, event_id: &str) -> Navigation {
        if !ctx.session.is_authenticated() {
            ctx.toasts.error("Please login to book classes");
            return Navigation::push(Route::Login);
        }
        Navigation::push(Route::Book {
            event_id: event_id.to_string(),
        })
    }

    pub fn render(&self) -> String {
        if self.loading {
            return "Loading classes...\n".into();
        }
        if self.events.is_empty() {
            return "No classes available at the moment.\n".into();
        }
        let mut out = String::from("Yoga Classes\n\n");
        for event in &self.events {
            render_card(&mut out, event);
        }
        out
    }
}

fn render_card(out: &mut String, event: &Event) {
    let _ = writeln!(out, "{}  [{}]", event.title, event.delivery_mode);
    if !event.description.is_empty() {
        let _ = writeln!(out, "  {}", event.description);
    }
    let _ = writeln!(out, "  Date: {}  Time: {}", event.date, event.time);
    let _ = writeln!(out, "  Capacity: {} people", event.capacity);
    let _ = writeln!(
        out,
        "  {}  -> {}",
        format_price(event.price),
        Route::Book {
            event_id: event.id.clone()
        }
    );
    out.push('\n');
}
