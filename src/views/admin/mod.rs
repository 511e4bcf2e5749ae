//! Admin console. One tab is mounted at a time; switching tabs drops the old
//! content and mounts a fresh one that fetches its own data.

pub mod bookings;
pub mod events;
pub mod overview;
pub mod settings;
pub mod users;

use std::fmt;
use std::str::FromStr;

use tracing::debug;

pub use bookings::{BookingsTab, ReviewAction};
pub use events::{EventAction, EventForm, EventsTab};
pub use overview::OverviewTab;
pub use settings::SettingsTab;
pub use users::UsersTab;

use super::ViewContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdminTab {
    #[default]
    Dashboard,
    Events,
    Bookings,
    Users,
    Settings,
}

impl AdminTab {
    pub const ALL: [AdminTab; 5] = [
        AdminTab::Dashboard,
        AdminTab::Events,
        AdminTab::Bookings,
        AdminTab::Users,
        AdminTab::Settings,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AdminTab::Dashboard => "Dashboard",
            AdminTab::Events => "Events",
            AdminTab::Bookings => "Bookings",
            AdminTab::Users => "Users",
            AdminTab::Settings => "Settings",
        }
    }
}

impl fmt::Display for AdminTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AdminTab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AdminTab::ALL
            .into_iter()
            .find(|tab| tab.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown admin tab `{s}`"))
    }
}

/// The mounted tab and its state.
#[derive(Debug)]
pub enum TabContent {
    Dashboard(OverviewTab),
    Events(EventsTab),
    Bookings(BookingsTab),
    Users(UsersTab),
    Settings(SettingsTab),
}

impl TabContent {
    pub async fn mount(tab: AdminTab, ctx: ViewContext<'_>) -> Self {
        debug!(tab = %tab, "mounting admin tab");
        match tab {
            AdminTab::Dashboard => TabContent::Dashboard(OverviewTab::mount(ctx).await),
            AdminTab::Events => TabContent::Events(EventsTab::mount(ctx).await),
            AdminTab::Bookings => TabContent::Bookings(BookingsTab::mount(ctx).await),
            AdminTab::Users => TabContent::Users(UsersTab::mount(ctx).await),
            AdminTab::Settings => TabContent::Settings(SettingsTab::mount(ctx).await),
        }
    }

    pub fn tab(&self) -> AdminTab {
        match self {
            TabContent::Dashboard(_) => AdminTab::Dashboard,
            TabContent::Events(_) => AdminTab::Events,
            TabContent::Bookings(_) => AdminTab::Bookings,
            TabContent::Users(_) => AdminTab::Users,
            TabContent::Settings(_) => AdminTab::Settings,
        }
    }

    pub fn render(&self) -> String {
        match self {
            TabContent::Dashboard(tab) => tab.render(),
            TabContent::Events(tab) => tab.render(),
            TabContent::Bookings(tab) => tab.render(),
            TabContent::Users(tab) => tab.render(),
            TabContent::Settings(tab) => tab.render(),
        }
    }
}

#[derive(Debug)]
pub struct AdminConsole {
    content: TabContent,
}

impl AdminConsole {
    pub async fn open(ctx: ViewContext<'_>, tab: AdminTab) -> Self {
        Self {
            content: TabContent::mount(tab, ctx).await,
        }
    }

    /// Replaces the mounted tab, even when `tab` is already active.
    pub async fn select(&mut self, ctx: ViewContext<'_>, tab: AdminTab) {
        self.content = TabContent::mount(tab, ctx).await;
    }

    pub fn active(&self) -> AdminTab {
        self.content.tab()
    }

    pub fn content(&self) -> &TabContent {
        &self.content
    }

    pub fn content_mut(&mut self) -> &mut TabContent {
        &mut self.content
    }

    pub fn render(&self) -> String {
        let active = self.active();
        let bar: Vec<String> = AdminTab::ALL
            .iter()
            .map(|tab| {
                if *tab == active {
                    format!("[{tab}]")
                } else {
                    format!(" {tab} ")
                }
            })
            .collect();
        format!("Admin Panel\n{}\n\n{}", bar.join(" "), self.content.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tab_names_parse_case_insensitively() {
        assert_eq!("events".parse::<AdminTab>(), Ok(AdminTab::Events));
        assert_eq!("SETTINGS".parse::<AdminTab>(), Ok(AdminTab::Settings));
        assert!("reports".parse::<AdminTab>().is_err());
        assert_eq!(AdminTab::default(), AdminTab::Dashboard);
    }
}
