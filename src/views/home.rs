//! Landing page and the navigation bar shown above every page.

use std::fmt::Write;

use crate::router::{AccessState, Route};
use crate::session::SessionManager;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub label: &'static str,
    pub route: Route,
}

/// Links visible for the current session. Dashboard needs a signed-in user,
/// Admin needs the admin role.
pub fn nav_links(session: &impl AccessState) -> Vec<NavLink> {
    let mut links = vec![
        NavLink { label: "Home", route: Route::Home },
        NavLink { label: "Classes", route: Route::Classes },
    ];
    if session.is_authenticated() {
        links.push(NavLink { label: "Dashboard", route: Route::Dashboard });
    }
    if session.is_admin() {
        links.push(NavLink { label: "Admin", route: Route::Admin });
    }
    links
}

/// Where "Get started" leads.
pub fn get_started(session: &impl AccessState) -> Route {
    if session.is_authenticated() {
        Route::Classes
    } else {
        Route::Login
    }
}

pub fn render_navbar(session: &SessionManager) -> String {
    let mut out = String::from("Vibrant Yoga |");
    for link in nav_links(session) {
        let _ = write!(out, " {} ({})", link.label, link.route);
    }
    match session.user() {
        Some(user) if session.is_authenticated() => {
            let _ = write!(out, " | Welcome, {} | Logout", user.name);
        }
        _ => out.push_str(" | Login"),
    }
    out
}

pub fn render_home(session: &SessionManager) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Find Your Inner Peace");
    let _ = writeln!(
        out,
        "Join our yoga community and transform your mind, body and spirit."
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "Get started -> {}", get_started(session));
    let _ = writeln!(out, "View classes -> {}", Route::Classes);
    out
}
