//! Path ⇄ route mapping and the access guard in front of each route.

use std::fmt;

use crate::session::SessionManager;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Register,
    Classes,
    Book { event_id: String },
    Dashboard,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    Open,
    Protected { admin_only: bool },
}

/// Outcome of a navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Render(Route),
    /// Session state is still resolving; show a placeholder.
    Loading,
    Redirect { to: Route, replace: bool },
}

impl Navigation {
    pub fn push(to: Route) -> Self {
        Navigation::Redirect { to, replace: false }
    }

    pub fn replace(to: Route) -> Self {
        Navigation::Redirect { to, replace: true }
    }
}

/// What the guard needs to know about the session.
pub trait AccessState {
    fn is_loading(&self) -> bool;
    fn is_authenticated(&self) -> bool;
    fn is_admin(&self) -> bool;
}

impl AccessState for SessionManager {
    fn is_loading(&self) -> bool {
        SessionManager::is_loading(self)
    }

    fn is_authenticated(&self) -> bool {
        SessionManager::is_authenticated(self)
    }

    fn is_admin(&self) -> bool {
        SessionManager::is_admin(self)
    }
}

impl Route {
    pub fn parse(path: &str) -> Option<Route> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Some(Route::Home),
            ["login"] => Some(Route::Login),
            ["register"] => Some(Route::Register),
            ["classes"] => Some(Route::Classes),
            ["book", id] => Some(Route::Book {
                event_id: (*id).to_string(),
            }),
            ["dashboard"] => Some(Route::Dashboard),
            ["admin"] => Some(Route::Admin),
            _ => None,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".into(),
            Route::Login => "/login".into(),
            Route::Register => "/register".into(),
            Route::Classes => "/classes".into(),
            Route::Book { event_id } => format!("/book/{event_id}"),
            Route::Dashboard => "/dashboard".into(),
            Route::Admin => "/admin".into(),
        }
    }

    pub fn guard(&self) -> Guard {
        match self {
            Route::Home | Route::Login | Route::Register | Route::Classes => Guard::Open,
            Route::Book { .. } | Route::Dashboard => Guard::Protected { admin_only: false },
            Route::Admin => Guard::Protected { admin_only: true },
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

impl Guard {
    pub fn check(&self, route: Route, session: &impl AccessState) -> Navigation {
        match self {
            Guard::Open => Navigation::Render(route),
            Guard::Protected { admin_only } => {
                if session.is_loading() {
                    Navigation::Loading
                } else if !session.is_authenticated() {
                    Navigation::replace(Route::Login)
                } else if *admin_only && !session.is_admin() {
                    Navigation::replace(Route::Dashboard)
                } else {
                    Navigation::Render(route)
                }
            }
        }
    }
}

/// Resolves a path against the route table and its guard. Unknown paths go
/// home, replacing history.
pub fn resolve(path: &str, session: &impl AccessState) -> Navigation {
    match Route::parse(path) {
        Some(route) => route.guard().check(route, session),
        None => Navigation::replace(Route::Home),
    }
}
