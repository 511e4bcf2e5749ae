//! Sign-in and registration forms.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::warn;

use crate::notify::Toaster;
use crate::router::{Navigation, Route};
use crate::session::{IdentityProvider, SessionManager};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// The checks a browser would run before letting the form submit.
    pub fn validate(&self) -> Result<(), String> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err("Email and password are required".into());
        }
        if !is_valid_email(self.email.trim()) {
            return Err("Please enter a valid email address".into());
        }
        Ok(())
    }

    /// Signs in; on success the caller navigates to the dashboard.
    pub async fn submit(&self, session: &mut SessionManager, toasts: &Toaster) -> Option<Navigation> {
        if let Err(msg) = self.validate() {
            warn!(reason = %msg, "login form rejected");
            toasts.error(msg);
            return None;
        }
        session
            .login(toasts, self.email.trim(), &self.password)
            .await
            .ok()
            .map(|_| Navigation::push(Route::Dashboard))
    }
}

#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterForm {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() || self.email.trim().is_empty() || self.password.is_empty() {
            return Err("Name, email and password are required".into());
        }
        if !is_valid_email(self.email.trim()) {
            return Err("Please enter a valid email address".into());
        }
        Ok(())
    }

    pub async fn submit(&self, session: &mut SessionManager, toasts: &Toaster) -> Option<Navigation> {
        if let Err(msg) = self.validate() {
            warn!(reason = %msg, "registration form rejected");
            toasts.error(msg);
            return None;
        }
        session
            .register(toasts, self.name.trim(), self.email.trim(), &self.password)
            .await
            .ok()
            .map(|_| Navigation::push(Route::Dashboard))
    }
}

/// "Continue with Google".
pub async fn sign_in_with_provider(
    session: &mut SessionManager,
    toasts: &Toaster,
    provider: &dyn IdentityProvider,
) -> Option<Navigation> {
    session
        .login_with_identity_provider(toasts, provider)
        .await
        .ok()
        .map(|_| Navigation::push(Route::Dashboard))
}
