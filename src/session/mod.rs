//! Session manager: the single owner of the bearer credential and the
//! current user.
//!
//! Views receive `&SessionManager` and only read it. Every write (login,
//! register, provider exchange, logout, restore) goes through the methods
//! below, which also keep the persisted credential and the request header in
//! step with the in-memory state.

mod provider;
mod store;

use std::sync::Arc;

use tracing::{info, instrument, warn};

pub use provider::{IdentityProvider, StaticTokenProvider};
pub use store::{FileTokenStore, MemoryTokenStore, TokenStore};

use crate::api::dto::AuthResponse;
use crate::api::ApiClient;
use crate::error::{ApiError, ApiResult};
use crate::models::User;
use crate::notify::Toaster;

pub struct SessionManager {
    api: ApiClient,
    store: Arc<dyn TokenStore>,
    token: Option<String>,
    user: Option<User>,
    loading: bool,
}

impl SessionManager {
    /// Reads the persisted credential. When one exists the session starts in
    /// the loading state until [`SessionManager::restore`] resolves it.
    pub fn new(mut api: ApiClient, store: Arc<dyn TokenStore>) -> Self {
        let token = match store.load() {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "could not read persisted credential");
                None
            }
        };
        api.set_bearer(token.clone());
        let loading = token.is_some();
        Self {
            api,
            store,
            token,
            user: None,
            loading,
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some() && self.user.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(User::is_admin)
    }

    /// Eager identity lookup for a persisted credential. A failed lookup is
    /// an implicit logout; there is no retry.
    #[instrument(skip(self))]
    pub async fn restore(&mut self) {
        if self.token.is_none() {
            self.loading = false;
            return;
        }
        self.loading = true;
        match self.api.current_user().await {
            Ok(user) => {
                info!(user_id = %user.id, role = %user.role, "session restored");
                self.user = Some(user);
            }
            Err(e) if e.is_unauthorized() => {
                warn!(error = %e, "persisted credential rejected; signing out");
                self.clear();
            }
            Err(e) => {
                warn!(error = %e, "identity lookup failed; signing out");
                self.clear();
            }
        }
        self.loading = false;
    }

    #[instrument(skip(self, toasts, password))]
    pub async fn login(&mut self, toasts: &Toaster, email: &str, password: &str) -> ApiResult<()> {
        let result = self.api.login(email, password).await;
        self.finish_auth(toasts, result, "Login successful!", "Login failed")
    }

    #[instrument(skip(self, toasts, password))]
    pub async fn register(
        &mut self,
        toasts: &Toaster,
        name: &str,
        email: &str,
        password: &str,
    ) -> ApiResult<()> {
        let result = self.api.register(name, email, password).await;
        self.finish_auth(toasts, result, "Registration successful!", "Registration failed")
    }

    /// Obtains a provider token out-of-band and exchanges it with the backend.
    #[instrument(skip_all)]
    pub async fn login_with_identity_provider(
        &mut self,
        toasts: &Toaster,
        provider: &dyn IdentityProvider,
    ) -> ApiResult<()> {
        let token = match provider.obtain_token().await {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "identity provider did not return a token");
                toasts.error("Google login failed");
                return Err(ApiError::Invalid(e.to_string()));
            }
        };
        let result = self.api.exchange_identity_token(&token).await;
        match result {
            // The provider flow only ever reports a generic failure.
            Err(e) => {
                toasts.error("Google login failed");
                Err(e)
            }
            ok => self.finish_auth(toasts, ok, "Google login successful!", "Google login failed"),
        }
    }

    /// Clears credential, user and request header. No backend call.
    pub fn logout(&mut self, toasts: &Toaster) {
        self.clear();
        info!("logged out");
        toasts.success("Logged out successfully");
    }

    fn finish_auth(
        &mut self,
        toasts: &Toaster,
        result: ApiResult<AuthResponse>,
        success: &str,
        fallback: &str,
    ) -> ApiResult<()> {
        match result {
            Ok(auth) if !auth.access_token.is_empty() => {
                self.establish(auth);
                toasts.success(success);
                Ok(())
            }
            Ok(_) => {
                toasts.error(fallback);
                Err(ApiError::Invalid("backend issued an empty credential".into()))
            }
            Err(e) => {
                toasts.error(e.user_message(fallback));
                Err(e)
            }
        }
    }

    fn establish(&mut self, auth: AuthResponse) {
        if let Err(e) = self.store.save(&auth.access_token) {
            warn!(error = %e, "could not persist credential; session lasts for this process only");
        }
        self.api.set_bearer(Some(auth.access_token.clone()));
        info!(user_id = %auth.user.id, role = %auth.user.role, "signed in");
        self.token = Some(auth.access_token);
        self.user = Some(auth.user);
        self.loading = false;
    }

    fn clear(&mut self) {
        self.token = None;
        self.user = None;
        self.api.set_bearer(None);
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "could not remove persisted credential");
        }
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("api", &self.api)
            .field("user", &self.user.as_ref().map(|u| &u.email))
            .field("loading", &self.loading)
            .finish()
    }
}
