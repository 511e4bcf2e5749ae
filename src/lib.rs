//! Client for the Vibrant Yoga class booking platform: a typed API client,
//! the session it runs under, the route guard and one controller per page.

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod notify;
pub mod router;
pub mod session;
pub mod views;

pub use api::ApiClient;
pub use error::{ApiError, ApiResult};
pub use notify::Toaster;
pub use session::SessionManager;
