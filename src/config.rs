use std::path::PathBuf;

use anyhow::Context;
use directories::ProjectDirs;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend_url: String,
    pub api_prefix: String,
    pub session_dir: PathBuf,
    pub provider_token: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let backend_url =
            std::env::var("BACKEND_URL").unwrap_or_else(|_| "http://localhost:8001".into());
        let api_prefix = std::env::var("API_PREFIX").unwrap_or_else(|_| "/api".into());
        let session_dir = match std::env::var("VIBRANT_SESSION_DIR") {
            Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
            _ => default_session_dir()?,
        };
        let provider_token = std::env::var("VIBRANT_PROVIDER_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());
        Ok(Self {
            backend_url,
            api_prefix,
            session_dir,
            provider_token,
        })
    }

    /// Backend URL joined with the API prefix, always ending in `/`.
    pub fn api_base(&self) -> String {
        join_base(&self.backend_url, &self.api_prefix)
    }
}

fn default_session_dir() -> anyhow::Result<PathBuf> {
    let dirs = ProjectDirs::from("in", "vibrantyoga", "vibrant")
        .context("could not determine a config directory; set VIBRANT_SESSION_DIR")?;
    Ok(dirs.config_dir().to_path_buf())
}

pub(crate) fn join_base(backend_url: &str, prefix: &str) -> String {
    let host = backend_url.trim_end_matches('/');
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        format!("{host}/")
    } else {
        format!("{host}/{prefix}/")
    }
}
