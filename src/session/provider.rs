use async_trait::async_trait;

/// Source of a third-party identity token (the "Sign in with Google" popup
/// in a browser). The token is exchanged with the backend for a session
/// credential; this crate never verifies it.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn obtain_token(&self) -> anyhow::Result<String>;
}

/// Provider whose token was obtained out-of-band and handed to the process
/// (flag or environment).
#[derive(Debug, Clone, Default)]
pub struct StaticTokenProvider {
    token: Option<String>,
}

impl StaticTokenProvider {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token.filter(|t| !t.trim().is_empty()),
        }
    }
}

#[async_trait]
impl IdentityProvider for StaticTokenProvider {
    async fn obtain_token(&self) -> anyhow::Result<String> {
        self.token
            .clone()
            .ok_or_else(|| anyhow::anyhow!("no identity provider token configured"))
    }
}
