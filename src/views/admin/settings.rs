use std::fmt::Write;

use tracing::{info, instrument, warn};

use crate::models::SmtpSettings;
use crate::views::ViewContext;

/// Outgoing mail configuration form.
#[derive(Debug, Clone, Default)]
pub struct SettingsTab {
    form: SmtpSettings,
}

impl SettingsTab {
    /// Prefills from the backend; the built-in defaults stand in when the
    /// fetch fails.
    pub async fn mount(ctx: ViewContext<'_>) -> Self {
        match ctx.api().smtp_settings().await {
            Ok(form) => Self { form },
            Err(e) => {
                warn!(error = %e, "smtp settings fetch failed; using defaults");
                Self::default()
            }
        }
    }

    pub fn form(&self) -> &SmtpSettings {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut SmtpSettings {
        &mut self.form
    }

    /// Posts the whole record.
    #[instrument(skip_all, fields(host = %self.form.host))]
    pub async fn save(&self, ctx: ViewContext<'_>) -> bool {
        match ctx.api().update_smtp_settings(&self.form).await {
            Ok(()) => {
                info!("smtp settings saved");
                ctx.toasts.success("SMTP settings updated successfully");
                true
            }
            Err(e) => {
                warn!(error = %e, "smtp settings update failed");
                ctx.toasts.error("Failed to update SMTP settings");
                false
            }
        }
    }

    pub fn render(&self) -> String {
        let f = &self.form;
        let mut out = String::from("SMTP Settings\n\n");
        let _ = writeln!(out, "Mailer Name: {}", f.mailer_name);
        let _ = writeln!(out, "Host:        {}", f.host);
        let _ = writeln!(out, "Port:        {}", f.port);
        let _ = writeln!(out, "Username:    {}", f.username);
        let _ = writeln!(out, "Email:       {}", f.email);
        let _ = writeln!(out, "Encryption:  {}", f.encryption);
        let _ = writeln!(
            out,
            "Password:    {}",
            if f.password.is_empty() { "(not set)" } else { "********" }
        );
        out
    }
}
