use std::fmt::Write;

use tracing::{info, instrument, warn};

use crate::models::{timestamp, User, UserRole};
use crate::views::{truncate, ViewContext};

#[derive(Debug, Clone, Default)]
pub struct UsersTab {
    users: Vec<User>,
}

impl UsersTab {
    pub async fn mount(ctx: ViewContext<'_>) -> Self {
        let mut tab = Self::default();
        tab.refresh(ctx).await;
        tab
    }

    async fn refresh(&mut self, ctx: ViewContext<'_>) {
        match ctx.api().list_users().await {
            Ok(users) => self.users = users,
            Err(e) => {
                warn!(error = %e, "user list fetch failed");
                ctx.toasts.error("Failed to fetch users");
                self.users.clear();
            }
        }
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    /// Submits the role selector immediately. Picking the current role is
    /// not a change and sends nothing.
    #[instrument(skip(self, ctx))]
    pub async fn change_role(&mut self, ctx: ViewContext<'_>, user_id: &str, role: UserRole) -> bool {
        if self
            .users
            .iter()
            .any(|u| u.id == user_id && u.role == role)
        {
            return false;
        }
        match ctx.api().update_user_role(user_id, role).await {
            Ok(()) => {
                info!("user role updated");
                ctx.toasts.success("User role updated successfully");
                self.refresh(ctx).await;
                true
            }
            Err(e) => {
                warn!(error = %e, "user role update failed");
                ctx.toasts.error("Failed to update user role");
                false
            }
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::from("Users Management\n\n");
        if self.users.is_empty() {
            out.push_str("No users.\n");
            return out;
        }
        let active = self.users.iter().filter(|u| u.is_active()).count();
        let _ = writeln!(out, "{} users, {active} active\n", self.users.len());
        let _ = writeln!(
            out,
            "{:<36} {:<20} {:<28} {:<6} {:<8} JOINED",
            "ID", "NAME", "EMAIL", "ROLE", "STATUS"
        );
        for u in &self.users {
            let joined = u
                .created_at
                .as_ref()
                .map(timestamp::display_date)
                .unwrap_or_else(|| "-".into());
            let _ = writeln!(
                out,
                "{:<36} {:<20} {:<28} {:<6} {:<8} {}",
                u.id,
                truncate(&u.name, 20),
                truncate(&u.email, 28),
                u.role.as_str(),
                u.status,
                joined
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_shows_role_and_status() {
        let tab = UsersTab {
            users: vec![User {
                id: "admin_user_id".into(),
                name: "Admin".into(),
                email: "admin@vibrantyoga.com".into(),
                role: UserRole::Admin,
                status: "active".into(),
                created_at: None,
            }],
        };
        let text = tab.render();
        assert!(text.contains("admin@vibrantyoga.com"));
        assert!(text.contains("admin "));
        assert!(text.contains("active"));
    }
}
