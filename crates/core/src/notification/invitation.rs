//! Notification sent when a user's group invitation is approved.

use serde_json::json;

use super::types::{Channel, MailMessage, Notification};

/// Group the user joined.
#[derive(Debug, Clone)]
pub struct GroupRef {
    /// Display name.
    pub name: String,
    /// URL slug of the group profile page.
    pub slug: String,
}

/// User who joined.
#[derive(Debug, Clone)]
pub struct UserRef {
    /// Display name.
    pub name: String,
}

/// A user joined a group.
#[derive(Debug, Clone)]
pub struct InvitationApproved {
    group: GroupRef,
    user: UserRef,
    group_url: String,
}

impl InvitationApproved {
    /// Build the notification. `app_url` is the public base URL.
    #[must_use]
    pub fn new(group: GroupRef, user: UserRef, app_url: &str) -> Self {
        let group_url = format!("{}/groups/{}", app_url.trim_end_matches('/'), group.slug);
        Self {
            group,
            user,
            group_url,
        }
    }

    /// Group profile URL.
    #[must_use]
    pub fn group_url(&self) -> &str {
        &self.group_url
    }

    fn text(&self) -> String {
        format!(
            "User \"{}\" joined group \"{}\"",
            self.user.name, self.group.name
        )
    }
}

impl Notification for InvitationApproved {
    fn kind(&self) -> &'static str {
        "invitation_approved"
    }

    fn via(&self) -> Vec<Channel> {
        vec![Channel::Mail, Channel::Database]
    }

    fn to_mail(&self) -> MailMessage {
        MailMessage::new("User joined group")
            .line(self.text())
            .action("Show group", &self.group_url)
    }

    fn to_database(&self) -> serde_json::Value {
        json!({
            "message": self.text(),
            "post_url": self.group_url,
        })
    }
}
