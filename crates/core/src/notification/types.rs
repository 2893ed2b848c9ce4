//! Notification types.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Delivery channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Email through SMTP.
    Mail,
    /// Row in the notifications table.
    Database,
}

/// The user a notification is sent to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    /// User ID, stored as the notifiable.
    pub id: Uuid,
    /// Email address.
    pub email: String,
    /// Display name.
    pub name: String,
}

/// Call-to-action link in a mail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailAction {
    /// Button text.
    pub text: String,
    /// Target URL.
    pub url: String,
}

/// Mail representation of a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    /// Subject line.
    pub subject: String,
    /// Paragraphs.
    pub lines: Vec<String>,
    /// Optional action link.
    pub action: Option<MailAction>,
}

impl MailMessage {
    /// Start a message with a subject.
    #[must_use]
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            lines: Vec::new(),
            action: None,
        }
    }

    /// Append a paragraph.
    #[must_use]
    pub fn line(mut self, line: impl Into<String>) -> Self {
        self.lines.push(line.into());
        self
    }

    /// Set the action link.
    #[must_use]
    pub fn action(mut self, text: impl Into<String>, url: impl Into<String>) -> Self {
        self.action = Some(MailAction {
            text: text.into(),
            url: url.into(),
        });
        self
    }

    /// Render the plain-text body.
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut parts = self.lines.clone();
        if let Some(action) = &self.action {
            parts.push(format!("{}: {}", action.text, action.url));
        }
        parts.join("\n\n")
    }
}

/// Something that can be delivered to a user.
pub trait Notification: Send + Sync + 'static {
    /// Type tag stored with database notifications.
    fn kind(&self) -> &'static str;

    /// Channels to deliver over, in order.
    fn via(&self) -> Vec<Channel>;

    /// Mail representation.
    fn to_mail(&self) -> MailMessage;

    /// Payload stored in the database.
    fn to_database(&self) -> serde_json::Value;
}

/// Row data for a database notification.
#[derive(Debug, Clone)]
pub struct NewNotification {
    /// Receiving user.
    pub notifiable_id: Uuid,
    /// Type tag.
    pub kind: String,
    /// Payload.
    pub data: serde_json::Value,
}

/// A persisted notification.
#[derive(Debug, Clone, Serialize)]
pub struct StoredNotification {
    /// Unique identifier.
    pub id: Uuid,
    /// Receiving user.
    pub notifiable_id: Uuid,
    /// Type tag.
    #[serde(rename = "type")]
    pub kind: String,
    /// Payload.
    pub data: serde_json::Value,
    /// When the user read it.
    pub read_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_text_with_action() {
        let message = MailMessage::new("Hi")
            .line("First")
            .line("Second")
            .action("Open", "https://example.com");

        assert_eq!(
            message.render_text(),
            "First\n\nSecond\n\nOpen: https://example.com"
        );
    }

    #[test]
    fn test_render_text_without_action() {
        let message = MailMessage::new("Hi").line("Only line");
        assert_eq!(message.render_text(), "Only line");
    }
}
