//! Channel traits and the notification dispatcher.

use std::future::Future;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use postboard_shared::EmailService;

use super::error::NotificationError;
use super::types::{
    Channel, MailMessage, NewNotification, Notification, Recipient, StoredNotification,
};

/// Sends mail.
pub trait MailChannel: Send + Sync + 'static {
    /// Send a message to the recipient.
    fn send(
        &self,
        recipient: &Recipient,
        message: &MailMessage,
    ) -> impl Future<Output = Result<(), NotificationError>> + Send;
}

/// Stores notifications for in-app display.
pub trait DatabaseChannel: Send + Sync + 'static {
    /// Store a notification.
    fn store(
        &self,
        notification: NewNotification,
    ) -> impl Future<Output = Result<StoredNotification, NotificationError>> + Send;
}

impl MailChannel for EmailService {
    async fn send(
        &self,
        recipient: &Recipient,
        message: &MailMessage,
    ) -> Result<(), NotificationError> {
        self.send_email(&recipient.email, &message.subject, &message.render_text())
            .await
            .map_err(|e| NotificationError::mail(e.to_string()))
    }
}

/// Outcome of delivering one notification.
#[derive(Debug, Default)]
pub struct DeliveryReport {
    /// Channels that succeeded.
    pub delivered: Vec<Channel>,
    /// Channels that failed, with their error.
    pub failed: Vec<(Channel, NotificationError)>,
}

impl DeliveryReport {
    /// Whether every channel succeeded.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Delivers notifications over mail and the database.
pub struct Notifier<M: MailChannel, D: DatabaseChannel> {
    mail: Arc<M>,
    database: Arc<D>,
}

impl<M: MailChannel, D: DatabaseChannel> Clone for Notifier<M, D> {
    fn clone(&self) -> Self {
        Self {
            mail: Arc::clone(&self.mail),
            database: Arc::clone(&self.database),
        }
    }
}

impl<M: MailChannel, D: DatabaseChannel> Notifier<M, D> {
    /// Create a notifier.
    pub fn new(mail: Arc<M>, database: Arc<D>) -> Self {
        Self { mail, database }
    }

    /// Deliver over every channel of the notification, in order.
    ///
    /// A failing channel does not stop the ones after it.
    pub async fn deliver<N: Notification>(
        &self,
        recipient: &Recipient,
        notification: &N,
    ) -> DeliveryReport {
        let mut report = DeliveryReport::default();

        for channel in notification.via() {
            let result = match channel {
                Channel::Mail => self.mail.send(recipient, &notification.to_mail()).await,
                Channel::Database => self
                    .database
                    .store(NewNotification {
                        notifiable_id: recipient.id,
                        kind: notification.kind().to_string(),
                        data: notification.to_database(),
                    })
                    .await
                    .map(|_| ()),
            };

            match result {
                Ok(()) => report.delivered.push(channel),
                Err(e) => {
                    warn!(
                        recipient_id = %recipient.id,
                        kind = notification.kind(),
                        channel = ?channel,
                        error = %e,
                        "Notification channel failed"
                    );
                    report.failed.push((channel, e));
                }
            }
        }

        report
    }

    /// Deliver on a background task.
    pub fn dispatch<N: Notification>(
        &self,
        recipient: Recipient,
        notification: N,
    ) -> JoinHandle<DeliveryReport> {
        let notifier = self.clone();
        tokio::spawn(async move {
            let report = notifier.deliver(&recipient, &notification).await;
            info!(
                recipient_id = %recipient.id,
                kind = notification.kind(),
                delivered = report.delivered.len(),
                failed = report.failed.len(),
                "Notification dispatched"
            );
            report
        })
    }
}
