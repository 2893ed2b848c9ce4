//! User notifications delivered over mail and the database.
//!
//! A [`Notification`] renders itself per [`Channel`]. The [`Notifier`]
//! sends it over every channel it asks for, in order. Delivery runs on a
//! background task so a failing mail relay never fails the request that
//! triggered it.

mod dispatcher;
mod error;
mod invitation;
mod types;

pub use dispatcher::{DatabaseChannel, DeliveryReport, MailChannel, Notifier};
pub use error::NotificationError;
pub use invitation::{GroupRef, InvitationApproved, UserRef};
pub use types::{
    Channel, MailAction, MailMessage, NewNotification, Notification, Recipient,
    StoredNotification,
};
