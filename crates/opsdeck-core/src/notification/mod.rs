//! Notification domain module.
//!
//! - `model`: the notification record and its kind
//! - `log`: most-recent-first list with an incrementally maintained unread counter

mod log;
mod model;

pub use log::NotificationLog;
pub use model::{NewNotification, Notification, NotificationKind};
