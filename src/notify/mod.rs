//! Customer notification layer.
//!
//! A status change produces at most one outbound WhatsApp message, built
//! from a per-status template and sent to the customer's normalized phone
//! number through an HTTP gateway. Delivery is best-effort: the outcome is
//! recorded and returned, but a failure never touches the persisted order.

/// Outcome-recording dispatch of status change notifications
pub mod dispatcher;
/// The messaging HTTP gateway and its trait
pub mod gateway;
/// Per-status customer message templates
pub mod message;
/// Phone number normalization and validation
pub mod phone;

pub use dispatcher::{Dispatcher, NotificationOutcome, update_status_notified};
pub use gateway::{MessageGateway, SmartSmsGateway};
pub use message::notification_message;
pub use phone::normalize_phone;
