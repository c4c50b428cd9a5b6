//! Notification dispatch on status changes.
//!
//! Dispatching happens after the status change has been persisted and never
//! affects it: the dispatcher returns a recorded outcome instead of an
//! error, and a delivery failure leaves the already-committed order exactly
//! as it was. Every attempt is appended to the notification log so the
//! best-effort, at-most-once contract can be audited later.

use crate::{
    core::auth::Identity,
    core::install::status_of,
    core::lifecycle::{InstallStatus, StatusChange},
    entities::{Notification, install, notification},
    errors::{Error, Result},
    notify::{gateway::MessageGateway, message::notification_message, phone::normalize_phone},
};
use chrono::Utc;
use sea_orm::{DatabaseConnection, QueryOrder, Set, prelude::*};
use tracing::{debug, info, warn};

/// What happened to one notification attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NotificationOutcome {
    /// The gateway accepted the message
    Sent,
    /// Nothing was sent and nothing needed to be: the status does not
    /// notify, or it did not actually change
    Skipped {
        /// Why the attempt was skipped
        reason: String,
    },
    /// The message could not be delivered; the status change stands
    Failed {
        /// Phone validation or transport failure detail
        reason: String,
    },
}

impl NotificationOutcome {
    /// Stable string encoding used in the `notifications.outcome` column.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Skipped { .. } => "skipped",
            Self::Failed { .. } => "failed",
        }
    }

    /// Whether the gateway accepted the message.
    #[must_use]
    pub const fn is_sent(&self) -> bool {
        matches!(self, Self::Sent)
    }

    fn detail(&self) -> Option<String> {
        match self {
            Self::Sent => None,
            Self::Skipped { reason } | Self::Failed { reason } => Some(reason.clone()),
        }
    }
}

/// Builds and delivers status change messages through a gateway.
pub struct Dispatcher<G> {
    gateway: G,
}

impl<G: MessageGateway> Dispatcher<G> {
    /// Creates a dispatcher over the given gateway.
    pub const fn new(gateway: G) -> Self {
        Self { gateway }
    }

    /// Notifies the customer of an install's status change.
    ///
    /// Returns the recorded outcome; this method never fails. The attempt is
    /// appended to the notification log, and a failure to write the log is
    /// itself only logged.
    pub async fn dispatch(
        &self,
        db: &DatabaseConnection,
        old_status: InstallStatus,
        install: &install::Model,
    ) -> NotificationOutcome {
        let (outcome, recipient) = self.attempt(old_status, install).await;

        match &outcome {
            NotificationOutcome::Sent => {
                info!(install_id = install.id, status = %install.status, "customer notified");
            }
            NotificationOutcome::Skipped { reason } => {
                debug!(install_id = install.id, %reason, "notification skipped");
            }
            NotificationOutcome::Failed { reason } => {
                warn!(install_id = install.id, %reason, "customer notification failed");
            }
        }

        let entry = notification::ActiveModel {
            install_id: Set(install.id),
            status: Set(install.status.clone()),
            recipient: Set(recipient),
            outcome: Set(outcome.as_str().to_string()),
            detail: Set(outcome.detail()),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        if let Err(error) = entry.insert(db).await {
            warn!(install_id = install.id, %error, "failed to record notification outcome");
        }

        outcome
    }

    async fn attempt(
        &self,
        old_status: InstallStatus,
        install: &install::Model,
    ) -> (NotificationOutcome, String) {
        let new_status = match status_of(install) {
            Ok(status) => status,
            Err(error) => {
                return (
                    NotificationOutcome::Failed {
                        reason: error.to_string(),
                    },
                    String::new(),
                );
            }
        };

        if new_status == old_status {
            return (
                NotificationOutcome::Skipped {
                    reason: "status unchanged".to_string(),
                },
                String::new(),
            );
        }

        let Some(message) = notification_message(new_status, install) else {
            return (
                NotificationOutcome::Skipped {
                    reason: format!("no message defined for status {new_status}"),
                },
                String::new(),
            );
        };

        // Malformed numbers fail here, before any network call.
        let recipient = match normalize_phone(&install.customer_phone) {
            Ok(number) => number,
            Err(error) => {
                return (
                    NotificationOutcome::Failed {
                        reason: error.to_string(),
                    },
                    String::new(),
                );
            }
        };

        match self.gateway.send(&recipient, &message).await {
            Ok(()) => (NotificationOutcome::Sent, recipient),
            Err(error) => (
                NotificationOutcome::Failed {
                    reason: error.to_string(),
                },
                recipient,
            ),
        }
    }
}

/// Applies a status change and then notifies the customer.
///
/// This is the commit-then-notify composition: the database change fully
/// resolves first, and the notification outcome, whatever it is, cannot roll
/// it back. A rejected status change returns an error without attempting
/// any delivery.
pub async fn update_status_notified<G: MessageGateway>(
    db: &DatabaseConnection,
    dispatcher: &Dispatcher<G>,
    actor: &Identity,
    install_id: i64,
    change: StatusChange,
    note_text: Option<String>,
) -> Result<(install::Model, NotificationOutcome)> {
    let before = crate::core::install::get_install(db, install_id)
        .await?
        .ok_or(Error::NotFound {
            entity: "install",
            id: install_id,
        })?;
    let old_status = status_of(&before)?;

    let updated =
        crate::core::install::update_status(db, actor, install_id, change, note_text).await?;
    let outcome = dispatcher.dispatch(db, old_status, &updated).await;
    Ok((updated, outcome))
}

/// Lists the notification log for an install, oldest first.
pub async fn list_notifications(
    db: &DatabaseConnection,
    install_id: i64,
) -> Result<Vec<notification::Model>> {
    Notification::find()
        .filter(notification::Column::InstallId.eq(install_id))
        .order_by_asc(notification::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}
