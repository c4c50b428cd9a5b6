//! Status change message templates.
//!
//! Five of the seven statuses carry a customer-facing message; a fresh order
//! and the internal payment-approval handover do not notify anyone.

use crate::{core::lifecycle::InstallStatus, entities::install};

/// Builds the customer message for a status, or `None` when that status does
/// not notify.
///
/// The scheduled installation time is rendered in a human-readable form;
/// when the record somehow lacks one the message falls back to "soon"
/// rather than failing the whole dispatch.
#[must_use]
pub fn notification_message(status: InstallStatus, install: &install::Model) -> Option<String> {
    let customer = &install.customer_name;
    match status {
        InstallStatus::DeviceShipped => {
            let courier = install.courier_service.as_deref().unwrap_or("courier");
            let imei = install.imei.as_deref().unwrap_or("unknown");
            Some(format!(
                "Dear {customer}, your GPS tracker has been shipped via \"{courier}\". \
                 IMEI: {imei}. Our technician will contact you shortly. Thank you."
            ))
        }
        InstallStatus::InstallationScheduled => {
            let when = install.installation_at.map_or_else(
                || "soon".to_string(),
                |at| at.format("%d %B %Y at %I:%M %p").to_string(),
            );
            Some(format!(
                "Dear {customer}, your GPS tracker installation has been scheduled for {when}. \
                 Our technician will contact you. Thank you."
            ))
        }
        InstallStatus::Completed => Some(format!(
            "Dear {customer}, your GPS tracker installation has been completed successfully. \
             Thank you for using our service."
        )),
        InstallStatus::PaymentReceived => Some(format!(
            "Dear {customer}, we have received your payment. Your GPS tracker service is now \
             fully active. Thank you."
        )),
        InstallStatus::Cancelled => Some(format!(
            "Dear {customer}, we are sorry, your GPS tracker order (ID: {}) has been cancelled. \
             Please contact us for more information.",
            install.id
        )),
        InstallStatus::NewOrder | InstallStatus::PaymentPendingApproval => None,
    }
}
