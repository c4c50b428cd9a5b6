//! Install lifecycle engine - The order status state machine and its
//! derived financial values.
//!
//! An install moves through a fixed lifecycle: new order, device shipped,
//! installation scheduled, completed, payment pending approval, and finally
//! payment received or cancelled. Each transition that needs extra data
//! carries that data in its [`StatusChange`] variant, so an under-specified
//! status write (for example marking a device shipped without an IMEI) is
//! unrepresentable rather than merely rejected. The travel expense approval
//! is an orthogonal sub-transition handled by the install operations module
//! and validated here.

use crate::errors::{Error, Result};
use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of an install order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum InstallStatus {
    /// Order recorded, device not yet shipped
    NewOrder,
    /// Device handed to a courier, shipping details captured
    DeviceShipped,
    /// Installation visit scheduled with the customer
    InstallationScheduled,
    /// Installation done, travel expense submitted as pending
    Completed,
    /// Waiting for the admin to confirm the customer's payment
    PaymentPendingApproval,
    /// Payment confirmed by the admin; terminal
    PaymentReceived,
    /// Order cancelled; terminal
    Cancelled,
}

/// All statuses in lifecycle order, used for filter dropdowns and tests.
pub const ALL_STATUSES: [InstallStatus; 7] = [
    InstallStatus::NewOrder,
    InstallStatus::DeviceShipped,
    InstallStatus::InstallationScheduled,
    InstallStatus::Completed,
    InstallStatus::PaymentPendingApproval,
    InstallStatus::PaymentReceived,
    InstallStatus::Cancelled,
];

impl InstallStatus {
    /// Stable string encoding used in the `installs.status` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NewOrder => "new_order",
            Self::DeviceShipped => "device_shipped",
            Self::InstallationScheduled => "installation_scheduled",
            Self::Completed => "completed",
            Self::PaymentPendingApproval => "payment_pending_approval",
            Self::PaymentReceived => "payment_received",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether no further transitions are possible from this status.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::PaymentReceived | Self::Cancelled)
    }

    /// The statuses reachable from this one.
    ///
    /// This is the transition table of the state machine. Cancellation is
    /// offered between shipping and completion; once payment approval is
    /// pending, the only way forward is the admin recording the payment.
    #[must_use]
    pub const fn allowed_transitions(self) -> &'static [Self] {
        match self {
            Self::NewOrder => &[Self::DeviceShipped],
            Self::DeviceShipped => &[Self::InstallationScheduled, Self::Cancelled],
            Self::InstallationScheduled => &[Self::Completed, Self::Cancelled],
            Self::Completed => &[Self::PaymentPendingApproval, Self::Cancelled],
            Self::PaymentPendingApproval => &[Self::PaymentReceived],
            Self::PaymentReceived | Self::Cancelled => &[],
        }
    }

    /// Whether the state machine allows moving from this status to `to`.
    #[must_use]
    pub fn can_transition_to(self, to: Self) -> bool {
        self.allowed_transitions().contains(&to)
    }
}

impl fmt::Display for InstallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InstallStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "new_order" => Ok(Self::NewOrder),
            "device_shipped" => Ok(Self::DeviceShipped),
            "installation_scheduled" => Ok(Self::InstallationScheduled),
            "completed" => Ok(Self::Completed),
            "payment_pending_approval" => Ok(Self::PaymentPendingApproval),
            "payment_received" => Ok(Self::PaymentReceived),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(Error::Validation {
                message: format!("unknown install status: {other}"),
            }),
        }
    }
}

/// Kind of GPS tracker device being installed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DeviceType {
    /// Device with a voice/call capability
    Voice,
    /// Data-only device
    NonVoice,
}

impl DeviceType {
    /// Stable string encoding used in the `installs.device_type` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Voice => "Voice",
            Self::NonVoice => "Non-Voice",
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Voice" => Ok(Self::Voice),
            "Non-Voice" => Ok(Self::NonVoice),
            other => Err(Error::Validation {
                message: format!("unknown device type: {other}"),
            }),
        }
    }
}

/// Approval state of a submitted travel expense.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExpenseStatus {
    /// Submitted by the technician, awaiting admin approval
    Pending,
    /// Approved by the admin and deducted from the amount due
    Approved,
}

impl ExpenseStatus {
    /// Stable string encoding used in the `installs.expense_status` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
        }
    }
}

impl fmt::Display for ExpenseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExpenseStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            other => Err(Error::Validation {
                message: format!("unknown expense status: {other}"),
            }),
        }
    }
}

/// A requested status change together with the data the transition captures.
#[derive(Clone, Debug, PartialEq)]
pub enum StatusChange {
    /// Mark the device as shipped. Shipping details are mandatory here:
    /// a bare status change to `DeviceShipped` cannot be expressed.
    Ship {
        /// Device IMEI
        imei: String,
        /// Courier service the device was handed to
        courier_service: String,
        /// Kind of device shipped
        device_type: DeviceType,
    },
    /// Schedule the installation visit
    Schedule {
        /// Agreed date and time of the visit
        at: DateTime<Utc>,
    },
    /// Mark the installation as done and submit the travel expense as pending
    Complete {
        /// Travel expense claimed by the technician
        travel_expense: f64,
    },
    /// Hand the completed job over for payment approval
    SubmitForPayment,
    /// Record the customer's payment; admin-only
    ApprovePayment {
        /// Amount actually received from the customer
        amount_received: f64,
    },
    /// Cancel the order
    Cancel,
}

impl StatusChange {
    /// The status this change moves the install to.
    #[must_use]
    pub const fn target(&self) -> InstallStatus {
        match self {
            Self::Ship { .. } => InstallStatus::DeviceShipped,
            Self::Schedule { .. } => InstallStatus::InstallationScheduled,
            Self::Complete { .. } => InstallStatus::Completed,
            Self::SubmitForPayment => InstallStatus::PaymentPendingApproval,
            Self::ApprovePayment { .. } => InstallStatus::PaymentReceived,
            Self::Cancel => InstallStatus::Cancelled,
        }
    }

    /// Validates the captured data without touching any install.
    ///
    /// Rejects empty shipping fields and negative or non-finite amounts.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Ship {
                imei,
                courier_service,
                ..
            } => {
                if imei.trim().is_empty() {
                    return Err(Error::Validation {
                        message: "IMEI is required to mark a device as shipped".to_string(),
                    });
                }
                if courier_service.trim().is_empty() {
                    return Err(Error::Validation {
                        message: "Courier service is required to mark a device as shipped"
                            .to_string(),
                    });
                }
                Ok(())
            }
            Self::Complete { travel_expense } => validate_amount(*travel_expense),
            Self::ApprovePayment { amount_received } => validate_amount(*amount_received),
            Self::Schedule { .. } | Self::SubmitForPayment | Self::Cancel => Ok(()),
        }
    }
}

/// Validates a monetary amount: must be finite and non-negative.
pub fn validate_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(Error::InvalidAmount { amount });
    }
    Ok(())
}

/// Checks a requested change against the current status and its own data.
///
/// Returns the target status when both the captured data and the transition
/// table allow the change. Nothing is persisted on failure.
pub fn check_transition(from: InstallStatus, change: &StatusChange) -> Result<InstallStatus> {
    change.validate()?;
    let to = change.target();
    if !from.can_transition_to(to) {
        return Err(Error::InvalidTransition { from, to });
    }
    Ok(to)
}

/// Computes the net amount owed on an install.
///
/// `approved_expense` is the travel expense amount when (and only when) the
/// expense has been approved; pending expenses do not reduce the amount due.
/// Pure and idempotent: recomputing never drifts, which is why the value is
/// derived on demand instead of stored.
#[must_use]
pub fn amount_due(product_price: f64, technician_fee: f64, approved_expense: Option<f64>) -> f64 {
    product_price - technician_fee - approved_expense.unwrap_or(0.0)
}
