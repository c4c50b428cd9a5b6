//! Dashboard metric computations.
//!
//! The admin dashboard and the technician panel both show a small set of
//! headline numbers derived from the install list. Like the amount due,
//! these are always recomputed from the records rather than stored.

use crate::{
    core::install::amount_due_for,
    core::lifecycle::{ExpenseStatus, InstallStatus},
    entities::{Install, install},
    errors::Result,
};
use sea_orm::{DatabaseConnection, prelude::*};

/// Headline numbers for the admin dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardMetrics {
    /// Total number of orders ever recorded
    pub total_installs: usize,
    /// Orders that reached Completed or PaymentReceived
    pub completed_installs: usize,
    /// Sum of the amount due over orders awaiting payment
    pub pending_amount: f64,
}

/// Headline numbers for one technician's panel.
#[derive(Debug, Clone, PartialEq)]
pub struct TechnicianMetrics {
    /// Assignments that are still in flight
    pub pending_jobs: usize,
    /// Sum of travel expense claims awaiting approval
    pub pending_expense: f64,
}

/// Computes the admin dashboard metrics over all installs.
///
/// `pending_amount` covers orders in Completed or PaymentPendingApproval:
/// work is done but the money has not been confirmed yet.
pub async fn dashboard_metrics(db: &DatabaseConnection) -> Result<DashboardMetrics> {
    let installs = Install::find().all(db).await?;

    let mut completed_installs = 0;
    let mut pending_amount = 0.0;
    for install in &installs {
        let status: InstallStatus = install.status.parse()?;
        if matches!(
            status,
            InstallStatus::Completed | InstallStatus::PaymentReceived
        ) {
            completed_installs += 1;
        }
        if matches!(
            status,
            InstallStatus::Completed | InstallStatus::PaymentPendingApproval
        ) {
            pending_amount += amount_due_for(install);
        }
    }

    Ok(DashboardMetrics {
        total_installs: installs.len(),
        completed_installs,
        pending_amount,
    })
}

/// Computes one technician's panel metrics over their assignments.
pub async fn technician_metrics(
    db: &DatabaseConnection,
    technician_id: i64,
) -> Result<TechnicianMetrics> {
    let assigned = Install::find()
        .filter(install::Column::TechnicianId.eq(technician_id))
        .all(db)
        .await?;

    let mut pending_jobs = 0;
    let mut pending_expense = 0.0;
    for install in &assigned {
        let status: InstallStatus = install.status.parse()?;
        if !matches!(
            status,
            InstallStatus::Completed | InstallStatus::PaymentReceived | InstallStatus::Cancelled
        ) {
            pending_jobs += 1;
        }
        if install.expense_status.as_deref() == Some(ExpenseStatus::Pending.as_str()) {
            pending_expense += install.expense_amount.unwrap_or(0.0);
        }
    }

    Ok(TechnicianMetrics {
        pending_jobs,
        pending_expense,
    })
}
