//! Install business logic - Handles all install-order operations.
//!
//! This module provides functions for creating and querying install orders,
//! moving them through the lifecycle state machine, approving travel
//! expenses, and appending notes. Status changes are applied inside a
//! database transaction so a rejected transition never leaves partial state.
//! The derived amount due is recomputed on demand and never stored on the
//! order itself.

use crate::{
    core::auth::Identity,
    core::lifecycle::{self, ExpenseStatus, InstallStatus, StatusChange},
    entities::{Install, install, note},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{Condition, QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::info;

/// Fields collected when the admin records a new order.
#[derive(Clone, Debug)]
pub struct NewInstall {
    /// Customer name
    pub customer_name: String,
    /// Customer phone number
    pub customer_phone: String,
    /// Customer address
    pub customer_address: String,
    /// Price of the device
    pub product_price: f64,
    /// Technician assigned to the job; must exist
    pub technician_id: i64,
    /// Fee owed to the technician
    pub technician_fee: f64,
}

/// Sort order for install listings.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Most recent orders first (the default)
    #[default]
    NewestFirst,
    /// Oldest orders first
    OldestFirst,
}

/// Filter bar state for the admin install listing.
#[derive(Clone, Debug, Default)]
pub struct InstallFilter {
    /// Term matched against customer name, customer phone, and IMEI
    pub search: Option<String>,
    /// Only installs in this status
    pub status: Option<InstallStatus>,
    /// Only installs assigned to this technician
    pub technician_id: Option<i64>,
    /// Ordering by order date
    pub sort: SortOrder,
}

/// Parses the stored status column of an install.
pub fn status_of(install: &install::Model) -> Result<InstallStatus> {
    install.status.parse()
}

/// Computes the net amount owed on an install.
///
/// Only an approved travel expense reduces the amount due; a pending claim
/// does not.
#[must_use]
pub fn amount_due_for(install: &install::Model) -> f64 {
    let approved_expense = (install.expense_status.as_deref()
        == Some(ExpenseStatus::Approved.as_str()))
    .then_some(install.expense_amount)
    .flatten();
    lifecycle::amount_due(install.product_price, install.technician_fee, approved_expense)
}

/// Creates a new install order in the `NewOrder` status.
///
/// Validates that the customer fields are non-empty, that price and fee are
/// finite and non-negative, and that the assigned technician exists.
pub async fn create_install(db: &DatabaseConnection, new: NewInstall) -> Result<install::Model> {
    for (field, value) in [
        ("Customer name", &new.customer_name),
        ("Customer phone", &new.customer_phone),
        ("Customer address", &new.customer_address),
    ] {
        if value.trim().is_empty() {
            return Err(Error::Validation {
                message: format!("{field} cannot be empty"),
            });
        }
    }
    lifecycle::validate_amount(new.product_price)?;
    lifecycle::validate_amount(new.technician_fee)?;

    crate::core::technician::get_technician(db, new.technician_id)
        .await?
        .ok_or(Error::NotFound {
            entity: "technician",
            id: new.technician_id,
        })?;

    let install = install::ActiveModel {
        customer_name: Set(new.customer_name.trim().to_string()),
        customer_phone: Set(new.customer_phone.trim().to_string()),
        customer_address: Set(new.customer_address.trim().to_string()),
        product_price: Set(new.product_price),
        technician_id: Set(Some(new.technician_id)),
        technician_fee: Set(new.technician_fee),
        status: Set(InstallStatus::NewOrder.as_str().to_string()),
        order_date: Set(Utc::now()),
        ..Default::default()
    };

    let result = install.insert(db).await?;
    info!(install_id = result.id, "install created");
    Ok(result)
}

/// Finds an install by its unique ID.
pub async fn get_install(
    db: &DatabaseConnection,
    install_id: i64,
) -> Result<Option<install::Model>> {
    Install::find_by_id(install_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists installs matching the admin filter bar.
///
/// The search term is matched as a substring of customer name, customer
/// phone, or IMEI; status and technician narrow the result further.
pub async fn list_installs(
    db: &DatabaseConnection,
    filter: &InstallFilter,
) -> Result<Vec<install::Model>> {
    let mut query = Install::find();

    if let Some(term) = filter.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        query = query.filter(
            Condition::any()
                .add(install::Column::CustomerName.contains(term))
                .add(install::Column::CustomerPhone.contains(term))
                .add(install::Column::Imei.contains(term)),
        );
    }
    if let Some(status) = filter.status {
        query = query.filter(install::Column::Status.eq(status.as_str()));
    }
    if let Some(technician_id) = filter.technician_id {
        query = query.filter(install::Column::TechnicianId.eq(technician_id));
    }

    let query = match filter.sort {
        SortOrder::NewestFirst => query.order_by_desc(install::Column::OrderDate),
        SortOrder::OldestFirst => query.order_by_asc(install::Column::OrderDate),
    };

    query.all(db).await.map_err(Into::into)
}

/// Lists the installs assigned to one technician, newest first.
pub async fn list_assigned_installs(
    db: &DatabaseConnection,
    technician_id: i64,
) -> Result<Vec<install::Model>> {
    Install::find()
        .filter(install::Column::TechnicianId.eq(technician_id))
        .order_by_desc(install::Column::OrderDate)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Applies a status change to an install.
///
/// The change is checked against the lifecycle engine, the fields it
/// captures are written alongside the new status, and the optional note is
/// appended, all inside one database transaction. A technician may only act
/// on their own assignments and may never approve a payment.
pub async fn update_status(
    db: &DatabaseConnection,
    actor: &Identity,
    install_id: i64,
    change: StatusChange,
    note_text: Option<String>,
) -> Result<install::Model> {
    let txn = db.begin().await?;

    let install = Install::find_by_id(install_id)
        .one(&txn)
        .await?
        .ok_or(Error::NotFound {
            entity: "install",
            id: install_id,
        })?;

    authorize_change(actor, &install, &change)?;

    let from = status_of(&install)?;
    let to = lifecycle::check_transition(from, &change)?;

    let mut active: install::ActiveModel = install.into();
    active.status = Set(to.as_str().to_string());
    match change {
        StatusChange::Ship {
            imei,
            courier_service,
            device_type,
        } => {
            active.imei = Set(Some(imei.trim().to_string()));
            active.courier_service = Set(Some(courier_service.trim().to_string()));
            active.device_type = Set(Some(device_type.as_str().to_string()));
        }
        StatusChange::Schedule { at } => {
            active.installation_at = Set(Some(at));
        }
        StatusChange::Complete { travel_expense } => {
            active.expense_amount = Set(Some(travel_expense));
            active.expense_status = Set(Some(ExpenseStatus::Pending.as_str().to_string()));
        }
        StatusChange::ApprovePayment { amount_received } => {
            active.payment_amount = Set(Some(amount_received));
            active.payment_received_at = Set(Some(Utc::now()));
            active.payment_approved_by = Set(Some("admin".to_string()));
        }
        StatusChange::SubmitForPayment | StatusChange::Cancel => {}
    }

    let updated = active.update(&txn).await?;

    if let Some(text) = note_text {
        if !text.trim().is_empty() {
            insert_note(&txn, updated.id, actor, text.trim()).await?;
        }
    }

    txn.commit().await?;
    info!(install_id, from = %from, to = %to, "install status updated");
    Ok(updated)
}

/// Approves a pending travel expense, optionally revising the amount.
///
/// This is the orthogonal sub-transition of the lifecycle: it changes the
/// expense from pending to approved independently of the main status, and
/// only the administrator may perform it.
pub async fn approve_expense(
    db: &DatabaseConnection,
    actor: &Identity,
    install_id: i64,
    approved_amount: f64,
) -> Result<install::Model> {
    if !actor.is_admin() {
        return Err(Error::Forbidden {
            message: "Only the administrator can approve travel expenses".to_string(),
        });
    }
    lifecycle::validate_amount(approved_amount)?;

    let install = get_install(db, install_id).await?.ok_or(Error::NotFound {
        entity: "install",
        id: install_id,
    })?;

    match install.expense_status.as_deref() {
        Some(s) if s == ExpenseStatus::Pending.as_str() => {}
        Some(s) if s == ExpenseStatus::Approved.as_str() => {
            return Err(Error::Conflict {
                message: "Travel expense has already been approved".to_string(),
            });
        }
        _ => {
            return Err(Error::Conflict {
                message: "No travel expense has been submitted for this install".to_string(),
            });
        }
    }

    let mut active: install::ActiveModel = install.into();
    active.expense_amount = Set(Some(approved_amount));
    active.expense_status = Set(Some(ExpenseStatus::Approved.as_str().to_string()));

    let updated = active.update(db).await?;
    info!(install_id, approved_amount, "travel expense approved");
    Ok(updated)
}

/// Appends a note to an install's history.
///
/// Notes are append-only: there is no operation to edit or remove one.
pub async fn add_note(
    db: &DatabaseConnection,
    actor: &Identity,
    install_id: i64,
    text: &str,
) -> Result<note::Model> {
    if text.trim().is_empty() {
        return Err(Error::Validation {
            message: "Note text cannot be empty".to_string(),
        });
    }

    let install = get_install(db, install_id).await?.ok_or(Error::NotFound {
        entity: "install",
        id: install_id,
    })?;

    if let Identity::Technician(tech) = actor {
        if install.technician_id != Some(tech.id) {
            return Err(Error::Forbidden {
                message: "Install is not assigned to this technician".to_string(),
            });
        }
    }

    insert_note(db, install_id, actor, text.trim()).await
}

/// Lists an install's notes in the order they were written.
pub async fn list_notes(db: &DatabaseConnection, install_id: i64) -> Result<Vec<note::Model>> {
    crate::entities::Note::find()
        .filter(note::Column::InstallId.eq(install_id))
        .order_by_asc(note::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

async fn insert_note<C>(db: &C, install_id: i64, actor: &Identity, text: &str) -> Result<note::Model>
where
    C: ConnectionTrait,
{
    let model = note::ActiveModel {
        install_id: Set(install_id),
        text: Set(text.to_string()),
        author_id: Set(actor.author_id()),
        author_name: Set(actor.author_name()),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    model.insert(db).await.map_err(Into::into)
}

/// Checks that the actor may apply this change to this install.
fn authorize_change(
    actor: &Identity,
    install: &install::Model,
    change: &StatusChange,
) -> Result<()> {
    let Identity::Technician(tech) = actor else {
        return Ok(());
    };

    if install.technician_id != Some(tech.id) {
        return Err(Error::Forbidden {
            message: "Install is not assigned to this technician".to_string(),
        });
    }
    if matches!(change, StatusChange::ApprovePayment { .. }) {
        return Err(Error::Forbidden {
            message: "Only the administrator can approve payments".to_string(),
        });
    }
    Ok(())
}
