//! Shared test utilities for `InstallDesk`.
//!
//! This module provides common helper functions for setting up test
//! databases, creating test records with sensible defaults, and a mock
//! messaging gateway for exercising the notification dispatcher without a
//! network.

use crate::{
    config::settings::AdminCredentials,
    core::auth::Identity,
    core::install::{NewInstall, create_install, get_install, update_status},
    core::lifecycle::{DeviceType, InstallStatus, StatusChange},
    core::technician::{NewTechnician, create_technician},
    entities::{install, technician},
    errors::Result,
    notify::MessageGateway,
};
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{DatabaseConnection, Set, prelude::*};
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    init_test_logging();
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Installs a test tracing subscriber once; later calls are no-ops.
fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_test_writer()
        .try_init();
}

/// The admin/admin credential pair used throughout the tests.
#[must_use]
pub fn admin_credentials() -> AdminCredentials {
    AdminCredentials {
        username: "admin".to_string(),
        password: "admin".to_string(),
    }
}

/// The administrator identity.
#[must_use]
pub const fn admin_identity() -> Identity {
    Identity::Admin
}

/// Builds a `NewTechnician` with sensible defaults.
///
/// # Defaults
/// * `phone`: `"01898765432"`
/// * `location`: `"Dhaka"`
/// * `username`: the name, lowercased
/// * `password`: `"secret123"`
#[must_use]
pub fn new_technician(name: &str) -> NewTechnician {
    NewTechnician {
        name: name.to_string(),
        phone: "01898765432".to_string(),
        location: "Dhaka".to_string(),
        username: name.to_lowercase(),
        password: "secret123".to_string(),
    }
}

/// Creates a test technician with the defaults of [`new_technician`].
pub async fn create_test_technician(
    db: &DatabaseConnection,
    name: &str,
) -> Result<technician::Model> {
    create_technician(db, new_technician(name)).await
}

/// Builds a `NewInstall` with sensible defaults.
///
/// # Defaults
/// * customer: `"Asif Rahman"`, `"01712345678"`, a Dhaka address
/// * `product_price`: 5000.0
/// * `technician_fee`: 500.0
#[must_use]
pub fn new_install(technician_id: i64) -> NewInstall {
    NewInstall {
        customer_name: "Asif Rahman".to_string(),
        customer_phone: "01712345678".to_string(),
        customer_address: "House 12, Dhanmondi, Dhaka".to_string(),
        product_price: 5000.0,
        technician_id,
        technician_fee: 500.0,
    }
}

/// Creates a test install with the defaults of [`new_install`].
pub async fn create_test_install(
    db: &DatabaseConnection,
    technician_id: i64,
) -> Result<install::Model> {
    create_install(db, new_install(technician_id)).await
}

/// Creates a test install with a custom customer name and phone.
pub async fn create_custom_install(
    db: &DatabaseConnection,
    technician_id: i64,
    customer_name: &str,
    customer_phone: &str,
) -> Result<install::Model> {
    let mut new = new_install(technician_id);
    new.customer_name = customer_name.to_string();
    new.customer_phone = customer_phone.to_string();
    create_install(db, new).await
}

/// A valid shipping change used wherever a test needs to ship a device.
#[must_use]
pub fn test_ship_change() -> StatusChange {
    StatusChange::Ship {
        imei: "356789012345678".to_string(),
        courier_service: "Sundarban".to_string(),
        device_type: DeviceType::NonVoice,
    }
}

/// Sets up a complete test environment with a technician.
/// Returns (db, technician) for common test scenarios.
pub async fn setup_with_technician() -> Result<(DatabaseConnection, technician::Model)> {
    let db = setup_test_db().await?;
    let technician = create_test_technician(&db, "Karim").await?;
    Ok((db, technician))
}

/// Sets up an install walked through the real engine to `Completed`, with a
/// 200.0 travel expense pending approval.
/// Returns (db, install) for expense and payment test scenarios.
pub async fn setup_with_completed_install() -> Result<(DatabaseConnection, install::Model)> {
    let (db, technician) = setup_with_technician().await?;
    let install = create_test_install(&db, technician.id).await?;
    let admin = admin_identity();

    update_status(&db, &admin, install.id, test_ship_change(), None).await?;
    update_status(
        &db,
        &admin,
        install.id,
        StatusChange::Schedule { at: Utc::now() },
        None,
    )
    .await?;
    let completed = update_status(
        &db,
        &admin,
        install.id,
        StatusChange::Complete {
            travel_expense: 200.0,
        },
        None,
    )
    .await?;

    Ok((db, completed))
}

/// Overwrites an install's status column directly, bypassing the lifecycle
/// engine. Only for arranging test fixtures in states that would otherwise
/// take several transitions to reach.
pub async fn force_status(
    db: &DatabaseConnection,
    install_id: i64,
    status: InstallStatus,
) -> Result<install::Model> {
    let install = get_install(db, install_id)
        .await?
        .expect("test install should exist");
    let mut active: install::ActiveModel = install.into();
    active.status = Set(status.as_str().to_string());
    active.update(db).await.map_err(Into::into)
}

/// Forces an install into `Completed` with a 200.0 pending travel expense,
/// bypassing the lifecycle engine.
pub async fn setup_pending_expense(
    db: &DatabaseConnection,
    install_id: i64,
) -> Result<install::Model> {
    let install = get_install(db, install_id)
        .await?
        .expect("test install should exist");
    let mut active: install::ActiveModel = install.into();
    active.status = Set(InstallStatus::Completed.as_str().to_string());
    active.expense_amount = Set(Some(200.0));
    active.expense_status = Set(Some("pending".to_string()));
    active.update(db).await.map_err(Into::into)
}

/// A [`MessageGateway`] that records sends instead of making network calls.
///
/// Clones share the same send log, so a test can hand one clone to a
/// dispatcher and inspect the other afterwards.
#[derive(Clone, Default)]
pub struct MockGateway {
    fail_with: Option<String>,
    sent: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockGateway {
    /// A gateway whose every send fails with the given reason.
    #[must_use]
    pub fn failing(reason: &str) -> Self {
        Self {
            fail_with: Some(reason.to_string()),
            sent: Arc::default(),
        }
    }

    /// The (recipient, message) pairs accepted so far.
    #[must_use]
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().expect("mock gateway lock").clone()
    }
}

#[async_trait]
impl MessageGateway for MockGateway {
    async fn send(&self, recipient: &str, message: &str) -> Result<()> {
        if let Some(reason) = &self.fail_with {
            return Err(crate::errors::Error::Transport {
                message: reason.clone(),
            });
        }
        self.sent
            .lock()
            .expect("mock gateway lock")
            .push((recipient.to_string(), message.to_string()));
        Ok(())
    }
}
