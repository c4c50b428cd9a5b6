//! Technician business logic - Handles all technician-related operations.
//!
//! Provides functions for creating, retrieving, updating, and deleting
//! technicians. Deletion is guarded: a technician referenced by any install
//! that is still in flight cannot be removed. All functions are async and
//! return Result types for error handling.

use crate::{
    core::auth::hash_password,
    core::lifecycle::InstallStatus,
    entities::{Install, Technician, install, technician},
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, QueryOrder, Set, prelude::*};
use tracing::info;

/// Statuses that no longer count as an active assignment.
const SETTLED_STATUSES: [InstallStatus; 3] = [
    InstallStatus::Completed,
    InstallStatus::Cancelled,
    InstallStatus::PaymentReceived,
];

/// Fields collected when the admin registers a technician.
#[derive(Clone, Debug)]
pub struct NewTechnician {
    /// Full name
    pub name: String,
    /// Contact phone number
    pub phone: String,
    /// Base location
    pub location: String,
    /// Login username, must be unique
    pub username: String,
    /// Initial password in plaintext; hashed before storage
    pub password: String,
}

/// Fields collected when the admin edits a technician.
///
/// `password` is optional: `None` or an empty string leaves the stored
/// password unchanged.
#[derive(Clone, Debug)]
pub struct TechnicianUpdate {
    /// Full name
    pub name: String,
    /// Contact phone number
    pub phone: String,
    /// Base location
    pub location: String,
    /// Login username, must stay unique
    pub username: String,
    /// Replacement password, if the admin entered one
    pub password: Option<String>,
}

/// Retrieves all technicians, ordered alphabetically by name.
pub async fn list_technicians(db: &DatabaseConnection) -> Result<Vec<technician::Model>> {
    Technician::find()
        .order_by_asc(technician::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a technician by its unique ID.
pub async fn get_technician(
    db: &DatabaseConnection,
    technician_id: i64,
) -> Result<Option<technician::Model>> {
    Technician::find_by_id(technician_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a technician by login username.
///
/// Used by the login check; usernames are unique so at most one record
/// matches.
pub async fn get_technician_by_username(
    db: &DatabaseConnection,
    username: &str,
) -> Result<Option<technician::Model>> {
    Technician::find()
        .filter(technician::Column::Username.eq(username))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a new technician, hashing the password before storage.
///
/// Validates that all fields are non-empty and that the username is not
/// already taken.
pub async fn create_technician(
    db: &DatabaseConnection,
    new: NewTechnician,
) -> Result<technician::Model> {
    validate_profile(&new.name, &new.phone, &new.location, &new.username)?;
    if new.password.trim().is_empty() {
        return Err(Error::Validation {
            message: "Password cannot be empty".to_string(),
        });
    }

    if get_technician_by_username(db, new.username.trim())
        .await?
        .is_some()
    {
        return Err(Error::Conflict {
            message: format!("Username '{}' is already taken", new.username.trim()),
        });
    }

    let technician = technician::ActiveModel {
        name: Set(new.name.trim().to_string()),
        phone: Set(new.phone.trim().to_string()),
        location: Set(new.location.trim().to_string()),
        username: Set(new.username.trim().to_string()),
        password_hash: Set(hash_password(&new.password)),
        ..Default::default()
    };

    let result = technician.insert(db).await?;
    info!(technician_id = result.id, "technician created");
    Ok(result)
}

/// Updates a technician's profile.
///
/// An empty or absent password leaves the stored hash untouched; the admin
/// edit form treats a blank password field as "no change".
pub async fn update_technician(
    db: &DatabaseConnection,
    technician_id: i64,
    update: TechnicianUpdate,
) -> Result<technician::Model> {
    validate_profile(&update.name, &update.phone, &update.location, &update.username)?;

    let existing = get_technician(db, technician_id)
        .await?
        .ok_or(Error::NotFound {
            entity: "technician",
            id: technician_id,
        })?;

    // Username must stay unique across the other technicians.
    if let Some(taken) = get_technician_by_username(db, update.username.trim()).await? {
        if taken.id != technician_id {
            return Err(Error::Conflict {
                message: format!("Username '{}' is already taken", update.username.trim()),
            });
        }
    }

    let mut active: technician::ActiveModel = existing.into();
    active.name = Set(update.name.trim().to_string());
    active.phone = Set(update.phone.trim().to_string());
    active.location = Set(update.location.trim().to_string());
    active.username = Set(update.username.trim().to_string());
    if let Some(password) = update.password.as_deref() {
        if !password.trim().is_empty() {
            active.password_hash = Set(hash_password(password));
        }
    }

    active.update(db).await.map_err(Into::into)
}

/// Deletes a technician.
///
/// Rejected with a conflict while any install referencing the technician has
/// a status outside {Completed, Cancelled, PaymentReceived}; jobs that are
/// settled or cancelled do not block deletion.
pub async fn delete_technician(db: &DatabaseConnection, technician_id: i64) -> Result<()> {
    let technician = get_technician(db, technician_id)
        .await?
        .ok_or(Error::NotFound {
            entity: "technician",
            id: technician_id,
        })?;

    let active_assignments = Install::find()
        .filter(install::Column::TechnicianId.eq(technician_id))
        .filter(install::Column::Status.is_not_in(SETTLED_STATUSES.map(InstallStatus::as_str)))
        .count(db)
        .await?;

    if active_assignments > 0 {
        return Err(Error::Conflict {
            message: format!(
                "Technician '{}' is assigned to {active_assignments} active install(s) and cannot be deleted",
                technician.name
            ),
        });
    }

    technician.delete(db).await?;
    info!(technician_id, "technician deleted");
    Ok(())
}

/// Validates the always-required profile fields.
fn validate_profile(name: &str, phone: &str, location: &str, username: &str) -> Result<()> {
    for (field, value) in [
        ("Name", name),
        ("Phone", phone),
        ("Location", location),
        ("Username", username),
    ] {
        if value.trim().is_empty() {
            return Err(Error::Validation {
                message: format!("{field} cannot be empty"),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::auth::verify_password;
    use crate::core::lifecycle::StatusChange;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_technician_integration() -> Result<()> {
        let db = setup_test_db().await?;

        let tech = create_test_technician(&db, "Karim").await?;

        assert_eq!(tech.name, "Karim");
        assert_eq!(tech.username, "karim");
        assert!(verify_password(&tech.password_hash, "secret123"));
        // Never stored in plaintext.
        assert_ne!(tech.password_hash, "secret123");

        Ok(())
    }

    #[tokio::test]
    async fn test_create_technician_validation() -> Result<()> {
        let db = setup_test_db().await?;

        let mut new = new_technician("Karim");
        new.name = "   ".to_string();
        let result = create_technician(&db, new).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let mut new = new_technician("Karim");
        new.password = String::new();
        let result = create_technician(&db, new).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_technician_duplicate_username() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_technician(&db, "Karim").await?;

        let mut duplicate = new_technician("Another Karim");
        duplicate.username = "karim".to_string();
        let result = create_technician(&db, duplicate).await;
        assert!(matches!(result, Err(Error::Conflict { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_keeps_password_when_blank() -> Result<()> {
        let db = setup_test_db().await?;
        let tech = create_test_technician(&db, "Karim").await?;
        let original_hash = tech.password_hash.clone();

        let updated = update_technician(
            &db,
            tech.id,
            TechnicianUpdate {
                name: "Karim Updated".to_string(),
                phone: tech.phone.clone(),
                location: "Chattogram".to_string(),
                username: tech.username.clone(),
                password: Some(String::new()),
            },
        )
        .await?;

        assert_eq!(updated.name, "Karim Updated");
        assert_eq!(updated.location, "Chattogram");
        assert_eq!(updated.password_hash, original_hash);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_replaces_password_when_given() -> Result<()> {
        let db = setup_test_db().await?;
        let tech = create_test_technician(&db, "Karim").await?;

        let updated = update_technician(
            &db,
            tech.id,
            TechnicianUpdate {
                name: tech.name.clone(),
                phone: tech.phone.clone(),
                location: tech.location.clone(),
                username: tech.username.clone(),
                password: Some("newpass456".to_string()),
            },
        )
        .await?;

        assert!(verify_password(&updated.password_hash, "newpass456"));
        assert!(!verify_password(&updated.password_hash, "secret123"));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_rejects_taken_username() -> Result<()> {
        let db = setup_test_db().await?;
        let karim = create_test_technician(&db, "Karim").await?;
        let rahim = create_test_technician(&db, "Rahim").await?;

        let result = update_technician(
            &db,
            rahim.id,
            TechnicianUpdate {
                name: rahim.name.clone(),
                phone: rahim.phone.clone(),
                location: rahim.location.clone(),
                username: karim.username.clone(),
                password: None,
            },
        )
        .await;
        assert!(matches!(result, Err(Error::Conflict { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_rejected_while_assigned_to_active_install() -> Result<()> {
        let (db, tech) = setup_with_technician().await?;
        create_test_install(&db, tech.id).await?;

        let result = delete_technician(&db, tech.id).await;
        assert!(matches!(result, Err(Error::Conflict { .. })));

        // The technician is still there.
        assert!(get_technician(&db, tech.id).await?.is_some());

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_rejected_at_every_active_status() -> Result<()> {
        use crate::core::lifecycle::InstallStatus as S;

        for status in [
            S::NewOrder,
            S::DeviceShipped,
            S::InstallationScheduled,
            S::PaymentPendingApproval,
        ] {
            let (db, tech) = setup_with_technician().await?;
            let install = create_test_install(&db, tech.id).await?;
            force_status(&db, install.id, status).await?;

            let result = delete_technician(&db, tech.id).await;
            assert!(
                matches!(result, Err(Error::Conflict { .. })),
                "delete should be rejected while an install is {status}"
            );
        }

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_allowed_with_only_settled_installs() -> Result<()> {
        use crate::core::lifecycle::InstallStatus as S;

        let (db, tech) = setup_with_technician().await?;
        for status in [S::Completed, S::Cancelled, S::PaymentReceived] {
            let install = create_test_install(&db, tech.id).await?;
            force_status(&db, install.id, status).await?;
        }

        delete_technician(&db, tech.id).await?;
        assert!(get_technician(&db, tech.id).await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_unknown_technician() -> Result<()> {
        let db = setup_test_db().await?;

        let result = delete_technician(&db, 999).await;
        assert!(matches!(
            result,
            Err(Error::NotFound {
                entity: "technician",
                id: 999
            })
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_allowed_after_cancellation() -> Result<()> {
        let (db, tech) = setup_with_technician().await?;
        let install = create_test_install(&db, tech.id).await?;

        // Walk the install into a cancelled state through the real engine.
        crate::core::install::update_status(
            &db,
            &admin_identity(),
            install.id,
            test_ship_change(),
            None,
        )
        .await?;
        crate::core::install::update_status(
            &db,
            &admin_identity(),
            install.id,
            StatusChange::Cancel,
            None,
        )
        .await?;

        delete_technician(&db, tech.id).await?;
        assert!(get_technician(&db, tech.id).await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_list_technicians_ordered_by_name() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_technician(&db, "Rahim").await?;
        create_test_technician(&db, "Karim").await?;

        let technicians = list_technicians(&db).await?;
        assert_eq!(technicians.len(), 2);
        assert_eq!(technicians[0].name, "Karim");
        assert_eq!(technicians[1].name, "Rahim");

        Ok(())
    }

    #[tokio::test]
    async fn test_get_technician_by_username() -> Result<()> {
        let db = setup_test_db().await?;
        let tech = create_test_technician(&db, "Karim").await?;

        let found = get_technician_by_username(&db, "karim").await?;
        assert_eq!(found.unwrap().id, tech.id);

        let not_found = get_technician_by_username(&db, "nobody").await?;
        assert!(not_found.is_none());

        Ok(())
    }
}
