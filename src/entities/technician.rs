//! Technician entity - Represents a field worker who ships and installs devices.
//!
//! Each technician has contact details, a base location, and login credentials.
//! Passwords are stored as salted hashes, never in plaintext.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Technician database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "technicians")]
pub struct Model {
    /// Unique identifier for the technician
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Full name shown to customers and in job listings
    pub name: String,
    /// Contact phone number
    pub phone: String,
    /// Base location, used when picking a technician for a job
    pub location: String,
    /// Login username, unique across technicians
    #[sea_orm(unique)]
    pub username: String,
    /// Salted password hash in `"<hex salt>$<hex digest>"` form
    pub password_hash: String,
}

/// Defines relationships between Technician and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One technician is assigned many installs
    #[sea_orm(has_many = "super::install::Entity")]
    Installs,
}

impl Related<super::install::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Installs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
