//! Notification entity - Log of customer notification attempts.
//!
//! One row is appended per dispatched status change, recording whether the
//! message was sent, skipped, or failed. The log makes the best-effort,
//! at-most-once delivery contract observable after the fact.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Notification log database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    /// Unique identifier for the log entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the install whose status change triggered the attempt
    pub install_id: i64,
    /// The new install status at dispatch time
    pub status: String,
    /// Normalized recipient phone number, empty when normalization failed
    pub recipient: String,
    /// `"sent"`, `"skipped"`, or `"failed"`
    pub outcome: String,
    /// Failure reason or skip explanation, if any
    pub detail: Option<String>,
    /// When the attempt was made
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Notification and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each log entry belongs to one install
    #[sea_orm(
        belongs_to = "super::install::Entity",
        from = "Column::InstallId",
        to = "super::install::Column::Id"
    )]
    Install,
}

impl Related<super::install::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Install.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
