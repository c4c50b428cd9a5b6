//! Note entity - Append-only history entries attached to an install.
//!
//! Notes are written by the admin or by the assigned technician alongside a
//! status change. Existing notes are never edited or removed; the crate
//! exposes no update or delete operation for them.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Note database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notes")]
pub struct Model {
    /// Unique identifier for the note
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the install this note belongs to
    pub install_id: i64,
    /// Note text
    pub text: String,
    /// `"admin"` or the technician's id as a string
    pub author_id: String,
    /// Display name of the author at the time of writing
    pub author_name: String,
    /// When the note was written
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Note and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each note belongs to one install
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
