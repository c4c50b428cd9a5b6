//! Install entity - Represents a single customer order for a GPS tracker
//! device and its installation.
//!
//! The `status` column carries the lifecycle state machine string encoding
//! (see `core::lifecycle::InstallStatus`). Shipping details, the travel
//! expense sub-record, and the payment sub-record start out empty and are
//! filled in by the transitions that require them.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Install database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "installs")]
pub struct Model {
    /// Unique identifier for the install order
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Customer name
    pub customer_name: String,
    /// Customer phone number as entered, normalized only when notifying
    pub customer_phone: String,
    /// Customer address for the installation visit
    pub customer_address: String,
    /// Price of the device being sold, in taka
    pub product_price: f64,
    /// Assigned technician; required at creation, nullable in the schema
    pub technician_id: Option<i64>,
    /// Fee owed to the technician for this job
    pub technician_fee: f64,
    /// Lifecycle status string, e.g. `"new_order"`, `"device_shipped"`
    pub status: String,
    /// When the order was created
    pub order_date: DateTimeUtc,
    /// Scheduled installation visit, set when the order is scheduled
    pub installation_at: Option<DateTimeUtc>,
    /// Device type, `"Voice"` or `"Non-Voice"`, set when shipped
    pub device_type: Option<String>,
    /// Courier service the device was shipped with
    pub courier_service: Option<String>,
    /// Device IMEI, set when shipped
    pub imei: Option<String>,
    /// Travel expense amount submitted by the technician on completion
    pub expense_amount: Option<f64>,
    /// Travel expense approval state, `"pending"` or `"approved"`
    pub expense_status: Option<String>,
    /// Amount the customer actually paid, set on payment approval
    pub payment_amount: Option<f64>,
    /// When the payment was recorded
    pub payment_received_at: Option<DateTimeUtc>,
    /// Who approved the payment (always `"admin"`)
    pub payment_approved_by: Option<String>,
}

/// Defines relationships between Install and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each install is assigned to one technician
    #[sea_orm(
        belongs_to = "super::technician::Entity",
        from = "Column::TechnicianId",
        to = "super::technician::Column::Id"
    )]
    Technician,
    /// One install has many notes
    #[sea_orm(has_many = "super::note::Entity")]
    Notes,
    /// One install has many notification log entries
    #[sea_orm(has_many = "super::notification::Entity")]
    Notifications,
}

impl Related<super::technician::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Technician.def()
    }
}

impl Related<super::note::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Notes.def()
    }
}

impl Related<super::notification::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Notifications.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
