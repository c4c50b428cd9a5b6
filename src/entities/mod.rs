//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod install;
pub mod note;
pub mod notification;
pub mod technician;

// Re-export specific types to avoid conflicts
pub use install::{Column as InstallColumn, Entity as Install, Model as InstallModel};
pub use note::{Column as NoteColumn, Entity as Note, Model as NoteModel};
pub use notification::{
    Column as NotificationColumn, Entity as Notification, Model as NotificationModel,
};
pub use technician::{Column as TechnicianColumn, Entity as Technician, Model as TechnicianModel};
