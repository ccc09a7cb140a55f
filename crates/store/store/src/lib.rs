//! Storage contracts consumed by the reminder orchestrator.
//!
//! The orchestrator only reads documents and profiles, and only writes
//! reminder rows and activity entries. [`DocumentWriter`] is the write side
//! used by fixtures and the CRUD layer that lives outside this workspace.

pub mod error;
pub mod repository;
pub mod testing;

pub use error::StoreError;
pub use repository::{
    ActivityLog, DocumentRepository, DocumentWriter, MarkSent, ReminderRepository, ReminderStore,
};
