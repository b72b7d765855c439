//! Synchronization and scheduling services over the BC client and the local
//! store.

pub mod assembly;
pub mod components;
pub mod equipment_sync;
pub mod scheduling;
