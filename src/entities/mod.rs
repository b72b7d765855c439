//! Local persisted shapes owned by the reconciliation store.

pub mod entry_request_assembly;
pub mod entry_request_component;
pub mod equipment;
pub mod scheduling_window;
