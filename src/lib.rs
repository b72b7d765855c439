//! BC Bridge Library
//!
//! This crate provides the integration core that keeps a local operational
//! database consistent with a Business Central-style ERP: paginated
//! collection fetches, reservation/consumption normalization, master-data
//! reconciliation, and equipment booking-window conflict checks.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod bc;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod logging;
pub mod services;

pub use bc::client::BcClient;
pub use bc::{BcError, BcResult};
pub use errors::ServiceError;
pub use events::{Event, EventSender};
