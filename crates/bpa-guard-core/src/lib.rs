//! Core types, configuration, and error handling for BPA Guard.
//!
//! This crate provides the building blocks shared by the reconciler and the
//! Lambda entry point: validated AWS identifiers, the reconciliation error
//! taxonomy, and environment-driven configuration.

mod config;
mod error;
mod types;

pub use config::{BpaConfig, LogFormat};
pub use error::{BpaError, BpaResult};
pub use types::{AccountId, PhysicalResourceId};
