//! Shared types and models for the Retail POS Platform
//!
//! This crate contains domain models, enums, and the pure inventory-costing
//! logic shared between the backend and other components of the system.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
