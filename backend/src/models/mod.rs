//! Database models for the Retail POS Platform
//!
//! Re-exports models from the shared crate and adds backend-specific models

pub use shared::models::*;
