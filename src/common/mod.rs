//! Common types, errors, and traits shared across the application

pub mod errors;
pub mod traits;
pub mod types;
