//! # warden-core
//!
//! Core crate for the Warden session store. Contains the backend
//! provider trait, configuration schemas, and the unified error system.
//!
//! This crate has **no** internal dependencies on other Warden crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;
