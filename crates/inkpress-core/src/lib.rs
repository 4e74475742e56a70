//! # inkpress-core
//!
//! Core crate for the Inkpress media service. Contains the object store
//! contract, object key validation, configuration schemas, and the unified
//! error system.
//!
//! This crate has **no** internal dependencies on other Inkpress crates.

pub mod config;
pub mod error;
pub mod keys;
pub mod result;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;
