//! # inkpress-storage
//!
//! Storage provider implementations for Inkpress media. Supports local
//! filesystem, in-process memory, S3-compatible object stores (AWS S3,
//! MinIO, Cloudflare R2), and Google Cloud Storage.

pub mod factory;
pub mod providers;

pub use factory::build_store;
