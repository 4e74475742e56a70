//! Storage provider implementations.

pub mod gcs;
pub mod local;
pub mod memory;
pub mod s3;

pub use gcs::GcsObjectStore;
pub use local::LocalObjectStore;
pub use memory::MemoryObjectStore;
pub use s3::S3ObjectStore;
