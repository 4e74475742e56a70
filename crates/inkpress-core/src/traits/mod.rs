//! Trait definitions implemented by other Inkpress crates.

pub mod storage;
