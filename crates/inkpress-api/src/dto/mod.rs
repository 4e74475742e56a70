//! Request/response DTOs.

pub mod response;
