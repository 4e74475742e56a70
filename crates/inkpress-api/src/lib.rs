//! # inkpress-api
//!
//! HTTP API layer for Inkpress built on Axum.
//!
//! Provides the media endpoints, middleware (rate limiting, CORS, request
//! logging), DTOs, and the mapping from [`inkpress_core::AppError`] to HTTP
//! responses.

pub mod app;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::build_app;
pub use state::AppState;
