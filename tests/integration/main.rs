//! Integration test harness — routes requests through the full Axum app.

mod helpers;

mod health_test;
mod media_test;
mod rate_limit_test;
