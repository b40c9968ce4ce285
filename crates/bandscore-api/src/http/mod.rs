//! HTTP layer for Bandscore.
//!
//! Axum-based REST API at `/api/v1/` driving the three-step wizard, the
//! envelope response format, and the embedded wizard page at `/`.

pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
