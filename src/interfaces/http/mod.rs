//! REST API module
//!
//! Provides HTTP endpoints for managing users, bulk import/export,
//! and health checks, with Swagger documentation.

pub mod common;
pub mod modules;
pub mod router;

pub use router::create_api_router;
