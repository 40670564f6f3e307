//! # User Registry Service
//!
//! User management service with consent-manager synchronization.
//!
//! ## Architecture
//!
//! The project follows Clean Architecture principles:
//!
//! - **domain**: User model, DTOs, repository interface and error types
//! - **application**: Business logic orchestrating persistence and the
//!   consent manager (CRUD, bulk import/export)
//! - **infrastructure**: External concerns (database, consent manager
//!   HTTP client, tabular file codec)
//! - **interfaces**: REST API with Swagger documentation

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod support;

pub use config::{default_config_path, AppConfig};

// Re-export database types for easy access
pub use infrastructure::database::{init_database, DatabaseConfig};

// Re-export API router
pub use interfaces::http::create_api_router;
