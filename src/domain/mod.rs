pub mod user;

// Re-export commonly used types
pub use user::{CreateUserDto, UpdateUserDto, User, UserRepositoryInterface};

// Re-export error types from support for convenience
pub use crate::support::errors::{DomainError, DomainResult};
