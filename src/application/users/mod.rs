//! User directory use-cases

mod service;

pub use service::{ImportOutcome, UserDirectoryService};
