pub mod consent;
pub mod database;
pub mod tabular;
