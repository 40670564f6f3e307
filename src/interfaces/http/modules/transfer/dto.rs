//! Bulk transfer DTOs

use serde::Serialize;
use utoipa::ToSchema;

use crate::application::users::ImportOutcome;
use crate::interfaces::http::modules::users::UserDto;

/// Result of a bulk import
#[derive(Debug, Serialize, ToSchema)]
pub struct ImportResponse {
    /// Users created and registered with the consent manager
    pub created: Vec<UserDto>,
    /// Internal IDs that already existed and were left untouched
    pub skipped: Vec<String>,
}

impl From<ImportOutcome> for ImportResponse {
    fn from(outcome: ImportOutcome) -> Self {
        Self {
            created: outcome.created.into_iter().map(UserDto::from).collect(),
            skipped: outcome.skipped,
        }
    }
}

/// Multipart upload body for the import endpoint
#[derive(Debug, ToSchema)]
pub struct ImportFileUpload {
    /// CSV file with an `internalID,email` header row
    #[schema(value_type = String, format = Binary)]
    pub file: String,
}
