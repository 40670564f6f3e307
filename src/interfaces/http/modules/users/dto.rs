//! User management DTOs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::{CreateUserDto, UpdateUserDto, User};

/// User record as returned by the API
#[derive(Debug, Serialize, ToSchema)]
pub struct UserDto {
    /// Storage key (UUID)
    pub id: String,
    /// Caller-supplied unique identifier
    pub internal_id: String,
    pub email: String,
    /// Remote identifier issued by the consent manager; `null` until
    /// registration succeeds
    pub consent_identifier: Option<String>,
    /// Extra fields carried over from bulk import
    #[schema(value_type = Object)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
    /// Creation date (ISO 8601)
    pub created_at: String,
    /// Last update date (ISO 8601)
    pub updated_at: String,
}

impl From<User> for UserDto {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            internal_id: u.internal_id,
            email: u.email,
            consent_identifier: u.consent_identifier,
            attributes: u.attributes,
            created_at: u.created_at.to_rfc3339(),
            updated_at: u.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "internal_id": "EMP-00042",
    "email": "user@example.com"
}))]
pub struct CreateUserRequest {
    /// Unique identifier supplied by the caller
    #[validate(length(min = 1, max = 255, message = "internal_id is required"))]
    pub internal_id: String,
    #[validate(email(message = "invalid email format"))]
    pub email: String,
    /// Optional free-form extra fields
    #[serde(default)]
    #[schema(value_type = Object)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl From<CreateUserRequest> for CreateUserDto {
    fn from(r: CreateUserRequest) -> Self {
        Self {
            internal_id: r.internal_id,
            email: r.email,
            attributes: r.attributes,
        }
    }
}

/// All fields optional — pass only what should change.
///
/// Changing `internal_id` or `email` does not re-register the user with
/// the consent manager.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub internal_id: Option<String>,
    pub email: Option<String>,
    #[schema(value_type = Object)]
    pub attributes: Option<serde_json::Map<String, serde_json::Value>>,
}

impl From<UpdateUserRequest> for UpdateUserDto {
    fn from(r: UpdateUserRequest) -> Self {
        Self {
            internal_id: r.internal_id,
            email: r.email,
            attributes: r.attributes,
        }
    }
}
