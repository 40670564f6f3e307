//! Common API types

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::DomainError;

/// Standard API response envelope.
///
/// On success: `{"success": true, "data": {...}}`,
/// on error: `{"success": false, "error": "description"}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// `true` if the request completed successfully
    pub success: bool,
    /// Payload; `null` on error
    pub data: Option<T>,
    /// Error description; `null` on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Map a domain error to an HTTP status + enveloped body.
pub fn domain_error_response<T>(e: DomainError) -> (StatusCode, Json<ApiResponse<T>>) {
    let status = match &e {
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::Validation(_) | DomainError::NotConfigured(_) => StatusCode::BAD_REQUEST,
        DomainError::Conflict(_) => StatusCode::CONFLICT,
        DomainError::Consent(_) => StatusCode::BAD_GATEWAY,
        DomainError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (status, Json(ApiResponse::error(e.to_string())))
}
