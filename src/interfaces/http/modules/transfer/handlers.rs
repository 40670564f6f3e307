//! Bulk user import/export handlers

use axum::{
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use super::dto::ImportResponse;
use crate::interfaces::http::common::{domain_error_response, ApiResponse};
use crate::interfaces::http::modules::users::UserHandlerState;

const TEMPLATE_FILE_NAME: &str = "users-template.csv";

/// Download the import template: a header row (`internalID,email`) and
/// no data rows.
#[utoipa::path(
    get,
    path = "/api/v1/users/template",
    tag = "Transfer",
    responses(
        (status = 200, description = "CSV template file", content_type = "text/csv")
    )
)]
pub async fn export_template(
    State(state): State<UserHandlerState>,
) -> Result<Response, (StatusCode, Json<ApiResponse<()>>)> {
    let bytes = state
        .service
        .export_template()
        .map_err(domain_error_response)?;

    let headers = [
        (header::CONTENT_TYPE, "text/csv".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{TEMPLATE_FILE_NAME}\""),
        ),
    ];

    Ok((headers, bytes).into_response())
}

/// Import users from an uploaded file.
///
/// Each new row is stored and registered with the consent manager; rows
/// whose `internalID` already exists are reported as skipped.
#[utoipa::path(
    post,
    path = "/api/v1/users/import",
    tag = "Transfer",
    request_body(content = super::dto::ImportFileUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Import finished", body = ApiResponse<ImportResponse>),
        (status = 400, description = "Missing file, missing required columns, or consent URI not configured"),
        (status = 502, description = "Consent manager call failed")
    )
)]
pub async fn import_users(
    State(state): State<UserHandlerState>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<ImportResponse>>, (StatusCode, Json<ApiResponse<ImportResponse>>)> {
    let mut file = None;
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(format!("Invalid multipart body: {}", e))),
        )
    })? {
        // Accept either a field named "file" or any field carrying a
        // filename.
        if field.name() == Some("file") || field.file_name().is_some() {
            let bytes = field.bytes().await.map_err(|e| {
                (
                    StatusCode::BAD_REQUEST,
                    Json(ApiResponse::error(format!("Failed to read upload: {}", e))),
                )
            })?;
            file = Some(bytes);
            break;
        }
    }

    let Some(file) = file else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error("No file uploaded")),
        ));
    };

    match state.service.import_users(&file).await {
        Ok(outcome) => Ok(Json(ApiResponse::success(ImportResponse::from(outcome)))),
        Err(e) => Err(domain_error_response(e)),
    }
}
