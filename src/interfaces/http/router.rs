//! API Router with Swagger UI

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::common::ApiResponse;
use super::modules::{health, transfer, users};
use super::modules::users::{SharedUserService, UserHandlerState};

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::handlers::health_check,
        // Users
        users::handlers::list_users,
        users::handlers::get_user,
        users::handlers::create_user,
        users::handlers::update_user,
        users::handlers::delete_user,
        // Transfer
        transfer::handlers::export_template,
        transfer::handlers::import_users,
    ),
    components(
        schemas(
            // Common
            ApiResponse<String>,
            // Health
            health::HealthResponse,
            // Users
            users::UserDto,
            users::CreateUserRequest,
            users::UpdateUserRequest,
            // Transfer
            transfer::ImportResponse,
            transfer::ImportFileUpload,
        )
    ),
    tags(
        (name = "Health", description = "Service liveness check."),
        (name = "Users", description = "User management. Creating a user registers it with the consent manager and stores the returned remote identifier."),
        (name = "Transfer", description = "Bulk user import/export. The exchange format is a CSV with an `internalID,email` header; extra columns are stored verbatim."),
    ),
    info(
        title = "User Registry API",
        version = "0.1.0",
        description = "REST API for managing users and synchronizing them with an \
external consent manager.

## Response format

All responses are wrapped in a standard envelope:
```json
{\"success\": true, \"data\": {...}, \"error\": null}
```

On error:
```json
{\"success\": false, \"data\": null, \"error\": \"description\"}
```",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

/// Create the API router with all routes
pub fn create_api_router(service: SharedUserService) -> Router {
    let user_state = UserHandlerState { service };

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // User routes: CRUD plus bulk transfer. Static segments must be
    // registered in the same router as `/{id}` so matchit sees one tree.
    let user_routes = Router::new()
        .route(
            "/",
            get(users::handlers::list_users).post(users::handlers::create_user),
        )
        .route("/template", get(transfer::handlers::export_template))
        .route("/import", post(transfer::handlers::import_users))
        .route(
            "/{id}",
            get(users::handlers::get_user)
                .put(users::handlers::update_user)
                .delete(users::handlers::delete_user),
        )
        .with_state(user_state);

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    Router::new()
        // Swagger UI
        .merge(swagger_routes)
        // Health
        .route("/health", get(health::handlers::health_check))
        // Users
        .nest("/api/v1/users", user_routes)
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
