//! HTTP API route definitions.

use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{self, health, root, AppState};
use crate::health::{
    ApiHealth, ApiStatus, DatabaseHealth, DbStatus, HealthReport, OverallStatus, WelcomeResponse,
};

/// OpenAPI document for the service.
#[derive(OpenApi)]
#[openapi(
    paths(handlers::root, handlers::health),
    components(schemas(
        HealthReport,
        ApiHealth,
        DatabaseHealth,
        OverallStatus,
        ApiStatus,
        DbStatus,
        WelcomeResponse
    ))
)]
pub struct ApiDoc;

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/api/health", get(health))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
