//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI spec,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "QazID Registry API",
        version = "0.3.2",
        description = "IIN validation and person records keyed by IIN, with paginated name search.",
        license(name = "Apache-2.0")
    ),
    paths(
        // IIN
        crate::routes::iin::check_iin,
        // People
        crate::routes::people::save_person,
        crate::routes::people::get_person_by_iin,
        crate::routes::people::search_people,
    ),
    components(schemas(
        crate::state::PersonRecord,
        // Error types
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        // DTOs
        crate::routes::iin::IinCheckResponse,
        crate::routes::people::SavePersonRequest,
        crate::routes::people::PeoplePage,
    )),
    tags(
        (name = "iin", description = "Standalone IIN validation"),
        (name = "people", description = "Person records and name search"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json — Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
