//! # IIN Validation Endpoint
//!
//! Standalone validation of an IIN without touching the registry. The
//! validator itself lives in `qazid-core`; this handler only maps its
//! result onto the HTTP surface (decoded info on 200, the specific
//! failure reason on 400).

use axum::extract::Path;
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDate;
use qazid_core::Sex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;
use crate::state::AppState;

/// Decoded IIN metadata returned on a successful check.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IinCheckResponse {
    /// Always `true` in a 200 response; failures are 400 with an error body.
    pub valid: bool,
    /// Sex decoded from the indicator digit.
    #[schema(value_type = String)]
    pub sex: Sex,
    /// Full date of birth.
    pub date_of_birth: NaiveDate,
}

/// Build the IIN router.
pub fn router() -> Router<AppState> {
    Router::new().route("/v1/iin/:iin", get(check_iin))
}

/// GET /v1/iin/:iin — Validate an IIN and decode its birth metadata.
#[utoipa::path(
    get,
    path = "/v1/iin/{iin}",
    params(("iin" = String, Path, description = "IIN to validate")),
    responses(
        (status = 200, description = "IIN is valid", body = IinCheckResponse),
        (status = 400, description = "IIN failed validation", body = crate::error::ErrorBody),
    ),
    tag = "iin"
)]
pub(crate) async fn check_iin(Path(iin): Path<String>) -> Result<Json<IinCheckResponse>, AppError> {
    match qazid_core::validate(&iin) {
        Ok(info) => {
            tracing::info!(iin = %iin, "IIN validated");
            Ok(Json(IinCheckResponse {
                valid: true,
                sex: info.sex,
                date_of_birth: info.date_of_birth,
            }))
        }
        Err(err) => {
            tracing::warn!(iin = %iin, error = %err, "IIN rejected");
            Err(err.into())
        }
    }
}
