//! # Person Records
//!
//! Save, fetch, and search person records. The IIN validator gates every
//! write: a person cannot be stored unless their IIN decodes and passes the
//! checksum. Point lookups are served from the in-memory store and fall
//! through to the database on a miss; searches go to the database when one
//! is configured. Saves write through and roll back on persistence failure.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use qazid_core::{Iin, Phone};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::db;
use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::state::{AppState, PersonRecord};

/// Default page size for name search.
const DEFAULT_PAGE_SIZE: u32 = 10;

/// Upper bound on the page size a client may request.
const MAX_PAGE_SIZE: u32 = 100;

/// Save person request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SavePersonRequest {
    /// Person's full name, 2-50 characters.
    pub name: String,
    /// 12-digit IIN; validated before anything is stored.
    pub iin: String,
    /// Phone number, exactly 11 digits.
    pub phone: String,
}

impl Validate for SavePersonRequest {
    fn validate(&self) -> Result<(), String> {
        let name_len = self.name.trim().chars().count();
        if !(2..=50).contains(&name_len) {
            return Err("name must be 2-50 characters".to_string());
        }
        Ok(())
    }
}

/// Name search query parameters.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchPeopleQuery {
    /// Name fragment to match (case-insensitive substring).
    pub name: String,
    /// Page number, starting at 1.
    pub page: Option<u32>,
    /// Results per page (default 10, max 100).
    pub limit: Option<u32>,
}

/// One page of search results.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PeoplePage {
    pub data: Vec<PersonRecord>,
    /// Total number of matches across all pages.
    pub total: usize,
    pub page: u32,
    pub limit: u32,
}

/// Build the people router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/people",
            axum::routing::post(save_person).get(search_people),
        )
        .route("/v1/people/iin/:iin", get(get_person_by_iin))
}

/// POST /v1/people — Save a person.
#[utoipa::path(
    post,
    path = "/v1/people",
    request_body = SavePersonRequest,
    responses(
        (status = 201, description = "Person saved", body = PersonRecord),
        (status = 400, description = "Malformed request or invalid IIN", body = crate::error::ErrorBody),
        (status = 409, description = "A person with this IIN already exists", body = crate::error::ErrorBody),
        (status = 422, description = "Name or phone failed validation", body = crate::error::ErrorBody),
    ),
    tag = "people"
)]
pub(crate) async fn save_person(
    State(state): State<AppState>,
    body: Result<Json<SavePersonRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PersonRecord>), AppError> {
    let req = extract_validated_json(body)?;

    let iin = Iin::new(req.iin).map_err(|err| {
        tracing::warn!(error = %err, "save rejected: invalid IIN");
        AppError::from(err)
    })?;
    let phone = Phone::new(req.phone)?;

    let now = Utc::now();
    let record = PersonRecord {
        id: Uuid::new_v4(),
        name: req.name.trim().to_string(),
        iin,
        phone,
        created_at: now,
        updated_at: now,
    };

    if state.people.insert_new(record.clone()).is_err() {
        return Err(AppError::Conflict(format!(
            "a person with IIN {} already exists",
            record.iin
        )));
    }

    if let Some(pool) = &state.db_pool {
        if let Err(err) = db::people::insert(pool, &record).await {
            // Roll back so the store stays a subset of durable state.
            state.people.remove(record.iin.as_str());
            tracing::error!(iin = %record.iin, error = %err, "failed to persist person");
            return Err(err.into());
        }
    }

    tracing::info!(iin = %record.iin, "person saved");
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /v1/people/iin/:iin — Fetch a person by IIN.
#[utoipa::path(
    get,
    path = "/v1/people/iin/{iin}",
    params(("iin" = String, Path, description = "IIN of the person")),
    responses(
        (status = 200, description = "Person found", body = PersonRecord),
        (status = 400, description = "IIN failed validation", body = crate::error::ErrorBody),
        (status = 404, description = "No person with this IIN", body = crate::error::ErrorBody),
    ),
    tag = "people"
)]
pub(crate) async fn get_person_by_iin(
    State(state): State<AppState>,
    Path(iin): Path<String>,
) -> Result<Json<PersonRecord>, AppError> {
    // Reject malformed IINs before touching the store, so a typo reads as
    // 400 rather than a misleading 404.
    qazid_core::validate(&iin).map_err(|err| {
        tracing::warn!(iin = %iin, error = %err, "lookup rejected: invalid IIN");
        AppError::from(err)
    })?;

    if let Some(record) = state.people.get(&iin) {
        return Ok(Json(record));
    }

    // Store miss: fall through to the database, which may hold rows written
    // by another process. A hit is loaded into the store for the next read.
    if let Some(pool) = &state.db_pool {
        if let Some(record) = db::people::get_by_iin(pool, &iin).await? {
            state.people.load([record.clone()]);
            return Ok(Json(record));
        }
    }

    Err(AppError::NotFound(format!(
        "person with IIN {iin} not found"
    )))
}

/// GET /v1/people — Paginated name search.
#[utoipa::path(
    get,
    path = "/v1/people",
    params(SearchPeopleQuery),
    responses(
        (status = 200, description = "One page of matches (possibly empty)", body = PeoplePage),
        (status = 400, description = "Missing name or invalid pagination", body = crate::error::ErrorBody),
    ),
    tag = "people"
)]
pub(crate) async fn search_people(
    State(state): State<AppState>,
    query: Result<Query<SearchPeopleQuery>, QueryRejection>,
) -> Result<Json<PeoplePage>, AppError> {
    let Query(query) = query.map_err(|err| AppError::BadRequest(err.body_text()))?;

    let name = query.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("name must not be empty".to_string()));
    }

    let page = query.page.unwrap_or(1);
    if page < 1 {
        return Err(AppError::BadRequest("invalid page number".to_string()));
    }

    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE);
    if !(1..=MAX_PAGE_SIZE).contains(&limit) {
        return Err(AppError::BadRequest(format!(
            "invalid limit (expected 1-{MAX_PAGE_SIZE})"
        )));
    }

    let offset = (page as usize - 1) * limit as usize;

    // The database is authoritative for search when configured; the
    // in-memory store serves the in-memory-only mode.
    let (data, total) = match &state.db_pool {
        Some(pool) => {
            let (data, total) =
                db::people::search_by_name(pool, name, limit as i64, offset as i64).await?;
            (data, total as usize)
        }
        None => state.people.search_by_name(name, offset, limit as usize),
    };

    Ok(Json(PeoplePage {
        data,
        total,
        page,
        limit,
    }))
}
