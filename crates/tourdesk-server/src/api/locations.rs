use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{
    map_db_error, map_unique_violation, validation_error, ApiError, ApiResponse, AppState,
    ResponseMeta,
};

#[derive(Debug, Serialize)]
pub(super) struct LocationItem {
    id: Uuid,
    name: String,
    country: Option<String>,
    description: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<tourdesk_db::LocationRow> for LocationItem {
    fn from(row: tourdesk_db::LocationRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            country: row.country,
            description: row.description,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct CreateLocationRequest {
    pub name: String,
    pub country: Option<String>,
    pub description: Option<String>,
}

pub(super) async fn list_locations(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<LocationItem>>>, ApiError> {
    let rows = tourdesk_db::list_locations(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: rows.into_iter().map(LocationItem::from).collect(),
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn create_location(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreateLocationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<LocationItem>>), ApiError> {
    let rid = &req_id.0;

    let name = body.name.trim();
    if name.is_empty() || name.chars().count() > 200 {
        return Err(validation_error(rid, "name must be 1–200 characters"));
    }

    let row = tourdesk_db::create_location(
        &state.pool,
        &tourdesk_db::NewLocation {
            name,
            country: body.country.as_deref().map(str::trim).filter(|s| !s.is_empty()),
            description: body.description.as_deref(),
        },
    )
    .await
    .map_err(|e| map_unique_violation(rid, &e, "a location with that name already exists"))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: LocationItem::from(row),
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}
