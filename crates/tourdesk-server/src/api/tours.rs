//! Tour handlers.
//!
//! - `GET   /api/v1/tours`                  — list, optional `?status=&limit=`
//! - `POST  /api/v1/tours`                  — create a draft tour
//! - `GET   /api/v1/tours/:tour_id`         — single tour
//! - `PATCH /api/v1/tours/:tour_id/status`  — set status

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tourdesk_core::TourStatus;
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{
    load_tour, map_db_error, normalize_limit, validation_error, ApiError, ApiResponse, AppState,
    ResponseMeta,
};

pub(super) const TOUR_NOT_FOUND: &str = "Tour not found";

const MAX_NAME_LEN: usize = 200;

#[derive(Debug, Serialize)]
pub(super) struct TourItem {
    id: Uuid,
    name: String,
    start_date: NaiveDate,
    duration_days: Option<i32>,
    total_pax: i32,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<tourdesk_db::TourRow> for TourItem {
    fn from(row: tourdesk_db::TourRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            start_date: row.start_date,
            duration_days: row.duration_days,
            total_pax: row.total_pax,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct TourQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CreateTourRequest {
    pub name: String,
    pub start_date: NaiveDate,
    pub duration_days: Option<i32>,
    #[serde(default)]
    pub total_pax: i32,
}

#[derive(Debug, Deserialize)]
pub(super) struct UpdateStatusRequest {
    pub status: String,
}

fn parse_status(request_id: &str, raw: &str) -> Result<TourStatus, ApiError> {
    raw.parse::<TourStatus>()
        .map_err(|e| validation_error(request_id, e.to_string()))
}

pub(super) async fn list_tours(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<TourQuery>,
) -> Result<Json<ApiResponse<Vec<TourItem>>>, ApiError> {
    let status = query
        .status
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(|s| parse_status(&req_id.0, s))
        .transpose()?;

    let rows = tourdesk_db::list_tours(&state.pool, status, normalize_limit(query.limit))
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: rows.into_iter().map(TourItem::from).collect(),
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn create_tour(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreateTourRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TourItem>>), ApiError> {
    let rid = &req_id.0;

    let name = body.name.trim();
    if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
        return Err(validation_error(rid, "name must be 1–200 characters"));
    }
    if body.total_pax < 0 {
        return Err(validation_error(rid, "total_pax must not be negative"));
    }
    if body.duration_days.is_some_and(|d| d <= 0) {
        return Err(validation_error(rid, "duration_days must be positive"));
    }

    let row = tourdesk_db::create_tour(
        &state.pool,
        &tourdesk_db::NewTour {
            name,
            start_date: body.start_date,
            duration_days: body.duration_days,
            total_pax: body.total_pax,
        },
    )
    .await
    .map_err(|e| map_db_error(rid.clone(), &e))?;

    tracing::info!(tour_id = %row.id, "tour created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: TourItem::from(row),
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

pub(super) async fn get_tour(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(tour_id): Path<String>,
) -> Result<Json<ApiResponse<TourItem>>, ApiError> {
    let row = load_tour(&state.pool, &req_id.0, &tour_id).await?;

    Ok(Json(ApiResponse {
        data: TourItem::from(row),
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// Any status may follow any other.
pub(super) async fn update_tour_status(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(tour_id): Path<String>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<ApiResponse<TourItem>>, ApiError> {
    let rid = &req_id.0;
    let tour = load_tour(&state.pool, rid, &tour_id).await?;
    let status = parse_status(rid, &body.status)?;

    let row = tourdesk_db::update_tour_status(&state.pool, tour.id, status)
        .await
        .map_err(|e| match e {
            tourdesk_db::DbError::NotFound => ApiError::new(rid, "not_found", TOUR_NOT_FOUND),
            other => map_db_error(rid.clone(), &other),
        })?;

    Ok(Json(ApiResponse {
        data: TourItem::from(row),
        meta: ResponseMeta::new(req_id.0),
    }))
}
