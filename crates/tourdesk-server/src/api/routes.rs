//! Directional transfer routes between catalog locations.

use axum::{extract::State, http::StatusCode, Extension, Json};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{
    check_money, map_db_error, map_unique_violation, validation_error, ApiError, ApiResponse,
    AppState, ResponseMeta,
};

#[derive(Debug, Serialize)]
pub(super) struct RouteItem {
    id: Uuid,
    origin_id: Uuid,
    origin_name: String,
    destination_id: Uuid,
    destination_name: String,
    description: Option<String>,
    duration: Option<String>,
    cost_price: Decimal,
    sales_price: Decimal,
}

#[derive(Debug, Serialize)]
pub(super) struct CreatedRoute {
    id: Uuid,
    origin_id: Uuid,
    destination_id: Uuid,
    description: Option<String>,
    duration: Option<String>,
    cost_price: Decimal,
    sales_price: Decimal,
}

#[derive(Debug, Deserialize)]
pub(super) struct CreateRouteRequest {
    pub origin_id: Uuid,
    pub destination_id: Uuid,
    pub description: Option<String>,
    pub duration: Option<String>,
    #[serde(default)]
    pub cost_price: Decimal,
    #[serde(default)]
    pub sales_price: Decimal,
}

pub(super) async fn list_routes(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<RouteItem>>>, ApiError> {
    let rows = tourdesk_db::list_routes(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| RouteItem {
            id: row.id,
            origin_id: row.origin_id,
            origin_name: row.origin_name,
            destination_id: row.destination_id,
            destination_name: row.destination_name,
            description: row.description,
            duration: row.duration,
            cost_price: row.cost_price,
            sales_price: row.sales_price,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn create_route(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreateRouteRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CreatedRoute>>), ApiError> {
    let rid = &req_id.0;

    if body.origin_id == body.destination_id {
        return Err(validation_error(rid, "origin and destination must differ"));
    }
    let cost_price = check_money(rid, "cost_price", body.cost_price)?;
    let sales_price = check_money(rid, "sales_price", body.sales_price)?;

    let endpoints =
        tourdesk_db::get_locations_by_ids(&state.pool, &[body.origin_id, body.destination_id])
            .await
            .map_err(|e| map_db_error(rid.clone(), &e))?;
    for id in [body.origin_id, body.destination_id] {
        if !endpoints.iter().any(|l| l.id == id) {
            return Err(ApiError::new(
                rid,
                "not_found",
                format!("location {id} not found"),
            ));
        }
    }

    let row = tourdesk_db::create_route(
        &state.pool,
        &tourdesk_db::NewRoute {
            origin_id: body.origin_id,
            destination_id: body.destination_id,
            description: body.description.as_deref(),
            duration: body.duration.as_deref(),
            cost_price,
            sales_price,
        },
    )
    .await
    .map_err(|e| map_unique_violation(rid, &e, "a route between those locations already exists"))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: CreatedRoute {
                id: row.id,
                origin_id: row.origin_id,
                destination_id: row.destination_id,
                description: row.description,
                duration: row.duration,
                cost_price: row.cost_price,
                sales_price: row.sales_price,
            },
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}
