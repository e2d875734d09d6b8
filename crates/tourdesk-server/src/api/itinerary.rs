//! Itinerary handlers.
//!
//! - `POST   /api/v1/tours/:tour_id/itinerary/generate` — rebuild from stops
//! - `GET    /api/v1/tours/:tour_id/itinerary`          — days with items
//! - `POST   /api/v1/itinerary/days/:day_id/items`      — append an item
//! - `DELETE /api/v1/itinerary/items/:item_id`          — remove an item

use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tourdesk_core::{
    check_itinerary_length, plan_itinerary, resolve_stops, validate_stop_entries, ItemType,
    PlanStop, Stop,
};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{
    check_money, load_tour, map_db_error, parse_id, tours::TOUR_NOT_FOUND, validation_error,
    ApiError, ApiResponse, AppState, ResponseMeta,
};

// ---------------------------------------------------------------------------
// Request / response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(super) struct GenerateItineraryRequest {
    pub stops: Vec<Stop>,
}

#[derive(Debug, Serialize)]
pub(super) struct DurationMismatch {
    expected_days: i32,
    generated_days: usize,
}

#[derive(Debug, Serialize)]
pub(super) struct GenerateItineraryResponse {
    success: bool,
    days_created: usize,
    skipped_location_ids: Vec<Uuid>,
    duration_mismatch: Option<DurationMismatch>,
}

#[derive(Debug, Serialize)]
pub(super) struct ItineraryView {
    tour_id: Uuid,
    start_date: NaiveDate,
    days: Vec<DayView>,
}

#[derive(Debug, Serialize)]
pub(super) struct DayView {
    id: Uuid,
    day_number: i32,
    date: NaiveDate,
    location_id: Option<Uuid>,
    title: String,
    items: Vec<ItemView>,
}

#[derive(Debug, Serialize)]
pub(super) struct ItemView {
    id: Uuid,
    item_type: String,
    title: String,
    description: Option<String>,
    cost_price: Decimal,
    sales_price: Decimal,
    sort_order: i32,
}

impl From<tourdesk_db::ItineraryItemRow> for ItemView {
    fn from(row: tourdesk_db::ItineraryItemRow) -> Self {
        Self {
            id: row.id,
            item_type: row.item_type,
            title: row.title,
            description: row.description,
            cost_price: row.cost_price,
            sales_price: row.sales_price,
            sort_order: row.sort_order,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct AddItemRequest {
    pub item_type: String,
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub cost_price: Decimal,
    #[serde(default)]
    pub sales_price: Decimal,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Replace a tour's itinerary with one generated from an ordered stop list.
///
/// Every location is resolved and every route looked up before the write, and
/// the write itself is a single transaction, so a failure leaves the previous
/// itinerary in place.
pub(super) async fn generate_itinerary(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(tour_id): Path<String>,
    Json(body): Json<GenerateItineraryRequest>,
) -> Result<Json<ApiResponse<GenerateItineraryResponse>>, ApiError> {
    let rid = &req_id.0;
    let tour = load_tour(&state.pool, rid, &tour_id).await?;

    validate_stop_entries(&body.stops).map_err(|e| validation_error(rid, e.to_string()))?;

    let ids: Vec<Uuid> = body.stops.iter().map(|s| s.location_id).collect();
    let known: HashMap<Uuid, String> = tourdesk_db::get_locations_by_ids(&state.pool, &ids)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?
        .into_iter()
        .map(|location| (location.id, location.name))
        .collect();

    let resolved = resolve_stops(&body.stops, &known, state.unknown_location_policy)
        .map_err(|e| ApiError::new(rid, "not_found", e.to_string()))?;
    for location_id in &resolved.skipped {
        tracing::warn!(tour_id = %tour.id, %location_id, "skipping stop with unknown location");
    }
    if resolved.stops.is_empty() {
        return Err(validation_error(rid, "none of the stops has a known location"));
    }
    check_itinerary_length(resolved.total_nights())
        .map_err(|e| validation_error(rid, e.to_string()))?;

    let mut plan_stops = Vec::with_capacity(resolved.stops.len());
    let mut previous: Option<Uuid> = None;
    for stop in resolved.stops {
        let location_id = stop.stop.location_id;
        let inbound_route = match previous {
            Some(origin_id) => tourdesk_db::get_route(&state.pool, origin_id, location_id)
                .await
                .map_err(|e| map_db_error(rid.clone(), &e))?
                .map(|route| route.route_info()),
            None => None,
        };

        plan_stops.push(PlanStop {
            location_id,
            location_name: stop.location_name,
            nights: stop.stop.nights,
            inbound_route,
        });
        previous = Some(location_id);
    }

    let days = plan_itinerary(tour.start_date, &plan_stops)
        .map_err(|e| validation_error(rid, e.to_string()))?;

    let days_created = tourdesk_db::replace_itinerary(&state.pool, tour.id, &days)
        .await
        .map_err(|e| match e {
            tourdesk_db::DbError::NotFound => ApiError::new(rid, "not_found", TOUR_NOT_FOUND),
            other => map_db_error(rid.clone(), &other),
        })?;

    let duration_mismatch = tour
        .duration_days
        .filter(|&expected| usize::try_from(expected).ok() != Some(days_created))
        .map(|expected_days| DurationMismatch {
            expected_days,
            generated_days: days_created,
        });
    if let Some(mismatch) = &duration_mismatch {
        tracing::warn!(
            tour_id = %tour.id,
            expected = mismatch.expected_days,
            generated = mismatch.generated_days,
            "generated itinerary length differs from tour duration"
        );
    }

    tracing::info!(tour_id = %tour.id, days_created, "itinerary generated");

    Ok(Json(ApiResponse {
        data: GenerateItineraryResponse {
            success: true,
            days_created,
            skipped_location_ids: resolved.skipped,
            duration_mismatch,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn get_itinerary(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(tour_id): Path<String>,
) -> Result<Json<ApiResponse<ItineraryView>>, ApiError> {
    let rid = &req_id.0;
    let tour = load_tour(&state.pool, rid, &tour_id).await?;

    let days = tourdesk_db::list_itinerary_days(&state.pool, tour.id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    let items = tourdesk_db::list_itinerary_items(&state.pool, tour.id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    // Items arrive sorted, so pushing preserves sort_order within each day.
    let mut by_day: HashMap<Uuid, Vec<ItemView>> = HashMap::new();
    for item in items {
        by_day.entry(item.day_id).or_default().push(ItemView::from(item));
    }

    let days = days
        .into_iter()
        .map(|day| DayView {
            items: by_day.remove(&day.id).unwrap_or_default(),
            id: day.id,
            day_number: day.day_number,
            date: day.date,
            location_id: day.location_id,
            title: day.title,
        })
        .collect();

    Ok(Json(ApiResponse {
        data: ItineraryView {
            tour_id: tour.id,
            start_date: tour.start_date,
            days,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn add_item(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(day_id): Path<String>,
    Json(body): Json<AddItemRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ItemView>>), ApiError> {
    let rid = &req_id.0;
    let day_id = parse_id(rid, &day_id, "Day not found")?;

    let item_type = body
        .item_type
        .parse::<ItemType>()
        .map_err(|e| validation_error(rid, e.to_string()))?;
    let title = body.title.trim();
    if title.is_empty() {
        return Err(validation_error(rid, "title must not be empty"));
    }
    let cost_price = check_money(rid, "cost_price", body.cost_price)?;
    let sales_price = check_money(rid, "sales_price", body.sales_price)?;

    tourdesk_db::get_itinerary_day(&state.pool, day_id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?
        .ok_or_else(|| ApiError::new(rid, "not_found", "Day not found"))?;

    let row = tourdesk_db::add_itinerary_item(
        &state.pool,
        day_id,
        &tourdesk_db::NewItineraryItem {
            item_type,
            title,
            description: body.description.as_deref(),
            cost_price,
            sales_price,
        },
    )
    .await
    .map_err(|e| map_db_error(rid.clone(), &e))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: ItemView::from(row),
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

pub(super) async fn delete_item(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(item_id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let rid = &req_id.0;
    let item_id = parse_id(rid, &item_id, "Item not found")?;

    tourdesk_db::delete_itinerary_item(&state.pool, item_id)
        .await
        .map_err(|e| match e {
            tourdesk_db::DbError::NotFound => ApiError::new(rid, "not_found", "Item not found"),
            other => map_db_error(rid.clone(), &other),
        })?;

    Ok(Json(ApiResponse {
        data: serde_json::json!({ "deleted": true }),
        meta: ResponseMeta::new(req_id.0),
    }))
}
