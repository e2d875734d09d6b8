//! Tour pricing handlers.
//!
//! - `POST /api/v1/financials`                 — save budget, margin and price (form)
//! - `GET  /api/v1/tours/:tour_id/financials`  — computed summary

use axum::{
    extract::{Path, Query, State},
    Extension, Form, Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tourdesk_core::{
    coerce_decimal, non_blank, recommended_price, total_base_cost, FinancialInputs,
    FinancialSummary, PriceSource,
};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{
    check_margin, check_money, load_tour, map_db_error, validation_error, ApiError, ApiResponse,
    AppState, ResponseMeta,
};

/// Form fields arrive as text; numbers are coerced, so blanks become zero.
#[derive(Debug, Deserialize)]
pub(super) struct SaveFinancialsForm {
    pub tour_id: Option<String>,
    pub budget: Option<String>,
    pub profit_margin: Option<String>,
    pub selling_price: Option<String>,
    pub last_edited: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct SaveFinancialsResponse {
    success: bool,
    selling_price: Decimal,
    price_source: PriceSource,
}

#[derive(Debug, Deserialize)]
pub(super) struct FinancialsQuery {
    pub margin: Option<String>,
    pub last_edited: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct FinancialsView {
    tour_id: Uuid,
    budget: Decimal,
    total_pax: i32,
    #[serde(flatten)]
    summary: FinancialSummary,
}

fn parse_price_source(request_id: &str, raw: Option<&str>) -> Result<Option<PriceSource>, ApiError> {
    non_blank(raw)
        .map(|s| {
            s.parse::<PriceSource>()
                .map_err(|e| validation_error(request_id, e.to_string()))
        })
        .transpose()
}

/// Save a tour's pricing inputs.
///
/// When the margin was edited last the stored selling price is recomputed
/// from the current itinerary; when the price was typed in it is kept.
pub(super) async fn save_financials(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Form(form): Form<SaveFinancialsForm>,
) -> Result<Json<ApiResponse<SaveFinancialsResponse>>, ApiError> {
    let rid = &req_id.0;

    let raw_tour_id = non_blank(form.tour_id.as_deref())
        .ok_or_else(|| validation_error(rid, "Missing Tour ID"))?;
    let tour = load_tour(&state.pool, rid, raw_tour_id).await?;

    let budget = check_money(
        rid,
        "budget",
        coerce_decimal(form.budget.as_deref().unwrap_or_default()),
    )?;
    let margin = check_margin(
        rid,
        coerce_decimal(form.profit_margin.as_deref().unwrap_or_default()),
    )?;
    let price_source =
        parse_price_source(rid, form.last_edited.as_deref())?.unwrap_or_default();

    let selling_price = match price_source {
        PriceSource::Margin => {
            let lines = tourdesk_db::list_tour_cost_lines(&state.pool, tour.id)
                .await
                .map_err(|e| map_db_error(rid.clone(), &e))?;
            recommended_price(total_base_cost(&lines), margin)
        }
        PriceSource::Manual => coerce_decimal(form.selling_price.as_deref().unwrap_or_default()),
    };
    let selling_price = check_money(rid, "selling_price", selling_price)?;

    let row = tourdesk_db::upsert_tour_financials(
        &state.pool,
        tour.id,
        budget,
        margin,
        selling_price,
        price_source,
    )
    .await
    .map_err(|e| map_db_error(rid.clone(), &e))?;

    tracing::info!(
        tour_id = %tour.id,
        %price_source,
        selling_price = %row.selling_price,
        "tour financials saved"
    );

    Ok(Json(ApiResponse {
        data: SaveFinancialsResponse {
            success: true,
            selling_price: row.selling_price,
            price_source,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// Compute the pricing summary for a tour.
///
/// `?margin=` and `?last_edited=` override the saved values without storing
/// anything, for previewing a margin change. A margin preview without
/// `last_edited` counts as a margin edit.
pub(super) async fn get_financials(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(tour_id): Path<String>,
    Query(query): Query<FinancialsQuery>,
) -> Result<Json<ApiResponse<FinancialsView>>, ApiError> {
    let rid = &req_id.0;
    let tour = load_tour(&state.pool, rid, &tour_id).await?;

    let saved = tourdesk_db::get_tour_financials(&state.pool, tour.id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    let lines = tourdesk_db::list_tour_cost_lines(&state.pool, tour.id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    let margin_preview = non_blank(query.margin.as_deref())
        .map(|raw| check_margin(rid, coerce_decimal(raw)))
        .transpose()?;
    let margin_percent = match margin_preview {
        Some(margin) => margin,
        None => saved.as_ref().map_or(Decimal::ZERO, |f| f.profit_margin),
    };
    let price_source = match parse_price_source(rid, query.last_edited.as_deref())? {
        Some(source) => source,
        None if margin_preview.is_some() => PriceSource::Margin,
        None => match &saved {
            Some(f) => f.source().map_err(|e| map_db_error(rid.clone(), &e))?,
            None => PriceSource::default(),
        },
    };

    let summary = FinancialSummary::compute(&FinancialInputs {
        lines: &lines,
        margin_percent,
        saved_selling_price: saved.as_ref().map(|f| f.selling_price),
        price_source,
        total_pax: tour.total_pax,
    });

    Ok(Json(ApiResponse {
        data: FinancialsView {
            tour_id: tour.id,
            budget: saved.as_ref().map_or(Decimal::ZERO, |f| f.budget),
            total_pax: tour.total_pax,
            summary,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
