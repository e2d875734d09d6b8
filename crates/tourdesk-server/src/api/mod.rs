mod financials;
mod itinerary;
mod locations;
mod routes;
mod tours;


use axum::{
    extract::State,
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{delete, get, patch, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use tourdesk_core::UnknownLocationPolicy;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};
use uuid::Uuid;

use crate::middleware::{
    enforce_rate_limit, request_id, require_bearer_auth, AuthState, RateLimitState, RequestId,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub unknown_location_policy: UnknownLocationPolicy,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "conflict" => StatusCode::CONFLICT,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn normalize_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(50).clamp(1, 200)
}

pub(super) fn map_db_error(request_id: String, error: &tourdesk_db::DbError) -> ApiError {
    tracing::error!(error = %error, "database query failed");
    ApiError::new(request_id, "internal_error", "database query failed")
}

/// Unique violations become `conflict` with `message`; anything else is a 500.
pub(super) fn map_unique_violation(
    request_id: &str,
    error: &tourdesk_db::DbError,
    message: &str,
) -> ApiError {
    if error.is_unique_violation() {
        return ApiError::new(request_id, "conflict", message);
    }
    map_db_error(request_id.to_owned(), error)
}

/// Parse a path id; a malformed id is reported the same way as a missing row.
pub(super) fn parse_id(request_id: &str, raw: &str, not_found: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::new(request_id, "not_found", not_found))
}

pub(super) fn validation_error(request_id: &str, message: impl Into<String>) -> ApiError {
    ApiError::new(request_id, "validation_error", message)
}

/// Round a money input to cents, rejecting values a `NUMERIC(12, 2)` column cannot hold.
pub(super) fn check_money(
    request_id: &str,
    field: &'static str,
    value: Decimal,
) -> Result<Decimal, ApiError> {
    tourdesk_core::validate_amount(field, value)
        .map_err(|e| validation_error(request_id, e.to_string()))
}

pub(super) fn check_margin(request_id: &str, margin: Decimal) -> Result<Decimal, ApiError> {
    tourdesk_core::validate_margin("profit_margin", margin)
        .map_err(|e| validation_error(request_id, e.to_string()))
}

/// Resolve a tour id from the path, returning 404 when it is malformed or unknown.
pub(super) async fn load_tour(
    pool: &PgPool,
    request_id: &str,
    raw_id: &str,
) -> Result<tourdesk_db::TourRow, ApiError> {
    let tour_id = parse_id(request_id, raw_id, tours::TOUR_NOT_FOUND)?;
    tourdesk_db::get_tour(pool, tour_id)
        .await
        .map_err(|e| map_db_error(request_id.to_owned(), &e))?
        .ok_or_else(|| ApiError::new(request_id, "not_found", tours::TOUR_NOT_FOUND))
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

fn protected_router(auth: AuthState, rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/tours",
            get(tours::list_tours).post(tours::create_tour),
        )
        .route("/api/v1/tours/{tour_id}", get(tours::get_tour))
        .route(
            "/api/v1/tours/{tour_id}/status",
            patch(tours::update_tour_status),
        )
        .route(
            "/api/v1/tours/{tour_id}/itinerary",
            get(itinerary::get_itinerary),
        )
        .route(
            "/api/v1/tours/{tour_id}/itinerary/generate",
            post(itinerary::generate_itinerary),
        )
        .route(
            "/api/v1/tours/{tour_id}/financials",
            get(financials::get_financials),
        )
        .route("/api/v1/financials", post(financials::save_financials))
        .route(
            "/api/v1/itinerary/days/{day_id}/items",
            post(itinerary::add_item),
        )
        .route(
            "/api/v1/itinerary/items/{item_id}",
            delete(itinerary::delete_item),
        )
        .route(
            "/api/v1/locations",
            get(locations::list_locations).post(locations::create_location),
        )
        .route(
            "/api/v1/routes",
            get(routes::list_routes).post(routes::create_route),
        )
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    rate_limit,
                    enforce_rate_limit,
                ))
                .layer(axum::middleware::from_fn_with_state(
                    auth,
                    require_bearer_auth,
                )),
        )
}

pub fn build_app(state: AppState, auth: AuthState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(protected_router(auth, rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::X_CONTENT_TYPE_OPTIONS,
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);

    match tourdesk_db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    database: "ok",
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        database: "unavailable",
                    },
                    meta,
                }),
            )
        }
    }
}
