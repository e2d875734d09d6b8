pub mod app_config;
pub mod catalog;
pub mod config;
pub mod financials;
pub mod itinerary;
pub mod tours;

pub use app_config::{AppConfig, Environment};
pub use catalog::{load_catalog, CatalogFile, LocationConfig, RouteConfig};
pub use config::{
    catalog_path_from_env, load_app_config, load_app_config_from_env, DEFAULT_CATALOG_PATH,
};
pub use financials::{
    actual_margin, coerce_decimal, cost_per_pax, recommended_price, total_base_cost,
    total_sales_value, validate_amount, validate_margin, FinancialInputs, FinancialSummary,
    PriceSource, PricedLine, MAX_AMOUNT, MAX_MARGIN_PERCENT,
};
pub use itinerary::{
    check_itinerary_length, plan_itinerary, resolve_stops, total_nights, transfer_description,
    validate_stop_entries, validate_stops,
    PlanStop, PlannedDay, PlannedItem, ResolvedStop, ResolvedStops, RouteInfo, Stop,
    UnknownLocationPolicy, MAX_ITINERARY_DAYS,
};
pub use tours::{ItemType, TourStatus};

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// Trim `value` and drop it when nothing is left.
#[must_use]
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read catalog file {path}: {source}")]
    CatalogFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog file: {0}")]
    CatalogFileParse(#[from] serde_yaml::Error),

    #[error("catalog validation failed: {0}")]
    Validation(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid tour status: {0}")]
    InvalidTourStatus(String),

    #[error("invalid item type: {0}")]
    InvalidItemType(String),

    #[error("invalid price source: {0}")]
    InvalidPriceSource(String),

    #[error("invalid unknown-location policy: {0}")]
    InvalidLocationPolicy(String),

    #[error("at least one stop is required")]
    EmptyStops,

    #[error("stop {index} must have at least one night")]
    ZeroNights { index: usize },

    #[error("itinerary exceeds {max} days (got {total})")]
    TooManyNights { total: u64, max: u32 },

    #[error("location {0} not found")]
    UnknownLocation(Uuid),

    #[error("itinerary date out of range")]
    DateOutOfRange,

    #[error("{field} must be between 0 and {max}")]
    AmountOutOfRange { field: &'static str, max: Decimal },
}
