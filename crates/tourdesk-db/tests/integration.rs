//! Offline unit tests for tourdesk-db pool configuration and row types.
//! These tests do not require a live database connection.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use tourdesk_core::{AppConfig, Environment, ItemType, PriceSource, TourStatus, UnknownLocationPolicy};
use tourdesk_db::{DbError, ItineraryItemRow, PoolConfig, RouteRow, TourFinancialsRow, TourRow};
use uuid::Uuid;

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let app_config = AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
        log_level: "info".to_string(),
        catalog_path: PathBuf::from("./config/catalog.yaml"),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        unknown_location_policy: UnknownLocationPolicy::Reject,
        rate_limit_per_minute: 120,
    };

    let pool_config = PoolConfig::from_app_config(&app_config);
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

fn tour_row(status: &str) -> TourRow {
    TourRow {
        id: Uuid::new_v4(),
        name: "Cultural Triangle".to_string(),
        start_date: NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date"),
        duration_days: Some(3),
        total_pax: 2,
        status: status.to_string(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[test]
fn tour_row_parses_stored_status() {
    assert_eq!(
        tour_row("confirmed").tour_status().expect("known status"),
        TourStatus::Confirmed
    );
}

#[test]
fn tour_row_with_unknown_status_is_invalid_data() {
    let err = tour_row("archived").tour_status().unwrap_err();
    assert!(matches!(err, DbError::InvalidData(_)));
}

#[test]
fn item_row_parses_item_type() {
    let row = ItineraryItemRow {
        id: Uuid::new_v4(),
        day_id: Uuid::new_v4(),
        item_type: "meal".to_string(),
        title: "Dinner".to_string(),
        description: None,
        cost_price: Decimal::new(1500, 2),
        sales_price: Decimal::new(2000, 2),
        sort_order: 0,
        created_at: Utc::now(),
    };

    assert_eq!(row.kind().expect("known type"), ItemType::Meal);
}

#[test]
fn financials_row_parses_price_source() {
    let row = TourFinancialsRow {
        tour_id: Uuid::new_v4(),
        budget: Decimal::ZERO,
        profit_margin: Decimal::from(20),
        selling_price: Decimal::from(420),
        price_source: "manual".to_string(),
        updated_at: Utc::now(),
    };

    assert_eq!(row.source().expect("known source"), PriceSource::Manual);
}

#[test]
fn route_row_exposes_transfer_info() {
    let row = RouteRow {
        id: Uuid::new_v4(),
        origin_id: Uuid::new_v4(),
        destination_id: Uuid::new_v4(),
        description: Some("Private car".to_string()),
        duration: Some("3h".to_string()),
        cost_price: Decimal::from(40),
        sales_price: Decimal::from(55),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    let info = row.route_info();
    assert_eq!(info.description.as_deref(), Some("Private car"));
    assert_eq!(info.duration.as_deref(), Some("3h"));
    assert_eq!(info.cost_price, Decimal::from(40));
    assert_eq!(info.sales_price, Decimal::from(55));
}
