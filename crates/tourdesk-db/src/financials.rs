//! Database operations for `tour_financials`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tourdesk_core::{PriceSource, PricedLine};
use uuid::Uuid;

use crate::DbError;

/// A row from the `tour_financials` table. One per tour.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TourFinancialsRow {
    pub tour_id: Uuid,
    pub budget: Decimal,
    pub profit_margin: Decimal,
    pub selling_price: Decimal,
    pub price_source: String,
    pub updated_at: DateTime<Utc>,
}

impl TourFinancialsRow {
    /// # Errors
    ///
    /// Returns [`DbError::InvalidData`] if the stored label is unknown.
    pub fn source(&self) -> Result<PriceSource, DbError> {
        Ok(self.price_source.parse::<PriceSource>()?)
    }
}

/// Inserts or overwrites the financial summary for a tour.
///
/// Keyed by `tour_id`; calling it repeatedly leaves exactly one row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails (including an unknown tour).
pub async fn upsert_tour_financials(
    pool: &PgPool,
    tour_id: Uuid,
    budget: Decimal,
    profit_margin: Decimal,
    selling_price: Decimal,
    price_source: PriceSource,
) -> Result<TourFinancialsRow, DbError> {
    let row = sqlx::query_as::<_, TourFinancialsRow>(
        "INSERT INTO tour_financials \
             (tour_id, budget, profit_margin, selling_price, price_source) \
         VALUES ($1, $2, $3, $4, $5) \
         ON CONFLICT (tour_id) DO UPDATE SET \
             budget        = EXCLUDED.budget, \
             profit_margin = EXCLUDED.profit_margin, \
             selling_price = EXCLUDED.selling_price, \
             price_source  = EXCLUDED.price_source, \
             updated_at    = NOW() \
         RETURNING tour_id, budget, profit_margin, selling_price, price_source, updated_at",
    )
    .bind(tour_id)
    .bind(budget)
    .bind(profit_margin)
    .bind(selling_price)
    .bind(price_source.as_str())
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Returns the saved financial summary for a tour, if any.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_tour_financials(
    pool: &PgPool,
    tour_id: Uuid,
) -> Result<Option<TourFinancialsRow>, DbError> {
    let row = sqlx::query_as::<_, TourFinancialsRow>(
        "SELECT tour_id, budget, profit_margin, selling_price, price_source, updated_at \
         FROM tour_financials \
         WHERE tour_id = $1",
    )
    .bind(tour_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns the cost and sale price of every item on a tour's itinerary.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_tour_cost_lines(pool: &PgPool, tour_id: Uuid) -> Result<Vec<PricedLine>, DbError> {
    let rows = sqlx::query_as::<_, (Decimal, Decimal)>(
        "SELECT i.cost_price, i.sales_price \
         FROM itinerary_items i \
         JOIN itinerary_days d ON d.id = i.day_id \
         WHERE d.tour_id = $1",
    )
    .bind(tour_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(cost_price, sales_price)| PricedLine {
            cost_price,
            sales_price,
        })
        .collect())
}
