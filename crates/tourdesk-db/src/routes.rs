//! Database operations for the directional `routes` table.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tourdesk_core::RouteInfo;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `routes` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RouteRow {
    pub id: Uuid,
    pub origin_id: Uuid,
    pub destination_id: Uuid,
    pub description: Option<String>,
    pub duration: Option<String>,
    pub cost_price: Decimal,
    pub sales_price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RouteRow {
    /// The parts of the route used to pre-fill a transfer item.
    #[must_use]
    pub fn route_info(&self) -> RouteInfo {
        RouteInfo {
            description: self.description.clone(),
            duration: self.duration.clone(),
            cost_price: self.cost_price,
            sales_price: self.sales_price,
        }
    }
}

/// A route joined with its endpoint names, for listings.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RouteSummaryRow {
    pub id: Uuid,
    pub origin_id: Uuid,
    pub origin_name: String,
    pub destination_id: Uuid,
    pub destination_name: String,
    pub description: Option<String>,
    pub duration: Option<String>,
    pub cost_price: Decimal,
    pub sales_price: Decimal,
}

#[derive(Debug, Clone)]
pub struct NewRoute<'a> {
    pub origin_id: Uuid,
    pub destination_id: Uuid,
    pub description: Option<&'a str>,
    pub duration: Option<&'a str>,
    pub cost_price: Decimal,
    pub sales_price: Decimal,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns every route with endpoint names, ordered by origin then destination.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_routes(pool: &PgPool) -> Result<Vec<RouteSummaryRow>, DbError> {
    let rows = sqlx::query_as::<_, RouteSummaryRow>(
        "SELECT r.id, r.origin_id, o.name AS origin_name, \
                r.destination_id, d.name AS destination_name, \
                r.description, r.duration, r.cost_price, r.sales_price \
         FROM routes r \
         JOIN locations o ON o.id = r.origin_id \
         JOIN locations d ON d.id = r.destination_id \
         ORDER BY o.name, d.name",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Looks up the route from `origin_id` to `destination_id`, if one is on file.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_route(
    pool: &PgPool,
    origin_id: Uuid,
    destination_id: Uuid,
) -> Result<Option<RouteRow>, DbError> {
    let row = sqlx::query_as::<_, RouteRow>(
        "SELECT id, origin_id, destination_id, description, duration, \
                cost_price, sales_price, created_at, updated_at \
         FROM routes \
         WHERE origin_id = $1 AND destination_id = $2",
    )
    .bind(origin_id)
    .bind(destination_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Inserts a new route. A duplicate `(origin, destination)` pair surfaces as a
/// unique-violation [`DbError::Sqlx`].
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_route(pool: &PgPool, route: &NewRoute<'_>) -> Result<RouteRow, DbError> {
    let row = sqlx::query_as::<_, RouteRow>(
        "INSERT INTO routes \
             (id, origin_id, destination_id, description, duration, cost_price, sales_price) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         RETURNING id, origin_id, destination_id, description, duration, \
                   cost_price, sales_price, created_at, updated_at",
    )
    .bind(Uuid::new_v4())
    .bind(route.origin_id)
    .bind(route.destination_id)
    .bind(route.description)
    .bind(route.duration)
    .bind(route.cost_price)
    .bind(route.sales_price)
    .fetch_one(pool)
    .await?;

    Ok(row)
}
