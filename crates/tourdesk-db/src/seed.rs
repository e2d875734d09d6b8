use std::collections::HashMap;

use sqlx::PgPool;
use tourdesk_core::CatalogFile;
use uuid::Uuid;

use crate::DbError;

/// Counts of catalog rows written by [`seed_catalog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeedSummary {
    pub locations: usize,
    /// Directional routes; a bidirectional entry counts twice.
    pub routes: usize,
}

/// Upsert catalog locations and routes into the database.
///
/// Locations are matched case-insensitively by name, routes by their
/// `(origin, destination)` pair. Re-running with the same catalog leaves the
/// tables unchanged apart from `updated_at`. All upserts run inside a single
/// transaction; if any operation fails the entire batch is rolled back.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any database operation fails.
pub async fn seed_catalog(pool: &PgPool, catalog: &CatalogFile) -> Result<SeedSummary, DbError> {
    let mut tx = pool.begin().await?;
    let mut ids: HashMap<String, Uuid> = HashMap::with_capacity(catalog.locations.len());

    for location in &catalog.locations {
        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO locations (id, name, country, description) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT ((LOWER(name))) DO UPDATE SET \
                 country = EXCLUDED.country, \
                 description = EXCLUDED.description, \
                 updated_at = NOW() \
             RETURNING id",
        )
        .bind(Uuid::new_v4())
        .bind(&location.name)
        .bind(&location.country)
        .bind(&location.description)
        .fetch_one(&mut *tx)
        .await?;

        ids.insert(location.name.to_lowercase(), id);
    }

    let mut routes = 0usize;
    for route in &catalog.routes {
        for (origin, destination) in route.directions() {
            // Validated catalogs only reference declared locations.
            let (Some(&origin_id), Some(&destination_id)) = (
                ids.get(&origin.to_lowercase()),
                ids.get(&destination.to_lowercase()),
            ) else {
                tracing::warn!(origin, destination, "route endpoint not in catalog, skipping");
                continue;
            };

            sqlx::query(
                "INSERT INTO routes \
                     (id, origin_id, destination_id, description, duration, cost_price, sales_price) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7) \
                 ON CONFLICT (origin_id, destination_id) DO UPDATE SET \
                     description = EXCLUDED.description, \
                     duration = EXCLUDED.duration, \
                     cost_price = EXCLUDED.cost_price, \
                     sales_price = EXCLUDED.sales_price, \
                     updated_at = NOW()",
            )
            .bind(Uuid::new_v4())
            .bind(origin_id)
            .bind(destination_id)
            .bind(&route.description)
            .bind(&route.duration)
            .bind(route.cost_price)
            .bind(route.sales_price)
            .execute(&mut *tx)
            .await?;

            routes += 1;
        }
    }

    tx.commit().await?;

    Ok(SeedSummary {
        locations: ids.len(),
        routes,
    })
}
