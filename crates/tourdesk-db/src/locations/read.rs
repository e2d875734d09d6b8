//! Read operations for the `locations` table.

use sqlx::PgPool;
use uuid::Uuid;

use super::types::LocationRow;
use crate::DbError;

/// Returns all locations ordered by name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_locations(pool: &PgPool) -> Result<Vec<LocationRow>, DbError> {
    let rows = sqlx::query_as::<_, LocationRow>(
        "SELECT id, name, country, description, created_at, updated_at \
         FROM locations \
         ORDER BY name",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns the locations among `ids` that exist. Unknown ids are simply absent
/// from the result; order is unspecified.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_locations_by_ids(
    pool: &PgPool,
    ids: &[Uuid],
) -> Result<Vec<LocationRow>, DbError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let rows = sqlx::query_as::<_, LocationRow>(
        "SELECT id, name, country, description, created_at, updated_at \
         FROM locations \
         WHERE id = ANY($1)",
    )
    .bind(ids)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
