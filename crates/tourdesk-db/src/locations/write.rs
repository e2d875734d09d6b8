//! Write operations for the `locations` table.

use sqlx::PgPool;
use uuid::Uuid;

use super::types::{LocationRow, NewLocation};
use crate::DbError;

/// Inserts a new location.
///
/// Names are unique case-insensitively; a duplicate surfaces as a
/// unique-violation [`DbError::Sqlx`] (see [`DbError::is_unique_violation`]).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_location(
    pool: &PgPool,
    location: &NewLocation<'_>,
) -> Result<LocationRow, DbError> {
    let row = sqlx::query_as::<_, LocationRow>(
        "INSERT INTO locations (id, name, country, description) \
         VALUES ($1, $2, $3, $4) \
         RETURNING id, name, country, description, created_at, updated_at",
    )
    .bind(Uuid::new_v4())
    .bind(location.name)
    .bind(location.country)
    .bind(location.description)
    .fetch_one(pool)
    .await?;

    Ok(row)
}
