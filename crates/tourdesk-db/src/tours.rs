//! Database operations for the `tours` table.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use tourdesk_core::TourStatus;
use uuid::Uuid;

use crate::DbError;

/// A row from the `tours` table.
///
/// `status` is stored as text; use [`TourRow::tour_status`] for the typed value.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TourRow {
    pub id: Uuid,
    pub name: String,
    pub start_date: NaiveDate,
    pub duration_days: Option<i32>,
    pub total_pax: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TourRow {
    /// Parse the stored status label.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidData`] if the label is not a known status.
    pub fn tour_status(&self) -> Result<TourStatus, DbError> {
        Ok(self.status.parse::<TourStatus>()?)
    }
}

#[derive(Debug, Clone)]
pub struct NewTour<'a> {
    pub name: &'a str,
    pub start_date: NaiveDate,
    pub duration_days: Option<i32>,
    pub total_pax: i32,
}

const TOUR_COLUMNS: &str =
    "id, name, start_date, duration_days, total_pax, status, created_at, updated_at";

/// Creates a tour in `draft` status.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_tour(pool: &PgPool, tour: &NewTour<'_>) -> Result<TourRow, DbError> {
    let row = sqlx::query_as::<_, TourRow>(&format!(
        "INSERT INTO tours (id, name, start_date, duration_days, total_pax, status) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING {TOUR_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(tour.name)
    .bind(tour.start_date)
    .bind(tour.duration_days)
    .bind(tour.total_pax)
    .bind(TourStatus::Draft.as_str())
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Returns a tour by id, or `None` if it does not exist.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_tour(pool: &PgPool, id: Uuid) -> Result<Option<TourRow>, DbError> {
    let row = sqlx::query_as::<_, TourRow>(&format!(
        "SELECT {TOUR_COLUMNS} FROM tours WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns tours ordered by start date (soonest first), optionally filtered by status.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_tours(
    pool: &PgPool,
    status: Option<TourStatus>,
    limit: i64,
) -> Result<Vec<TourRow>, DbError> {
    let rows = sqlx::query_as::<_, TourRow>(&format!(
        "SELECT {TOUR_COLUMNS} FROM tours \
         WHERE ($1::TEXT IS NULL OR status = $1) \
         ORDER BY start_date, name \
         LIMIT $2"
    ))
    .bind(status.map(TourStatus::as_str))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Sets a tour's status. Transitions are not guarded.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no tour has this id, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn update_tour_status(
    pool: &PgPool,
    id: Uuid,
    status: TourStatus,
) -> Result<TourRow, DbError> {
    let row = sqlx::query_as::<_, TourRow>(&format!(
        "UPDATE tours SET status = $1, updated_at = NOW() \
         WHERE id = $2 \
         RETURNING {TOUR_COLUMNS}"
    ))
    .bind(status.as_str())
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.ok_or(DbError::NotFound)
}
