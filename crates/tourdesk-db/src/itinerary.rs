//! Database operations for `itinerary_days` and `itinerary_items`.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tourdesk_core::{ItemType, PlannedDay};
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `itinerary_days` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ItineraryDayRow {
    pub id: Uuid,
    pub tour_id: Uuid,
    /// `NULL` once the location it pointed at has been deleted.
    pub location_id: Option<Uuid>,
    pub day_number: i32,
    pub date: NaiveDate,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

/// A row from the `itinerary_items` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ItineraryItemRow {
    pub id: Uuid,
    pub day_id: Uuid,
    pub item_type: String,
    pub title: String,
    pub description: Option<String>,
    pub cost_price: Decimal,
    pub sales_price: Decimal,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

impl ItineraryItemRow {
    /// Parse the stored item type.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidData`] if the stored label is unknown.
    pub fn kind(&self) -> Result<ItemType, DbError> {
        Ok(self.item_type.parse::<ItemType>()?)
    }
}

#[derive(Debug, Clone)]
pub struct NewItineraryItem<'a> {
    pub item_type: ItemType,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub cost_price: Decimal,
    pub sales_price: Decimal,
}

const ITEM_COLUMNS: &str = "id, day_id, item_type, title, description, cost_price, sales_price, \
                            sort_order, created_at";

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Replaces a tour's whole itinerary with `days`.
///
/// Locks the tour row, deletes every existing day (items cascade), then
/// inserts the new days and their items. All of it runs in one transaction;
/// on any failure nothing changes. Returns the number of days written.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the tour does not exist, or
/// [`DbError::Sqlx`] if any statement fails.
pub async fn replace_itinerary(
    pool: &PgPool,
    tour_id: Uuid,
    days: &[PlannedDay],
) -> Result<usize, DbError> {
    let mut tx = pool.begin().await?;

    let locked: Option<Uuid> = sqlx::query_scalar("SELECT id FROM tours WHERE id = $1 FOR UPDATE")
        .bind(tour_id)
        .fetch_optional(&mut *tx)
        .await?;
    if locked.is_none() {
        return Err(DbError::NotFound);
    }

    let deleted = sqlx::query("DELETE FROM itinerary_days WHERE tour_id = $1")
        .bind(tour_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    for day in days {
        let day_id = Uuid::new_v4();

        sqlx::query(
            "INSERT INTO itinerary_days (id, tour_id, location_id, day_number, date, title) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(day_id)
        .bind(tour_id)
        .bind(day.location_id)
        .bind(day.day_number)
        .bind(day.date)
        .bind(&day.title)
        .execute(&mut *tx)
        .await?;

        for item in &day.items {
            sqlx::query(
                "INSERT INTO itinerary_items \
                     (id, day_id, item_type, title, description, cost_price, sales_price, sort_order) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
            )
            .bind(Uuid::new_v4())
            .bind(day_id)
            .bind(item.item_type.as_str())
            .bind(&item.title)
            .bind(&item.description)
            .bind(item.cost_price)
            .bind(item.sales_price)
            .bind(item.sort_order)
            .execute(&mut *tx)
            .await?;
        }
    }

    tx.commit().await?;

    tracing::debug!(%tour_id, deleted, created = days.len(), "itinerary replaced");
    Ok(days.len())
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// Returns a tour's days ordered by `day_number`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_itinerary_days(
    pool: &PgPool,
    tour_id: Uuid,
) -> Result<Vec<ItineraryDayRow>, DbError> {
    let rows = sqlx::query_as::<_, ItineraryDayRow>(
        "SELECT id, tour_id, location_id, day_number, date, title, created_at \
         FROM itinerary_days \
         WHERE tour_id = $1 \
         ORDER BY day_number",
    )
    .bind(tour_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns every item of a tour, ordered by day then `sort_order`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_itinerary_items(
    pool: &PgPool,
    tour_id: Uuid,
) -> Result<Vec<ItineraryItemRow>, DbError> {
    let rows = sqlx::query_as::<_, ItineraryItemRow>(
        "SELECT i.id, i.day_id, i.item_type, i.title, i.description, \
                i.cost_price, i.sales_price, i.sort_order, i.created_at \
         FROM itinerary_items i \
         JOIN itinerary_days d ON d.id = i.day_id \
         WHERE d.tour_id = $1 \
         ORDER BY d.day_number, i.sort_order, i.created_at",
    )
    .bind(tour_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns a single day by id, or `None` if it does not exist.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_itinerary_day(
    pool: &PgPool,
    day_id: Uuid,
) -> Result<Option<ItineraryDayRow>, DbError> {
    let row = sqlx::query_as::<_, ItineraryDayRow>(
        "SELECT id, tour_id, location_id, day_number, date, title, created_at \
         FROM itinerary_days \
         WHERE id = $1",
    )
    .bind(day_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

// ---------------------------------------------------------------------------
// Item edits
// ---------------------------------------------------------------------------

/// Appends an item to the end of a day.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails (including an unknown `day_id`).
pub async fn add_itinerary_item(
    pool: &PgPool,
    day_id: Uuid,
    item: &NewItineraryItem<'_>,
) -> Result<ItineraryItemRow, DbError> {
    let row = sqlx::query_as::<_, ItineraryItemRow>(&format!(
        "INSERT INTO itinerary_items \
             (id, day_id, item_type, title, description, cost_price, sales_price, sort_order) \
         SELECT $1, $2, $3, $4, $5, $6, $7, COALESCE(MAX(sort_order) + 1, 0) \
         FROM itinerary_items \
         WHERE day_id = $2 \
         RETURNING {ITEM_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(day_id)
    .bind(item.item_type.as_str())
    .bind(item.title)
    .bind(item.description)
    .bind(item.cost_price)
    .bind(item.sales_price)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Deletes one item.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no item has this id.
pub async fn delete_itinerary_item(pool: &PgPool, item_id: Uuid) -> Result<(), DbError> {
    let result = sqlx::query("DELETE FROM itinerary_items WHERE id = $1")
        .bind(item_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }

    Ok(())
}
