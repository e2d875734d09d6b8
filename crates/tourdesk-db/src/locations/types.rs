//! Row types for the `locations` table.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Input record for creating a location.
#[derive(Debug, Clone)]
pub struct NewLocation<'a> {
    pub name: &'a str,
    pub country: Option<&'a str>,
    pub description: Option<&'a str>,
}

/// A row from the `locations` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LocationRow {
    pub id: Uuid,
    pub name: String,
    pub country: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
