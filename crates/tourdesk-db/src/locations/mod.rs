//! Database operations for the `locations` table.

mod read;
mod types;
mod write;

pub use read::{get_locations_by_ids, list_locations};
pub use types::{LocationRow, NewLocation};
pub use write::create_location;
