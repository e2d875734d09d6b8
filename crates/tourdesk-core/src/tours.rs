use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Coarse lifecycle label for a tour. Any status may move to any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TourStatus {
    #[default]
    Draft,
    Designed,
    Confirmed,
    Completed,
    Cancelled,
}

impl TourStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TourStatus::Draft => "draft",
            TourStatus::Designed => "designed",
            TourStatus::Confirmed => "confirmed",
            TourStatus::Completed => "completed",
            TourStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for TourStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TourStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(TourStatus::Draft),
            "designed" => Ok(TourStatus::Designed),
            "confirmed" => Ok(TourStatus::Confirmed),
            "completed" => Ok(TourStatus::Completed),
            "cancelled" => Ok(TourStatus::Cancelled),
            _ => Err(CoreError::InvalidTourStatus(s.to_string())),
        }
    }
}

/// Kind of bookable unit attached to an itinerary day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Accommodation,
    Activity,
    Transfer,
    Meal,
}

impl ItemType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ItemType::Accommodation => "accommodation",
            ItemType::Activity => "activity",
            ItemType::Transfer => "transfer",
            ItemType::Meal => "meal",
        }
    }
}

impl std::fmt::Display for ItemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "accommodation" => Ok(ItemType::Accommodation),
            "activity" => Ok(ItemType::Activity),
            "transfer" => Ok(ItemType::Transfer),
            "meal" => Ok(ItemType::Meal),
            _ => Err(CoreError::InvalidItemType(s.to_string())),
        }
    }
}
