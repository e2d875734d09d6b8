//! Route generation: turns an ordered list of stops into dated itinerary days.
//!
//! Everything here is pure. Location lookups, route lookups and the
//! transactional write live in `tourdesk-db`; the HTTP handler wires them
//! together.

use std::collections::HashMap;
use std::hash::BuildHasher;
use std::str::FromStr;

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::tours::ItemType;
use crate::{non_blank, CoreError};

/// Upper bound on the number of days a single generation may produce.
pub const MAX_ITINERARY_DAYS: u32 = 365;

pub const ARRIVAL_PICKUP_TITLE: &str = "Arrival & Pickup";
pub const ARRIVAL_PICKUP_DESCRIPTION: &str = "Meet and greet on arrival, transfer to hotel";

/// Transfer text used when a route has no known duration.
pub const DIRECT_TRANSFER: &str = "Direct";

/// A `(location, nights)` pair supplied when building a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stop {
    pub location_id: Uuid,
    pub nights: u32,
}

/// What generation does with a stop whose location id does not resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownLocationPolicy {
    /// Fail the whole generation before anything is written.
    #[default]
    Reject,
    /// Drop the stop and continue with the rest.
    Skip,
}

impl std::fmt::Display for UnknownLocationPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnknownLocationPolicy::Reject => write!(f, "reject"),
            UnknownLocationPolicy::Skip => write!(f, "skip"),
        }
    }
}

impl FromStr for UnknownLocationPolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(UnknownLocationPolicy::Reject),
            "skip" => Ok(UnknownLocationPolicy::Skip),
            _ => Err(CoreError::InvalidLocationPolicy(s.to_string())),
        }
    }
}

/// Transfer details known for a directional `(origin, destination)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RouteInfo {
    pub description: Option<String>,
    /// Free-form travel time, e.g. `"3h 30m"`.
    pub duration: Option<String>,
    pub cost_price: Decimal,
    pub sales_price: Decimal,
}

/// A stop whose location has been resolved, ready for planning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanStop {
    pub location_id: Uuid,
    pub location_name: String,
    pub nights: u32,
    /// Route from the previous planned stop, if one is on file.
    pub inbound_route: Option<RouteInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedItem {
    pub item_type: ItemType,
    pub title: String,
    pub description: Option<String>,
    pub cost_price: Decimal,
    pub sales_price: Decimal,
    pub sort_order: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedDay {
    pub day_number: i32,
    pub date: NaiveDate,
    pub location_id: Uuid,
    pub title: String,
    pub items: Vec<PlannedItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedStop {
    pub stop: Stop,
    pub location_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolvedStops {
    pub stops: Vec<ResolvedStop>,
    /// Location ids dropped under [`UnknownLocationPolicy::Skip`], in input order.
    pub skipped: Vec<Uuid>,
}

impl ResolvedStops {
    /// Nights across the stops that will actually be planned.
    #[must_use]
    pub fn total_nights(&self) -> u64 {
        self.stops.iter().map(|r| u64::from(r.stop.nights)).sum()
    }
}

/// Sum of nights across all stops.
#[must_use]
pub fn total_nights(stops: &[Stop]) -> u64 {
    stops.iter().map(|s| u64::from(s.nights)).sum()
}

/// Check that a stop list can be planned.
///
/// # Errors
///
/// Returns [`CoreError::EmptyStops`] for an empty list,
/// [`CoreError::ZeroNights`] for a stop without nights, and
/// [`CoreError::TooManyNights`] when the total exceeds [`MAX_ITINERARY_DAYS`].
pub fn validate_stops(stops: &[Stop]) -> Result<(), CoreError> {
    validate_stop_entries(stops)?;
    check_itinerary_length(total_nights(stops))
}

/// Per-entry checks on a requested stop list, independent of which
/// locations exist.
///
/// # Errors
///
/// Returns [`CoreError::EmptyStops`] or [`CoreError::ZeroNights`].
pub fn validate_stop_entries(stops: &[Stop]) -> Result<(), CoreError> {
    if stops.is_empty() {
        return Err(CoreError::EmptyStops);
    }

    if let Some(index) = stops.iter().position(|s| s.nights == 0) {
        return Err(CoreError::ZeroNights { index });
    }

    Ok(())
}

/// # Errors
///
/// Returns [`CoreError::TooManyNights`] when `total` exceeds [`MAX_ITINERARY_DAYS`].
pub fn check_itinerary_length(total: u64) -> Result<(), CoreError> {
    if total > u64::from(MAX_ITINERARY_DAYS) {
        return Err(CoreError::TooManyNights {
            total,
            max: MAX_ITINERARY_DAYS,
        });
    }
    Ok(())
}

/// Match each stop against the known locations (`id -> name`) under `policy`.
///
/// # Errors
///
/// Returns [`CoreError::UnknownLocation`] for the first unresolved stop when
/// the policy is [`UnknownLocationPolicy::Reject`].
pub fn resolve_stops<S: BuildHasher>(
    stops: &[Stop],
    known: &HashMap<Uuid, String, S>,
    policy: UnknownLocationPolicy,
) -> Result<ResolvedStops, CoreError> {
    let mut resolved = ResolvedStops::default();

    for stop in stops {
        match known.get(&stop.location_id) {
            Some(name) => resolved.stops.push(ResolvedStop {
                stop: *stop,
                location_name: name.clone(),
            }),
            None => match policy {
                UnknownLocationPolicy::Reject => {
                    return Err(CoreError::UnknownLocation(stop.location_id));
                }
                UnknownLocationPolicy::Skip => resolved.skipped.push(stop.location_id),
            },
        }
    }

    Ok(resolved)
}

/// Text pre-filled into a transfer item for `route`.
#[must_use]
pub fn transfer_description(route: &RouteInfo) -> String {
    let duration = non_blank(route.duration.as_deref()).unwrap_or(DIRECT_TRANSFER);
    match non_blank(route.description.as_deref()) {
        Some(description) => format!("{description} ({duration})"),
        None => duration.to_string(),
    }
}

/// Lay out one day per night across `stops`, starting at `start_date`.
///
/// Day numbers run `1..=N` in stop order and each day is dated
/// `start_date + (day_number - 1)`.
///
/// # Errors
///
/// Returns [`CoreError::DateOutOfRange`] if a date or day number overflows.
pub fn plan_itinerary(
    start_date: NaiveDate,
    stops: &[PlanStop],
) -> Result<Vec<PlannedDay>, CoreError> {
    let mut days = Vec::new();
    let mut elapsed: u64 = 0;

    for stop in stops {
        let mut transfer = stop.inbound_route.as_ref().map(|route| PlannedItem {
            item_type: ItemType::Transfer,
            title: format!("Transfer to {}", stop.location_name),
            description: Some(transfer_description(route)),
            cost_price: route.cost_price,
            sales_price: route.sales_price,
            sort_order: 0,
        });

        for night in 0..stop.nights {
            let day_number = i32::try_from(elapsed + 1).map_err(|_| CoreError::DateOutOfRange)?;
            let date = start_date
                .checked_add_days(Days::new(elapsed))
                .ok_or(CoreError::DateOutOfRange)?;

            let title = if night == 0 {
                format!("Arrival in {}", stop.location_name)
            } else {
                format!("Explore {}", stop.location_name)
            };

            let mut items = Vec::new();
            if let Some(item) = transfer.take() {
                items.push(item);
            }
            if day_number == 1 && items.is_empty() {
                items.push(arrival_pickup());
            }

            days.push(PlannedDay {
                day_number,
                date,
                location_id: stop.location_id,
                title,
                items,
            });
            elapsed += 1;
        }
    }

    Ok(days)
}

fn arrival_pickup() -> PlannedItem {
    PlannedItem {
        item_type: ItemType::Transfer,
        title: ARRIVAL_PICKUP_TITLE.to_string(),
        description: Some(ARRIVAL_PICKUP_DESCRIPTION.to_string()),
        cost_price: Decimal::ZERO,
        sales_price: Decimal::ZERO,
        sort_order: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn plan_stop(name: &str, nights: u32, inbound_route: Option<RouteInfo>) -> PlanStop {
        PlanStop {
            location_id: Uuid::new_v4(),
            location_name: name.to_string(),
            nights,
            inbound_route,
        }
    }

    #[test]
    fn two_stops_produce_contiguous_dated_days() {
        let stops = vec![plan_stop("A", 2, None), plan_stop("B", 1, None)];
        let days = plan_itinerary(date(2024, 1, 1), &stops).expect("plan");

        assert_eq!(days.len(), 3);
        assert_eq!(
            days.iter().map(|d| d.day_number).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(
            days.iter().map(|d| d.date).collect::<Vec<_>>(),
            vec![date(2024, 1, 1), date(2024, 1, 2), date(2024, 1, 3)]
        );
        assert_eq!(days[0].title, "Arrival in A");
        assert_eq!(days[1].title, "Explore A");
        assert_eq!(days[2].title, "Arrival in B");
        assert_eq!(days[2].location_id, stops[1].location_id);
    }

    #[test]
    fn first_day_gets_arrival_pickup_without_route() {
        let days = plan_itinerary(date(2024, 1, 1), &[plan_stop("Colombo", 1, None)]).unwrap();

        assert_eq!(days[0].items.len(), 1);
        let item = &days[0].items[0];
        assert_eq!(item.item_type, ItemType::Transfer);
        assert_eq!(item.title, ARRIVAL_PICKUP_TITLE);
        assert_eq!(item.cost_price, Decimal::ZERO);
    }

    #[test]
    fn route_transfer_lands_on_first_day_of_stop_only() {
        let route = RouteInfo {
            description: Some("Scenic train".to_string()),
            duration: Some("7h".to_string()),
            cost_price: Decimal::new(4000, 2),
            sales_price: Decimal::new(5500, 2),
        };
        let stops = vec![plan_stop("Kandy", 1, None), plan_stop("Ella", 2, Some(route))];
        let days = plan_itinerary(date(2024, 3, 10), &stops).unwrap();

        assert_eq!(days[1].title, "Arrival in Ella");
        assert_eq!(days[1].items.len(), 1);
        let transfer = &days[1].items[0];
        assert_eq!(transfer.title, "Transfer to Ella");
        assert_eq!(transfer.description.as_deref(), Some("Scenic train (7h)"));
        assert_eq!(transfer.cost_price, Decimal::new(4000, 2));
        assert_eq!(transfer.sales_price, Decimal::new(5500, 2));
        assert!(days[2].items.is_empty(), "second night carries no transfer");
    }

    #[test]
    fn only_global_first_day_gets_pickup() {
        let stops = vec![plan_stop("A", 1, None), plan_stop("B", 1, None)];
        let days = plan_itinerary(date(2024, 1, 1), &stops).unwrap();
        assert_eq!(days[0].items[0].title, ARRIVAL_PICKUP_TITLE);
        assert!(days[1].items.is_empty());
    }

    #[test]
    fn empty_stop_list_plans_nothing() {
        let days = plan_itinerary(date(2024, 1, 1), &[]).unwrap();
        assert!(days.is_empty());
    }

    #[test]
    fn plan_crosses_month_and_leap_day() {
        let days = plan_itinerary(date(2024, 2, 28), &[plan_stop("A", 3, None)]).unwrap();
        assert_eq!(days[1].date, date(2024, 2, 29));
        assert_eq!(days[2].date, date(2024, 3, 1));
    }

    #[test]
    fn transfer_description_falls_back_to_direct() {
        let route = RouteInfo::default();
        assert_eq!(transfer_description(&route), "Direct");

        let described = RouteInfo {
            description: Some("Private car".to_string()),
            duration: Some("   ".to_string()),
            ..RouteInfo::default()
        };
        assert_eq!(transfer_description(&described), "Private car (Direct)");

        let timed = RouteInfo {
            duration: Some("2h 15m".to_string()),
            ..RouteInfo::default()
        };
        assert_eq!(transfer_description(&timed), "2h 15m");
    }

    #[test]
    fn validate_stops_rejects_empty_and_zero_nights() {
        assert_eq!(validate_stops(&[]), Err(CoreError::EmptyStops));

        let stops = [
            Stop {
                location_id: Uuid::new_v4(),
                nights: 2,
            },
            Stop {
                location_id: Uuid::new_v4(),
                nights: 0,
            },
        ];
        assert_eq!(validate_stops(&stops), Err(CoreError::ZeroNights { index: 1 }));
    }

    #[test]
    fn skipped_stops_do_not_count_toward_the_day_cap() {
        let known_id = Uuid::new_v4();
        let stops = [
            Stop {
                location_id: Uuid::new_v4(),
                nights: 300,
            },
            Stop {
                location_id: known_id,
                nights: 100,
            },
        ];
        let known = HashMap::from([(known_id, "Kandy".to_string())]);

        assert_eq!(validate_stop_entries(&stops), Ok(()));
        assert!(validate_stops(&stops).is_err());

        let resolved =
            resolve_stops(&stops, &known, UnknownLocationPolicy::Skip).expect("resolve");
        assert_eq!(resolved.total_nights(), 100);
        assert_eq!(check_itinerary_length(resolved.total_nights()), Ok(()));
        assert_eq!(
            check_itinerary_length(366),
            Err(CoreError::TooManyNights {
                total: 366,
                max: MAX_ITINERARY_DAYS
            })
        );
    }

    #[test]
    fn validate_stops_caps_total_days() {
        let stops = [
            Stop {
                location_id: Uuid::new_v4(),
                nights: 300,
            },
            Stop {
                location_id: Uuid::new_v4(),
                nights: 66,
            },
        ];
        assert_eq!(
            validate_stops(&stops),
            Err(CoreError::TooManyNights {
                total: 366,
                max: MAX_ITINERARY_DAYS
            })
        );
    }

    #[test]
    fn resolve_stops_rejects_unknown_location_by_default() {
        let known_id = Uuid::new_v4();
        let missing_id = Uuid::new_v4();
        let known = HashMap::from([(known_id, "Galle".to_string())]);
        let stops = [
            Stop {
                location_id: known_id,
                nights: 1,
            },
            Stop {
                location_id: missing_id,
                nights: 1,
            },
        ];

        let result = resolve_stops(&stops, &known, UnknownLocationPolicy::default());
        assert_eq!(result, Err(CoreError::UnknownLocation(missing_id)));
    }

    #[test]
    fn resolve_stops_skip_policy_drops_unknown_and_keeps_order() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let missing = Uuid::new_v4();
        let known = HashMap::from([(a, "A".to_string()), (b, "B".to_string())]);
        let stops = [
            Stop {
                location_id: a,
                nights: 2,
            },
            Stop {
                location_id: missing,
                nights: 4,
            },
            Stop {
                location_id: b,
                nights: 1,
            },
        ];

        let resolved = resolve_stops(&stops, &known, UnknownLocationPolicy::Skip).unwrap();
        assert_eq!(resolved.skipped, vec![missing]);
        let names: Vec<_> = resolved
            .stops
            .iter()
            .map(|s| s.location_name.as_str())
            .collect();
        assert_eq!(names, vec!["A", "B"]);

        let kept: Vec<Stop> = resolved.stops.iter().map(|s| s.stop).collect();
        assert_eq!(total_nights(&kept), 3);
    }

    #[test]
    fn policy_parses_from_config_strings() {
        assert_eq!(
            "Skip".parse::<UnknownLocationPolicy>(),
            Ok(UnknownLocationPolicy::Skip)
        );
        assert_eq!(
            "reject".parse::<UnknownLocationPolicy>(),
            Ok(UnknownLocationPolicy::Reject)
        );
        assert!("merge".parse::<UnknownLocationPolicy>().is_err());
    }
}
