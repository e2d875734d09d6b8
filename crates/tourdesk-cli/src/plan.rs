//! Offline itinerary preview from the catalog file.

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;
use tourdesk_core::{
    plan_itinerary, resolve_stops, validate_stops, CatalogFile, PlanStop, PlannedDay, RouteInfo,
    Stop, UnknownLocationPolicy,
};
use uuid::Uuid;

/// A `Location:nights` pair from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopArg {
    pub location: String,
    pub nights: u32,
}

impl FromStr for StopArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (location, nights) = s
            .rsplit_once(':')
            .ok_or_else(|| format!("expected LOCATION:NIGHTS, got '{s}'"))?;
        let location = location.trim();
        if location.is_empty() {
            return Err(format!("missing location name in '{s}'"));
        }
        let nights = nights
            .trim()
            .parse::<u32>()
            .map_err(|_| format!("nights must be a whole number in '{s}'"))?;
        Ok(Self {
            location: location.to_string(),
            nights,
        })
    }
}

/// Catalog locations keyed by ids minted for this preview.
struct CatalogIndex {
    ids_by_name: HashMap<String, Uuid>,
    names: HashMap<Uuid, String>,
    routes: HashMap<(Uuid, Uuid), RouteInfo>,
}

impl CatalogIndex {
    fn build(catalog: &CatalogFile) -> Self {
        let mut ids_by_name = HashMap::new();
        let mut names = HashMap::new();
        for location in &catalog.locations {
            let id = Uuid::new_v4();
            ids_by_name.insert(location.name.to_lowercase(), id);
            names.insert(id, location.name.clone());
        }

        let mut routes = HashMap::new();
        for route in &catalog.routes {
            for (origin, destination) in route.directions() {
                if let (Some(&o), Some(&d)) = (
                    ids_by_name.get(&origin.to_lowercase()),
                    ids_by_name.get(&destination.to_lowercase()),
                ) {
                    routes.insert(
                        (o, d),
                        RouteInfo {
                            description: route.description.clone(),
                            duration: route.duration.clone(),
                            cost_price: route.cost_price,
                            sales_price: route.sales_price,
                        },
                    );
                }
            }
        }

        Self {
            ids_by_name,
            names,
            routes,
        }
    }
}

/// Plan the stops against `catalog` the same way the server does.
///
/// # Errors
///
/// Returns an error for an unknown location or an invalid stop list.
pub(crate) fn build_plan(
    catalog: &CatalogFile,
    start_date: NaiveDate,
    stop_args: &[StopArg],
) -> anyhow::Result<Vec<PlannedDay>> {
    let index = CatalogIndex::build(catalog);

    let mut stops = Vec::with_capacity(stop_args.len());
    for arg in stop_args {
        let location_id = index
            .ids_by_name
            .get(&arg.location.to_lowercase())
            .copied()
            .ok_or_else(|| anyhow::anyhow!("location '{}' is not in the catalog", arg.location))?;
        stops.push(Stop {
            location_id,
            nights: arg.nights,
        });
    }
    validate_stops(&stops)?;

    let resolved = resolve_stops(&stops, &index.names, UnknownLocationPolicy::Reject)?;

    let mut previous: Option<Uuid> = None;
    let plan_stops: Vec<PlanStop> = resolved
        .stops
        .into_iter()
        .map(|r| {
            let location_id = r.stop.location_id;
            let inbound_route =
                previous.and_then(|origin| index.routes.get(&(origin, location_id)).cloned());
            previous = Some(location_id);
            PlanStop {
                location_id,
                location_name: r.location_name,
                nights: r.stop.nights,
                inbound_route,
            }
        })
        .collect();

    Ok(plan_itinerary(start_date, &plan_stops)?)
}

/// # Errors
///
/// Returns an error if the catalog cannot be loaded or the stops do not plan.
pub(crate) fn run_plan(
    start_date: NaiveDate,
    stop_args: &[StopArg],
    catalog_override: Option<&Path>,
) -> anyhow::Result<()> {
    let path = catalog_override.map_or_else(tourdesk_core::catalog_path_from_env, Path::to_path_buf);
    let catalog = tourdesk_core::load_catalog(&path)?;
    let days = build_plan(&catalog, start_date, stop_args)?;

    println!("{:<5}{:<12}TITLE", "DAY", "DATE");
    for day in &days {
        println!(
            "{:<5}{:<12}{}",
            day.day_number,
            day.date.to_string(),
            day.title
        );
        for item in &day.items {
            let description = item.description.as_deref().unwrap_or("");
            println!(
                "{:<17}- [{}] {} {} (cost {}, sale {})",
                "", item.item_type, item.title, description, item.cost_price, item.sales_price
            );
        }
    }
    println!("{} day(s)", days.len());

    Ok(())
}
