use std::collections::HashSet;
use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::financials::validate_amount;
use crate::ConfigError;

/// A destination the agency operates in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    pub name: String,
    pub country: Option<String>,
    pub description: Option<String>,
}

/// A known transfer between two catalog locations, referenced by name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteConfig {
    pub origin: String,
    pub destination: String,
    pub description: Option<String>,
    pub duration: Option<String>,
    #[serde(default)]
    pub cost_price: Decimal,
    #[serde(default)]
    pub sales_price: Decimal,
    /// Also register the reverse direction with the same details.
    #[serde(default)]
    pub bidirectional: bool,
}

impl RouteConfig {
    /// The route itself plus its reverse when `bidirectional` is set.
    #[must_use]
    pub fn directions(&self) -> Vec<(&str, &str)> {
        let mut out = vec![(self.origin.as_str(), self.destination.as_str())];
        if self.bidirectional {
            out.push((self.destination.as_str(), self.origin.as_str()));
        }
        out
    }
}

#[derive(Debug, Deserialize)]
pub struct CatalogFile {
    pub locations: Vec<LocationConfig>,
    #[serde(default)]
    pub routes: Vec<RouteConfig>,
}

/// Load and validate the location/route catalog from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_catalog(path: &Path) -> Result<CatalogFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CatalogFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_catalog(&content)
}

/// Parse and validate catalog YAML.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_catalog(content: &str) -> Result<CatalogFile, ConfigError> {
    let catalog: CatalogFile = serde_yaml::from_str(content)?;
    validate_catalog(&catalog)?;
    Ok(catalog)
}

fn validate_catalog(catalog: &CatalogFile) -> Result<(), ConfigError> {
    let mut names = HashSet::new();

    for location in &catalog.locations {
        let name = location.name.trim();
        if name.is_empty() {
            return Err(ConfigError::Validation(
                "location name must be non-empty".to_string(),
            ));
        }
        if !names.insert(name.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate location name: '{name}'"
            )));
        }
    }

    let mut pairs = HashSet::new();
    for route in &catalog.routes {
        for endpoint in [&route.origin, &route.destination] {
            if !names.contains(&endpoint.trim().to_lowercase()) {
                return Err(ConfigError::Validation(format!(
                    "route references unknown location '{endpoint}'"
                )));
            }
        }

        if route.origin.trim().eq_ignore_ascii_case(route.destination.trim()) {
            return Err(ConfigError::Validation(format!(
                "route from '{}' to itself",
                route.origin
            )));
        }

        for (field, value) in [
            ("cost_price", route.cost_price),
            ("sales_price", route.sales_price),
        ] {
            validate_amount(field, value).map_err(|e| {
                ConfigError::Validation(format!(
                    "route '{}' -> '{}': {e}",
                    route.origin, route.destination
                ))
            })?;
        }

        for (origin, destination) in route.directions() {
            let key = (origin.trim().to_lowercase(), destination.trim().to_lowercase());
            if !pairs.insert(key) {
                return Err(ConfigError::Validation(format!(
                    "duplicate route: '{origin}' -> '{destination}'"
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
