use async_trait::async_trait;
use futures::future::join_all;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::{Coordinate, Result, approx};

static POSTAL_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d{5})(?:-?\d{4})?\s*$").expect("postal code regex"));

/// Reduce a US postal code (5-digit or ZIP+4) to its five-digit form.
///
/// ```rust
/// use roster_geo::normalize_postal_code;
///
/// assert_eq!(normalize_postal_code(" 44289-1234 ").as_deref(), Some("44289"));
/// assert_eq!(normalize_postal_code("442891234").as_deref(), Some("44289"));
/// assert_eq!(normalize_postal_code("4428"), None);
/// ```
pub fn normalize_postal_code(postal_code: &str) -> Option<String> {
    POSTAL_CODE
        .captures(postal_code)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_owned())
}

/// Where a [`ZipLocation`] estimate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationSource {
    /// An external lookup service answered.
    Remote,
    /// The static prefix table answered.
    Approximation,
}

/// A postal code or city label paired with an estimated coordinate.
///
/// Derived per request and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZipLocation {
    pub label: String,
    pub coordinate: Coordinate,
    /// Upper-case two-letter state, when the source could tell us.
    pub state: Option<String>,
    pub source: LocationSource,
}

/// Resolves postal codes and city names to coordinates.
///
/// Implementations swallow transport failures: a lookup that cannot be
/// answered is `None`, never an error.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode_postal_code(&self, postal_code: &str) -> Option<ZipLocation>;

    /// Resolve a city, optionally constrained to a state. With a state, a
    /// result in any other state must not be returned.
    async fn geocode_city(&self, city: &str, state: Option<&str>) -> Option<ZipLocation>;

    /// Geocode many postal codes concurrently. Output order matches input.
    async fn geocode_postal_codes(&self, postal_codes: &[String]) -> Vec<Option<ZipLocation>> {
        join_all(
            postal_codes
                .iter()
                .map(|code| self.geocode_postal_code(code)),
        )
        .await
    }
}

/// Returns every postal code within a radius of another.
#[async_trait]
pub trait RadiusLookup: Send + Sync {
    async fn postal_codes_within(&self, postal_code: &str, radius_miles: f64)
    -> Result<Vec<String>>;
}

/// Offline geocoder backed only by the prefix approximation table.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableGeocoder;

#[async_trait]
impl Geocoder for TableGeocoder {
    async fn geocode_postal_code(&self, postal_code: &str) -> Option<ZipLocation> {
        approx::approximate(postal_code)
    }

    async fn geocode_city(&self, _city: &str, _state: Option<&str>) -> Option<ZipLocation> {
        None
    }
}
