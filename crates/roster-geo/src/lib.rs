//! Geography primitives for the roster search service.
//!
//! This crate owns everything the search service needs to reason about
//! "nearby": coordinates and great-circle distance, a static approximation
//! table keyed by three-digit US postal prefixes, US state normalisation, and
//! (behind the default `remote` feature) HTTP clients for the external postal,
//! city and bulk-radius lookup services.
//!
//! # Quick Start
//!
//! ```rust
//! use roster_geo::{Geocoder, TableGeocoder, haversine_miles};
//!
//! # futures::executor::block_on(async {
//! let geocoder = TableGeocoder;
//! let akron = geocoder.geocode_postal_code("44310").await.expect("known prefix");
//! let columbus = geocoder.geocode_postal_code("43215").await.expect("known prefix");
//!
//! let miles = haversine_miles(akron.coordinate, columbus.coordinate);
//! assert!(miles > 100.0 && miles < 150.0);
//! # });
//! ```
//!
//! Lookups never surface transport errors to callers: a failed or timed-out
//! remote lookup falls through to the approximation table, and an unknown
//! prefix is simply "not found".

pub mod approx;
pub mod distance;
mod geocoder;
#[cfg(feature = "remote")]
pub mod remote;
pub mod states;

pub use distance::{BoundingBox, Coordinate, EARTH_RADIUS_MILES, haversine_miles};
pub use error::{GeoError, Result};
pub use geocoder::{
    Geocoder, LocationSource, RadiusLookup, TableGeocoder, ZipLocation, normalize_postal_code,
};

mod error {
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum GeoError {
        #[cfg(feature = "remote")]
        #[error("HTTP error: {0}")]
        Http(#[from] reqwest::Error),
        #[error("Serialization error: {0}")]
        Serde(#[from] serde_json::Error),
        #[error("Invalid coordinate: latitude {latitude}, longitude {longitude}")]
        InvalidCoordinate { latitude: String, longitude: String },
        #[error("Invalid postal code: {0:?}")]
        InvalidPostalCode(String),
        #[error("No result for {0:?}")]
        NotFound(String),
    }

    pub type Result<T> = std::result::Result<T, GeoError>;
}
