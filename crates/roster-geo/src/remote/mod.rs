//! HTTP clients for the external lookup services.
//!
//! Every client shares one [`reqwest::Client`] built by [`http_client`], so the
//! request timeout applies to each individual lookup.

mod bulk_radius;
mod city;
mod postal;

use std::time::Duration;

use async_trait::async_trait;
pub use bulk_radius::BulkRadiusClient;
pub use city::CityLookupClient;
pub use postal::PostalLookupClient;
use reqwest::Client;
use tracing::{debug, warn};

use crate::{Geocoder, Result, ZipLocation, approx};

/// Upper bound for any single external lookup.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub const DEFAULT_USER_AGENT: &str = concat!("roster/", env!("CARGO_PKG_VERSION"));

/// Build the HTTP client shared by the lookup clients.
pub fn http_client(timeout: Duration, user_agent: &str) -> Result<Client> {
    Ok(Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .user_agent(user_agent)
        .build()?)
}

/// Geocoder that asks the remote services first and falls back to the
/// approximation table for postal codes.
///
/// ```rust,no_run
/// use roster_geo::remote::{
///     CityLookupClient, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, PostalLookupClient, RemoteGeocoder,
///     http_client,
/// };
///
/// let client = http_client(DEFAULT_TIMEOUT, DEFAULT_USER_AGENT)?;
/// let geocoder = RemoteGeocoder::new()
///     .with_postal_lookup(PostalLookupClient::new(client.clone(), "https://api.zippopotam.us"))
///     .with_city_lookup(CityLookupClient::new(client, "https://nominatim.openstreetmap.org"));
/// # Ok::<(), roster_geo::GeoError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct RemoteGeocoder {
    postal: Option<PostalLookupClient>,
    city: Option<CityLookupClient>,
}

impl RemoteGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_postal_lookup(mut self, client: PostalLookupClient) -> Self {
        self.postal = Some(client);
        self
    }

    pub fn with_city_lookup(mut self, client: CityLookupClient) -> Self {
        self.city = Some(client);
        self
    }
}

#[async_trait]
impl Geocoder for RemoteGeocoder {
    async fn geocode_postal_code(&self, postal_code: &str) -> Option<ZipLocation> {
        if let Some(postal) = &self.postal {
            match postal.lookup(postal_code).await {
                Ok(location) => return Some(location),
                Err(e) => warn!(
                    postal_code,
                    error = %e,
                    "Postal lookup failed, falling back to approximation table"
                ),
            }
        }
        approx::approximate(postal_code)
    }

    async fn geocode_city(&self, city: &str, state: Option<&str>) -> Option<ZipLocation> {
        let client = self.city.as_ref()?;
        match client.search(city, state).await {
            Ok(Some(location)) => Some(location),
            Ok(None) => {
                debug!(city, state, "City lookup returned no matching result");
                None
            }
            Err(e) => {
                warn!(city, state, error = %e, "City lookup failed");
                None
            }
        }
    }
}
