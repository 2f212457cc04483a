use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::{Coordinate, LocationSource, Result, ZipLocation, states};

const MAX_CANDIDATES: &str = "10";

/// Client for a Nominatim-shaped text search service (`GET {base}/search`).
#[derive(Debug, Clone)]
pub struct CityLookupClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct CityResult {
    lat: String,
    lon: String,
    #[serde(default)]
    address: Option<CityAddress>,
}

#[derive(Debug, Default, Deserialize)]
struct CityAddress {
    #[serde(default)]
    state: Option<String>,
    #[serde(default, rename = "ISO3166-2-lvl4")]
    iso_subdivision: Option<String>,
}

impl CityResult {
    /// Two-letter state of this result, from the ISO subdivision code or the
    /// state name.
    fn state(&self) -> Option<&'static str> {
        let address = self.address.as_ref()?;
        address
            .iso_subdivision
            .as_deref()
            .and_then(|iso| iso.strip_prefix("US-"))
            .and_then(states::abbreviation_for)
            .or_else(|| address.state.as_deref().and_then(states::abbreviation_for))
    }
}

impl CityLookupClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        }
    }

    /// Search for a city. With `state`, only results in that state qualify;
    /// `Ok(None)` when nothing qualifies.
    #[instrument(name = "City lookup", skip(self), level = "debug")]
    pub async fn search(&self, city: &str, state: Option<&str>) -> Result<Option<ZipLocation>> {
        let wanted_state = state.map(|s| states::abbreviation_for(s).ok_or(s));
        let state_name = wanted_state
            .and_then(|s| s.ok())
            .and_then(states::name_for)
            .unwrap_or_default();

        let url = format!("{}/search", self.base_url);
        let mut params = vec![
            ("city", city.trim()),
            ("country", "us"),
            ("format", "json"),
            ("addressdetails", "1"),
            ("limit", MAX_CANDIDATES),
        ];
        if !state_name.is_empty() {
            params.push(("state", state_name));
        }
        debug!(url, ?params, "Requesting city");

        let body = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let results: Vec<CityResult> = serde_json::from_str(&body)?;

        let chosen = match wanted_state {
            None => results.into_iter().next(),
            // An unrecognised state can never match a result.
            Some(Err(_)) => None,
            Some(Ok(wanted)) => results.into_iter().find(|r| r.state() == Some(wanted)),
        };

        chosen
            .map(|r| {
                let coordinate = Coordinate::parse(&r.lat, &r.lon)?;
                Ok(ZipLocation {
                    label: city.trim().to_owned(),
                    coordinate,
                    state: r.state().map(str::to_owned),
                    source: LocationSource::Remote,
                })
            })
            .transpose()
    }
}
