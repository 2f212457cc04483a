use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::{
    Coordinate, GeoError, LocationSource, Result, ZipLocation, normalize_postal_code, states,
};

/// Client for a zippopotam.us-shaped postal code service (`GET {base}/us/{zip}`).
#[derive(Debug, Clone)]
pub struct PostalLookupClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct PostalResponse {
    #[serde(default)]
    places: Vec<PostalPlace>,
}

#[derive(Debug, Deserialize)]
struct PostalPlace {
    latitude: String,
    longitude: String,
    #[serde(default)]
    state: Option<String>,
    #[serde(default, rename = "state abbreviation")]
    state_abbreviation: Option<String>,
}

impl PostalLookupClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        }
    }

    #[instrument(name = "Postal lookup", skip(self), level = "debug")]
    pub async fn lookup(&self, postal_code: &str) -> Result<ZipLocation> {
        let code = normalize_postal_code(postal_code)
            .ok_or_else(|| GeoError::InvalidPostalCode(postal_code.to_owned()))?;
        let url = format!("{}/us/{code}", self.base_url);
        debug!(url, "Requesting postal code");

        let body = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let response: PostalResponse = serde_json::from_str(&body)?;

        let place = response
            .places
            .into_iter()
            .next()
            .ok_or_else(|| GeoError::NotFound(code.clone()))?;
        let coordinate = Coordinate::parse(&place.latitude, &place.longitude)?;
        let state = place
            .state_abbreviation
            .as_deref()
            .or(place.state.as_deref())
            .and_then(states::abbreviation_for)
            .map(str::to_owned);

        Ok(ZipLocation {
            label: code,
            coordinate,
            state,
            source: LocationSource::Remote,
        })
    }
}
