use async_trait::async_trait;
use itertools::Itertools;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::{GeoError, RadiusLookup, Result, normalize_postal_code};

/// Client for a zipcodeapi.com-shaped bulk radius service
/// (`GET {base}/{key}/radius.json/{zip}/{miles}/mile`).
#[derive(Debug, Clone)]
pub struct BulkRadiusClient {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct RadiusResponse {
    #[serde(default)]
    zip_codes: Vec<RadiusEntry>,
}

#[derive(Debug, Deserialize)]
struct RadiusEntry {
    zip_code: String,
}

impl BulkRadiusClient {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl RadiusLookup for BulkRadiusClient {
    #[instrument(name = "Bulk radius lookup", skip(self), level = "debug")]
    async fn postal_codes_within(
        &self,
        postal_code: &str,
        radius_miles: f64,
    ) -> Result<Vec<String>> {
        let code = normalize_postal_code(postal_code)
            .ok_or_else(|| GeoError::InvalidPostalCode(postal_code.to_owned()))?;
        let url = format!(
            "{}/{}/radius.json/{code}/{}/mile",
            self.base_url,
            self.api_key,
            radius_miles.ceil() as u32
        );

        let body = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let response: RadiusResponse = serde_json::from_str(&body)?;

        let codes = response
            .zip_codes
            .iter()
            .filter_map(|entry| normalize_postal_code(&entry.zip_code))
            .unique()
            .collect::<Vec<_>>();
        debug!(center = code, count = codes.len(), "Bulk radius lookup complete");
        Ok(codes)
    }
}
