//! The [`Roster`] service facade.
//!
//! A [`Roster`] owns the searcher and the contact service and is shared by
//! every request handler. Build one from a [`RosterConfig`] with
//! [`Roster::from_config`], or assemble it piece by piece with
//! [`Roster::builder`]:
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use roster::{MemoryProfileStore, ResolverConfigBuilder, Roster, geo::TableGeocoder};
//!
//! let roster = Roster::builder(Arc::new(MemoryProfileStore::default()))
//!     .geocoder(Arc::new(TableGeocoder))
//!     .resolver_config(ResolverConfigBuilder::offline().build())
//!     .build();
//! assert_eq!(roster.search_settings().default_limit, 12);
//! ```

use std::{collections::HashMap, sync::Arc};

use roster_geo::{Geocoder, RadiusLookup, TableGeocoder};
use tracing::{info, instrument};

use crate::{
    config::{ResolverConfig, RosterConfig, SearchSettings},
    contact::{
        ContactError, ContactReceipt, ContactRequest, ContactService, HttpMailer, LogMailer,
        Mailer, OfficeDirectory,
    },
    error::{Result, RosterError},
    model::{Profile, SearchPage, SearchParams, SearchQuery},
    search::{ProfileSearcher, RadiusResolver},
    store::{PostgresProfileStore, ProfileStore},
};

pub struct Roster {
    searcher: ProfileSearcher,
    contact: ContactService,
    search_settings: SearchSettings,
}

impl Roster {
    pub fn builder(store: Arc<dyn ProfileStore>) -> RosterBuilder {
        RosterBuilder::new(store)
    }

    /// Connect to the database and the configured lookup services.
    #[instrument(name = "Build roster", skip_all)]
    pub async fn from_config(config: &RosterConfig) -> Result<Self> {
        let url = config
            .database
            .url
            .as_deref()
            .ok_or_else(|| RosterError::Config("database.url is not set".to_owned()))?;
        let store = PostgresProfileStore::connect(
            url,
            config.database.max_connections,
            config.database.acquire_timeout(),
        )
        .await?;
        if config.database.ensure_schema {
            store.ensure_schema().await?;
        }

        let mut builder = Self::builder(Arc::new(store))
            .resolver_config(config.radius.resolver_config()?)
            .search_settings(config.search)
            .office_directory(OfficeDirectory::new(
                config.contact.default_email.clone(),
                &config.contact.offices,
            ))
            .from_email(config.contact.from_email.clone());

        #[cfg(feature = "remote")]
        {
            builder = remote::attach(builder, config)?;
        }

        if let Some(url) = &config.contact.mail_relay_url {
            builder = builder.mailer(Arc::new(HttpMailer::new(
                url.clone(),
                config.contact.mail_timeout(),
            )?));
        }

        Ok(builder.build())
    }

    pub fn search_settings(&self) -> SearchSettings {
        self.search_settings
    }

    pub async fn search(&self, query: &SearchQuery) -> Result<SearchPage> {
        Ok(self.searcher.search(query).await?)
    }

    /// Parse raw query-string parameters with the configured page limits and search.
    pub async fn search_params(&self, params: SearchParams) -> Result<SearchPage> {
        let query = params.into_query(
            self.search_settings.default_limit,
            self.search_settings.max_limit,
        );
        self.search(&query).await
    }

    pub async fn professions(&self) -> Result<Vec<String>> {
        Ok(self.searcher.professions().await?)
    }

    pub async fn states(&self) -> Result<Vec<String>> {
        Ok(self.searcher.states().await?)
    }

    pub async fn offices(&self) -> Result<Vec<String>> {
        Ok(self.searcher.offices().await?)
    }

    pub async fn profile(&self, id: i64) -> Result<Option<Profile>> {
        Ok(self.searcher.profile(id).await?)
    }

    pub async fn contact(
        &self,
        request: &ContactRequest,
    ) -> std::result::Result<ContactReceipt, ContactError> {
        self.contact.submit(request).await
    }
}

/// Assembles a [`Roster`]. Defaults: offline geocoding from the prefix
/// table, no bulk radius service, every strategy enabled, log-only mail.
pub struct RosterBuilder {
    store: Arc<dyn ProfileStore>,
    geocoder: Arc<dyn Geocoder>,
    bulk_lookup: Option<Arc<dyn RadiusLookup>>,
    resolver_config: ResolverConfig,
    search_settings: SearchSettings,
    mailer: Arc<dyn Mailer>,
    directory: OfficeDirectory,
    from_email: String,
}

impl RosterBuilder {
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self {
            store,
            geocoder: Arc::new(TableGeocoder),
            bulk_lookup: None,
            resolver_config: ResolverConfig::default(),
            search_settings: SearchSettings::default(),
            mailer: Arc::new(LogMailer),
            directory: OfficeDirectory::new("info@example.com", &HashMap::new()),
            from_email: "no-reply@example.com".to_owned(),
        }
    }

    pub fn geocoder(mut self, geocoder: Arc<dyn Geocoder>) -> Self {
        self.geocoder = geocoder;
        self
    }

    pub fn bulk_lookup(mut self, lookup: Arc<dyn RadiusLookup>) -> Self {
        self.bulk_lookup = Some(lookup);
        self
    }

    pub fn resolver_config(mut self, config: ResolverConfig) -> Self {
        self.resolver_config = config;
        self
    }

    pub fn search_settings(mut self, settings: SearchSettings) -> Self {
        self.search_settings = settings;
        self
    }

    pub fn mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.mailer = mailer;
        self
    }

    pub fn office_directory(mut self, directory: OfficeDirectory) -> Self {
        self.directory = directory;
        self
    }

    pub fn from_email(mut self, from: impl Into<String>) -> Self {
        self.from_email = from.into();
        self
    }

    pub fn build(self) -> Roster {
        let resolver = RadiusResolver::new(
            self.store.clone(),
            self.geocoder,
            self.bulk_lookup,
            &self.resolver_config,
        );
        info!(strategies = ?resolver.strategy_names(), "Radius strategies");

        Roster {
            searcher: ProfileSearcher::new(self.store.clone(), resolver),
            contact: ContactService::new(self.store, self.directory, self.mailer, self.from_email),
            search_settings: self.search_settings,
        }
    }
}

#[cfg(feature = "remote")]
mod remote {
    use std::sync::Arc;

    use roster_geo::remote::{
        BulkRadiusClient, CityLookupClient, DEFAULT_USER_AGENT, PostalLookupClient,
        RemoteGeocoder, http_client,
    };

    use super::RosterBuilder;
    use crate::{config::RosterConfig, error::Result};

    /// Wire the remote geocoder and bulk radius client from configuration.
    pub(super) fn attach(
        mut builder: RosterBuilder,
        config: &RosterConfig,
    ) -> Result<RosterBuilder> {
        let geocoding = &config.geocoding;
        let user_agent = geocoding.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
        let client = http_client(geocoding.timeout(), user_agent)?;

        if geocoding.enabled {
            builder = builder.geocoder(Arc::new(
                RemoteGeocoder::new()
                    .with_postal_lookup(PostalLookupClient::new(
                        client.clone(),
                        geocoding.postal_base_url.clone(),
                    ))
                    .with_city_lookup(CityLookupClient::new(
                        client.clone(),
                        geocoding.city_base_url.clone(),
                    )),
            ));
        }

        if let Some(key) = &config.radius.bulk_api_key {
            builder = builder.bulk_lookup(Arc::new(BulkRadiusClient::new(
                client,
                config.radius.bulk_base_url.clone(),
                key.clone(),
            )));
        }
        Ok(builder)
    }
}
