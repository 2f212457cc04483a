//! Service configuration.
//!
//! [`RosterConfig::load`] layers, lowest first: the embedded defaults below, an
//! optional TOML file, then `ROSTER__SECTION__KEY` environment variables
//! (`ROSTER__DATABASE__URL`, `ROSTER__RADIUS__BULK_API_KEY`, ...).

use std::{collections::HashMap, path::Path, time::Duration};

use ::config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

use super::{DEFAULT_MAX_RADIUS_MILES, ResolverConfig};
use crate::{
    error::Result,
    model::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT},
};

const DEFAULT_CONFIG: &str = r#"
[server]
bind = "0.0.0.0:3000"

[database]
max_connections = 5
acquire_timeout_secs = 5
ensure_schema = false

[geocoding]
enabled = true
postal_base_url = "https://api.zippopotam.us"
city_base_url = "https://nominatim.openstreetmap.org"
timeout_secs = 10

[radius]
use_spatial_index = true
use_bulk_lookup = true
use_per_record_geocode = true
max_radius_miles = 500.0
bulk_base_url = "https://www.zipcodeapi.com/rest"

[search]
default_limit = 12
max_limit = 100

[contact]
default_email = "info@example.com"
from_email = "no-reply@example.com"
mail_timeout_secs = 10
"#;

const ENV_PREFIX: &str = "ROSTER";
const ENV_SEPARATOR: &str = "__";

/// Top-level service configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RosterConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub geocoding: GeocodingSettings,
    #[serde(default)]
    pub radius: RadiusSettings,
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub contact: ContactSettings,
}

/// `[server]`
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "0.0.0.0:3000".to_owned()
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

/// `[database]`. Without a `url` the service cannot start in `serve` mode.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
    /// Create the `profiles` table at startup if missing.
    #[serde(default)]
    pub ensure_schema: bool,
}

fn default_max_connections() -> u32 {
    5
}
fn default_acquire_timeout_secs() -> u64 {
    5
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
            acquire_timeout_secs: default_acquire_timeout_secs(),
            ensure_schema: false,
        }
    }
}

impl DatabaseSettings {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }
}

/// `[geocoding]`
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodingSettings {
    /// When false only the prefix approximation table is used.
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_postal_base_url")]
    pub postal_base_url: String,
    #[serde(default = "default_city_base_url")]
    pub city_base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub user_agent: Option<String>,
}

fn default_true() -> bool {
    true
}
fn default_postal_base_url() -> String {
    "https://api.zippopotam.us".to_owned()
}
fn default_city_base_url() -> String {
    "https://nominatim.openstreetmap.org".to_owned()
}
fn default_timeout_secs() -> u64 {
    10
}

impl Default for GeocodingSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            postal_base_url: default_postal_base_url(),
            city_base_url: default_city_base_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: None,
        }
    }
}

impl GeocodingSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// `[radius]`. The bulk tier only runs when `bulk_api_key` is set.
#[derive(Debug, Clone, Deserialize)]
pub struct RadiusSettings {
    #[serde(default = "default_true")]
    pub use_spatial_index: bool,
    #[serde(default = "default_true")]
    pub use_bulk_lookup: bool,
    #[serde(default = "default_true")]
    pub use_per_record_geocode: bool,
    #[serde(default = "default_max_radius_miles")]
    pub max_radius_miles: f64,
    #[serde(default = "default_bulk_base_url")]
    pub bulk_base_url: String,
    #[serde(default)]
    pub bulk_api_key: Option<String>,
}

fn default_max_radius_miles() -> f64 {
    DEFAULT_MAX_RADIUS_MILES
}
fn default_bulk_base_url() -> String {
    "https://www.zipcodeapi.com/rest".to_owned()
}

impl Default for RadiusSettings {
    fn default() -> Self {
        Self {
            use_spatial_index: true,
            use_bulk_lookup: true,
            use_per_record_geocode: true,
            max_radius_miles: default_max_radius_miles(),
            bulk_base_url: default_bulk_base_url(),
            bulk_api_key: None,
        }
    }
}

impl RadiusSettings {
    pub fn resolver_config(&self) -> Result<ResolverConfig> {
        Ok(ResolverConfig::builder()
            .spatial_index(self.use_spatial_index)
            .bulk_lookup(self.use_bulk_lookup)
            .per_record_geocode(self.use_per_record_geocode)
            .max_radius(self.max_radius_miles)?
            .build())
    }
}

/// `[search]`
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SearchSettings {
    #[serde(default = "default_limit")]
    pub default_limit: u32,
    #[serde(default = "max_limit")]
    pub max_limit: u32,
}

fn default_limit() -> u32 {
    DEFAULT_PAGE_LIMIT
}
fn max_limit() -> u32 {
    MAX_PAGE_LIMIT
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: max_limit(),
        }
    }
}

/// `[contact]`. `offices` maps an office name to its inbox; keys are matched
/// case-insensitively.
#[derive(Debug, Clone, Deserialize)]
pub struct ContactSettings {
    #[serde(default = "default_email")]
    pub default_email: String,
    #[serde(default = "default_from_email")]
    pub from_email: String,
    #[serde(default)]
    pub offices: HashMap<String, String>,
    /// JSON mail relay endpoint. Without it requests are only logged.
    #[serde(default)]
    pub mail_relay_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub mail_timeout_secs: u64,
}

fn default_email() -> String {
    "info@example.com".to_owned()
}
fn default_from_email() -> String {
    "no-reply@example.com".to_owned()
}

impl Default for ContactSettings {
    fn default() -> Self {
        Self {
            default_email: default_email(),
            from_email: default_from_email(),
            offices: HashMap::new(),
            mail_relay_url: None,
            mail_timeout_secs: default_timeout_secs(),
        }
    }
}

impl ContactSettings {
    pub fn mail_timeout(&self) -> Duration {
        Duration::from_secs(self.mail_timeout_secs)
    }
}

impl RosterConfig {
    /// Load the embedded defaults, then `path` if given, then the process
    /// environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with(path, Environment::with_prefix(ENV_PREFIX))
    }

    /// Built-in defaults only.
    pub fn defaults() -> Result<Self> {
        Self::from_toml("")
    }

    /// Defaults overlaid with an inline TOML document.
    pub fn from_toml(toml: &str) -> Result<Self> {
        Ok(Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()?)
    }

    fn load_with(path: Option<&Path>, environment: Environment) -> Result<Self> {
        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        Ok(builder
            .add_source(
                environment
                    .separator(ENV_SEPARATOR)
                    .prefix_separator(ENV_SEPARATOR)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_embedded_defaults() {
        let config = RosterConfig::defaults().unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:3000");
        assert_eq!(config.database.url, None);
        assert_eq!(config.search.default_limit, 12);
        assert_eq!(config.search.max_limit, 100);
        assert_eq!(config.geocoding.timeout(), Duration::from_secs(10));
        assert!(config.radius.bulk_api_key.is_none());
        assert_eq!(config.contact.default_email, "info@example.com");
    }

    #[test]
    fn test_inline_overrides_keep_other_defaults() {
        let config = RosterConfig::from_toml(
            r#"
            [search]
            max_limit = 50

            [contact.offices]
            cleveland = "cleveland@example.com"
            "#,
        )
        .unwrap();
        assert_eq!(config.search.max_limit, 50);
        assert_eq!(config.search.default_limit, 12);
        assert_eq!(
            config.contact.offices.get("cleveland").map(String::as_str),
            Some("cleveland@example.com")
        );
    }

    #[test]
    fn test_environment_overrides() {
        let env = HashMap::from([
            ("ROSTER__DATABASE__URL".to_owned(), "postgres://localhost/roster".to_owned()),
            ("ROSTER__RADIUS__MAX_RADIUS_MILES".to_owned(), "150".to_owned()),
            ("ROSTER__GEOCODING__ENABLED".to_owned(), "false".to_owned()),
        ]);
        let config =
            RosterConfig::load_with(None, Environment::with_prefix(ENV_PREFIX).source(Some(env)))
                .unwrap();

        assert_eq!(config.database.url.as_deref(), Some("postgres://localhost/roster"));
        assert!(!config.geocoding.enabled);
        let resolver = config.radius.resolver_config().unwrap();
        assert!((resolver.max_radius_miles - 150.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(RosterConfig::load(Some(Path::new("/definitely/not/here.toml"))).is_err());
    }

    #[test]
    fn test_invalid_radius_rejected() {
        let config = RosterConfig::from_toml("[radius]\nmax_radius_miles = -1.0").unwrap();
        assert!(config.radius.resolver_config().is_err());
    }
}
