mod settings;

pub use settings::{
    ContactSettings, DatabaseSettings, GeocodingSettings, RadiusSettings, RosterConfig,
    SearchSettings, ServerSettings,
};

use crate::error::RosterError;

/// Upper bound on any radius, in miles.
pub const DEFAULT_MAX_RADIUS_MILES: f64 = 500.0;

/// Which radius strategies run, and the largest radius honoured.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverConfig {
    /// Use the store's geography column when it has one.
    pub use_spatial_index: bool,
    /// Ask the bulk radius service, when one is configured.
    pub use_bulk_lookup: bool,
    /// Geocode candidates one by one as the last resort.
    pub use_per_record_geocode: bool,
    /// Larger radii are clamped to this.
    pub max_radius_miles: f64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            use_spatial_index: true,
            use_bulk_lookup: true,
            use_per_record_geocode: true,
            max_radius_miles: DEFAULT_MAX_RADIUS_MILES,
        }
    }
}

impl ResolverConfig {
    pub fn builder() -> ResolverConfigBuilder {
        ResolverConfigBuilder::new()
    }
}

/// Builder for creating resolver configurations with sensible defaults
#[derive(Debug, Clone, Default)]
pub struct ResolverConfigBuilder {
    config: ResolverConfig,
}

impl ResolverConfigBuilder {
    /// Create a new builder with every strategy enabled
    pub fn new() -> Self {
        Self {
            config: ResolverConfig::default(),
        }
    }

    /// Create a builder that never leaves the process: no bulk radius service
    pub fn offline() -> Self {
        let mut builder = Self::new();
        builder.config.use_bulk_lookup = false;
        builder
    }

    /// Create a builder that relies on remote services only: no spatial index
    pub fn remote_only() -> Self {
        let mut builder = Self::new();
        builder.config.use_spatial_index = false;
        builder
    }

    pub fn spatial_index(mut self, enabled: bool) -> Self {
        self.config.use_spatial_index = enabled;
        self
    }

    pub fn bulk_lookup(mut self, enabled: bool) -> Self {
        self.config.use_bulk_lookup = enabled;
        self
    }

    pub fn per_record_geocode(mut self, enabled: bool) -> Self {
        self.config.use_per_record_geocode = enabled;
        self
    }

    /// Set the largest radius honoured (must be positive)
    pub fn max_radius(mut self, miles: f64) -> Result<Self, RosterError> {
        if !miles.is_finite() || miles <= 0.0 {
            return Err(RosterError::Config(format!(
                "Maximum radius must be a positive number of miles, got {miles}"
            )));
        }
        self.config.max_radius_miles = miles;
        Ok(self)
    }

    /// Build the final configuration
    pub fn build(self) -> ResolverConfig {
        self.config
    }
}
