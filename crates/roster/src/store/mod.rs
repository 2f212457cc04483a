//! Profile persistence.
//!
//! The searcher only talks to [`ProfileStore`]. [`PostgresProfileStore`] is the
//! production backend; [`MemoryProfileStore`] evaluates the same predicates in
//! memory for tests and the demo server.

mod memory;
mod postgres;

use async_trait::async_trait;
pub use error::{Result, StoreError};
pub use memory::MemoryProfileStore;
pub use postgres::PostgresProfileStore;
use roster_geo::Coordinate;

use crate::{
    model::{Pagination, Profile, Sort},
    search::FilterSet,
};

/// Just enough of a profile to geocode it.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ProfileCandidate {
    pub id: i64,
    pub postal_code: String,
}

/// Columns exposed as filter metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistinctColumn {
    ProfessionType,
    State,
    Office,
}

impl DistinctColumn {
    pub const fn column(self) -> &'static str {
        match self {
            Self::ProfessionType => "profession_type",
            Self::State => "state",
            Self::Office => "office",
        }
    }
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn count(&self, filters: &FilterSet) -> Result<u64>;

    async fn fetch_page(
        &self,
        filters: &FilterSet,
        sort: Sort,
        pagination: Pagination,
    ) -> Result<Vec<Profile>>;

    /// Ids and postal codes of every profile matching `filters`.
    async fn candidates(&self, filters: &FilterSet) -> Result<Vec<ProfileCandidate>>;

    /// Whether [`ProfileStore::ids_within_radius`] can be answered natively.
    fn supports_spatial(&self) -> bool {
        false
    }

    /// Ids of profiles matching `filters` within `radius_miles` of any center.
    async fn ids_within_radius(
        &self,
        _filters: &FilterSet,
        _centers: &[Coordinate],
        _radius_miles: f64,
    ) -> Result<Vec<i64>> {
        Err(StoreError::SpatialUnsupported)
    }

    /// Distinct non-empty values of `column` over active profiles, ascending.
    async fn distinct(&self, column: DistinctColumn) -> Result<Vec<String>>;

    /// One active profile.
    async fn profile(&self, id: i64) -> Result<Option<Profile>>;
}

mod error {
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum StoreError {
        #[error("Database error: {0}")]
        Database(#[from] sqlx::Error),
        #[error("Store has no spatial index")]
        SpatialUnsupported,
    }

    pub type Result<T> = std::result::Result<T, StoreError>;
}
