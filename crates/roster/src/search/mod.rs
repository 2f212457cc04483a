//! Profile search: predicate building, radius resolution and the searcher
//! that ties them to a [`ProfileStore`](crate::store::ProfileStore).

mod orchestration;
mod predicate;
mod radius;

pub use error::{Result, SearchError};
pub use orchestration::ProfileSearcher;
pub use predicate::{Field, FilterSet, Predicate};
pub use radius::{
    BulkPostalCodeStrategy, PerRecordGeocodeStrategy, RadiusContext, RadiusMatch, RadiusResolver,
    RadiusStrategy, Resolution, SpatialIndexStrategy, TierOutcome,
};

mod error {
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum SearchError {
        #[error("Store error: {0}")]
        Store(#[from] crate::store::StoreError),

        #[error(transparent)]
        Other(#[from] anyhow::Error),
    }

    pub type Result<T> = std::result::Result<T, SearchError>;
}
