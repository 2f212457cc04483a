use std::sync::Arc;

use tracing::{debug, instrument};

use super::{FilterSet, Predicate, RadiusResolver, Resolution, Result};
use crate::{
    model::{Profile, SearchPage, SearchQuery},
    store::{DistinctColumn, ProfileStore},
};

/// Turns a [`SearchQuery`] into a [`SearchPage`].
///
/// Count and fetch always run against the same [`FilterSet`], so `total` and
/// the rows on every page agree.
pub struct ProfileSearcher {
    store: Arc<dyn ProfileStore>,
    resolver: RadiusResolver,
}

impl ProfileSearcher {
    pub fn new(store: Arc<dyn ProfileStore>, resolver: RadiusResolver) -> Self {
        Self { store, resolver }
    }

    #[instrument(name = "Profile search", skip(self), level = "info")]
    pub async fn search(&self, query: &SearchQuery) -> Result<SearchPage> {
        let pagination = query.pagination;
        let Some(filters) = self.filters_for(query).await? else {
            debug!("Radius matched nothing, returning an empty page");
            return Ok(SearchPage::empty(pagination));
        };

        let total = self.store.count(&filters).await?;
        if total == 0 {
            return Ok(SearchPage::empty(pagination));
        }
        let profiles = self
            .store
            .fetch_page(&filters, query.sort, pagination)
            .await?;
        debug!(total, rows = profiles.len(), "Search complete");
        Ok(SearchPage::new(profiles, total, pagination))
    }

    /// The final filters, or `None` when the result is known to be empty.
    async fn filters_for(&self, query: &SearchQuery) -> Result<Option<FilterSet>> {
        let base = FilterSet::base(query);
        let Some(radius) = query.radius() else {
            return Ok(Some(base.with_location(query)));
        };

        let centers = query.centers();
        let resolution = if !centers.is_empty() {
            self.resolver
                .resolve_postal(&centers, radius, &base, query.state.as_deref())
                .await?
        } else if let Some(city) = query.city.as_deref() {
            self.resolver
                .resolve_city(city, query.state.as_deref(), radius, &base)
                .await?
        } else {
            debug!(radius, "Radius given without a center, ignoring it");
            return Ok(Some(base.with_location(query)));
        };

        Ok(match resolution {
            Resolution::Matched(found) if found.is_empty() => None,
            Resolution::Matched(found) => Some(base.and(found.into_predicate())),
            Resolution::StateOnly(state) => Some(base.and(Predicate::state(&state))),
            Resolution::Nothing => None,
        })
    }

    pub async fn professions(&self) -> Result<Vec<String>> {
        Ok(self.store.distinct(DistinctColumn::ProfessionType).await?)
    }

    pub async fn states(&self) -> Result<Vec<String>> {
        Ok(self.store.distinct(DistinctColumn::State).await?)
    }

    pub async fn offices(&self) -> Result<Vec<String>> {
        Ok(self.store.distinct(DistinctColumn::Office).await?)
    }

    pub async fn profile(&self, id: i64) -> Result<Option<Profile>> {
        Ok(self.store.profile(id).await?)
    }
}
