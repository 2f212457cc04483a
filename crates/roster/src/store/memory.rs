use ahash::AHashMap;
use async_trait::async_trait;
use itertools::Itertools;
use roster_geo::{BoundingBox, Coordinate};

use super::{DistinctColumn, ProfileCandidate, ProfileStore, Result};
use crate::{
    model::{Pagination, Profile, Sort, SortDirection, SortField},
    search::FilterSet,
};

/// In-memory store over a fixed list of profiles.
///
/// With [`MemoryProfileStore::with_coordinates`] it also answers radius
/// queries directly, standing in for a store with a geography column.
#[derive(Debug, Clone, Default)]
pub struct MemoryProfileStore {
    profiles: Vec<Profile>,
    coordinates: Option<AHashMap<i64, Coordinate>>,
}

impl MemoryProfileStore {
    pub fn new(profiles: Vec<Profile>) -> Self {
        Self {
            profiles,
            coordinates: None,
        }
    }

    /// Attach a stored coordinate per profile id, enabling spatial queries.
    pub fn with_coordinates(
        mut self,
        coordinates: impl IntoIterator<Item = (i64, Coordinate)>,
    ) -> Self {
        self.coordinates = Some(coordinates.into_iter().collect());
        self
    }

    fn matching<'a>(&'a self, filters: &'a FilterSet) -> impl Iterator<Item = &'a Profile> + 'a {
        self.profiles.iter().filter(move |p| filters.matches(p))
    }
}

fn sort_key(profile: &Profile, field: SortField) -> &str {
    match field {
        SortField::Name => &profile.first_name,
        SortField::Location => &profile.city,
        SortField::Profession => &profile.profession_type,
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn count(&self, filters: &FilterSet) -> Result<u64> {
        Ok(self.matching(filters).count() as u64)
    }

    async fn fetch_page(
        &self,
        filters: &FilterSet,
        sort: Sort,
        pagination: Pagination,
    ) -> Result<Vec<Profile>> {
        let mut rows = self.matching(filters).collect::<Vec<_>>();
        // Byte order, matching `COLLATE "C"` in Postgres.
        rows.sort_by(|a, b| {
            let ord = sort_key(a, sort.field).cmp(sort_key(b, sort.field));
            match sort.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        });
        Ok(rows
            .into_iter()
            .skip(usize::try_from(pagination.offset()).unwrap_or(usize::MAX))
            .take(pagination.limit() as usize)
            .cloned()
            .collect())
    }

    async fn candidates(&self, filters: &FilterSet) -> Result<Vec<ProfileCandidate>> {
        Ok(self
            .matching(filters)
            .map(|p| ProfileCandidate {
                id: p.id,
                postal_code: p.postal_code.clone(),
            })
            .collect())
    }

    fn supports_spatial(&self) -> bool {
        self.coordinates.is_some()
    }

    async fn ids_within_radius(
        &self,
        filters: &FilterSet,
        centers: &[Coordinate],
        radius_miles: f64,
    ) -> Result<Vec<i64>> {
        let Some(coordinates) = &self.coordinates else {
            return Err(super::StoreError::SpatialUnsupported);
        };
        let boxes = centers
            .iter()
            .map(|c| (*c, BoundingBox::around(*c, radius_miles)))
            .collect::<Vec<_>>();

        Ok(self
            .matching(filters)
            .filter(|p| {
                coordinates.get(&p.id).is_some_and(|point| {
                    boxes.iter().any(|(center, bbox)| {
                        bbox.contains(*point) && center.miles_to(*point) <= radius_miles
                    })
                })
            })
            .map(|p| p.id)
            .collect())
    }

    async fn distinct(&self, column: DistinctColumn) -> Result<Vec<String>> {
        Ok(self
            .matching(&FilterSet::active_only())
            .map(|p| match column {
                DistinctColumn::ProfessionType => p.profession_type.as_str(),
                DistinctColumn::State => p.state.as_str(),
                DistinctColumn::Office => p.office.as_str(),
            })
            .filter(|v| !v.trim().is_empty())
            .unique()
            .sorted()
            .map(str::to_owned)
            .collect())
    }

    async fn profile(&self, id: i64) -> Result<Option<Profile>> {
        Ok(self
            .profiles
            .iter()
            .find(|p| p.id == id && p.active)
            .cloned())
    }
}
