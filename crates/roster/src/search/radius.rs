//! Radius resolution.
//!
//! A radius search is answered by the first strategy in the chain that can
//! answer it:
//!
//! 1. [`SpatialIndexStrategy`]: the store measures distance natively.
//! 2. [`BulkPostalCodeStrategy`]: an external service lists the postal codes
//!    inside the radius.
//! 3. [`PerRecordGeocodeStrategy`]: every pre-filtered candidate is geocoded
//!    and measured.
//!
//! When no strategy can answer, the search narrows to a single state rather
//! than returning everything. Every tier keeps a record that is within the
//! radius of *any* center.

use std::sync::Arc;

use ahash::AHashMap;
use async_trait::async_trait;
use futures::future::join_all;
use itertools::Itertools;
use roster_geo::{
    BoundingBox, Coordinate, Geocoder, RadiusLookup, ZipLocation, approx, normalize_postal_code,
};
use tracing::{debug, info, instrument, warn};

use super::{FilterSet, Predicate, Result};
use crate::{
    config::ResolverConfig,
    store::{ProfileCandidate, ProfileStore},
};

/// The set a radius search narrows the main query to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RadiusMatch {
    Ids(Vec<i64>),
    PostalCodes(Vec<String>),
}

impl RadiusMatch {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Ids(ids) => ids.is_empty(),
            Self::PostalCodes(codes) => codes.is_empty(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Ids(ids) => ids.len(),
            Self::PostalCodes(codes) => codes.len(),
        }
    }

    pub fn into_predicate(self) -> Predicate {
        match self {
            Self::Ids(ids) => Predicate::IdIn(ids),
            Self::PostalCodes(codes) => Predicate::postal_codes(&codes),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TierOutcome {
    Resolved(RadiusMatch),
    Unavailable(String),
}

impl TierOutcome {
    fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable(reason.into())
    }
}

/// Inputs shared by every strategy for one radius search.
#[derive(Debug, Clone, Copy)]
pub struct RadiusContext<'a> {
    /// Normalised center postal codes, in request order.
    pub postal_codes: &'a [String],
    /// Centers that geocoded successfully.
    pub centers: &'a [ZipLocation],
    pub radius_miles: f64,
    /// Keyword, profession and office filters.
    pub base_filters: &'a FilterSet,
}

impl RadiusContext<'_> {
    fn center_coordinates(&self) -> Vec<Coordinate> {
        self.centers.iter().map(|c| c.coordinate).collect()
    }
}

#[async_trait]
pub trait RadiusStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn resolve(&self, ctx: &RadiusContext<'_>) -> Result<TierOutcome>;
}

/// Native geodesic query against the store's geography column.
pub struct SpatialIndexStrategy {
    store: Arc<dyn ProfileStore>,
}

impl SpatialIndexStrategy {
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl RadiusStrategy for SpatialIndexStrategy {
    fn name(&self) -> &'static str {
        "spatial_index"
    }

    async fn resolve(&self, ctx: &RadiusContext<'_>) -> Result<TierOutcome> {
        if !self.store.supports_spatial() {
            return Ok(TierOutcome::unavailable("store has no geography column"));
        }
        if ctx.centers.is_empty() {
            return Ok(TierOutcome::unavailable("no center could be geocoded"));
        }
        let ids = self
            .store
            .ids_within_radius(ctx.base_filters, &ctx.center_coordinates(), ctx.radius_miles)
            .await?;
        Ok(TierOutcome::Resolved(RadiusMatch::Ids(ids)))
    }
}

/// External "postal codes within N miles" lookup, unioned across centers.
pub struct BulkPostalCodeStrategy {
    lookup: Option<Arc<dyn RadiusLookup>>,
}

impl BulkPostalCodeStrategy {
    pub fn new(lookup: Option<Arc<dyn RadiusLookup>>) -> Self {
        Self { lookup }
    }
}

#[async_trait]
impl RadiusStrategy for BulkPostalCodeStrategy {
    fn name(&self) -> &'static str {
        "bulk_postal_code"
    }

    async fn resolve(&self, ctx: &RadiusContext<'_>) -> Result<TierOutcome> {
        let Some(lookup) = &self.lookup else {
            return Ok(TierOutcome::unavailable("no bulk radius service configured"));
        };
        if ctx.postal_codes.is_empty() {
            return Ok(TierOutcome::unavailable("no valid center postal code"));
        }

        let responses = join_all(
            ctx.postal_codes
                .iter()
                .map(|code| lookup.postal_codes_within(code, ctx.radius_miles)),
        )
        .await;

        let mut codes = Vec::new();
        for (center, response) in ctx.postal_codes.iter().zip(responses) {
            match response {
                Ok(found) => codes.extend(found),
                Err(e) => {
                    return Ok(TierOutcome::unavailable(format!(
                        "bulk lookup failed for {center}: {e}"
                    )));
                }
            }
        }
        let codes = codes.into_iter().unique().collect::<Vec<_>>();

        if codes.is_empty() {
            return Ok(TierOutcome::unavailable("bulk lookup returned no postal codes"));
        }
        Ok(TierOutcome::Resolved(RadiusMatch::PostalCodes(codes)))
    }
}

/// Geocode every pre-filtered candidate and keep those inside the radius.
pub struct PerRecordGeocodeStrategy {
    store: Arc<dyn ProfileStore>,
    geocoder: Arc<dyn Geocoder>,
}

impl PerRecordGeocodeStrategy {
    pub fn new(store: Arc<dyn ProfileStore>, geocoder: Arc<dyn Geocoder>) -> Self {
        Self { store, geocoder }
    }

    /// Ids of `candidates` within `radius_miles` of any center. Candidates
    /// whose postal code cannot be geocoded are left out.
    async fn within_radius(
        &self,
        candidates: &[ProfileCandidate],
        centers: &[Coordinate],
        radius_miles: f64,
    ) -> Vec<i64> {
        let normalized = candidates
            .iter()
            .map(|c| normalize_postal_code(&c.postal_code))
            .collect::<Vec<_>>();
        let distinct = normalized.iter().flatten().unique().cloned().collect::<Vec<_>>();

        let located = self.geocoder.geocode_postal_codes(&distinct).await;
        let coordinates = distinct
            .iter()
            .zip(located)
            .filter_map(|(code, location)| location.map(|l| (code.as_str(), l.coordinate)))
            .collect::<AHashMap<_, _>>();
        debug!(
            candidates = candidates.len(),
            distinct = distinct.len(),
            geocoded = coordinates.len(),
            "Geocoded candidate postal codes"
        );

        let boxes = centers
            .iter()
            .map(|c| (*c, BoundingBox::around(*c, radius_miles)))
            .collect::<Vec<_>>();

        candidates
            .iter()
            .zip(&normalized)
            .filter_map(|(candidate, code)| {
                let point = *coordinates.get(code.as_deref()?)?;
                boxes
                    .iter()
                    .any(|(center, bbox)| {
                        bbox.contains(point) && center.miles_to(point) <= radius_miles
                    })
                    .then_some(candidate.id)
            })
            .collect()
    }
}

#[async_trait]
impl RadiusStrategy for PerRecordGeocodeStrategy {
    fn name(&self) -> &'static str {
        "per_record_geocode"
    }

    async fn resolve(&self, ctx: &RadiusContext<'_>) -> Result<TierOutcome> {
        if ctx.centers.is_empty() {
            return Ok(TierOutcome::unavailable("no center could be geocoded"));
        }
        let candidates = self.store.candidates(ctx.base_filters).await?;
        if candidates.is_empty() {
            return Ok(TierOutcome::Resolved(RadiusMatch::Ids(Vec::new())));
        }
        let ids = self
            .within_radius(&candidates, &ctx.center_coordinates(), ctx.radius_miles)
            .await;
        Ok(TierOutcome::Resolved(RadiusMatch::Ids(ids)))
    }
}

/// Outcome of a radius search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Matched(RadiusMatch),
    /// No strategy could answer; narrow to this state instead.
    StateOnly(String),
    /// No strategy could answer and no state could be derived.
    Nothing,
}

/// Runs the strategy chain for postal-code centers, and the per-record
/// strategy alone for city centers.
pub struct RadiusResolver {
    strategies: Vec<Box<dyn RadiusStrategy>>,
    per_record: PerRecordGeocodeStrategy,
    store: Arc<dyn ProfileStore>,
    geocoder: Arc<dyn Geocoder>,
    max_radius_miles: f64,
}

impl RadiusResolver {
    pub fn new(
        store: Arc<dyn ProfileStore>,
        geocoder: Arc<dyn Geocoder>,
        bulk_lookup: Option<Arc<dyn RadiusLookup>>,
        config: &ResolverConfig,
    ) -> Self {
        let mut strategies: Vec<Box<dyn RadiusStrategy>> = Vec::with_capacity(3);
        if config.use_spatial_index {
            strategies.push(Box::new(SpatialIndexStrategy::new(store.clone())));
        }
        if config.use_bulk_lookup {
            strategies.push(Box::new(BulkPostalCodeStrategy::new(bulk_lookup)));
        }
        if config.use_per_record_geocode {
            strategies.push(Box::new(PerRecordGeocodeStrategy::new(
                store.clone(),
                geocoder.clone(),
            )));
        }

        Self {
            strategies,
            per_record: PerRecordGeocodeStrategy::new(store.clone(), geocoder.clone()),
            store,
            geocoder,
            max_radius_miles: config.max_radius_miles,
        }
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    fn clamp_radius(&self, radius_miles: f64) -> f64 {
        radius_miles.min(self.max_radius_miles)
    }

    /// Resolve a radius around one or more postal codes.
    ///
    /// `state_hint` is the request's own state filter, used first if the
    /// search has to degrade.
    #[instrument(name = "Resolve postal radius", skip(self, base_filters), level = "debug")]
    pub async fn resolve_postal(
        &self,
        postal_codes: &[String],
        radius_miles: f64,
        base_filters: &FilterSet,
        state_hint: Option<&str>,
    ) -> Result<Resolution> {
        let radius_miles = self.clamp_radius(radius_miles);
        let codes = postal_codes
            .iter()
            .filter_map(|c| {
                let normalized = normalize_postal_code(c);
                if normalized.is_none() {
                    warn!(postal_code = c.as_str(), "Ignoring malformed center postal code");
                }
                normalized
            })
            .unique()
            .collect::<Vec<_>>();

        let centers = self
            .geocoder
            .geocode_postal_codes(&codes)
            .await
            .into_iter()
            .zip(&codes)
            .filter_map(|(location, code)| {
                if location.is_none() {
                    warn!(
                        postal_code = code.as_str(),
                        "Dropping center that could not be geocoded"
                    );
                }
                location
            })
            .collect::<Vec<_>>();

        let ctx = RadiusContext {
            postal_codes: &codes,
            centers: &centers,
            radius_miles,
            base_filters,
        };

        for strategy in &self.strategies {
            match strategy.resolve(&ctx).await {
                Ok(TierOutcome::Resolved(found)) => {
                    info!(
                        strategy = strategy.name(),
                        matches = found.len(),
                        "Radius resolved"
                    );
                    return Ok(Resolution::Matched(found));
                }
                Ok(TierOutcome::Unavailable(reason)) => {
                    debug!(strategy = strategy.name(), %reason, "Radius strategy unavailable");
                }
                Err(e) => {
                    warn!(strategy = strategy.name(), error = %e, "Radius strategy failed");
                }
            }
        }

        let state = state_hint
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .or_else(|| centers.iter().find_map(|c| c.state.clone()))
            .or_else(|| {
                postal_codes
                    .first()
                    .map(String::as_str)
                    .and_then(approx::approximate)
                    .and_then(|l| l.state)
            });

        Ok(match state {
            Some(state) => {
                warn!(%state, "No radius strategy available, narrowing to state");
                Resolution::StateOnly(state)
            }
            None => {
                warn!("No radius strategy available and no state to fall back to");
                Resolution::Nothing
            }
        })
    }

    /// Resolve a radius around a city. Only the per-record strategy applies.
    /// If the city cannot be geocoded every pre-filtered candidate matches.
    #[instrument(name = "Resolve city radius", skip(self, base_filters), level = "debug")]
    pub async fn resolve_city(
        &self,
        city: &str,
        state: Option<&str>,
        radius_miles: f64,
        base_filters: &FilterSet,
    ) -> Result<Resolution> {
        let radius_miles = self.clamp_radius(radius_miles);
        let Some(center) = self.geocoder.geocode_city(city, state).await else {
            warn!(city, state, "City could not be geocoded, keeping all candidates");
            let ids = self
                .store
                .candidates(base_filters)
                .await?
                .into_iter()
                .map(|c| c.id)
                .collect();
            return Ok(Resolution::Matched(RadiusMatch::Ids(ids)));
        };

        let centers = [center];
        let ctx = RadiusContext {
            postal_codes: &[],
            centers: &centers,
            radius_miles,
            base_filters,
        };
        match self.per_record.resolve(&ctx).await? {
            TierOutcome::Resolved(found) => Ok(Resolution::Matched(found)),
            TierOutcome::Unavailable(reason) => {
                warn!(city, %reason, "City radius could not be resolved");
                Ok(Resolution::Nothing)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use roster_geo::{GeoError, TableGeocoder};

    use super::*;
    use crate::store::MemoryProfileStore;

    struct FailingLookup;

    #[async_trait]
    impl RadiusLookup for FailingLookup {
        async fn postal_codes_within(
            &self,
            code: &str,
            _radius: f64,
        ) -> roster_geo::Result<Vec<String>> {
            Err(GeoError::NotFound(code.to_owned()))
        }
    }

    struct FixedLookup(Vec<&'static str>);

    #[async_trait]
    impl RadiusLookup for FixedLookup {
        async fn postal_codes_within(
            &self,
            _code: &str,
            _radius: f64,
        ) -> roster_geo::Result<Vec<String>> {
            Ok(self.0.iter().map(|c| (*c).to_owned()).collect())
        }
    }

    fn ctx<'a>(
        codes: &'a [String],
        centers: &'a [ZipLocation],
        filters: &'a FilterSet,
    ) -> RadiusContext<'a> {
        RadiusContext {
            postal_codes: codes,
            centers,
            radius_miles: 25.0,
            base_filters: filters,
        }
    }

    #[tokio::test]
    async fn test_bulk_unions_and_dedups_across_centers() {
        let lookup = FixedLookup(vec!["44310", "44289"]);
        let strategy = BulkPostalCodeStrategy::new(Some(Arc::new(lookup)));
        let codes = vec!["44310".to_owned(), "44240".to_owned()];
        let filters = FilterSet::active_only();

        let outcome = strategy.resolve(&ctx(&codes, &[], &filters)).await.unwrap();
        assert_eq!(
            outcome,
            TierOutcome::Resolved(RadiusMatch::PostalCodes(vec!["44310".into(), "44289".into()]))
        );
    }

    #[tokio::test]
    async fn test_bulk_is_unavailable_on_error_empty_or_missing() {
        let codes = vec!["44310".to_owned()];
        let filters = FilterSet::active_only();

        for strategy in [
            BulkPostalCodeStrategy::new(None),
            BulkPostalCodeStrategy::new(Some(Arc::new(FailingLookup))),
            BulkPostalCodeStrategy::new(Some(Arc::new(FixedLookup(vec![])))),
        ] {
            let outcome = strategy.resolve(&ctx(&codes, &[], &filters)).await.unwrap();
            assert!(matches!(outcome, TierOutcome::Unavailable(_)), "{outcome:?}");
        }
    }

    #[tokio::test]
    async fn test_spatial_is_unavailable_without_geography() {
        let store: Arc<dyn ProfileStore> = Arc::new(MemoryProfileStore::default());
        let strategy = SpatialIndexStrategy::new(store);
        let filters = FilterSet::active_only();
        let outcome = strategy.resolve(&ctx(&[], &[], &filters)).await.unwrap();
        assert!(matches!(outcome, TierOutcome::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_per_record_short_circuits_on_no_candidates() {
        let store: Arc<dyn ProfileStore> = Arc::new(MemoryProfileStore::default());
        let strategy = PerRecordGeocodeStrategy::new(store, Arc::new(TableGeocoder));
        let center = TableGeocoder.geocode_postal_code("44310").await.unwrap();
        let filters = FilterSet::active_only();

        let outcome = strategy
            .resolve(&ctx(&[], std::slice::from_ref(&center), &filters))
            .await
            .unwrap();
        assert_eq!(outcome, TierOutcome::Resolved(RadiusMatch::Ids(vec![])));
    }

    #[tokio::test]
    async fn test_degrades_to_prefix_table_state() {
        let store: Arc<dyn ProfileStore> = Arc::new(MemoryProfileStore::default());
        let config = ResolverConfig::builder()
            .spatial_index(false)
            .bulk_lookup(false)
            .per_record_geocode(false)
            .build();
        let resolver = RadiusResolver::new(store, Arc::new(TableGeocoder), None, &config);
        assert!(resolver.strategy_names().is_empty());

        let resolution = resolver
            .resolve_postal(&["44310".into()], 25.0, &FilterSet::active_only(), None)
            .await
            .unwrap();
        assert_eq!(resolution, Resolution::StateOnly("OH".into()));

        let hinted = resolver
            .resolve_postal(&["44310".into()], 25.0, &FilterSet::active_only(), Some("pa"))
            .await
            .unwrap();
        assert_eq!(hinted, Resolution::StateOnly("PA".into()));

        let nothing = resolver
            .resolve_postal(&["09001".into()], 25.0, &FilterSet::active_only(), None)
            .await
            .unwrap();
        assert_eq!(nothing, Resolution::Nothing);
    }

    #[test]
    fn test_match_into_predicate() {
        assert_eq!(RadiusMatch::Ids(vec![3]).into_predicate(), Predicate::IdIn(vec![3]));
        assert!(RadiusMatch::PostalCodes(vec![]).is_empty());
    }
}
