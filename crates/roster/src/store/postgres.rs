use std::time::Duration;

use async_trait::async_trait;
use roster_geo::Coordinate;
use sqlx::{PgPool, Postgres, QueryBuilder, postgres::PgPoolOptions};
use tracing::{debug, info, instrument};

use super::{DistinctColumn, ProfileCandidate, ProfileStore, Result};
use crate::{
    model::{Pagination, Profile, Sort, SortDirection, SortField},
    search::FilterSet,
};

const METERS_PER_MILE: f64 = 1609.344;

const PROFILE_COLUMNS: &str = "id, first_name, last_initial, city, state, postal_code, summary, \
     office, profession_type, skills, source_file, active, created_at, updated_at";

const CREATE_PROFILES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS profiles (
    id BIGSERIAL PRIMARY KEY,
    first_name TEXT NOT NULL,
    last_initial TEXT NOT NULL,
    city TEXT NOT NULL,
    state TEXT NOT NULL,
    postal_code TEXT NOT NULL,
    summary TEXT NOT NULL DEFAULT '',
    office TEXT NOT NULL DEFAULT '',
    profession_type TEXT NOT NULL DEFAULT '',
    skills TEXT[],
    source_file TEXT,
    active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
)";

/// `profiles` table in PostgreSQL.
///
/// Radius queries run natively when the table has a `geog` geography column
/// (PostGIS), detected once at construction.
#[derive(Debug, Clone)]
pub struct PostgresProfileStore {
    pool: PgPool,
    spatial: bool,
}

impl PostgresProfileStore {
    /// Open a pool and detect spatial support.
    #[instrument(name = "Connect profile store", skip(url))]
    pub async fn connect(
        url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(url)
            .await?;
        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: PgPool) -> Result<Self> {
        let spatial = detect_spatial(&pool).await?;
        info!(spatial, "Profile store ready");
        Ok(Self { pool, spatial })
    }

    /// Create the `profiles` table if it does not exist.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(CREATE_PROFILES_TABLE).execute(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

async fn detect_spatial(pool: &PgPool) -> Result<bool> {
    let found: Option<i32> = sqlx::query_scalar(
        "SELECT 1 FROM information_schema.columns \
         WHERE table_schema = current_schema() AND table_name = 'profiles' \
           AND column_name = 'geog' AND udt_name = 'geography' \
         LIMIT 1",
    )
    .fetch_optional(pool)
    .await?;
    Ok(found.is_some())
}

/// Non-blank values of `column` among active profiles, in byte order.
fn distinct_sql(column: DistinctColumn) -> String {
    let column = column.column();
    // SELECT DISTINCT cannot be ordered by a collated expression.
    format!(
        "SELECT {column} FROM profiles \
         WHERE active = TRUE AND {column} IS NOT NULL AND BTRIM({column}) <> '' \
         GROUP BY {column} \
         ORDER BY {column} COLLATE \"C\""
    )
}

const fn sort_column(field: SortField) -> &'static str {
    match field {
        SortField::Name => "first_name",
        SortField::Location => "city",
        SortField::Profession => "profession_type",
    }
}

#[async_trait]
impl ProfileStore for PostgresProfileStore {
    #[instrument(skip_all, level = "debug")]
    async fn count(&self, filters: &FilterSet) -> Result<u64> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM profiles");
        filters.push_where(&mut qb);
        let total: i64 = qb.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(u64::try_from(total).unwrap_or_default())
    }

    #[instrument(skip(self, filters), level = "debug")]
    async fn fetch_page(
        &self,
        filters: &FilterSet,
        sort: Sort,
        pagination: Pagination,
    ) -> Result<Vec<Profile>> {
        let mut qb =
            QueryBuilder::<Postgres>::new(format!("SELECT {PROFILE_COLUMNS} FROM profiles"));
        filters.push_where(&mut qb);
        qb.push(" ORDER BY ")
            .push(sort_column(sort.field))
            .push(" COLLATE \"C\"")
            .push(match sort.direction {
                SortDirection::Asc => " ASC",
                SortDirection::Desc => " DESC",
            })
            .push(" LIMIT ")
            .push_bind(i64::from(pagination.limit()))
            .push(" OFFSET ")
            .push_bind(i64::try_from(pagination.offset()).unwrap_or(i64::MAX));
        debug!(sql = qb.sql(), "Fetching profile page");

        Ok(qb.build_query_as::<Profile>().fetch_all(&self.pool).await?)
    }

    #[instrument(skip_all, level = "debug")]
    async fn candidates(&self, filters: &FilterSet) -> Result<Vec<ProfileCandidate>> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT id, postal_code FROM profiles");
        filters.push_where(&mut qb);
        Ok(qb
            .build_query_as::<ProfileCandidate>()
            .fetch_all(&self.pool)
            .await?)
    }

    fn supports_spatial(&self) -> bool {
        self.spatial
    }

    #[instrument(skip(self, filters), level = "debug")]
    async fn ids_within_radius(
        &self,
        filters: &FilterSet,
        centers: &[Coordinate],
        radius_miles: f64,
    ) -> Result<Vec<i64>> {
        if !self.spatial {
            return Err(super::StoreError::SpatialUnsupported);
        }
        if centers.is_empty() {
            return Ok(Vec::new());
        }

        let mut qb = QueryBuilder::<Postgres>::new("SELECT id FROM profiles");
        let joiner = if filters.push_where(&mut qb) { " AND (" } else { " WHERE (" };
        qb.push(joiner);
        for (i, center) in centers.iter().enumerate() {
            if i > 0 {
                qb.push(" OR ");
            }
            qb.push("ST_DWithin(geog, ST_SetSRID(ST_MakePoint(")
                .push_bind(center.longitude)
                .push(", ")
                .push_bind(center.latitude)
                .push("), 4326)::geography, ")
                .push_bind(radius_miles * METERS_PER_MILE)
                .push(")");
        }
        qb.push(")");

        Ok(qb.build_query_scalar::<i64>().fetch_all(&self.pool).await?)
    }

    async fn distinct(&self, column: DistinctColumn) -> Result<Vec<String>> {
        Ok(sqlx::query_scalar(&distinct_sql(column))
            .fetch_all(&self.pool)
            .await?)
    }

    async fn profile(&self, id: i64) -> Result<Option<Profile>> {
        let sql =
            format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1 AND active = TRUE");
        Ok(sqlx::query_as::<_, Profile>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }
}
