//! Throwaway Postgres schemas for the store harness.
//!
//! Set `ROSTER_TEST_DATABASE_URL` to a database where the test user may
//! create schemas; without it the Postgres tests return early. Each
//! [`TestDatabase`] lives in its own `roster_test_<uuid>` schema.

use roster::{PostgresProfileStore, Profile, geo::Coordinate};
use sqlx::{PgPool, Postgres, QueryBuilder, postgres::PgPoolOptions};

pub const DATABASE_URL_ENV: &str = "ROSTER_TEST_DATABASE_URL";

pub struct TestDatabase {
    admin: PgPool,
    schema: String,
    pub store: PostgresProfileStore,
}

impl TestDatabase {
    /// A fresh schema with the `profiles` table, or `None` when no test
    /// database is configured.
    pub async fn connect() -> Option<Self> {
        let Ok(url) = std::env::var(DATABASE_URL_ENV) else {
            eprintln!("{DATABASE_URL_ENV} is not set, skipping Postgres test");
            return None;
        };

        let schema = format!("roster_test_{}", uuid::Uuid::new_v4().simple());
        let admin = PgPool::connect(&url).await.unwrap();
        sqlx::query(&format!("CREATE SCHEMA {schema}"))
            .execute(&admin)
            .await
            .unwrap();

        let search_path = format!("SET search_path TO {schema}, public");
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .after_connect(move |conn, _meta| {
                let search_path = search_path.clone();
                Box::pin(async move {
                    sqlx::query(&search_path).execute(conn).await?;
                    Ok(())
                })
            })
            .connect(&url)
            .await
            .unwrap();

        let store = PostgresProfileStore::from_pool(pool).await.unwrap();
        store.ensure_schema().await.unwrap();
        Some(Self {
            admin,
            schema,
            store,
        })
    }

    pub async fn insert(&self, profiles: &[Profile]) {
        let mut qb = QueryBuilder::<Postgres>::new(
            "INSERT INTO profiles (id, first_name, last_initial, city, state, postal_code, \
             summary, office, profession_type, skills, source_file, active, created_at, \
             updated_at) ",
        );
        qb.push_values(profiles, |mut row, p| {
            row.push_bind(p.id)
                .push_bind(p.first_name.clone())
                .push_bind(p.last_initial.clone())
                .push_bind(p.city.clone())
                .push_bind(p.state.clone())
                .push_bind(p.postal_code.clone())
                .push_bind(p.summary.clone())
                .push_bind(p.office.clone())
                .push_bind(p.profession_type.clone())
                .push_bind(p.skills.clone())
                .push_bind(p.source_file.clone())
                .push_bind(p.active)
                .push_bind(p.created_at)
                .push_bind(p.updated_at);
        });
        qb.build().execute(self.store.pool()).await.unwrap();
    }

    /// Add a PostGIS `geog` column filled from `points` and return a store
    /// that sees it. `None` when PostGIS is not installable here.
    pub async fn with_geography(
        &self,
        points: &[(i64, Coordinate)],
    ) -> Option<PostgresProfileStore> {
        if let Err(e) = sqlx::query("CREATE EXTENSION IF NOT EXISTS postgis")
            .execute(&self.admin)
            .await
        {
            eprintln!("PostGIS unavailable ({e}), skipping geography checks");
            return None;
        }

        let pool = self.store.pool();
        sqlx::query("ALTER TABLE profiles ADD COLUMN geog geography(Point, 4326)")
            .execute(pool)
            .await
            .unwrap();
        for (id, point) in points {
            sqlx::query(
                "UPDATE profiles \
                 SET geog = ST_SetSRID(ST_MakePoint($1, $2), 4326)::geography \
                 WHERE id = $3",
            )
            .bind(point.longitude)
            .bind(point.latitude)
            .bind(id)
            .execute(pool)
            .await
            .unwrap();
        }
        Some(PostgresProfileStore::from_pool(pool.clone()).await.unwrap())
    }

    pub async fn drop_schema(self) {
        self.store.pool().close().await;
        sqlx::query(&format!("DROP SCHEMA {} CASCADE", self.schema))
            .execute(&self.admin)
            .await
            .unwrap();
    }
}
