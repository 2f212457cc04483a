//! Test builders: ergonomic constructors for profiles and rosters.
//!
//! Readability over rigour; these panic rather than return `Result`.

use std::sync::{
    Arc,
    atomic::{AtomicI64, Ordering},
};

use chrono::Utc;
use roster::{
    MemoryProfileStore, OfficeDirectory, Profile, ResolverConfig, Roster, RosterBuilder,
    contact::Mailer,
    geo::{Geocoder, RadiusLookup},
};

static NEXT_ID: AtomicI64 = AtomicI64::new(1_000);

/// Fluent builder for [`Profile`] fixtures.
///
/// ```rust,ignore
/// let profile = ProfileBuilder::new("Avery")
///     .city("Akron", "OH")
///     .postal_code("44310")
///     .summary("Project manager")
///     .build();
/// ```
pub struct ProfileBuilder {
    profile: Profile,
}

impl ProfileBuilder {
    pub fn new(first_name: &str) -> Self {
        let now = Utc::now();
        Self {
            profile: Profile {
                id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
                first_name: first_name.to_owned(),
                last_initial: "X".to_owned(),
                city: "Akron".to_owned(),
                state: "OH".to_owned(),
                postal_code: "44310".to_owned(),
                summary: String::new(),
                office: "Cleveland".to_owned(),
                profession_type: "Engineering".to_owned(),
                skills: None,
                source_file: None,
                active: true,
                created_at: now,
                updated_at: now,
            },
        }
    }

    pub fn id(mut self, id: i64) -> Self {
        self.profile.id = id;
        self
    }

    pub fn city(mut self, city: &str, state: &str) -> Self {
        self.profile.city = city.to_owned();
        self.profile.state = state.to_owned();
        self
    }

    pub fn postal_code(mut self, postal_code: &str) -> Self {
        self.profile.postal_code = postal_code.to_owned();
        self
    }

    pub fn summary(mut self, summary: &str) -> Self {
        self.profile.summary = summary.to_owned();
        self
    }

    pub fn office(mut self, office: &str) -> Self {
        self.profile.office = office.to_owned();
        self
    }

    pub fn profession(mut self, profession: &str) -> Self {
        self.profile.profession_type = profession.to_owned();
        self
    }

    pub fn inactive(mut self) -> Self {
        self.profile.active = false;
        self
    }

    pub fn build(self) -> Profile {
        self.profile
    }
}

/// Fluent builder for a [`Roster`] over an in-memory store.
pub struct TestRoster {
    builder: RosterBuilder,
}

impl TestRoster {
    pub fn new(profiles: Vec<Profile>) -> Self {
        Self::with_store(MemoryProfileStore::new(profiles))
    }

    pub fn with_store(store: MemoryProfileStore) -> Self {
        Self {
            builder: Roster::builder(Arc::new(store)),
        }
    }

    pub fn geocoder(mut self, geocoder: Arc<dyn Geocoder>) -> Self {
        self.builder = self.builder.geocoder(geocoder);
        self
    }

    pub fn bulk_lookup(mut self, lookup: Arc<dyn RadiusLookup>) -> Self {
        self.builder = self.builder.bulk_lookup(lookup);
        self
    }

    pub fn resolver(mut self, config: ResolverConfig) -> Self {
        self.builder = self.builder.resolver_config(config);
        self
    }

    pub fn mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.builder = self.builder.mailer(mailer);
        self
    }

    pub fn offices(mut self, directory: OfficeDirectory) -> Self {
        self.builder = self.builder.office_directory(directory);
        self
    }

    pub fn build(self) -> Roster {
        self.builder.build()
    }
}
