//! Roster - talent profile search and contact routing
//!
//! Roster serves a searchable directory of professional profiles. Visitors
//! filter by keyword, profession, office, state, postal code or city, sort and
//! paginate the results, and send a "request this associate" inquiry that is
//! routed by e-mail to the right regional office.
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use roster::{MemoryProfileStore, Roster, SearchQuery};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let store = Arc::new(MemoryProfileStore::new(roster::demo::sample_profiles()));
//! let roster = Roster::builder(store).build();
//!
//! let query = SearchQuery::builder()
//!     .keywords(["analyst"])
//!     .limit(5)
//!     .build();
//! let page = roster.search(&query).await?;
//! assert!(page.profiles.len() <= 5);
//! # Ok::<(), roster::error::RosterError>(())
//! # }).unwrap();
//! ```
//!
//! # Radius search
//!
//! A search with a positive radius and one or more postal codes (or a city)
//! is resolved by a chain of strategies, first success wins:
//!
//! 1. a native geography query, when the store has a geography column;
//! 2. a bulk "postal codes within N miles" service, when configured;
//! 3. geocoding every pre-filtered candidate and measuring the distance.
//!
//! If nothing in the chain can answer, the search narrows to the center's
//! state instead of returning an unbounded "nearby" list.
use once_cell::sync::OnceCell;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

pub mod config;
pub mod contact;
mod core;
pub mod demo;
pub mod error;
mod model;
pub mod search;
pub mod server;
pub mod store;

pub use core::{Roster, RosterBuilder};

pub use config::{ResolverConfig, ResolverConfigBuilder, RosterConfig, SearchSettings};
pub use contact::{ContactRequest, ContactService, LogMailer, Mailer, OfficeDirectory};
pub use model::{
    Pagination, Profile, SearchPage, SearchParams, SearchQuery, SearchQueryBuilder, Sort,
    SortDirection, SortField,
};
pub use roster_geo as geo;
pub use search::{FilterSet, Predicate, ProfileSearcher, RadiusResolver};
pub use store::{MemoryProfileStore, PostgresProfileStore, ProfileStore};

static LOGGER_INIT: OnceCell<()> = OnceCell::new();

/// Initialize logging for the roster service.
///
/// Sets up structured logging honouring `RUST_LOG`, falling back to `level`.
/// Noisy dependencies are held at `warn`. Safe to call more than once; only
/// the first call installs the subscriber.
///
/// # Examples
///
/// ```rust
/// use roster::init_logging;
/// use tracing::Level;
///
/// init_logging(Level::INFO)?;
/// # Ok::<(), roster::error::RosterError>(())
/// ```
pub fn init_logging(level: impl Into<LevelFilter>) -> Result<&'static (), error::RosterError> {
    LOGGER_INIT.get_or_try_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(level.into().to_string()))?
            .add_directive("sqlx=warn".parse()?)
            .add_directive("hyper_util=warn".parse()?)
            .add_directive("reqwest=warn".parse()?);

        tracing_subscriber::fmt::fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .try_init()
            .map_err(|e| error::RosterError::Config(e.to_string()))?;
        Ok(())
    })
}
