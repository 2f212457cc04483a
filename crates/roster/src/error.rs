use thiserror::Error;

#[derive(Error, Debug)]
pub enum RosterError {
    #[error("Search error: {0}")]
    Search(#[from] crate::search::SearchError),
    #[error("Store error: {0}")]
    Store(#[from] crate::store::StoreError),
    #[error("Contact error: {0}")]
    Contact(#[from] crate::contact::ContactError),
    #[error("Geocoding error: {0}")]
    Geo(#[from] roster_geo::GeoError),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Configuration load error: {0}")]
    ConfigLoad(#[from] ::config::ConfigError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Init Logging error: {0}")]
    InitLoggingError(#[from] tracing_subscriber::filter::ParseError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, RosterError>;
