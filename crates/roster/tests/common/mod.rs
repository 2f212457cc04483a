//! Shared test utilities for the roster integration harnesses.
//!
//! Import everything via `mod common; use common::*;` at the top of each
//! harness file.

pub mod builders;
pub mod database;
pub mod fixtures;

pub use builders::*;
pub use database::*;
pub use fixtures::*;

pub fn setup_test_env() {
    let _ = roster::init_logging(tracing::Level::WARN);
}
