//! Shared test infrastructure for tablevote integration tests.

pub mod fixtures;
pub mod mocks;
