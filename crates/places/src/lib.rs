//! Restaurant source client.
//!
//! The session service treats restaurant search as an external
//! collaborator: one `search` call at session creation, results frozen
//! into the deck. The HTTP client caches responses and falls back to a
//! deterministic mock deck when no upstream is configured.

pub mod client;
pub mod config;

pub use client::{HttpPlacesClient, RestaurantSource};
pub use config::PlacesConfig;
