//! Restaurant source configuration.

use serde::{Deserialize, Serialize};
use vote_core::GeoPoint;

/// Restaurant source client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacesConfig {
    /// Upstream search service URL. Empty or "mock" enables the
    /// deterministic mock deck.
    #[serde(default)]
    pub base_url: String,
    /// API key passed as a bearer token, if the upstream needs one.
    pub api_key: Option<String>,
    /// Search radius used when the client does not supply one.
    #[serde(default = "default_radius_km")]
    pub default_radius_km: f64,
    /// Search center used when the client does not supply one.
    pub default_center: Option<GeoPoint>,
    /// Response cache TTL in seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

fn default_radius_km() -> f64 {
    5.0
}

fn default_cache_ttl_secs() -> u64 {
    300
}

impl Default for PlacesConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: None,
            default_radius_km: default_radius_km(),
            default_center: None,
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}
