//! Application state shared across handlers.

use std::sync::Arc;

use places::RestaurantSource;
use session_store::SessionStore;
use vote_core::GeoPoint;

use crate::notify::Notifier;

/// Search defaults applied when the create request omits them.
#[derive(Debug, Clone)]
pub struct SearchDefaults {
    pub radius_km: f64,
    pub center: Option<GeoPoint>,
}

impl Default for SearchDefaults {
    fn default() -> Self {
        Self {
            radius_km: 5.0,
            center: None,
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Session persistence (Redis + fallback map behind one policy).
    pub store: Arc<SessionStore>,
    /// Restaurant source (HTTP client in production, mock in tests).
    pub places: Arc<dyn RestaurantSource>,
    /// Real-time fan-out hub.
    pub notifier: Notifier,
    /// Defaults for candidate search.
    pub search_defaults: SearchDefaults,
}

impl AppState {
    pub fn new(
        store: Arc<SessionStore>,
        places: Arc<dyn RestaurantSource>,
        search_defaults: SearchDefaults,
    ) -> Self {
        Self {
            store,
            places,
            notifier: Notifier::new(),
            search_defaults,
        }
    }
}
