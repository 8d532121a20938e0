//! HTTP restaurant source client with response caching and mock mode.

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use tracing::{debug, warn};
use vote_core::{Error, Restaurant, Result, SearchPage, SearchParams};

use crate::config::PlacesConfig;

/// Cache capacity for search responses.
const SEARCH_CACHE_MAX_CAPACITY: u64 = 1_000;

/// Size of the deterministic mock deck before filtering.
const MOCK_DECK_SIZE: usize = 20;

/// The restaurant search capability consumed at session creation.
#[async_trait]
pub trait RestaurantSource: Send + Sync {
    /// Runs one search and returns candidate summaries.
    async fn search(&self, params: &SearchParams) -> Result<SearchPage>;
}

/// Restaurant source client.
///
/// Calls the upstream search service and caches responses so repeated
/// session creations with the same criteria do not hammer it. With no
/// upstream configured it serves a deterministic mock deck instead,
/// which keeps local development and tests reproducible.
#[derive(Clone)]
pub struct HttpPlacesClient {
    config: PlacesConfig,
    http_client: reqwest::Client,
    cache: Cache<String, SearchPage>,
    mock_mode: bool,
}

impl HttpPlacesClient {
    pub fn new(config: PlacesConfig) -> Result<Self> {
        let mock_mode = config.base_url.is_empty() || config.base_url == "mock";

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| Error::internal(format!("Failed to create HTTP client: {e}")))?;

        let cache = Cache::builder()
            .max_capacity(SEARCH_CACHE_MAX_CAPACITY)
            .time_to_live(Duration::from_secs(config.cache_ttl_secs))
            .build();

        Ok(Self {
            config,
            http_client,
            cache,
            mock_mode,
        })
    }

    async fn remote_search(&self, params: &SearchParams) -> Result<SearchPage> {
        let url = format!("{}/search", self.config.base_url);

        debug!(url = %url, radius_km = params.radius_km, "Calling restaurant source");

        let mut request = self.http_client.post(&url).json(params);
        if let Some(ref key) = self.config.api_key {
            request = request.header("Authorization", format!("Bearer {key}"));
        }

        let response = request.send().await.map_err(|e| {
            warn!(error = %e, "Restaurant source request failed");
            Error::restaurant_source(format!("search service unavailable: {e}"))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "Restaurant source returned error");
            return Err(Error::restaurant_source(format!(
                "search service returned {status}: {body}"
            )));
        }

        let page: SearchPage = response.json().await.map_err(|e| {
            warn!(error = %e, "Failed to parse search response");
            Error::restaurant_source(format!("invalid search response: {e}"))
        })?;

        Ok(page)
    }

    /// Builds a deterministic deck from the search params: the same
    /// criteria always produce the same restaurants.
    fn mock_search(&self, params: &SearchParams) -> SearchPage {
        debug!("Using mock restaurant source");

        let seed = mock_seed(params);
        let cuisines: Vec<&str> = if params.filters.cuisines.is_empty() {
            vec!["italian", "thai", "mexican", "japanese", "indian"]
        } else {
            params.filters.cuisines.iter().map(String::as_str).collect()
        };

        let items = (0..MOCK_DECK_SIZE)
            .map(|i| {
                let n = seed.wrapping_add(i as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
                let cuisine = cuisines[(n % cuisines.len() as u64) as usize];
                Restaurant {
                    id: format!("mock-{:08x}", n as u32),
                    name: format!("{} Place #{}", capitalize(cuisine), i + 1),
                    rating: Some(3.0 + (n % 21) as f32 / 10.0),
                    price: Some((n % 4) as u8 + 1),
                    cuisines: vec![cuisine.to_string()],
                    photos: vec![],
                    open_now: Some(n % 5 != 0),
                    address: None,
                }
            })
            .filter(|r| params.filters.matches(r))
            .collect();

        SearchPage {
            items,
            next_page_token: None,
        }
    }
}

#[async_trait]
impl RestaurantSource for HttpPlacesClient {
    async fn search(&self, params: &SearchParams) -> Result<SearchPage> {
        let cache_key = serde_json::to_string(params)?;

        if let Some(cached) = self.cache.get(&cache_key).await {
            debug!("Search cache hit");
            return Ok(cached);
        }

        let page = if self.mock_mode {
            self.mock_search(params)
        } else {
            self.remote_search(params).await?
        };

        self.cache.insert(cache_key, page.clone()).await;

        Ok(page)
    }
}

/// Deterministic seed derived from the search params.
fn mock_seed(params: &SearchParams) -> u64 {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    (params.radius_km.to_bits()).hash(&mut hasher);
    for cuisine in &params.filters.cuisines {
        cuisine.hash(&mut hasher);
    }
    for price in &params.filters.price {
        price.hash(&mut hasher);
    }
    hasher.finish()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
