//! Restaurant candidate summaries and search criteria.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{Error, Result};

/// A candidate restaurant, frozen into a session's deck at creation.
///
/// This is the summary shape the Restaurant Source returns; the session
/// never goes back to the source after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
    /// Price level 1..=4.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<u8>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cuisines: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub photos: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_now: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Search area for building a session's candidate deck.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Area {
    #[validate(range(min = 0.1, max = 100.0))]
    pub radius_km: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub center: Option<GeoPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// Filter criteria used to build/filter the candidate deck.
///
/// Sets are `BTreeSet` so snapshots serialize with a stable order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Filters {
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub cuisines: BTreeSet<String>,
    /// Price levels, each 1..=4.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub price: BTreeSet<u8>,
    #[serde(default)]
    pub open_now: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_rating: Option<f32>,
}

impl Filters {
    /// Validates filter bounds on session creation.
    pub fn validate(&self) -> Result<()> {
        if let Some(level) = self.price.iter().find(|p| !(1..=4).contains(*p)) {
            return Err(Error::bad_request(format!(
                "price level {level} out of range 1..=4"
            )));
        }
        if let Some(rating) = self.min_rating {
            if !(0.0..=5.0).contains(&rating) {
                return Err(Error::bad_request(format!(
                    "min_rating {rating} out of range 0..=5"
                )));
            }
        }
        Ok(())
    }

    /// Whether a restaurant passes these filters.
    pub fn matches(&self, restaurant: &Restaurant) -> bool {
        if !self.cuisines.is_empty()
            && !restaurant.cuisines.iter().any(|c| self.cuisines.contains(c))
        {
            return false;
        }
        if !self.price.is_empty() {
            match restaurant.price {
                Some(p) if self.price.contains(&p) => {}
                _ => return false,
            }
        }
        if self.open_now && restaurant.open_now != Some(true) {
            return false;
        }
        if let Some(min) = self.min_rating {
            match restaurant.rating {
                Some(r) if r >= min => {}
                _ => return false,
            }
        }
        true
    }
}

/// Parameters for one Restaurant Source query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    pub radius_km: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub center: Option<GeoPoint>,
    pub filters: Filters,
}

/// One page of Restaurant Source results.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchPage {
    pub items: Vec<Restaurant>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}
