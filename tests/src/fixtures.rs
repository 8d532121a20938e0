//! Test fixtures: decks and request payloads.

use serde_json::{json, Value};
use vote_core::{Area, Filters, Restaurant, Session, Threshold};

/// A fixed three-restaurant deck (R1, R2, R3).
pub fn deck() -> Vec<Restaurant> {
    ["R1", "R2", "R3"]
        .iter()
        .enumerate()
        .map(|(i, id)| Restaurant {
            id: id.to_string(),
            name: format!("Restaurant {}", i + 1),
            rating: Some(4.0 + i as f32 / 10.0),
            price: Some(2),
            cuisines: vec!["thai".into()],
            photos: vec![],
            open_now: Some(true),
            address: Some(format!("{} Main St", 100 + i)),
        })
        .collect()
}

/// A minimal session aggregate for store-level tests.
pub fn bare_session() -> Session {
    Session::new(
        Some("team lunch".into()),
        Area {
            radius_km: 2.0,
            center: None,
        },
        Filters::default(),
        Threshold::absolute(2, 3),
        deck(),
    )
}

/// Create-session payload with the given threshold.
pub fn create_payload(value: u32, participants: u32) -> Value {
    json!({
        "name": "team lunch",
        "area": { "radius_km": 2.0 },
        "filters": { "cuisines": ["thai"] },
        "threshold": { "value": value, "participants": participants }
    })
}

/// Join payload for a new named participant.
pub fn join_payload(name: &str) -> Value {
    json!({ "name": name })
}

/// Join payload resuming an existing participant id.
pub fn resume_payload(participant_id: &str) -> Value {
    json!({ "participant_id": participant_id })
}

/// Vote payload.
pub fn vote_payload(participant_id: &str, restaurant_id: &str, choice: &str) -> Value {
    json!({
        "participant_id": participant_id,
        "restaurant_id": restaurant_id,
        "choice": choice
    })
}

/// Mark-done payload.
pub fn done_payload(participant_id: &str) -> Value {
    json!({ "participant_id": participant_id })
}
