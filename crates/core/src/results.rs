//! Results calculation over a session snapshot.
//!
//! Pure and deterministic: identical snapshots always produce identical
//! output, so clients can poll this repeatedly and diff nothing.

use serde::{Deserialize, Serialize};

use crate::session::Session;

/// Vote standing for one restaurant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestaurantResult {
    pub restaurant_id: String,
    pub name: String,
    pub yes: u32,
    pub no: u32,
    /// Expected voters who have not voted on this restaurant yet.
    pub pending: u32,
    pub total: u32,
    pub yes_ids: Vec<String>,
    pub no_ids: Vec<String>,
}

/// Full computed results for a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Results {
    pub total_participants: u32,
    pub voters_target: u32,
    pub needed: u32,
    pub results: Vec<RestaurantResult>,
    /// Every restaurant at or above the threshold, for tie reporting.
    pub winner_ids: Vec<String>,
}

/// Derives ranked results, winner set and pending counts from a
/// session snapshot.
pub fn compute_results(session: &Session) -> Results {
    let total_participants = session.participants.len() as u32;
    let voters_target = if session.threshold.participants > 0 {
        session.threshold.participants
    } else {
        total_participants
    };
    let needed = session.threshold.value.max(2);

    let mut results: Vec<RestaurantResult> = session
        .restaurants
        .iter()
        .map(|restaurant| {
            let (yes_ids, no_ids) = session
                .votes
                .get(&restaurant.id)
                .map(|bucket| {
                    (
                        bucket.yes.iter().cloned().collect::<Vec<_>>(),
                        bucket.no.iter().cloned().collect::<Vec<_>>(),
                    )
                })
                .unwrap_or_default();

            let yes = yes_ids.len() as u32;
            let no = no_ids.len() as u32;
            RestaurantResult {
                restaurant_id: restaurant.id.clone(),
                name: restaurant.name.clone(),
                yes,
                no,
                pending: voters_target.saturating_sub(yes + no),
                total: yes + no,
                yes_ids,
                no_ids,
            }
        })
        .collect();

    // Descending yes, then ascending no. The sort is stable, so fully
    // tied restaurants keep their deck order.
    results.sort_by(|a, b| b.yes.cmp(&a.yes).then(a.no.cmp(&b.no)));

    let winner_ids = results
        .iter()
        .filter(|r| r.yes >= needed)
        .map(|r| r.restaurant_id.clone())
        .collect();

    Results {
        total_participants,
        voters_target,
        needed,
        results,
        winner_ids,
    }
}
