//! The session aggregate: participants, vote buckets, match detection.
//!
//! A session freezes its candidate deck at creation and then only
//! mutates through [`Session::join`], [`Session::vote`] and
//! [`Session::mark_done`]. Vote buckets are true sets in memory and
//! serialize as sorted arrays, so a stored snapshot rehydrates with the
//! same no-duplicate guarantees it was saved with.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::restaurant::{Area, Filters, Restaurant};

/// Session lifecycle status. Only moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Created, nobody has joined yet.
    Open,
    /// At least one participant joined.
    Voting,
    /// Some restaurant reached the yes threshold.
    Matched,
    /// Every participant exhausted their deck. Terminal for voting.
    Finished,
}

/// Match threshold: `value` yes-votes on one restaurant declares it the
/// match; `participants` is the expected voter count used for pending
/// math.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Threshold {
    #[serde(rename = "type", default)]
    pub kind: ThresholdKind,
    pub value: u32,
    pub participants: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdKind {
    #[default]
    Absolute,
}

impl Threshold {
    /// Builds a threshold with the effective value rules applied: a
    /// two-person session always requires both to agree, larger groups
    /// clamp the requested value into `[2, participants]`.
    pub fn absolute(requested: u32, participants: u32) -> Self {
        let value = if participants <= 2 {
            2
        } else {
            requested.clamp(2, participants)
        };
        Self {
            kind: ThresholdKind::Absolute,
            value,
            participants: participants.max(2),
        }
    }
}

/// A person voting in a session. Append-only except for `done`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub joined_at: DateTime<Utc>,
    #[serde(default)]
    pub done: bool,
}

/// Yes/no vote sets for one restaurant. A participant appears in at
/// most one of the two sets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VoteBucket {
    #[serde(default)]
    pub yes: BTreeSet<String>,
    #[serde(default)]
    pub no: BTreeSet<String>,
}

/// The swipe direction of a single vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteChoice {
    Yes,
    No,
}

/// What a single vote did to the session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoteOutcome {
    pub matched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<String>,
    pub yes_count: u32,
    pub needed: u32,
    /// True only for the vote that flipped the session to matched.
    /// Used to decide whether a match event should be broadcast.
    #[serde(skip)]
    pub newly_matched: bool,
}

/// The central aggregate: one shared restaurant-picking session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub area: Area,
    #[serde(default)]
    pub filters: Filters,
    pub threshold: Threshold,
    pub status: SessionStatus,
    /// Candidate deck, frozen at creation. Identity by `Restaurant::id`.
    pub restaurants: Vec<Restaurant>,
    #[serde(default)]
    pub participants: BTreeMap<String, Participant>,
    #[serde(default)]
    pub votes: BTreeMap<String, VoteBucket>,
    /// Every restaurant that reached the threshold, in arrival order.
    #[serde(default)]
    pub matched_ids: Vec<String>,
    /// The first restaurant that reached the threshold. Never
    /// overwritten by later qualifiers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Creates a new session with a frozen candidate deck.
    pub fn new(
        name: Option<String>,
        area: Area,
        filters: Filters,
        threshold: Threshold,
        restaurants: Vec<Restaurant>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            area,
            filters,
            threshold,
            status: SessionStatus::Open,
            restaurants,
            participants: BTreeMap::new(),
            votes: BTreeMap::new(),
            matched_ids: Vec::new(),
            winner: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Adds a new participant. Each call creates a fresh identity; the
    /// first join moves the session from open to voting.
    pub fn join(&mut self, name: Option<String>) -> Participant {
        let participant = Participant {
            id: Uuid::new_v4().to_string(),
            name,
            joined_at: Utc::now(),
            done: false,
        };
        self.participants
            .insert(participant.id.clone(), participant.clone());
        if self.status == SessionStatus::Open {
            self.status = SessionStatus::Voting;
        }
        self.touch_updated();
        participant
    }

    /// Looks up an existing participant for an idempotent re-join.
    pub fn participant(&self, participant_id: &str) -> Option<&Participant> {
        self.participants.get(participant_id)
    }

    /// Records one vote with overwrite semantics and re-evaluates the
    /// match status for the voted restaurant.
    pub fn vote(
        &mut self,
        participant_id: &str,
        restaurant_id: &str,
        choice: VoteChoice,
    ) -> Result<VoteOutcome> {
        if !self.participants.contains_key(participant_id) {
            return Err(Error::unknown_participant(participant_id));
        }
        if !self.restaurants.iter().any(|r| r.id == restaurant_id) {
            return Err(Error::bad_request(format!(
                "unknown restaurant id: {restaurant_id}"
            )));
        }
        if self.status == SessionStatus::Finished {
            return Err(Error::bad_request("session is finished"));
        }

        let bucket = self.votes.entry(restaurant_id.to_string()).or_default();

        // Overwrite semantics: a participant holds one vote per
        // restaurant, so clear both sets before recording the choice.
        bucket.yes.remove(participant_id);
        bucket.no.remove(participant_id);
        match choice {
            VoteChoice::Yes => bucket.yes.insert(participant_id.to_string()),
            VoteChoice::No => bucket.no.insert(participant_id.to_string()),
        };

        let yes_count = bucket.yes.len() as u32;
        let needed = self.threshold.value;
        let mut newly_matched = false;

        if yes_count >= needed {
            if !self.matched_ids.iter().any(|id| id == restaurant_id) {
                self.matched_ids.push(restaurant_id.to_string());
            }
            // First restaurant across the line is the winner; later
            // qualifiers only accumulate in matched_ids.
            if self.status != SessionStatus::Matched {
                self.status = SessionStatus::Matched;
                self.winner = Some(restaurant_id.to_string());
                newly_matched = true;
            }
        }

        self.touch_updated();

        Ok(VoteOutcome {
            matched: self.status == SessionStatus::Matched,
            winner: self.winner.clone(),
            yes_count,
            needed,
            newly_matched,
        })
    }

    /// Marks a participant's deck as exhausted. Returns true if this
    /// was the last participant and the session is now finished.
    pub fn mark_done(&mut self, participant_id: &str) -> Result<bool> {
        let participant = self
            .participants
            .get_mut(participant_id)
            .ok_or_else(|| Error::unknown_participant(participant_id))?;
        participant.done = true;

        let all_done = !self.participants.is_empty()
            && self.participants.values().all(|p| p.done);
        let newly_finished = all_done && self.status != SessionStatus::Finished;
        if all_done {
            self.status = SessionStatus::Finished;
        }
        self.touch_updated();
        Ok(newly_finished)
    }

    /// Yes-count for one restaurant.
    pub fn yes_count(&self, restaurant_id: &str) -> u32 {
        self.votes
            .get(restaurant_id)
            .map(|b| b.yes.len() as u32)
            .unwrap_or(0)
    }

    fn touch_updated(&mut self) {
        self.updated_at = Utc::now();
    }
}
