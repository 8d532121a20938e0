//! Session endpoints: create, join, vote, done, snapshot, results.
//!
//! Every mutation goes through `SessionStore::update`, which holds the
//! per-session write lock for the whole read-modify-write. Notifier
//! publishes happen only after the store write succeeded and their
//! failures never reach the HTTP caller.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use telemetry::metrics;
use tracing::{debug, info};
use validator::Validate;
use vote_core::{
    compute_results, Area, Error, Filters, GeoPoint, Participant, SearchParams, Session,
    Threshold, VoteChoice,
};

use crate::notify::SessionEvent;
use crate::response::{
    ApiError, CreateSessionResponse, DoneResponse, JoinResponse, ResultsResponse, VoteResponse,
};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub name: Option<String>,
    pub area: Option<AreaRequest>,
    #[serde(default)]
    pub filters: Filters,
    pub threshold: ThresholdRequest,
}

#[derive(Debug, Default, Deserialize)]
pub struct AreaRequest {
    pub radius_km: Option<f64>,
    pub center: Option<GeoPoint>,
}

#[derive(Debug, Deserialize)]
pub struct ThresholdRequest {
    #[serde(default = "default_threshold_value")]
    pub value: u32,
    pub participants: u32,
}

fn default_threshold_value() -> u32 {
    2
}

#[derive(Debug, Deserialize)]
pub struct JoinRequest {
    pub name: Option<String>,
    pub participant_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub participant_id: String,
    pub restaurant_id: String,
    pub choice: String,
}

#[derive(Debug, Deserialize)]
pub struct DoneRequest {
    pub participant_id: String,
}

/// POST /sessions - Create a session with a frozen candidate deck.
pub async fn create_session(
    State(state): State<AppState>,
    Json(req): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<CreateSessionResponse>), ApiError> {
    if req.threshold.participants < 2 {
        return Err(ApiError::bad_request(
            "threshold.participants must be at least 2",
        ));
    }
    req.filters.validate().map_err(ApiError::from)?;

    let area_req = req.area.unwrap_or_default();
    let area = Area {
        radius_km: area_req
            .radius_km
            .unwrap_or(state.search_defaults.radius_km),
        center: area_req.center.or(state.search_defaults.center),
    };
    area.validate()
        .map_err(|e| ApiError::bad_request(format!("invalid search area: {e}")))?;

    let params = SearchParams {
        radius_km: area.radius_km,
        center: area.center,
        filters: req.filters.clone(),
    };
    let page = state.places.search(&params).await.map_err(ApiError::from)?;
    if page.items.is_empty() {
        return Err(ApiError::bad_request(
            "no restaurants matched the given criteria",
        ));
    }

    let session = Session::new(
        req.name,
        area,
        req.filters,
        Threshold::absolute(req.threshold.value, req.threshold.participants),
        page.items,
    );

    state.store.save(&session).await.map_err(ApiError::from)?;
    metrics().sessions_created.inc();

    info!(
        session_id = %session.id,
        restaurants = session.restaurants.len(),
        needed = session.threshold.value,
        participants = session.threshold.participants,
        "Created session"
    );

    Ok((StatusCode::CREATED, Json(CreateSessionResponse { session })))
}

/// GET /sessions/:id - Fetch a session snapshot, refreshing its TTL.
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Session>, ApiError> {
    let session = state
        .store
        .get(&id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found(format!("session {id} not found")))?;

    // Best-effort expiry refresh; a failure never fails the read.
    if let Err(e) = state.store.touch(&id).await {
        debug!(session_id = %id, error = %e, "TTL refresh failed");
    }

    Ok(Json(session))
}

/// POST /sessions/:id/join - Join by name, or resume by participant id.
pub async fn join_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<JoinRequest>,
) -> Result<Json<JoinResponse>, ApiError> {
    let (session, (participant, is_new)) = state
        .store
        .update(&id, |session| match &req.participant_id {
            // Resume: known id is a no-op returning the existing identity.
            Some(pid) => session
                .participant(pid)
                .cloned()
                .map(|p| (p, false))
                .ok_or_else(|| Error::unknown_participant(pid.clone())),
            None => Ok((session.join(req.name.clone()), true)),
        })
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found(format!("session {id} not found")))?;

    if is_new {
        metrics().participants_joined.inc();
        info!(session_id = %id, participant_id = %participant.id, "Participant joined");

        let roster: Vec<Participant> = session.participants.values().cloned().collect();
        state.notifier.publish(
            &id,
            SessionEvent::ParticipantJoined {
                participant: participant.clone(),
                participants: roster,
            },
        );
    }

    Ok(Json(JoinResponse {
        participant,
        session,
    }))
}

/// POST /sessions/:id/vote - Cast or overwrite one vote.
pub async fn cast_vote(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<VoteRequest>,
) -> Result<Json<VoteResponse>, ApiError> {
    let choice = match req.choice.to_lowercase().as_str() {
        "yes" => VoteChoice::Yes,
        "no" => VoteChoice::No,
        other => {
            return Err(ApiError::bad_request(format!(
                "choice must be 'yes' or 'no', got '{other}'"
            )))
        }
    };

    let (session, outcome) = state
        .store
        .update(&id, |session| {
            session.vote(&req.participant_id, &req.restaurant_id, choice)
        })
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found(format!("session {id} not found")))?;

    metrics().votes_cast.inc();

    let bucket = session.votes.get(&req.restaurant_id);
    state.notifier.publish(
        &id,
        SessionEvent::Vote {
            restaurant_id: req.restaurant_id.clone(),
            yes: outcome.yes_count,
            no: bucket.map(|b| b.no.len() as u32).unwrap_or(0),
            matched: outcome.matched,
        },
    );

    if outcome.newly_matched {
        metrics().matches_detected.inc();
        let winner_id = outcome.winner.clone().unwrap_or_default();
        info!(session_id = %id, winner_id = %winner_id, "Session matched");

        let winner = session
            .restaurants
            .iter()
            .find(|r| r.id == winner_id)
            .cloned();
        state.notifier.publish(
            &id,
            SessionEvent::Matched {
                winner_id,
                winner,
                yes_count: outcome.yes_count,
            },
        );
    }

    Ok(Json(VoteResponse::from(outcome)))
}

/// POST /sessions/:id/done - Mark a participant's deck exhausted.
pub async fn mark_done(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<DoneRequest>,
) -> Result<Json<DoneResponse>, ApiError> {
    let (session, finished) = state
        .store
        .update(&id, |session| session.mark_done(&req.participant_id))
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found(format!("session {id} not found")))?;

    state.notifier.publish(
        &id,
        SessionEvent::ParticipantDone {
            participant_id: req.participant_id.clone(),
        },
    );

    if finished {
        metrics().sessions_finished.inc();
        info!(session_id = %id, "Session finished");
        state
            .notifier
            .publish(&id, SessionEvent::Finished { session_id: id.clone() });
    }

    Ok(Json(DoneResponse {
        session_finished: finished,
        session,
    }))
}

/// GET /sessions/:id/results - Computed results over the snapshot.
pub async fn get_results(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ResultsResponse>, ApiError> {
    let session = state
        .store
        .get(&id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found(format!("session {id} not found")))?;

    Ok(Json(ResultsResponse {
        results: compute_results(&session),
    }))
}

/// DELETE /sessions/:id - Explicit deletion. Idempotent.
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.store.delete(&id).await.map_err(ApiError::from)?;
    state.notifier.remove(&id);
    metrics().sessions_deleted.inc();
    info!(session_id = %id, "Deleted session");
    Ok(StatusCode::NO_CONTENT)
}
