//! Wizard session HTTP handlers.
//!
//! Endpoints:
//! - POST   /api/v1/sessions               - Start a session at step 1
//! - GET    /api/v1/sessions/{id}          - Current session state
//! - DELETE /api/v1/sessions/{id}          - Drop a session
//! - POST   /api/v1/sessions/{id}/task     - Select the task (step 1 -> 2)
//! - PUT    /api/v1/sessions/{id}/draft    - Save question and response
//! - POST   /api/v1/sessions/{id}/evaluate - Run the evaluation (step 2 -> 3)
//! - POST   /api/v1/sessions/{id}/back     - Step back, keeping text
//! - POST   /api/v1/sessions/{id}/restart  - Clear and return to step 1
//! - GET    /api/v1/sessions/{id}/report   - Feedback as an HTML download

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bandscore_core::document::{REPORT_TITLE, feedback_report};
use bandscore_core::wizard::{WizardExt, new_session};
use bandscore_types::error::WizardError;
use bandscore_types::session::{EvaluationSession, SessionId, WizardStep};
use bandscore_types::task::TaskVariant;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Session state plus the word-count status of the current draft.
#[derive(Debug, Serialize)]
pub struct SessionView {
    #[serde(flatten)]
    pub session: EvaluationSession,
    /// Minimum words for the selected task, once one is selected.
    pub minimum_words: Option<usize>,
    pub meets_minimum: Option<bool>,
}

impl From<&EvaluationSession> for SessionView {
    fn from(session: &EvaluationSession) -> Self {
        let minimum = session.variant.map(|v| v.minimum_words());
        Self {
            session: session.clone(),
            minimum_words: minimum,
            meets_minimum: minimum.map(|m| session.word_count >= m),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SelectTaskRequest {
    pub task: String,
}

#[derive(Debug, Deserialize)]
pub struct DraftRequest {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub response: String,
}

/// Parse a session ID from a path parameter. Malformed IDs cannot name a
/// live session, so they are reported as not found.
fn parse_session_id(s: &str) -> Result<SessionId, AppError> {
    s.parse::<SessionId>()
        .map_err(|_| AppError::SessionNotFound(s.to_string()))
}

fn session_link(id: SessionId) -> String {
    format!("/api/v1/sessions/{id}")
}

fn respond(
    view: SessionView,
    request_id: String,
    start: Instant,
) -> Json<ApiResponse<SessionView>> {
    let link = session_link(view.session.id);
    let elapsed = start.elapsed().as_millis() as u64;
    Json(ApiResponse::success(view, request_id, elapsed).with_link("self", &link))
}

/// Run `f` against the stored session while holding its map entry.
///
/// A session idle past the configured limit is dropped and reported as not
/// found, even if the sweeper has not reached it yet.
fn with_session<T>(
    state: &AppState,
    id: &str,
    f: impl FnOnce(&mut EvaluationSession) -> Result<T, AppError>,
) -> Result<T, AppError> {
    let sid = parse_session_id(id)?;
    let now = Utc::now();
    if state
        .sessions
        .remove_if(&sid, |_, session| state.is_expired(session, now))
        .is_some()
    {
        tracing::debug!(session = %sid, "Session expired");
        return Err(AppError::SessionNotFound(id.to_string()));
    }

    let mut entry = state
        .sessions
        .get_mut(&sid)
        .ok_or_else(|| AppError::SessionNotFound(id.to_string()))?;
    f(entry.value_mut())
}

/// POST /api/v1/sessions - Start a new wizard session.
pub async fn create_session(
    State(state): State<AppState>,
) -> Json<ApiResponse<SessionView>> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let session = new_session();
    let view = SessionView::from(&session);
    tracing::debug!(session = %session.id, "Session created");
    state.insert_session(session);

    respond(view, request_id, start)
}

/// GET /api/v1/sessions/{id}
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<SessionView>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let view = with_session(&state, &id, |session| Ok(SessionView::from(&*session)))?;
    Ok(respond(view, request_id, start))
}

/// DELETE /api/v1/sessions/{id}
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let sid = parse_session_id(&id)?;
    state
        .sessions
        .remove(&sid)
        .ok_or_else(|| AppError::SessionNotFound(id.clone()))?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(
        serde_json::json!({"deleted": true, "id": sid}),
        request_id,
        elapsed,
    )))
}

/// POST /api/v1/sessions/{id}/task - Select the task variant.
pub async fn select_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<SelectTaskRequest>,
) -> Result<Json<ApiResponse<SessionView>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let variant: TaskVariant = body.task.parse().map_err(AppError::Validation)?;
    let view = with_session(&state, &id, |session| {
        session.select_task(variant)?;
        Ok(SessionView::from(&*session))
    })?;

    Ok(respond(view, request_id, start))
}

/// PUT /api/v1/sessions/{id}/draft - Save the question and response text.
pub async fn update_draft(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<DraftRequest>,
) -> Result<Json<ApiResponse<SessionView>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let view = with_session(&state, &id, |session| {
        session.update_draft(body.question, body.response)?;
        Ok(SessionView::from(&*session))
    })?;

    Ok(respond(view, request_id, start))
}

/// POST /api/v1/sessions/{id}/evaluate - Evaluate the draft.
///
/// The session entry is not held while the model call is in flight. If the
/// session left the compose step or its draft changed in the meantime, the
/// result is discarded.
pub async fn evaluate(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<SessionView>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let policy = state.config.word_count_policy;
    let input = with_session(&state, &id, |session| {
        session.begin_evaluation(policy).map_err(AppError::from)
    })?;

    let evaluation = state
        .evaluation_service
        .evaluate(input.variant, &input.question, &input.response)
        .await?;

    let view = with_session(&state, &id, |session| {
        let unchanged = session.variant == Some(input.variant)
            && session.question == input.question
            && session.response == input.response;
        if !unchanged {
            return Err(AppError::Conflict(
                "session changed while the evaluation was running".to_string(),
            ));
        }
        session.complete_evaluation(evaluation.feedback)?;
        Ok(SessionView::from(&*session))
    })?;

    Ok(respond(view, request_id, start))
}

/// POST /api/v1/sessions/{id}/back
pub async fn back(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<SessionView>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let view = with_session(&state, &id, |session| {
        session.back()?;
        Ok(SessionView::from(&*session))
    })?;

    Ok(respond(view, request_id, start))
}

/// POST /api/v1/sessions/{id}/restart
pub async fn restart(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<SessionView>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let view = with_session(&state, &id, |session| {
        session.restart();
        Ok(SessionView::from(&*session))
    })?;

    Ok(respond(view, request_id, start))
}

/// GET /api/v1/sessions/{id}/report - Download the feedback as HTML.
pub async fn report(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let html = with_session(&state, &id, |session| {
        match (session.step, &session.feedback, session.variant) {
            (WizardStep::Results, Some(feedback), Some(variant)) => {
                Ok(feedback_report(variant, session.word_count, feedback).to_html(REPORT_TITLE))
            }
            _ => Err(WizardError::InvalidTransition {
                from: session.step,
                action: "download a report",
            }
            .into()),
        }
    })?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"ielts-feedback.html\"",
            ),
        ],
        html,
    ))
}
