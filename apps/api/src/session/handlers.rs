use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::analysis::models::AnalysisResult;
use crate::errors::AppError;
use crate::session::history::{apply_user_edits, validate_results, HistoryEntry};
use crate::session::learning::LearningInsights;
use crate::session::registry::Session;
use crate::state::AppState;

#[derive(Serialize)]
pub struct SessionCreatedResponse {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// An analysis the user accepted, optionally with their own edits to the narrative.
#[derive(Deserialize)]
pub struct RecordAnalysisRequest {
    pub resume_text: String,
    pub job_description: Option<String>,
    pub analysis_results: AnalysisResult,
    pub modified_suggestions: Option<String>,
    pub custom_note: Option<String>,
}

#[derive(Serialize)]
pub struct HistoryResponse {
    pub entries: Vec<HistoryEntry>,
}

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SessionCreatedResponse>), AppError> {
    let (session_id, created_at) = state.sessions.create()?;
    info!("Session {session_id} created");
    Ok((
        StatusCode::CREATED,
        Json(SessionCreatedResponse {
            session_id,
            created_at,
        }),
    ))
}

/// DELETE /api/v1/sessions/:session_id
pub async fn handle_end_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.sessions.remove(session_id)?;
    info!("Session {session_id} ended");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/sessions/:session_id/history
pub async fn handle_record_analysis(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(req): Json<RecordAnalysisRequest>,
) -> Result<(StatusCode, Json<HistoryEntry>), AppError> {
    if req.resume_text.trim().is_empty() {
        return Err(AppError::Validation("resume_text must not be empty".into()));
    }

    validate_results(
        &req.analysis_results,
        &req.resume_text,
        req.job_description.as_deref(),
    )
    .map_err(AppError::Validation)?;

    let mut results = req.analysis_results;
    let is_modified = apply_user_edits(
        &mut results,
        req.modified_suggestions,
        req.custom_note.as_deref(),
    );

    let entry = state.sessions.write(session_id, |session| {
        session.record_analysis(req.resume_text, results, req.job_description, is_modified)
    })?;

    info!(
        "Session {session_id}: recorded history entry {} (modified={is_modified})",
        entry.id
    );
    Ok((StatusCode::CREATED, Json(entry)))
}

/// GET /api/v1/sessions/:session_id/history
pub async fn handle_get_history(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<HistoryResponse>, AppError> {
    let entries = state
        .sessions
        .read(session_id, |session| session.history().to_vec())?;
    Ok(Json(HistoryResponse { entries }))
}

/// DELETE /api/v1/sessions/:session_id/history
pub async fn handle_clear_history(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.sessions.write(session_id, Session::clear)?;
    info!("Session {session_id}: history cleared");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/sessions/:session_id/insights
pub async fn handle_get_insights(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<LearningInsights>, AppError> {
    let insights = state.sessions.read(session_id, Session::insights)?;
    Ok(Json(insights))
}
