use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use crate::analysis::models::AnalysisResult;
use crate::analysis::orchestrator::analyze_resume;
use crate::errors::AppError;
use crate::extraction::{extract_text, DocumentFormat, ExtractionError};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct AnalyzeRequest {
    pub resume_text: String,
    pub job_description: Option<String>,
}

#[derive(Serialize)]
pub struct AnalyzeResponse {
    pub analysis: AnalysisResult,
}

#[derive(Serialize)]
pub struct UploadAnalyzeResponse {
    /// Extracted text, so the client can record it to history unchanged.
    pub resume_text: String,
    pub analysis: AnalysisResult,
}

/// POST /api/v1/sessions/:session_id/analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    if req.resume_text.trim().is_empty() {
        return Err(AppError::Validation("resume_text must not be empty".into()));
    }

    let analysis = run_analysis(
        &state,
        session_id,
        &req.resume_text,
        req.job_description.as_deref(),
    )
    .await?;
    Ok(Json(AnalyzeResponse { analysis }))
}

/// POST /api/v1/sessions/:session_id/analyze/upload
///
/// Multipart fields: `file` (PDF, DOCX or plain text) and optional `job_description`.
pub async fn handle_analyze_upload(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<UploadAnalyzeResponse>, AppError> {
    // fail fast on an unknown session before reading the upload
    state.sessions.read(session_id, |_| ())?;

    let mut upload: Option<(Bytes, DocumentFormat)> = None;
    let mut job_description: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let format = DocumentFormat::from_hint(field.file_name(), field.content_type())?;
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Could not read file: {e}")))?;
                upload = Some((data, format));
            }
            Some("job_description") => {
                let text = field.text().await.map_err(|e| {
                    AppError::Validation(format!("Could not read job_description: {e}"))
                })?;
                job_description = Some(text);
            }
            _ => {}
        }
    }

    let (data, format) =
        upload.ok_or_else(|| AppError::Validation("Missing multipart field 'file'".into()))?;
    info!(
        "Session {session_id}: extracting {format:?} upload ({} bytes)",
        data.len()
    );

    let resume_text = tokio::task::spawn_blocking(move || extract_text(&data, format))
        .await
        .map_err(|e| {
            error!("Extraction task failed: {e}");
            parser_crashed(format)
        })??;

    match run_analysis(&state, session_id, &resume_text, job_description.as_deref()).await {
        Ok(analysis) => Ok(Json(UploadAnalyzeResponse {
            resume_text,
            analysis,
        })),
        Err(AppError::FeedbackGeneration { error, .. }) => Err(AppError::FeedbackGeneration {
            error,
            extracted_text: Some(resume_text),
        }),
        Err(other) => Err(other),
    }
}

/// Reads the session's personalized hints, then analyzes without holding the lock.
async fn run_analysis(
    state: &AppState,
    session_id: Uuid,
    resume_text: &str,
    job_description: Option<&str>,
) -> Result<AnalysisResult, AppError> {
    let hints = state
        .sessions
        .read(session_id, |session| session.personalized_hints(resume_text))?;

    let analysis = analyze_resume(
        state.generator.as_ref(),
        state.config.llm_timeout,
        resume_text,
        job_description,
        &hints,
    )
    .await?;

    info!(
        "Session {session_id}: analysis complete (readability={:.1}, formatting={:.1}, content={:.1})",
        analysis.scores.readability, analysis.scores.formatting, analysis.scores.content
    );
    Ok(analysis)
}

fn parser_crashed(format: DocumentFormat) -> ExtractionError {
    let reason = "parser failed on malformed input".to_string();
    match format {
        DocumentFormat::Pdf => ExtractionError::Pdf(reason),
        DocumentFormat::Docx => ExtractionError::Docx(reason),
        DocumentFormat::PlainText => ExtractionError::InvalidEncoding,
    }
}
