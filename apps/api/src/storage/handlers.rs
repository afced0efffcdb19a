//! Axum route handlers for the résumé library and the master résumé.

use axum::{
    extract::{Multipart, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::models::resume::{MasterResumeDetails, ResumeExport, ResumeSummary, StoredResume};
use crate::state::AppState;

const UPLOAD_FIELD: &str = "file";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UrlQuery {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct ResumeListResponse {
    pub count: usize,
    pub resumes: Vec<ResumeSummary>,
}

#[derive(Debug, Deserialize)]
pub struct MasterResumeRequest {
    pub content: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Library
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/resumes?q=
pub async fn handle_list_resumes(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ResumeListResponse>, AppError> {
    let resumes: Vec<ResumeSummary> = state
        .library
        .list(query.q.as_deref())
        .await?
        .into_iter()
        .map(ResumeSummary::from)
        .collect();

    Ok(Json(ResumeListResponse {
        count: resumes.len(),
        resumes,
    }))
}

/// DELETE /api/v1/resumes
pub async fn handle_clear_resumes(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.library.clear_all().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/resumes/entry?url=
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Query(query): Query<UrlQuery>,
) -> Result<Json<StoredResume>, AppError> {
    state
        .library
        .get(&query.url)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("No resume saved for {}", query.url)))
}

/// DELETE /api/v1/resumes/entry?url=
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    Query(query): Query<UrlQuery>,
) -> Result<StatusCode, AppError> {
    if state.library.delete(&query.url).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("No resume saved for {}", query.url)))
    }
}

/// GET /api/v1/resumes/export
pub async fn handle_export_resumes(
    State(state): State<AppState>,
) -> Result<Json<ResumeExport>, AppError> {
    Ok(Json(state.library.export(Utc::now()).await?))
}

// ────────────────────────────────────────────────────────────────────────────
// Master résumé
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/master-resume
pub async fn handle_get_master(
    State(state): State<AppState>,
) -> Result<Json<MasterResumeDetails>, AppError> {
    let master = state.library.master_resume().await?;
    Ok(Json(MasterResumeDetails::from_master(master)))
}

/// PUT /api/v1/master-resume
pub async fn handle_put_master(
    State(state): State<AppState>,
    Json(request): Json<MasterResumeRequest>,
) -> Result<Json<MasterResumeDetails>, AppError> {
    store_master(&state, request.content).await
}

/// POST /api/v1/master-resume/upload
///
/// Multipart upload of a `.tex` file in the `file` field.
pub async fn handle_upload_master(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<MasterResumeDetails>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed upload: {e}")))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Malformed upload: {e}")))?;
        let content = String::from_utf8(bytes.to_vec())
            .map_err(|_| AppError::Validation("Uploaded file is not UTF-8 text".to_string()))?;
        return store_master(&state, content).await;
    }

    Err(AppError::Validation(format!(
        "Missing '{UPLOAD_FIELD}' field in upload"
    )))
}

async fn store_master(
    state: &AppState,
    content: String,
) -> Result<Json<MasterResumeDetails>, AppError> {
    if content.trim().is_empty() {
        return Err(AppError::Validation("Master resume cannot be empty".to_string()));
    }
    state
        .library
        .save_master_resume(&content, Utc::now().timestamp_millis())
        .await?;
    info!("Master resume stored");

    let master = state.library.master_resume().await?;
    Ok(Json(MasterResumeDetails::from_master(master)))
}
