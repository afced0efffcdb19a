//! Axum route handler for PDF export.

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::render::{pdf_filename, MAIN_FILE};
use crate::state::AppState;
use crate::storage::handlers::UrlQuery;

/// POST /api/v1/resumes/pdf?url=
///
/// Compiles the résumé saved for `url` and returns it as a download. One attempt;
/// a failed compile returns the engine log.
pub async fn handle_export_pdf(
    State(state): State<AppState>,
    Query(query): Query<UrlQuery>,
) -> Result<Response, AppError> {
    let stored = state
        .library
        .get(&query.url)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No resume saved for {}", query.url)))?;

    let output = state.compiler.compile(&stored.resume, MAIN_FILE).await?;
    debug!("Compilation log:\n{}", output.log);
    let pdf = output.into_pdf()?;

    let filename = pdf_filename(&query.url, Utc::now().date_naive());

    // The download does not depend on the archive copy.
    if let Some(archive) = &state.archive {
        if let Err(e) = archive.upload(&filename, pdf.clone()).await {
            warn!("PDF archive failed: {e}");
        }
    }

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        pdf,
    )
        .into_response())
}
