//! Axum route handlers for the Tailoring API.

use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::truncate_text;
use crate::state::AppState;
use crate::tailoring::assembler::ExcludedSegment;
use crate::tailoring::job_url::is_valid_job_url;
use crate::tailoring::pipeline::tailor;
use crate::tailoring::segment::SegmentKind;
use crate::tailoring::segmenter::segment;

const SEGMENT_PREVIEW_CHARS: usize = 80;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TailorRequest {
    pub url: String,
    pub html: String,
    pub page_limit: Option<u32>,
    /// Re-tailor even if this URL was tailored within the update interval.
    #[serde(default)]
    pub force: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TailorStatus {
    Created,
    Skipped,
}

/// Details of a run that actually happened. Absent when the request was skipped.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub segment_count: usize,
    pub selected_count: usize,
    pub excluded: Vec<ExcludedSegment>,
    pub used_chars: usize,
    pub budget_chars: usize,
}

#[derive(Debug, Serialize)]
pub struct TailorResponse {
    pub status: TailorStatus,
    pub url: String,
    pub resume_text: String,
    pub job_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run: Option<RunSummary>,
}

#[derive(Debug, Deserialize)]
pub struct SegmentRequest {
    pub source: String,
}

#[derive(Debug, Serialize)]
pub struct SegmentView {
    pub index: usize,
    pub kind: SegmentKind,
    pub mandatory: bool,
    pub length: usize,
    pub preview: String,
}

#[derive(Debug, Default, Serialize)]
pub struct SegmentCounts {
    pub experience: usize,
    pub project: usize,
    pub other: usize,
}

#[derive(Debug, Serialize)]
pub struct SegmentsResponse {
    pub segments: Vec<SegmentView>,
    pub counts: SegmentCounts,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/tailor
///
/// Tailors the stored master résumé to the posting in `html` and saves the result
/// under `url`. Nothing is saved when scoring fails.
pub async fn handle_tailor(
    State(state): State<AppState>,
    Json(request): Json<TailorRequest>,
) -> Result<Json<TailorResponse>, AppError> {
    if request.html.trim().is_empty() {
        return Err(AppError::Validation("html cannot be empty".to_string()));
    }
    if state.tailoring.enforce_job_urls && !is_valid_job_url(&request.url) {
        return Err(AppError::Validation(format!(
            "{} is not a supported job posting URL",
            request.url
        )));
    }

    let now_ms = Utc::now().timestamp_millis();
    if !request.force
        && !state
            .library
            .should_update(&request.url, now_ms, state.tailoring.update_interval)
            .await?
    {
        if let Some(existing) = state.library.get(&request.url).await? {
            info!("{} was tailored recently; returning saved copy", request.url);
            return Ok(Json(TailorResponse {
                status: TailorStatus::Skipped,
                url: existing.url,
                resume_text: existing.resume,
                job_title: existing.job_title,
                run: None,
            }));
        }
    }

    let master = state.library.master_resume().await?.ok_or_else(|| {
        AppError::Validation("No master resume uploaded. Upload one before tailoring.".to_string())
    })?;

    let page_limit = request
        .page_limit
        .unwrap_or(state.tailoring.default_page_limit);

    let outcome = tailor(
        &request.html,
        &master.content,
        page_limit,
        Arc::clone(&state.oracle),
        &state.tailoring,
    )
    .await?;

    state
        .library
        .save_tailored(
            &request.url,
            &outcome.assembly.resume_text,
            outcome.job_title.as_deref(),
            Utc::now().timestamp_millis(),
        )
        .await?;
    info!("Saved tailored resume for {}", request.url);

    Ok(Json(TailorResponse {
        status: TailorStatus::Created,
        url: request.url,
        resume_text: outcome.assembly.resume_text,
        job_title: outcome.job_title,
        run: Some(RunSummary {
            run_id: outcome.run_id,
            segment_count: outcome.segment_count,
            selected_count: outcome.assembly.selected.len(),
            excluded: outcome.assembly.excluded,
            used_chars: outcome.assembly.used_chars,
            budget_chars: outcome.assembly.budget_chars,
        }),
    }))
}

/// POST /api/v1/segments
///
/// Previews how a résumé source would be split. No oracle calls.
pub async fn handle_segments(
    Json(request): Json<SegmentRequest>,
) -> Result<Json<SegmentsResponse>, AppError> {
    let mut counts = SegmentCounts::default();

    let segments = segment(&request.source)
        .into_iter()
        .enumerate()
        .map(|(index, segment)| {
            match segment.kind {
                SegmentKind::Experience => counts.experience += 1,
                SegmentKind::Project => counts.project += 1,
                SegmentKind::Other => counts.other += 1,
            }
            SegmentView {
                index,
                kind: segment.kind,
                mandatory: segment.mandatory,
                length: segment.char_len(),
                preview: truncate_text(&segment.display_content, SEGMENT_PREVIEW_CHARS),
            }
        })
        .collect();

    Ok(Json(SegmentsResponse { segments, counts }))
}
