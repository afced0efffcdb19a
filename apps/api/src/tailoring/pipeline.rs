//! Tailoring pipeline: orchestrates one run.
//!
//! Flow: extract posting text → segment master résumé → score segments → assemble.
//!
//! Extraction and segmentation never fail. An oracle failure aborts the run before
//! anything is returned, so callers never see (or persist) a partial résumé.
//! The oracle handle is owned by the caller; the pipeline keeps no state between runs.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::tailoring::assembler::{assemble, Assembly};
use crate::tailoring::extractor::extract_page;
use crate::tailoring::scorer::{score_segments, RelevanceOracle};
use crate::tailoring::segmenter::segment;
use crate::tailoring::TailoringConfig;

/// Result of one tailoring run.
#[derive(Debug, Clone, Serialize)]
pub struct TailorOutcome {
    pub run_id: Uuid,
    pub job_title: Option<String>,
    pub segment_count: usize,
    pub assembly: Assembly,
}

/// Tailors `master_resume` to the job posting in `html` under `page_limit` pages.
pub async fn tailor(
    html: &str,
    master_resume: &str,
    page_limit: u32,
    oracle: Arc<dyn RelevanceOracle>,
    config: &TailoringConfig,
) -> Result<TailorOutcome, AppError> {
    let run_id = Uuid::new_v4();
    let span = info_span!("tailor", %run_id, backend = oracle.backend());

    async move {
        let page = extract_page(html);
        info!("Extracted {} chars of posting text", page.text.len());

        let segments = segment(master_resume);
        let segment_count = segments.len();
        info!("Split master resume into {segment_count} segments");

        let scored =
            score_segments(segments, &page.text, oracle, config.scoring_concurrency).await?;

        let assembly = assemble(&scored, page_limit, config.chars_per_page);
        info!(
            "Assembled {} of {} segments ({} / {} chars)",
            assembly.selected.len(),
            segment_count,
            assembly.used_chars,
            assembly.budget_chars
        );

        Ok(TailorOutcome {
            run_id,
            job_title: page.job_title,
            segment_count,
            assembly,
        })
    }
    .instrument(span)
    .await
}
