// Tailoring engine: posting extraction, résumé segmentation, relevance scoring, assembly.
// All model calls go through the RelevanceOracle seam in scorer; no backend types here.

pub mod assembler;
pub mod extractor;
pub mod handlers;
pub mod job_url;
pub mod pipeline;
pub mod prompts;
pub mod scorer;
pub mod segment;
pub mod segmenter;

use std::time::Duration;

/// Rough character capacity of one rendered page.
///
/// A calibration knob for the greedy assembler, not a typesetting fact. Values
/// between 3500 and 8000 have been used in practice; the lower end undershoots
/// dense templates.
pub const DEFAULT_CHARS_PER_PAGE: usize = 8000;

/// Tunables for a tailoring run.
#[derive(Debug, Clone)]
pub struct TailoringConfig {
    pub chars_per_page: usize,
    /// Max oracle calls in flight during one scoring pass.
    pub scoring_concurrency: usize,
    pub default_page_limit: u32,
    /// A URL tailored more recently than this is skipped unless forced.
    pub update_interval: Duration,
    pub enforce_job_urls: bool,
}

impl Default for TailoringConfig {
    fn default() -> Self {
        Self {
            chars_per_page: DEFAULT_CHARS_PER_PAGE,
            scoring_concurrency: 4,
            default_page_limit: 1,
            update_interval: Duration::from_secs(24 * 60 * 60),
            enforce_job_urls: true,
        }
    }
}
