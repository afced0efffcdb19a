//! Scorer: assigns each segment a relevance weight in [0, 1] against the job text.
//!
//! Required segments (mandatory or `Other`) score 1.0 without touching the oracle.
//! Everything else costs exactly one oracle call. Replies that do not parse as a
//! number in [0, 1] degrade to 0.0; an oracle that fails outright aborts the pass.
//!
//! `RelevanceOracle` is the seam for model backends; the state carries it as
//! `Arc<dyn RelevanceOracle>`.

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::llm_client::LlmError;
use crate::tailoring::prompts::relevance_prompt;
use crate::tailoring::segment::{ScoredSegment, Segment};

/// Leading decimal literal, the way a lenient float parser reads it.
static LEADING_FLOAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?").expect("float pattern is valid")
});

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// A text-generation backend that answers one prompt with free text.
#[async_trait]
pub trait RelevanceOracle: Send + Sync {
    async fn prompt(&self, text: &str) -> Result<String, LlmError>;

    /// Short backend label for logs.
    fn backend(&self) -> &'static str;
}

// ────────────────────────────────────────────────────────────────────────────
// Scoring
// ────────────────────────────────────────────────────────────────────────────

/// Parses an oracle reply into a score. `None` for anything outside [0, 1].
pub fn parse_score(reply: &str) -> Option<f64> {
    let literal = LEADING_FLOAT.find(reply.trim())?;
    literal
        .as_str()
        .parse::<f64>()
        .ok()
        .filter(|score| (0.0..=1.0).contains(score))
}

/// Asks the oracle how relevant one résumé item is to the job description.
///
/// Unusable replies become 0.0. Only oracle failures are errors.
pub async fn score_item(
    oracle: &dyn RelevanceOracle,
    item_text: &str,
    job_description: &str,
) -> Result<f64, LlmError> {
    let reply = oracle
        .prompt(&relevance_prompt(job_description, item_text))
        .await?;
    debug!("Score reply from {}: {reply:?}", oracle.backend());

    match parse_score(&reply) {
        Some(score) => Ok(score),
        None => {
            warn!("Invalid score received: {:?}", reply.trim());
            Ok(0.0)
        }
    }
}

/// Scores every segment, one-to-one with input order.
///
/// At most `concurrency` oracle calls are in flight. Results are reattached by
/// segment index, so completion order never affects the output. The first oracle
/// failure drops the remaining calls and is returned as `AppError::Oracle`.
pub async fn score_segments(
    segments: Vec<Segment>,
    job_description: &str,
    oracle: Arc<dyn RelevanceOracle>,
    concurrency: usize,
) -> Result<Vec<ScoredSegment>, AppError> {
    let mut scores: Vec<Option<f64>> = segments
        .iter()
        .map(|segment| segment.is_required().then_some(1.0))
        .collect();

    let job_description: Arc<str> = Arc::from(job_description);
    let permits = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut tasks = JoinSet::new();

    for (index, segment) in segments.iter().enumerate() {
        if scores[index].is_some() {
            continue;
        }
        let oracle = Arc::clone(&oracle);
        let job_description = Arc::clone(&job_description);
        let permits = Arc::clone(&permits);
        let item_text = segment.display_content.clone();

        tasks.spawn(async move {
            let _permit = permits
                .acquire_owned()
                .await
                .map_err(|e| LlmError::Unavailable(format!("scoring semaphore closed: {e}")))?;
            let score = score_item(oracle.as_ref(), &item_text, &job_description).await?;
            Ok::<_, LlmError>((index, score))
        });
    }

    while let Some(joined) = tasks.join_next().await {
        let (index, score) = joined
            .map_err(|e| AppError::Internal(anyhow::anyhow!("scoring task failed: {e}")))?
            .map_err(|e| AppError::Oracle(format!("relevance scoring failed: {e}")))?;
        scores[index] = Some(score);
    }

    Ok(segments
        .into_iter()
        .zip(scores)
        .enumerate()
        .map(|(original_index, (segment, score))| ScoredSegment {
            segment,
            score: score.unwrap_or(0.0),
            original_index,
        })
        .collect())
}

// ────────────────────────────────────────────────────────────────────────────
// Test doubles
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod fakes {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    /// Oracle that answers from a rule table keyed by prompt substrings.
    pub(crate) struct ScriptedOracle {
        rules: Vec<(String, String, Duration)>,
        default_reply: String,
        failing: bool,
        calls: AtomicUsize,
        prompts: std::sync::Mutex<Vec<String>>,
    }

    impl ScriptedOracle {
        pub(crate) fn new(default_reply: &str) -> Self {
            Self {
                rules: Vec::new(),
                default_reply: default_reply.to_string(),
                failing: false,
                calls: AtomicUsize::new(0),
                prompts: std::sync::Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn failing() -> Self {
            Self {
                failing: true,
                ..Self::new("")
            }
        }

        pub(crate) fn reply_when(self, needle: &str, reply: &str) -> Self {
            self.reply_after(needle, reply, Duration::ZERO)
        }

        pub(crate) fn reply_after(mut self, needle: &str, reply: &str, delay: Duration) -> Self {
            self.rules
                .push((needle.to_string(), reply.to_string(), delay));
            self
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub(crate) fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RelevanceOracle for ScriptedOracle {
        async fn prompt(&self, text: &str) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(text.to_string());
            if self.failing {
                return Err(LlmError::Unavailable("model not downloaded".to_string()));
            }
            let rule = self
                .rules
                .iter()
                .find(|(needle, _, _)| text.contains(needle.as_str()));
            match rule {
                Some((_, reply, delay)) => {
                    if !delay.is_zero() {
                        tokio::time::sleep(*delay).await;
                    }
                    Ok(reply.clone())
                }
                None => Ok(self.default_reply.clone()),
            }
        }

        fn backend(&self) -> &'static str {
            "scripted"
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
