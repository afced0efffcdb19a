//! Segment types shared by the segmenter, scorer, and assembler.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static CONTROL_SEQUENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\[a-zA-Z]+").expect("control sequence pattern is valid"));

/// Content kind of a segment. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    Experience,
    Project,
    Other,
}

/// An atomic, lossless slice of the master résumé source.
///
/// `raw_content` is used for reconstruction and is always an exact substring of
/// the source. `display_content` is only ever fed to the oracle or shown to a
/// human.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub kind: SegmentKind,
    pub raw_content: String,
    pub display_content: String,
    pub mandatory: bool,
}

impl Segment {
    pub fn new(kind: SegmentKind, raw_content: impl Into<String>, mandatory: bool) -> Self {
        let raw_content = raw_content.into();
        let display_content = to_display_text(&raw_content);
        Self {
            kind,
            raw_content,
            display_content,
            mandatory,
        }
    }

    /// Boilerplate segment: always kept, never scored.
    pub fn other(raw_content: impl Into<String>) -> Self {
        Self::new(SegmentKind::Other, raw_content, true)
    }

    /// Whether the segment bypasses scoring and selection.
    pub fn is_required(&self) -> bool {
        self.mandatory || self.kind == SegmentKind::Other
    }

    /// Length used against the page budget.
    pub fn char_len(&self) -> usize {
        self.raw_content.chars().count()
    }
}

/// A segment with its relevance score and position in the segment sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredSegment {
    pub segment: Segment,
    pub score: f64,
    pub original_index: usize,
}

/// Strips markup control sequences and braces for scoring and display.
pub fn to_display_text(raw: &str) -> String {
    CONTROL_SEQUENCE
        .replace_all(raw, "")
        .replace(['{', '}'], "")
        .trim()
        .to_string()
}
