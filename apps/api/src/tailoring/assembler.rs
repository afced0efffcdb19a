//! Assembler: picks the highest-scoring segments that fit the page budget and
//! stitches them back together in source order.
//!
//! Algorithm:
//! 1. Required segments (mandatory or `Other`) are always selected.
//! 2. Optional segments are ranked by score descending, earlier segments first on ties.
//! 3. budget = page_limit × chars_per_page; required content counts against it first.
//! 4. Walk the ranking once: take a segment if it still fits, otherwise skip it for good.
//! 5. Emit the selection in original order.
//!
//! Step 4 is a greedy approximation of the knapsack: no backtracking, so a large
//! high-scoring item can crowd out several smaller ones whose combined score is higher.
//! Required content may exceed the budget on its own; it is never dropped.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::tailoring::segment::ScoredSegment;

/// Why an optional segment was left out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExcludedSegment {
    pub index: usize,
    pub score: f64,
    pub reason: String,
}

/// Output of one assembly pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assembly {
    pub resume_text: String,
    /// Original indices of the kept segments, ascending.
    pub selected: Vec<usize>,
    pub excluded: Vec<ExcludedSegment>,
    pub used_chars: usize,
    pub budget_chars: usize,
}

/// Selects segments under `page_limit * chars_per_page` characters and rebuilds the document.
pub fn assemble(scored: &[ScoredSegment], page_limit: u32, chars_per_page: usize) -> Assembly {
    let budget_chars = (page_limit as usize).saturating_mul(chars_per_page);

    let (required, mut optional): (Vec<&ScoredSegment>, Vec<&ScoredSegment>) =
        scored.iter().partition(|s| s.segment.is_required());

    optional.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then(a.original_index.cmp(&b.original_index))
    });

    let mut used_chars: usize = required.iter().map(|s| s.segment.char_len()).sum();
    let mut selected = required;
    let mut excluded = Vec::new();

    for candidate in optional {
        let len = candidate.segment.char_len();
        if used_chars + len <= budget_chars {
            used_chars += len;
            selected.push(candidate);
        } else {
            excluded.push(ExcludedSegment {
                index: candidate.original_index,
                score: candidate.score,
                reason: format!("Needs {len} chars; {used_chars} of {budget_chars} already used"),
            });
        }
    }

    selected.sort_by_key(|s| s.original_index);
    excluded.sort_by_key(|e| e.index);

    Assembly {
        resume_text: selected
            .iter()
            .map(|s| s.segment.raw_content.as_str())
            .collect(),
        selected: selected.iter().map(|s| s.original_index).collect(),
        excluded,
        used_chars,
        budget_chars,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tailoring::segment::{Segment, SegmentKind};

    fn scored(index: usize, segment: Segment, score: f64) -> ScoredSegment {
        ScoredSegment {
            segment,
            score,
            original_index: index,
        }
    }

    fn optional(index: usize, fill: char, len: usize, score: f64) -> ScoredSegment {
        let text: String = std::iter::repeat(fill).take(len).collect();
        scored(index, Segment::new(SegmentKind::Experience, text, false), score)
    }

    fn boilerplate(index: usize, fill: char, len: usize) -> ScoredSegment {
        let text: String = std::iter::repeat(fill).take(len).collect();
        scored(index, Segment::other(text), 1.0)
    }

    #[test]
    fn test_higher_score_wins_when_both_cannot_fit() {
        // 100 + 4000 + 4000 = 8100 > 8000: only one optional segment fits.
        let segments = vec![
            boilerplate(0, 'h', 100),
            optional(1, 'a', 4000, 0.2),
            optional(2, 'b', 4000, 0.9),
        ];

        let assembly = assemble(&segments, 1, 8000);

        assert_eq!(assembly.selected, vec![0, 2]);
        assert_eq!(assembly.used_chars, 4100);
        assert_eq!(assembly.budget_chars, 8000);
        assert_eq!(assembly.excluded.len(), 1);
        assert_eq!(assembly.excluded[0].index, 1);
        assert!(!assembly.resume_text.contains('a'));
    }

    #[test]
    fn test_everything_fits_with_room() {
        let segments = vec![
            boilerplate(0, 'h', 100),
            optional(1, 'a', 4000, 0.2),
            optional(2, 'b', 3900, 0.9),
        ];
        let assembly = assemble(&segments, 1, 8000);
        assert_eq!(assembly.selected, vec![0, 1, 2]);
        assert_eq!(assembly.used_chars, 8000);
        assert!(assembly.excluded.is_empty());
    }

    #[test]
    fn test_output_preserves_original_order() {
        let segments = vec![
            boilerplate(0, 'h', 1),
            optional(1, 'a', 1, 0.1),
            boilerplate(2, 'm', 1),
            optional(3, 'b', 1, 0.9),
            optional(4, 'c', 1, 0.5),
            boilerplate(5, 't', 1),
        ];
        let assembly = assemble(&segments, 1, 100);
        assert_eq!(assembly.resume_text, "hambct");
        assert_eq!(assembly.selected, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_mandatory_kept_even_over_budget() {
        let segments = vec![
            boilerplate(0, 'h', 50),
            optional(1, 'a', 1, 1.0),
            boilerplate(2, 't', 50),
        ];

        let assembly = assemble(&segments, 1, 10);

        assert_eq!(assembly.resume_text, format!("{}{}", "h".repeat(50), "t".repeat(50)));
        assert_eq!(assembly.used_chars, 100);
        assert_eq!(assembly.excluded[0].index, 1);
    }

    #[test]
    fn test_zero_page_limit_keeps_only_required() {
        let segments = vec![
            boilerplate(0, 'h', 3),
            optional(1, 'a', 1, 1.0),
            scored(2, Segment::new(SegmentKind::Project, "pin", true), 1.0),
        ];
        let assembly = assemble(&segments, 0, 8000);
        assert_eq!(assembly.budget_chars, 0);
        assert_eq!(assembly.resume_text, "hhhpin");
        assert_eq!(assembly.selected, vec![0, 2]);
    }

    #[test]
    fn test_ties_prefer_earlier_segment() {
        let segments = vec![optional(0, 'a', 5, 0.5), optional(1, 'b', 5, 0.5)];
        let assembly = assemble(&segments, 1, 5);
        assert_eq!(assembly.resume_text, "aaaaa");
    }

    #[test]
    fn test_greedy_does_not_backtrack() {
        // Optimal would be the two 0.6 items (total 1.2); greedy takes the 0.9 item first.
        let segments = vec![
            optional(0, 'x', 10, 0.9),
            optional(1, 'y', 6, 0.6),
            optional(2, 'z', 6, 0.6),
        ];
        let assembly = assemble(&segments, 1, 12);
        assert_eq!(assembly.selected, vec![0]);
        assert_eq!(assembly.excluded.len(), 2);
    }

    #[test]
    fn test_skipped_item_does_not_block_smaller_later_item() {
        let segments = vec![
            optional(0, 'x', 8, 0.9),
            optional(1, 'y', 5, 0.8),
            optional(2, 'z', 2, 0.1),
        ];
        let assembly = assemble(&segments, 1, 10);
        assert_eq!(assembly.selected, vec![0, 2]);
    }

    #[test]
    fn test_budget_counts_characters_not_bytes() {
        let segments = vec![scored(
            0,
            Segment::new(SegmentKind::Experience, "é".repeat(4), false),
            0.5,
        )];
        let assembly = assemble(&segments, 1, 4);
        assert_eq!(assembly.selected, vec![0]);
        assert_eq!(assembly.used_chars, 4);
    }

    #[test]
    fn test_empty_input() {
        let assembly = assemble(&[], 2, 8000);
        assert_eq!(assembly.resume_text, "");
        assert!(assembly.selected.is_empty());
        assert_eq!(assembly.budget_chars, 16000);
    }

    #[test]
    fn test_reassembling_everything_reproduces_source() {
        let source = crate::tailoring::segmenter::segment(
            "\\section{Experience}\n\\resumeSubheading{A}\\resumeItemListEnd\nend",
        );
        let segments: Vec<_> = source
            .into_iter()
            .enumerate()
            .map(|(i, s)| scored(i, s, 0.5))
            .collect();
        let assembly = assemble(&segments, 1, usize::MAX);
        assert_eq!(
            assembly.resume_text,
            "\\section{Experience}\n\\resumeSubheading{A}\\resumeItemListEnd\nend"
        );
    }
}
