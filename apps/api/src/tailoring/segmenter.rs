//! Segmenter: splits a LaTeX résumé source into typed, lossless segments.
//!
//! Algorithm:
//! 1. Locate every `\section{Name}` marker; each section runs until the next marker
//!    (or end of text).
//! 2. Locate every `\resumeSubheading` and `\resumeProjectHeading`. A heading only
//!    qualifies when the section containing it is named like experience/work/employment
//!    (subheadings) or project (project headings). Anything else stays boilerplate.
//! 3. Walk the qualifying headings in offset order. Each item runs to the first
//!    `\resumeItemListEnd` inside its section, else to the next heading or section end.
//! 4. Gaps between items become mandatory `Other` segments. Whitespace-only gaps are
//!    folded into a neighbour so concatenating every `raw_content` reproduces the source.
//!
//! Never fails: malformed markup degrades to coarser segments.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::tailoring::segment::{Segment, SegmentKind};

static SECTION_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\section\{([^}]+)\}").expect("section pattern is valid"));
static EXPERIENCE_SECTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)experience|work|employment").expect("experience pattern is valid")
});
static PROJECT_SECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)project").expect("project pattern is valid"));

const EXPERIENCE_HEADING: &str = r"\resumeSubheading";
const PROJECT_HEADING: &str = r"\resumeProjectHeading";
const ITEM_LIST_END: &str = r"\resumeItemListEnd";

/// A named region `[start, end)` of the source.
#[derive(Debug, Clone)]
struct Section<'a> {
    name: &'a str,
    start: usize,
    end: usize,
}

impl Section<'_> {
    fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end
    }
}

#[derive(Debug, Clone, Copy)]
struct Heading {
    offset: usize,
    kind: SegmentKind,
}

#[derive(Debug, Clone, Copy)]
struct Span {
    kind: SegmentKind,
    start: usize,
    end: usize,
}

impl Span {
    fn other(start: usize, end: usize) -> Self {
        Self {
            kind: SegmentKind::Other,
            start,
            end,
        }
    }
}

/// Splits `source` into an ordered, lossless sequence of segments.
pub fn segment(source: &str) -> Vec<Segment> {
    let sections = find_sections(source);
    let headings = find_headings(source, &sections);
    let spans = fold_blank_gaps(source, build_spans(source, &sections, &headings));

    debug!(
        "Segmented source: {} sections, {} qualifying headings, {} segments",
        sections.len(),
        headings.len(),
        spans.len()
    );

    spans
        .into_iter()
        .map(|span| {
            let raw = &source[span.start..span.end];
            match span.kind {
                SegmentKind::Other => Segment::other(raw),
                kind => Segment::new(kind, raw, false),
            }
        })
        .collect()
}

fn find_sections(source: &str) -> Vec<Section<'_>> {
    let mut sections: Vec<Section<'_>> = SECTION_MARKER
        .captures_iter(source)
        .filter_map(|caps| {
            let marker = caps.get(0)?;
            let name = caps.get(1)?;
            Some(Section {
                name: name.as_str(),
                start: marker.start(),
                end: source.len(),
            })
        })
        .collect();

    for i in 1..sections.len() {
        let next_start = sections[i].start;
        sections[i - 1].end = next_start;
    }

    sections
}

fn containing_section<'s, 'a>(sections: &'s [Section<'a>], offset: usize) -> Option<&'s Section<'a>> {
    sections.iter().find(|s| s.contains(offset))
}

/// Collects qualifying headings sorted by offset.
fn find_headings(source: &str, sections: &[Section<'_>]) -> Vec<Heading> {
    let candidates = source
        .match_indices(EXPERIENCE_HEADING)
        .map(|(offset, _)| (offset, SegmentKind::Experience))
        .chain(
            source
                .match_indices(PROJECT_HEADING)
                .map(|(offset, _)| (offset, SegmentKind::Project)),
        );

    let mut headings = Vec::new();
    for (offset, kind) in candidates {
        let qualifies = containing_section(sections, offset).is_some_and(|section| match kind {
            SegmentKind::Experience => EXPERIENCE_SECTION.is_match(section.name),
            SegmentKind::Project => PROJECT_SECTION.is_match(section.name),
            SegmentKind::Other => false,
        });

        if qualifies {
            headings.push(Heading { offset, kind });
        } else {
            debug!("Heading at offset {offset} ({kind:?}) is outside a matching section; kept as boilerplate");
        }
    }

    headings.sort_by_key(|h| h.offset);
    headings
}

fn build_spans(source: &str, sections: &[Section<'_>], headings: &[Heading]) -> Vec<Span> {
    let mut spans = Vec::with_capacity(headings.len() * 2 + 1);
    let mut cursor = 0usize;

    for (i, heading) in headings.iter().enumerate() {
        // The first end marker may belong to a later heading; that heading is then
        // already inside the previous item.
        if heading.offset < cursor {
            debug!(
                "Heading at offset {} absorbed by the preceding item ending at {cursor}",
                heading.offset
            );
            continue;
        }

        if heading.offset > cursor {
            spans.push(Span::other(cursor, heading.offset));
        }

        let section_end = containing_section(sections, heading.offset)
            .map_or(source.len(), |section| section.end);

        let end = match source[heading.offset..].find(ITEM_LIST_END) {
            Some(rel) if heading.offset + rel < section_end => {
                heading.offset + rel + ITEM_LIST_END.len()
            }
            _ => headings
                .get(i + 1)
                .map(|next| next.offset)
                .filter(|&next| next < section_end)
                .unwrap_or(section_end),
        };

        spans.push(Span {
            kind: heading.kind,
            start: heading.offset,
            end,
        });
        cursor = end;
    }

    if cursor < source.len() {
        spans.push(Span::other(cursor, source.len()));
    }

    spans
}

/// Merges whitespace-only `Other` spans into the previous span, or into the next one
/// when nothing precedes them.
fn fold_blank_gaps(source: &str, spans: Vec<Span>) -> Vec<Span> {
    let mut folded: Vec<Span> = Vec::with_capacity(spans.len());
    let mut leading_blank: Option<usize> = None;

    for mut span in spans {
        let blank =
            span.kind == SegmentKind::Other && source[span.start..span.end].trim().is_empty();

        if blank {
            match folded.last_mut() {
                Some(prev) => prev.end = span.end,
                None => leading_blank = Some(leading_blank.unwrap_or(span.start)),
            }
            continue;
        }

        if let Some(start) = leading_blank.take() {
            span.start = start;
        }
        folded.push(span);
    }

    // Entirely blank source: still has to round-trip.
    if let Some(start) = leading_blank {
        folded.push(Span::other(start, source.len()));
    }

    folded
}
