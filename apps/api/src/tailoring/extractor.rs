//! Content Extractor: reduces a job-posting page to plain prose.
//!
//! Prefers the first `<article>` element and falls back to `<body>`. Text is taken the
//! way a DOM `textContent` would take it (attributes such as link targets and media
//! sources never appear), minus script/style payloads, then whitespace-collapsed.

use scraper::{ElementRef, Html, Node, Selector};

const HIDDEN_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Text and metadata pulled from one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedPage {
    pub text: String,
    pub job_title: Option<String>,
}

/// Parses the page once and extracts both the prose and the posting title.
pub fn extract_page(html: &str) -> ExtractedPage {
    let document = Html::parse_document(html);
    ExtractedPage {
        text: extract(&document),
        job_title: extract_job_title(&document),
    }
}

/// Normalized prose of the first `<article>`, else of `<body>`. Never fails.
pub fn extract(document: &Html) -> String {
    let container = first_match(document, "article")
        .or_else(|| first_match(document, "body"))
        .unwrap_or_else(|| document.root_element());
    normalize_whitespace(&visible_text(container))
}

/// First non-empty `<h1>`, else the document `<title>`.
pub fn extract_job_title(document: &Html) -> Option<String> {
    let heading = Selector::parse("h1").ok().and_then(|selector| {
        document
            .select(&selector)
            .map(|h1| normalize_whitespace(&visible_text(h1)))
            .find(|text| !text.is_empty())
    });

    heading.or_else(|| {
        first_match(document, "title")
            .map(|title| normalize_whitespace(&title.text().collect::<String>()))
            .filter(|text| !text.is_empty())
    })
}

fn first_match<'a>(document: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    document.select(&selector).next()
}

fn visible_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    for node in element.descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|ancestor| HIDDEN_ELEMENTS.contains(&ancestor.value().name()));
        if !hidden {
            out.push_str(text);
        }
    }
    out
}

/// Collapses whitespace runs to single spaces and trims the ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
