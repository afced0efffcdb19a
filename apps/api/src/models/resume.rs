use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static TRAILING_PARTIAL_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+\S*$").expect("partial word pattern is valid"));

/// A tailored résumé as stored in the library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredResume {
    pub url: String,
    pub resume: String,
    /// Epoch millis of the last save.
    pub last_update: Option<i64>,
    pub job_title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasterResume {
    pub content: String,
    pub last_update: Option<i64>,
}

/// What the popup shows about the master résumé.
#[derive(Debug, Clone, Serialize)]
pub struct MasterResumeDetails {
    pub loaded: bool,
    pub last_update: Option<i64>,
    pub snippet: Option<String>,
}

impl MasterResumeDetails {
    pub const SNIPPET_CHARS: usize = 50;

    pub fn from_master(master: Option<MasterResume>) -> Self {
        match master {
            Some(master) => Self {
                loaded: true,
                last_update: master.last_update,
                snippet: Some(truncate_text(&master.content, Self::SNIPPET_CHARS)),
            },
            None => Self {
                loaded: false,
                last_update: None,
                snippet: None,
            },
        }
    }
}

/// One row of the library listing.
#[derive(Debug, Clone, Serialize)]
pub struct ResumeSummary {
    pub url: String,
    pub host: String,
    pub job_title: Option<String>,
    pub last_update: Option<i64>,
    pub preview: String,
}

impl ResumeSummary {
    pub const PREVIEW_CHARS: usize = 150;
}

impl From<StoredResume> for ResumeSummary {
    fn from(stored: StoredResume) -> Self {
        Self {
            host: display_host(&stored.url),
            preview: truncate_text(&stored.resume, Self::PREVIEW_CHARS),
            url: stored.url,
            job_title: stored.job_title,
            last_update: stored.last_update,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeExport {
    /// ISO-8601 with millisecond precision.
    pub export_date: String,
    pub resumes: Vec<ExportedResume>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedResume {
    pub url: String,
    pub resume: String,
    pub last_update: Option<i64>,
}

/// Cuts `text` to at most `max_chars` characters, backs off to the last word
/// boundary and appends "...". Short text comes back unchanged.
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let head: String = text.chars().take(max_chars).collect();
    format!("{}...", TRAILING_PARTIAL_WORD.replace(&head, ""))
}

/// Host name of a URL; unparseable URLs are shown shortened instead.
pub fn display_host(url: &str) -> String {
    if let Some(host) = url::Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_owned))
    {
        return host;
    }
    if url.chars().count() > 50 {
        format!("{}...", url.chars().take(47).collect::<String>())
    } else {
        url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_text_unchanged() {
        assert_eq!(truncate_text("short", 50), "short");
    }

    #[test]
    fn test_truncate_backs_off_to_word_boundary() {
        assert_eq!(truncate_text("alpha beta gamma", 13), "alpha beta...");
        assert_eq!(truncate_text("alpha beta gamma", 10), "alpha...");
    }

    #[test]
    fn test_truncate_single_long_word_is_cut_hard() {
        assert_eq!(truncate_text("abcdefghij", 4), "abcd...");
    }

    #[test]
    fn test_truncate_counts_characters() {
        assert_eq!(truncate_text("ééé ééé", 5), "ééé...");
    }

    #[test]
    fn test_display_host() {
        assert_eq!(
            display_host("https://www.linkedin.com/jobs/view/1"),
            "www.linkedin.com"
        );
        assert_eq!(display_host("not a url"), "not a url");
        let long = "x".repeat(60);
        assert_eq!(display_host(&long), format!("{}...", "x".repeat(47)));
    }

    #[test]
    fn test_master_details_snippet() {
        let details = MasterResumeDetails::from_master(Some(MasterResume {
            content: "\\documentclass[letterpaper,11pt]{article} \\usepackage{latexsym}".to_string(),
            last_update: Some(1_700_000_000_000),
        }));
        assert!(details.loaded);
        assert_eq!(
            details.snippet.as_deref(),
            Some("\\documentclass[letterpaper,11pt]{article}...")
        );

        let empty = MasterResumeDetails::from_master(None);
        assert!(!empty.loaded);
        assert!(empty.snippet.is_none());
    }
}
