//! Job-posting URL allow-list. Tailoring is only offered on pages we know how to read.

use std::sync::LazyLock;

use regex::Regex;

static JOB_URL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // Single posting
        r"(?i)^https?://(www\.)?linkedin\.com/jobs/view/\d+",
        // Collections (recommended, saved, ...)
        r"(?i)^https?://(www\.)?linkedin\.com/jobs/collections/\w+",
        // Search results with a selected posting
        r"(?i)^https?://(www\.)?linkedin\.com/jobs/search",
    ]
    .into_iter()
    .map(|pattern| Regex::new(pattern).expect("job URL pattern is valid"))
    .collect()
});

pub fn is_valid_job_url(url: &str) -> bool {
    JOB_URL_PATTERNS.iter().any(|pattern| pattern.is_match(url))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linkedin_posting_urls_accepted() {
        assert!(is_valid_job_url("https://www.linkedin.com/jobs/view/3912345678/"));
        assert!(is_valid_job_url("http://linkedin.com/jobs/view/42?refId=abc"));
        assert!(is_valid_job_url(
            "https://www.linkedin.com/jobs/collections/recommended/?currentJobId=1"
        ));
        assert!(is_valid_job_url("https://www.linkedin.com/jobs/search/?keywords=rust"));
    }

    #[test]
    fn test_match_is_case_insensitive() {
        assert!(is_valid_job_url("HTTPS://WWW.LINKEDIN.COM/JOBS/VIEW/1"));
    }

    #[test]
    fn test_other_urls_rejected() {
        assert!(!is_valid_job_url("https://www.linkedin.com/feed/"));
        assert!(!is_valid_job_url("https://www.linkedin.com/jobs/view/not-a-number"));
        assert!(!is_valid_job_url("https://example.com/jobs/view/1"));
        assert!(!is_valid_job_url("https://evil.com/?u=https://linkedin.com/jobs/view/1"));
        assert!(!is_valid_job_url(""));
    }
}
