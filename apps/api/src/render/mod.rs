// PDF export: compile a stored résumé with a LaTeX engine, hand the bytes back,
// optionally archive them to S3.

pub mod archive;
pub mod handlers;
pub mod latex;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::NaiveDate;

use crate::errors::AppError;

/// Entry file name every compile uses.
pub const MAIN_FILE: &str = "main.tex";

/// Raw result of one engine run.
#[derive(Debug, Clone)]
pub struct CompileOutput {
    pub status: i32,
    pub log: String,
    pub pdf: Option<Bytes>,
}

impl CompileOutput {
    /// A run that never produced engine output (spawn failure, timeout).
    pub fn failed(log: impl Into<String>) -> Self {
        Self {
            status: -1,
            log: log.into(),
            pdf: None,
        }
    }

    /// The PDF, or `AppError::Compile` with the full log when the run failed.
    pub fn into_pdf(self) -> Result<Bytes, AppError> {
        match self.pdf {
            Some(pdf) if self.status == 0 && !pdf.is_empty() => Ok(pdf),
            _ => Err(AppError::Compile {
                status: self.status,
                log: self.log,
            }),
        }
    }
}

/// A typesetting engine. Compiles `source` as `main_file` in a fresh workspace.
#[async_trait]
pub trait TypesetCompiler: Send + Sync {
    async fn compile(&self, source: &str, main_file: &str) -> Result<CompileOutput, AppError>;
}

/// `resume_<host without www.>_<YYYY-MM-DD>.pdf`
pub fn pdf_filename(url: &str, date: NaiveDate) -> String {
    let host = url::Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_owned))
        .unwrap_or_else(|| "unknown".to_string());
    let domain = host.strip_prefix("www.").unwrap_or(&host);
    format!("resume_{domain}_{}.pdf", date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_filename_strips_www() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 17).unwrap();
        assert_eq!(
            pdf_filename("https://www.linkedin.com/jobs/view/123", date),
            "resume_linkedin.com_2024-05-17.pdf"
        );
        assert_eq!(
            pdf_filename("https://jobs.example.org/a", date),
            "resume_jobs.example.org_2024-05-17.pdf"
        );
    }

    #[test]
    fn test_pdf_filename_unparseable_url() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(pdf_filename("not a url", date), "resume_unknown_2024-01-02.pdf");
    }

    #[test]
    fn test_into_pdf_requires_zero_status_and_bytes() {
        let ok = CompileOutput {
            status: 0,
            log: String::new(),
            pdf: Some(Bytes::from_static(b"%PDF-1.5")),
        };
        assert_eq!(ok.into_pdf().unwrap(), Bytes::from_static(b"%PDF-1.5"));

        let nonzero = CompileOutput {
            status: 1,
            log: "! LaTeX Error".to_string(),
            pdf: Some(Bytes::from_static(b"%PDF-1.5")),
        };
        assert!(matches!(
            nonzero.into_pdf(),
            Err(AppError::Compile { status: 1, ref log }) if log == "! LaTeX Error"
        ));

        let missing = CompileOutput {
            status: 0,
            log: String::new(),
            pdf: None,
        };
        assert!(matches!(missing.into_pdf(), Err(AppError::Compile { status: 0, .. })));
    }
}
