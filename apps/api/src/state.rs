use std::sync::Arc;

use crate::render::archive::PdfArchive;
use crate::render::TypesetCompiler;
use crate::storage::library::ResumeLibrary;
use crate::tailoring::scorer::RelevanceOracle;
use crate::tailoring::TailoringConfig;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub library: ResumeLibrary,
    /// Relevance backend. Ollama by default; swap via ORACLE_BACKEND.
    pub oracle: Arc<dyn RelevanceOracle>,
    pub compiler: Arc<dyn TypesetCompiler>,
    /// Set only when S3 is configured.
    pub archive: Option<PdfArchive>,
    pub tailoring: TailoringConfig,
}
