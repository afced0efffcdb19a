pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::render::handlers as render;
use crate::state::AppState;
use crate::storage::handlers as library;
use crate::tailoring::handlers as tailoring;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Tailoring API
        .route("/api/v1/tailor", post(tailoring::handle_tailor))
        .route("/api/v1/segments", post(tailoring::handle_segments))
        // Library API
        .route(
            "/api/v1/resumes",
            get(library::handle_list_resumes).delete(library::handle_clear_resumes),
        )
        .route(
            "/api/v1/resumes/entry",
            get(library::handle_get_resume).delete(library::handle_delete_resume),
        )
        .route("/api/v1/resumes/export", get(library::handle_export_resumes))
        .route(
            "/api/v1/master-resume",
            get(library::handle_get_master).put(library::handle_put_master),
        )
        .route(
            "/api/v1/master-resume/upload",
            post(library::handle_upload_master),
        )
        // Render API
        .route("/api/v1/resumes/pdf", post(render::handle_export_pdf))
        .with_state(state)
}
