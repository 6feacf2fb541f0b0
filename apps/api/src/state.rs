use std::sync::Arc;

use crate::llm_client::Completion;
use crate::storage::OkrStore;
use crate::validation::report::ReportArchive;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL when DATABASE_URL is set, in-memory otherwise.
    pub store: Arc<dyn OkrStore>,
    pub llm: Arc<dyn Completion>,
    /// Markdown copies of validation reports. `None` when S3 is not configured.
    pub archive: Option<ReportArchive>,
}
