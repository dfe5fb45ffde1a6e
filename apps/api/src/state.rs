use std::sync::Arc;

use crate::curriculum::generator::CurriculumGenerator;

/// Shared application state injected into all route handlers via Axum extractors.
/// Read-only after startup.
#[derive(Clone)]
pub struct AppState {
    /// Backend selected by `GENERATOR_BACKEND`: hosted (default) or local.
    pub generator: Arc<dyn CurriculumGenerator>,
}
