//! Axum route handlers for the Curriculum API.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use crate::curriculum::defaults::apply_defaults;
use crate::curriculum::models::{CurriculumEnvelope, CurriculumRequest};
use crate::errors::AppError;
use crate::render::{render_curriculum_pdf, PDF_FILENAME};
use crate::state::AppState;

/// POST /api/generate
///
/// Always answers 200: either the curriculum document or `{"error": "..."}`
/// when the configured backend could not produce one.
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(request): Json<CurriculumRequest>,
) -> Result<Json<Value>, AppError> {
    info!("Curriculum request received: {:?}", request);
    let params = request.resolve()?;

    match state.generator.generate(&params).await {
        Ok(curriculum) => Ok(Json(curriculum)),
        Err(e) => {
            warn!(
                "Curriculum generation via {} backend failed: {e}",
                state.generator.backend()
            );
            Ok(Json(json!({ "error": e.to_string() })))
        }
    }
}

/// POST /api/download
///
/// Accepts `{"curriculum": {...}}` or a bare curriculum object, fills missing
/// fields, and returns the rendered PDF as an attachment.
pub async fn handle_download(Json(document): Json<Value>) -> Result<Response, AppError> {
    let document = match document {
        Value::Object(map) if map.contains_key("curriculum") => Value::Object(map),
        Value::Object(map) => {
            let mut wrapper = Map::new();
            wrapper.insert("curriculum".to_string(), Value::Object(map));
            Value::Object(wrapper)
        }
        _ => {
            return Err(AppError::Validation(
                "download body must be a curriculum object".to_string(),
            ))
        }
    };

    let envelope = CurriculumEnvelope::deserialize(&apply_defaults(document))
        .map_err(|e| AppError::Validation(format!("curriculum is malformed: {e}")))?;

    let curriculum = envelope.curriculum;
    let domain = curriculum.domain.clone();
    // PDF layout is CPU-bound; keep it off the async workers.
    let pdf = tokio::task::spawn_blocking(move || render_curriculum_pdf(&curriculum))
        .await
        .map_err(|e| {
            AppError::Internal(anyhow::anyhow!("spawn_blocking failed in PDF render: {e}"))
        })??;
    info!("Rendered curriculum PDF for {domain} ({} bytes)", pdf.len());

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{PDF_FILENAME}\""),
            ),
        ],
        pdf,
    )
        .into_response())
}
