use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::{error, info};

use crate::errors::AppError;
use crate::extraction::{self, ExtractedContent, ExtractionError};
use crate::heuristic::{analyze_text, HeuristicReport};
use crate::history::StoredResumeItem;
use crate::state::AppState;

const UPLOAD_FIELD: &str = "file";
/// The picker accepts these; only PDF actually extracts.
const ACCEPTED_EXTENSIONS: &[&str] = &["pdf", "doc", "docx"];

/// An uploaded resume. Never persisted.
#[derive(Debug)]
pub struct ResumeDocument {
    pub file_name: String,
    pub bytes: Bytes,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub item: StoredResumeItem,
    /// False when the history write failed; the report is still returned.
    pub persisted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_error: Option<String>,
}

/// POST /api/v1/analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let _permit = state.gate.try_acquire().ok_or(AppError::Busy)?;

    let document = read_upload(multipart).await?;
    info!(
        "Analyzing '{}' ({} bytes)",
        document.file_name,
        document.bytes.len()
    );

    let content = extract_document(document).await?;
    let report = state.analyzer.analyze(&content.text).await;
    let item = StoredResumeItem::new(content, report);

    let (persisted, storage_error) = match state.history.save(item.clone()).await {
        Ok(()) => (true, None),
        Err(e) => {
            error!("Failed to save analysis {}: {e}", item.id);
            (false, Some(e.to_string()))
        }
    };

    info!(
        id = %item.id,
        overall_score = item.report.overall_score,
        persisted,
        "Resume analysis completed"
    );

    Ok(Json(AnalyzeResponse {
        item,
        persisted,
        storage_error,
    }))
}

/// POST /api/v1/analyze/heuristic
pub async fn handle_heuristic(multipart: Multipart) -> Result<Json<HeuristicReport>, AppError> {
    let document = read_upload(multipart).await?;
    let content = extract_document(document).await?;
    Ok(Json(analyze_text(&content.text)))
}

async fn read_upload(mut multipart: Multipart) -> Result<ResumeDocument, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        validate_file_name(&file_name)?;

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Could not read uploaded file: {e}")))?;
        if bytes.is_empty() {
            return Err(AppError::Validation("Uploaded file is empty".to_string()));
        }

        return Ok(ResumeDocument { file_name, bytes });
    }

    Err(AppError::Validation(
        "Please select a resume file.".to_string(),
    ))
}

fn validate_file_name(file_name: &str) -> Result<(), AppError> {
    let extension = std::path::Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    if ACCEPTED_EXTENSIONS.contains(&extension.as_str()) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "Unsupported file '{file_name}': upload a PDF, DOC, or DOCX resume"
        )))
    }
}

/// PDF parsing is CPU-bound; it runs on the blocking pool.
async fn extract_document(document: ResumeDocument) -> Result<ExtractedContent, AppError> {
    let bytes = document.bytes;
    let content = tokio::task::spawn_blocking(move || extraction::extract(&bytes))
        .await
        .map_err(|e| ExtractionError::Parse(format!("extraction worker failed: {e}")))??;
    Ok(content)
}
