//! Axum route handlers for the Analysis API.

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::Deserialize;
use tracing::info;

use crate::analysis::service::{analyze_document, run_analysis};
use crate::documents::extractor::is_pdf_filename;
use crate::documents::DocumentTextExtractor;
use crate::errors::AppError;
use crate::llm_client::prompts::PromptOptions;
use crate::resilience::{TaskKind, TaskResult};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ScrapeRequest {
    pub url: String,
}

/// A PDF upload plus any text fields sent alongside it.
#[derive(Debug, Default)]
struct UploadForm {
    file: Option<(String, Bytes)>,
    job_description: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/analyze/scrape-url
pub async fn handle_scrape_url(
    State(state): State<AppState>,
    Json(request): Json<ScrapeRequest>,
) -> Result<Json<TaskResult>, AppError> {
    let url = request.url.trim();
    if url.is_empty() {
        return Err(AppError::Validation("url cannot be empty".to_string()));
    }

    let scraped = state.scraper.scrape(url).await.ok_or_else(|| {
        AppError::Validation("Scraping failed. Check server logs.".to_string())
    })?;
    info!("Scraped profile for {}", scraped.name);

    let result = run_analysis(
        &state.orchestrator,
        state.store.as_ref(),
        TaskKind::ProfileAnalysisFromScrape,
        &scraped.raw_text,
        &PromptOptions::default(),
    )
    .await?;
    Ok(Json(result))
}

/// POST /api/analyze/linkedin
///
/// Analyzes an exported profile PDF and stores the result as the user's summary.
pub async fn handle_profile_pdf(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<TaskResult>, AppError> {
    analyze_upload(&state, multipart, "file", TaskKind::ProfileAnalysisFromDocument).await
}

/// POST /api/analyze/resume
pub async fn handle_resume(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<TaskResult>, AppError> {
    analyze_upload(&state, multipart, "file", TaskKind::DocumentAnalysis).await
}

/// POST /api/analyze/match-job
pub async fn handle_match_job(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<TaskResult>, AppError> {
    analyze_upload(&state, multipart, "resume", TaskKind::JobMatchAnalysis).await
}

// ────────────────────────────────────────────────────────────────────────────
// Upload plumbing
// ────────────────────────────────────────────────────────────────────────────

async fn analyze_upload(
    state: &AppState,
    multipart: Multipart,
    file_field: &str,
    task: TaskKind,
) -> Result<Json<TaskResult>, AppError> {
    let form = read_form(multipart, file_field).await?;

    let (filename, bytes) = form
        .file
        .ok_or_else(|| AppError::Validation(format!("Missing '{file_field}' upload")))?;
    if !is_pdf_filename(&filename) {
        return Err(AppError::Validation("Upload a PDF.".to_string()));
    }

    let job_description = form.job_description.unwrap_or_default();
    if task == TaskKind::JobMatchAnalysis && job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "job_description cannot be empty".to_string(),
        ));
    }

    info!(task = %task, "Analysis started for {filename}");
    let text = extract_text(state.extractor.clone(), bytes).await?;

    let options = PromptOptions {
        job_description: &job_description,
        ..PromptOptions::default()
    };
    let result = analyze_document(
        &state.orchestrator,
        state.store.as_ref(),
        task,
        &text,
        &options,
    )
    .await?;
    Ok(Json(result))
}

async fn read_form(mut multipart: Multipart, file_field: &str) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == file_field {
            let filename = field.file_name().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
            form.file = Some((filename, bytes));
        } else if name == "job_description" {
            let text = field
                .text()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read job_description: {e}")))?;
            form.job_description = Some(text);
        }
    }

    Ok(form)
}

/// PDF parsing is CPU-bound; keep it off the async workers.
async fn extract_text(
    extractor: Arc<dyn DocumentTextExtractor>,
    bytes: Bytes,
) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || extractor.extract_text(&bytes))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("PDF extraction task failed: {e}")))
}
