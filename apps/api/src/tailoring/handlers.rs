//! Axum route handlers for direct document operations.
//!
//! These run the engine synchronously on a caller-supplied document: no model
//! call, nothing written to disk. Include targets are never resolved, so any
//! `\input` is reported as missing.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::generation::reply::{parse_sections, GenerationReply};
use crate::state::AppState;
use crate::tailoring::locator::section_names;
use crate::tailoring::preflight::{declared_packages, preflight};
use crate::tailoring::validator::{validate_extended, ValidationReport};
use crate::tailoring::{tailor, TailorError, TailorOutcome, SUBTITLE_KEY};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct DocumentRequest {
    pub document: String,
}

#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub summary: String,
    #[serde(flatten)]
    pub report: ValidationReport,
}

#[derive(Debug, Serialize)]
pub struct SectionsResponse {
    pub supported: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection: Option<String>,
    pub packages: Vec<String>,
    pub missing_files: Vec<String>,
    pub sections: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct MergeRequest {
    pub document: String,
    pub reply: GenerationReply,
    #[serde(default)]
    pub include_experience: bool,
    /// Overrides any subtitle found in the reply.
    #[serde(default)]
    pub subtitle: Option<String>,
    /// Reject a structurally invalid result with 422 instead of returning it.
    #[serde(default)]
    pub strict: bool,
}

#[derive(Debug, Serialize)]
pub struct MergeResponse {
    pub summary: String,
    #[serde(flatten)]
    pub outcome: TailorOutcome,
}

fn no_files(_: &str) -> bool {
    false
}

fn require_document(document: &str) -> Result<(), AppError> {
    if document.trim().is_empty() {
        return Err(AppError::Validation("document cannot be empty".to_string()));
    }
    Ok(())
}

async fn blocking<F, T>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed: {e}")))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/documents/validate
///
/// Runs the extended structural checker. Always 200; validity is in the body.
pub async fn handle_validate(
    Json(request): Json<DocumentRequest>,
) -> Result<Json<ValidateResponse>, AppError> {
    require_document(&request.document)?;
    let report = blocking(move || validate_extended(&request.document)).await?;
    Ok(Json(ValidateResponse {
        summary: report.summary(),
        report,
    }))
}

/// POST /api/v1/documents/sections
///
/// Preflight verdict plus the section headers found, in document order.
pub async fn handle_sections(
    State(state): State<AppState>,
    Json(request): Json<DocumentRequest>,
) -> Result<Json<SectionsResponse>, AppError> {
    require_document(&request.document)?;
    let policy = state.policy;
    let response = blocking(move || {
        let document = request.document;
        let sections = section_names(&document);
        match preflight(&document, &policy, no_files) {
            Ok(()) => SectionsResponse {
                supported: true,
                rejection: None,
                packages: declared_packages(&document),
                missing_files: Vec::new(),
                sections,
            },
            Err(TailorError::PreflightRejected {
                reason,
                packages,
                missing_files,
            }) => SectionsResponse {
                supported: false,
                rejection: Some(reason),
                packages,
                missing_files,
                sections,
            },
            Err(other) => SectionsResponse {
                supported: false,
                rejection: Some(other.to_string()),
                packages: declared_packages(&document),
                missing_files: Vec::new(),
                sections,
            },
        }
    })
    .await?;
    Ok(Json(response))
}

/// POST /api/v1/documents/merge
///
/// Applies a generator reply to `document` without calling the model.
/// A reply with no recognised labels is a 400. Preflight or merge failures
/// come back as 422. An invalid merged document is returned with
/// `is_valid: false` in the report, or rejected as 422 when `strict` is set.
pub async fn handle_merge(
    State(state): State<AppState>,
    Json(request): Json<MergeRequest>,
) -> Result<Json<MergeResponse>, AppError> {
    require_document(&request.document)?;
    let text = request
        .reply
        .resolve_text()
        .ok_or_else(|| AppError::Validation("reply contains no text".to_string()))?;

    let policy = state.policy;
    let outcome = blocking(move || {
        preflight(&request.document, &policy, no_files)?;
        let mut sections = parse_sections(&text, request.include_experience, &policy);
        if let Some(subtitle) = request
            .subtitle
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            sections.insert(SUBTITLE_KEY, subtitle);
        }
        if sections.is_empty() {
            return Err(AppError::Validation(
                "reply contains no recognizable sections".to_string(),
            ));
        }
        let outcome = tailor(&request.document, &sections, &policy)?;
        if request.strict {
            outcome.report.ensure_valid()?;
        }
        Ok(outcome)
    })
    .await??;

    Ok(Json(MergeResponse {
        summary: outcome.report.summary(),
        outcome,
    }))
}
