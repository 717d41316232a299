//! Axum route handlers for the resume library.

use axum::{
    extract::{Multipart, Path, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use tracing::info;

use crate::errors::AppError;
use crate::models::library::{DeleteResponse, ResultInfo, ResumeInfo, UploadResponse};
use crate::state::AppState;
use crate::storage::ResultKind;

/// GET /api/v1/resumes
pub async fn handle_list_resumes(
    State(state): State<AppState>,
) -> Result<Json<Vec<ResumeInfo>>, AppError> {
    Ok(Json(state.library.list_originals().await?))
}

/// POST /api/v1/resumes/upload
///
/// Multipart upload; the first part carrying a file name is stored.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;

        let stored = state.library.save_original(&filename, &bytes).await?;
        info!("Uploaded resume '{}'", stored.id);
        return Ok(Json(UploadResponse {
            message: "Resume uploaded successfully".to_string(),
            resume_id: stored.id,
            filename: stored.filename,
            size: stored.size,
        }));
    }

    Err(AppError::Validation(
        "multipart body must contain a .tex file".to_string(),
    ))
}

/// GET /api/v1/results
pub async fn handle_list_results(
    State(state): State<AppState>,
) -> Result<Json<Vec<ResultInfo>>, AppError> {
    Ok(Json(state.library.list_results().await?))
}

/// GET /api/v1/results/:id/tex
pub async fn handle_download_tex(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    download(&state, &id, ResultKind::Tex).await
}

/// GET /api/v1/results/:id/pdf
pub async fn handle_download_pdf(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    download(&state, &id, ResultKind::Pdf).await
}

async fn download(state: &AppState, id: &str, kind: ResultKind) -> Result<Response, AppError> {
    let bytes = state.library.read_result(id, kind).await?;
    let disposition = format!("attachment; filename=\"{id}.{}\"", kind.extension());
    let disposition = HeaderValue::from_str(&disposition)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("invalid content disposition: {e}")))?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(kind.media_type())),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

/// DELETE /api/v1/results/:id
pub async fn handle_delete_result(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    let deleted_files = state.library.delete_result(&id).await?;
    Ok(Json(DeleteResponse {
        message: format!("Deleted {} files for {id}", deleted_files.join(", ")),
        deleted_files,
    }))
}
