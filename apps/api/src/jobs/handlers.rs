//! Axum route handlers for tailoring jobs.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::errors::AppError;
use crate::jobs::runner::spawn_job;
use crate::models::job::{JobResponse, JobStatusResponse, TailorRequest};
use crate::state::AppState;

/// POST /api/v1/tailor
///
/// Validates the request, registers a job and starts it in the background.
/// Returns 202 with the job id; poll `/api/v1/jobs/:id/status` for progress.
pub async fn handle_tailor(
    State(state): State<AppState>,
    Json(request): Json<TailorRequest>,
) -> Result<(StatusCode, Json<JobResponse>), AppError> {
    request.check().map_err(AppError::Validation)?;

    if !state.library.original_exists(&request.original_resume_id).await {
        let available = state.library.list_original_ids().await;
        return Err(AppError::NotFound(format!(
            "Resume '{}' not found. Available resumes: [{}]",
            request.original_resume_id,
            available.join(", ")
        )));
    }
    if state.generator.provider().is_none() {
        return Err(AppError::Unavailable(
            "no model provider configured (set ANTHROPIC_API_KEY)".to_string(),
        ));
    }

    let job = state.jobs.create(request).await;
    spawn_job(state.clone(), job.id);

    Ok((
        StatusCode::ACCEPTED,
        Json(JobResponse {
            job_id: job.id,
            status: job.status,
            created_at: job.created_at,
            message: format!(
                "Job submitted successfully. Check status at /api/v1/jobs/{}/status",
                job.id
            ),
        }),
    ))
}

/// GET /api/v1/jobs/:id/status
pub async fn handle_job_status(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<JobStatusResponse>, AppError> {
    let job = state
        .jobs
        .get(job_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;
    Ok(Json(job.status_view()))
}
