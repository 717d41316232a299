//! Background tailoring pipeline.
//!
//! Flow: read original → preflight → extract context → metadata → generate →
//!       parse sections → subtitle override → tailor → write .tex → optional PDF.
//!
//! The engine steps are CPU-bound string work and run inside `spawn_blocking`.
//! Everything else awaits I/O or the model.

use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::prompts::{build_section_prompt, extract_context};
use crate::generation::reply::parse_sections;
use crate::jobs::store::LogLevel;
use crate::models::job::{TailorRequest, TailorResult};
use crate::state::AppState;
use crate::storage::confined_path;
use crate::tailoring::preflight::preflight;
use crate::tailoring::{tailor, TailorError, SUBTITLE_KEY};

/// Runs `job_id` on a detached task under the configured overall timeout.
pub fn spawn_job(state: AppState, job_id: Uuid) {
    tokio::spawn(async move {
        let timeout = state.config.job_timeout;
        match tokio::time::timeout(timeout, run_job(&state, job_id)).await {
            Ok(Ok(result)) => {
                info!(
                    "Job {job_id} completed: {} ({})",
                    result.tex_path, result.validation
                );
                state.jobs.complete(job_id, result).await;
            }
            Ok(Err(e)) => {
                state
                    .jobs
                    .fail(job_id, format!("Error: {e}"), e.to_string())
                    .await;
            }
            Err(_) => {
                let secs = timeout.as_secs();
                state
                    .jobs
                    .fail(
                        job_id,
                        format!(
                            "Job timed out after {secs} seconds. The model took too long to respond."
                        ),
                        format!("Timeout after {secs} seconds"),
                    )
                    .await;
            }
        }
    });
}

/// Runs a CPU-bound closure off the async executor.
async fn run_blocking<F, T>(label: &'static str, f: F) -> Result<T, AppError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in {label}: {e}")))
}

async fn run_job(state: &AppState, job_id: Uuid) -> Result<TailorResult, AppError> {
    let request: TailorRequest = state
        .jobs
        .get(job_id)
        .await
        .map(|job| job.request)
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;
    let policy = state.policy;
    let include_experience = request.include_experience;

    state
        .jobs
        .progress(job_id, 10, "Starting resume tailoring...")
        .await;
    let original = state
        .library
        .read_original(&request.original_resume_id)
        .await?;

    // ── preflight + prompt context ──────────────────────────────────────────
    let originals_dir = state.library.originals_dir().to_path_buf();
    let (original, context) = run_blocking("preflight", move || {
        let file_exists =
            |name: &str| confined_path(&originals_dir, name).is_some_and(|path| path.is_file());
        preflight(&original, &policy, file_exists)?;
        let context = extract_context(&original, &policy, include_experience);
        Ok::<_, TailorError>((original, context))
    })
    .await??;

    // ── metadata ────────────────────────────────────────────────────────────
    state
        .jobs
        .progress(job_id, 20, "Extracting job metadata...")
        .await;
    let metadata = state
        .generator
        .extract_metadata(&request.job_posting)
        .await
        .with_overrides(
            request.company_name.as_deref(),
            request.desired_title.as_deref(),
        );
    state
        .jobs
        .log(
            job_id,
            LogLevel::Info,
            format!(
                "Company: {}, Position: {}",
                metadata.company, metadata.position
            ),
        )
        .await;

    // ── generation ──────────────────────────────────────────────────────────
    state
        .jobs
        .progress(job_id, 30, "Generating tailored sections...")
        .await;
    let prompt = build_section_prompt(&request.job_posting, &context, include_experience, &policy);
    let reply = state.generator.generate_sections(&prompt).await?;
    let text = reply
        .resolve_text()
        .ok_or_else(|| AppError::Llm("generator returned an empty reply".to_string()))?;

    let mut sections = parse_sections(&text, include_experience, &policy);
    if let Some(title) = request
        .desired_title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
    {
        sections.insert(SUBTITLE_KEY, title);
    }
    if let Some(subtitle) = sections.get(SUBTITLE_KEY) {
        let line = format!("Subtitle: {subtitle}");
        state.jobs.log(job_id, LogLevel::Info, line).await;
    }
    if sections.is_empty() {
        return Err(AppError::Llm(
            "generator output contained no recognizable sections".to_string(),
        ));
    }

    // ── merge ───────────────────────────────────────────────────────────────
    state
        .jobs
        .progress(
            job_id,
            60,
            &format!("Merging {} generated section(s)...", sections.len()),
        )
        .await;
    let outcome = run_blocking("tailor", move || tailor(&original, &sections, &policy)).await??;

    let summary = outcome.report.summary();
    let level = if outcome.report.is_valid {
        LogLevel::Info
    } else {
        LogLevel::Warning
    };
    state.jobs.log(job_id, level, summary.clone()).await;

    let result_id = metadata.file_stem();
    let tex_path = state
        .library
        .write_result(&result_id, &outcome.document)
        .await?;

    // ── render ──────────────────────────────────────────────────────────────
    let mut pdf_path = None;
    let mut pdf_error = None;
    if request.render_pdf {
        match outcome.report.ensure_valid() {
            Ok(()) => {
                state.jobs.progress(job_id, 80, "Compiling PDF...").await;
                match state.renderer.compile(&tex_path).await {
                    Ok(path) => pdf_path = Some(path.display().to_string()),
                    Err(e) => {
                        state
                            .jobs
                            .log(job_id, LogLevel::Warning, format!("PDF rendering failed: {e}"))
                            .await;
                        pdf_error = Some(e.to_string());
                    }
                }
            }
            Err(invalid) => {
                let reason = format!("PDF rendering skipped: {invalid}");
                state.jobs.log(job_id, LogLevel::Warning, reason.clone()).await;
                pdf_error = Some(reason);
            }
        }
    }

    state.jobs.progress(job_id, 90, "Finalizing...").await;

    Ok(TailorResult {
        result_id,
        tex_path: tex_path.display().to_string(),
        pdf_path,
        company: metadata.company,
        position: metadata.position,
        validation: summary,
        report: outcome.report,
        sections_applied: outcome.sections_applied,
        pdf_error,
    })
}
