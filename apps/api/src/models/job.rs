use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::tailoring::validator::ValidationReport;

pub const MIN_JOB_POSTING_CHARS: usize = 50;
pub const MAX_OVERRIDE_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: String,
    pub message: String,
}

fn default_render_pdf() -> bool {
    true
}

/// Body of `POST /api/v1/tailor`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TailorRequest {
    pub job_posting: String,
    pub original_resume_id: String,
    #[serde(default)]
    pub include_experience: bool,
    #[serde(default = "default_render_pdf")]
    pub render_pdf: bool,
    /// Overrides the extracted company name.
    #[serde(default)]
    pub company_name: Option<String>,
    /// Overrides the generated subtitle and the extracted position.
    #[serde(default)]
    pub desired_title: Option<String>,
}

impl TailorRequest {
    /// Field-level checks; returns the first problem found.
    pub fn check(&self) -> Result<(), String> {
        let posting_chars = self.job_posting.trim().chars().count();
        if posting_chars < MIN_JOB_POSTING_CHARS {
            return Err(format!(
                "job_posting must be at least {MIN_JOB_POSTING_CHARS} characters (got {posting_chars})"
            ));
        }
        if self.original_resume_id.trim().is_empty() {
            return Err("original_resume_id cannot be empty".to_string());
        }
        for (field, value) in [
            ("company_name", &self.company_name),
            ("desired_title", &self.desired_title),
        ] {
            if let Some(value) = value {
                if value.chars().count() > MAX_OVERRIDE_CHARS {
                    return Err(format!(
                        "{field} must be at most {MAX_OVERRIDE_CHARS} characters"
                    ));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TailorResult {
    pub result_id: String,
    pub tex_path: String,
    pub pdf_path: Option<String>,
    pub company: String,
    pub position: String,
    /// One-line validation summary.
    pub validation: String,
    pub report: ValidationReport,
    pub sections_applied: Vec<String>,
    /// Why no PDF was produced, when one was requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_error: Option<String>,
}

/// In-memory record of a single tailoring job. Plain data only.
#[derive(Debug, Clone)]
pub struct JobRecord {
    pub id: Uuid,
    pub status: JobStatus,
    pub progress: u8,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub request: TailorRequest,
    pub result: Option<TailorResult>,
    pub error: Option<String>,
    pub logs: Vec<LogEntry>,
}

impl JobRecord {
    pub fn new(request: TailorRequest) -> Self {
        Self {
            id: Uuid::new_v4(),
            status: JobStatus::Pending,
            progress: 0,
            message: "Job created".to_string(),
            created_at: Utc::now(),
            completed_at: None,
            request,
            result: None,
            error: None,
            logs: Vec::new(),
        }
    }

    pub fn status_view(&self) -> JobStatusResponse {
        JobStatusResponse {
            job_id: self.id,
            status: self.status,
            progress: self.progress,
            message: self.message.clone(),
            created_at: self.created_at,
            completed_at: self.completed_at,
            result: self.result.clone(),
            error: self.error.clone(),
            logs: self.logs.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JobResponse {
    pub job_id: Uuid,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobStatusResponse {
    pub job_id: Uuid,
    pub status: JobStatus,
    pub progress: u8,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub result: Option<TailorResult>,
    pub error: Option<String>,
    pub logs: Vec<LogEntry>,
}
