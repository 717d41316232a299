use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An uploaded original resume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeInfo {
    /// File name without the `.tex` extension.
    pub id: String,
    pub filename: String,
    pub size: u64,
    pub modified_at: DateTime<Utc>,
}

/// A tailored output, grouped by file stem across `.tex` and `.pdf`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultInfo {
    pub id: String,
    pub company: String,
    pub position: String,
    pub created_at: DateTime<Utc>,
    pub has_tex: bool,
    pub has_pdf: bool,
    pub tex_size: Option<u64>,
    pub pdf_size: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub resume_id: String,
    pub filename: String,
    pub size: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub message: String,
    pub deleted_files: Vec<String>,
}
