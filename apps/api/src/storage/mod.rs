//! File-backed resume library under `DATA_DIR`.
//!
//! `original/` holds uploaded `.tex` sources, `tailored_resumes/` holds outputs.
//! Ids are file stems and are checked before any path is built from them.

pub mod handlers;

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info};

use crate::models::library::{ResultInfo, ResumeInfo};

pub const TEX_EXTENSION: &str = "tex";
pub const PDF_EXTENSION: &str = "pdf";
const MAX_ID_CHARS: usize = 200;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    InvalidName(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultKind {
    Tex,
    Pdf,
}

impl ResultKind {
    pub fn extension(self) -> &'static str {
        match self {
            ResultKind::Tex => TEX_EXTENSION,
            ResultKind::Pdf => PDF_EXTENSION,
        }
    }

    pub fn media_type(self) -> &'static str {
        match self {
            ResultKind::Tex => "application/x-tex",
            ResultKind::Pdf => "application/pdf",
        }
    }
}

/// Rejects anything that could escape the data directory.
pub fn check_id(id: &str) -> Result<(), StorageError> {
    let valid = !id.is_empty()
        && id.chars().count() <= MAX_ID_CHARS
        && !id.starts_with('.')
        && !id.contains("..")
        && id
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ' '));
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidName(format!("invalid identifier '{id}'")))
    }
}

/// `name` joined under `root`, or `None` when it is absolute or steps outside
/// `root`. Used for paths taken from document content.
pub fn confined_path(root: &Path, name: &str) -> Option<PathBuf> {
    let relative = Path::new(name);
    let mut components = relative.components().peekable();
    components.peek()?;
    components
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        .then(|| root.join(relative))
}

#[derive(Debug, Clone)]
pub struct Library {
    originals: PathBuf,
    results: PathBuf,
}

impl Library {
    pub fn new(originals: impl Into<PathBuf>, results: impl Into<PathBuf>) -> Self {
        Self {
            originals: originals.into(),
            results: results.into(),
        }
    }

    pub fn originals_dir(&self) -> &Path {
        &self.originals
    }

    pub async fn ensure_dirs(&self) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.originals).await?;
        tokio::fs::create_dir_all(&self.results).await?;
        Ok(())
    }

    // ── originals ───────────────────────────────────────────────────────────

    pub fn original_path(&self, id: &str) -> Result<PathBuf, StorageError> {
        check_id(id)?;
        Ok(self.originals.join(format!("{id}.{TEX_EXTENSION}")))
    }

    pub async fn original_exists(&self, id: &str) -> bool {
        match self.original_path(id) {
            Ok(path) => tokio::fs::try_exists(path).await.unwrap_or(false),
            Err(_) => false,
        }
    }

    pub async fn read_original(&self, id: &str) -> Result<String, StorageError> {
        let path = self.original_path(id)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(format!("Resume '{id}'")))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Newest first.
    pub async fn list_originals(&self) -> Result<Vec<ResumeInfo>, StorageError> {
        let mut resumes = Vec::new();
        for (path, meta) in list_files(&self.originals).await? {
            if path.extension().and_then(|e| e.to_str()) != Some(TEX_EXTENSION) {
                continue;
            }
            let (Some(id), Some(filename)) = (file_stem(&path), file_name(&path)) else {
                continue;
            };
            resumes.push(ResumeInfo {
                id,
                filename,
                size: meta.len(),
                modified_at: modified_at(&meta),
            });
        }
        resumes.sort_by(|a, b| b.modified_at.cmp(&a.modified_at));
        Ok(resumes)
    }

    pub async fn list_original_ids(&self) -> Vec<String> {
        self.list_originals()
            .await
            .map(|list| list.into_iter().map(|r| r.id).collect())
            .unwrap_or_default()
    }

    /// Stores an uploaded `.tex` file, replacing any file with the same name.
    pub async fn save_original(&self, filename: &str, bytes: &[u8]) -> Result<ResumeInfo, StorageError> {
        let Some(id) = filename.strip_suffix(".tex") else {
            return Err(StorageError::InvalidName(
                "Only .tex files are allowed".to_string(),
            ));
        };
        check_id(id)?;

        tokio::fs::create_dir_all(&self.originals).await?;
        let path = self.original_path(id)?;
        tokio::fs::write(&path, bytes).await?;
        info!("Stored original resume {} ({} bytes)", path.display(), bytes.len());

        let meta = tokio::fs::metadata(&path).await?;
        Ok(ResumeInfo {
            id: id.to_string(),
            filename: filename.to_string(),
            size: meta.len(),
            modified_at: modified_at(&meta),
        })
    }

    // ── results ─────────────────────────────────────────────────────────────

    pub fn result_path(&self, id: &str, kind: ResultKind) -> Result<PathBuf, StorageError> {
        check_id(id)?;
        Ok(self.results.join(format!("{id}.{}", kind.extension())))
    }

    pub async fn write_result(&self, id: &str, document: &str) -> Result<PathBuf, StorageError> {
        tokio::fs::create_dir_all(&self.results).await?;
        let path = self.result_path(id, ResultKind::Tex)?;
        tokio::fs::write(&path, document).await?;
        debug!("Wrote tailored resume {}", path.display());
        Ok(path)
    }

    pub async fn read_result(&self, id: &str, kind: ResultKind) -> Result<Vec<u8>, StorageError> {
        let path = self.result_path(id, kind)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StorageError::NotFound(
                format!("Result {id}.{}", kind.extension()),
            )),
            Err(e) => Err(e.into()),
        }
    }

    /// Results grouped by stem, newest first.
    pub async fn list_results(&self) -> Result<Vec<ResultInfo>, StorageError> {
        let mut groups: BTreeMap<String, ResultInfo> = BTreeMap::new();
        for (path, meta) in list_files(&self.results).await? {
            let kind = match path.extension().and_then(|e| e.to_str()) {
                Some(TEX_EXTENSION) => ResultKind::Tex,
                Some(PDF_EXTENSION) => ResultKind::Pdf,
                _ => continue,
            };
            let Some(stem) = file_stem(&path) else {
                continue;
            };

            let entry = groups.entry(stem.clone()).or_insert_with(|| {
                let (company, position) = split_stem(&stem);
                ResultInfo {
                    id: stem,
                    company,
                    position,
                    created_at: modified_at(&meta),
                    has_tex: false,
                    has_pdf: false,
                    tex_size: None,
                    pdf_size: None,
                }
            });
            match kind {
                ResultKind::Tex => {
                    entry.has_tex = true;
                    entry.tex_size = Some(meta.len());
                    entry.created_at = modified_at(&meta);
                }
                ResultKind::Pdf => {
                    entry.has_pdf = true;
                    entry.pdf_size = Some(meta.len());
                }
            }
        }

        let mut results: Vec<ResultInfo> = groups.into_values().collect();
        results.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(results)
    }

    /// Deletes both files of a result. Returns the removed extensions.
    pub async fn delete_result(&self, id: &str) -> Result<Vec<String>, StorageError> {
        let mut deleted = Vec::new();
        for kind in [ResultKind::Tex, ResultKind::Pdf] {
            let path = self.result_path(id, kind)?;
            match tokio::fs::remove_file(&path).await {
                Ok(()) => deleted.push(format!(".{}", kind.extension())),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        if deleted.is_empty() {
            return Err(StorageError::NotFound(format!("Result {id}")));
        }
        info!("Deleted {} for result {id}", deleted.join(", "));
        Ok(deleted)
    }
}

/// `Company_Position...` → (`Company`, `Position...`).
fn split_stem(stem: &str) -> (String, String) {
    match stem.split_once('_') {
        Some((company, position)) if !company.is_empty() && !position.is_empty() => {
            (company.to_string(), position.to_string())
        }
        _ => ("Unknown".to_string(), "Unknown".to_string()),
    }
}

async fn list_files(dir: &Path) -> Result<Vec<(PathBuf, std::fs::Metadata)>, StorageError> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let meta = entry.metadata().await?;
        if meta.is_file() {
            files.push((entry.path(), meta));
        }
    }
    Ok(files)
}

fn file_stem(path: &Path) -> Option<String> {
    path.file_stem().and_then(|s| s.to_str()).map(str::to_string)
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name().and_then(|s| s.to_str()).map(str::to_string)
}

fn modified_at(meta: &std::fs::Metadata) -> DateTime<Utc> {
    meta.modified().map(DateTime::<Utc>::from).unwrap_or_else(|_| Utc::now())
}
