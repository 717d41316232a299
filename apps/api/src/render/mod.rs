//! PDF rendering through an external `pdflatex` binary.
//!
//! The compiler runs in the directory of the `.tex` file and writes the PDF
//! next to it. Intermediate `.aux`/`.log`/`.out` files are removed on success.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info, warn};

const VERSION_PROBE_TIMEOUT: Duration = Duration::from_secs(5);
const ERROR_EXCERPT_CHARS: usize = 500;
const INTERMEDIATE_EXTENSIONS: [&str; 3] = ["aux", "log", "out"];

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("TeX file not found: {0}")]
    SourceMissing(PathBuf),

    #[error("{0} not found. Install a LaTeX distribution (TeX Live, MiKTeX or MacTeX)")]
    CompilerMissing(String),

    #[error("{0} version check timed out")]
    ProbeTimeout(String),

    #[error("PDF compilation timed out after {0}s; check the LaTeX for errors")]
    Timeout(u64),

    #[error("PDF generation failed:\n{0}")]
    CompileFailed(String),

    #[error("failed to run compiler: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct PdfRenderer {
    binary: String,
    timeout: Duration,
}

impl PdfRenderer {
    pub fn new(binary: impl Into<String>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }

    /// Checks that the compiler binary runs at all.
    pub async fn probe(&self) -> Result<(), RenderError> {
        let output = Command::new(&self.binary)
            .arg("--version")
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        match tokio::time::timeout(VERSION_PROBE_TIMEOUT, output).await {
            Err(_) => Err(RenderError::ProbeTimeout(self.binary.clone())),
            Ok(Err(_)) => Err(RenderError::CompilerMissing(self.binary.clone())),
            Ok(Ok(out)) if !out.status.success() => {
                Err(RenderError::CompilerMissing(self.binary.clone()))
            }
            Ok(Ok(_)) => Ok(()),
        }
    }

    /// Compiles `tex_path` and returns the path of the produced PDF.
    pub async fn compile(&self, tex_path: &Path) -> Result<PathBuf, RenderError> {
        if !tokio::fs::try_exists(tex_path).await.unwrap_or(false) {
            return Err(RenderError::SourceMissing(tex_path.to_path_buf()));
        }
        self.probe().await?;

        let tex_path = tokio::fs::canonicalize(tex_path).await?;
        let output_dir = tex_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let file_name = tex_path
            .file_name()
            .ok_or_else(|| RenderError::SourceMissing(tex_path.clone()))?;

        debug!("Running {} on {}", self.binary, tex_path.display());
        let output = Command::new(&self.binary)
            .arg("-interaction=nonstopmode")
            .arg(format!("-output-directory={}", output_dir.display()))
            .arg(file_name)
            .current_dir(&output_dir)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, output)
            .await
            .map_err(|_| RenderError::Timeout(self.timeout.as_secs()))??;

        let pdf_path = tex_path.with_extension("pdf");
        if !tokio::fs::try_exists(&pdf_path).await.unwrap_or(false) {
            let log = if output.stderr.is_empty() {
                &output.stdout
            } else {
                &output.stderr
            };
            return Err(RenderError::CompileFailed(error_excerpt(
                &String::from_utf8_lossy(log),
            )));
        }

        for ext in INTERMEDIATE_EXTENSIONS {
            let path = tex_path.with_extension(ext);
            if let Err(e) = tokio::fs::remove_file(&path).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!("Could not remove {}: {e}", path.display());
                }
            }
        }

        info!("PDF created: {}", pdf_path.display());
        Ok(pdf_path)
    }
}

fn error_excerpt(log: &str) -> String {
    log.chars().take(ERROR_EXCERPT_CHARS).collect()
}
