// Shared test doubles: a scripted generator and a temp-dir backed AppState.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::config::Config;
use crate::errors::AppError;
use crate::generation::generator::SectionGenerator;
use crate::generation::metadata::JobMetadata;
use crate::generation::reply::GenerationReply;
use crate::state::AppState;

/// Generator reply that tailors `SAMPLE_RESUME`.
pub const LABELLED_REPLY: &str = r"SUBTITLE:
Platform Engineer

PROFESSIONAL SUMMARY:
\section{\faUser}{Professional Summary}
Platform engineer with 7 years of experience running \textbf{Kubernetes} at scale.

TECHNICAL PROFICIENCIES:
\section{\faCode}{Technical Proficiencies}
\resumeEntryStart \resumeEntryS{Platforms}{\textbf{Kubernetes}, Terraform, AWS} \resumeEntryEnd

OPTIONAL EXPERIENCE:
SKIP
";

/// Returns a fixed reply after an optional delay and records every prompt.
pub struct ScriptedGenerator {
    pub metadata: JobMetadata,
    pub reply: Result<String, String>,
    pub delay: Duration,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn replying(reply: &str) -> Self {
        Self {
            metadata: JobMetadata {
                company: "Acme".to_string(),
                position: "Platform Engineer".to_string(),
            },
            reply: Ok(reply.to_string()),
            delay: Duration::ZERO,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            ..Self::replying("")
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::replying(LABELLED_REPLY)
        }
    }
}

#[async_trait]
impl SectionGenerator for ScriptedGenerator {
    fn provider(&self) -> Option<&'static str> {
        Some("scripted")
    }

    async fn extract_metadata(&self, _job_posting: &str) -> JobMetadata {
        self.metadata.clone()
    }

    async fn generate_sections(&self, prompt: &str) -> Result<GenerationReply, AppError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.reply
            .clone()
            .map(GenerationReply::Plain)
            .map_err(AppError::Llm)
    }
}

/// State rooted in `dir`, with a compiler binary that never exists.
pub fn test_state(dir: &tempfile::TempDir, generator: Arc<dyn SectionGenerator>) -> AppState {
    let data_dir = dir.path().display().to_string();
    let mut config = Config::from_lookup(|key| match key {
        "DATA_DIR" => Some(data_dir.clone()),
        "PDFLATEX_BIN" => Some("tailor-test-missing-pdflatex".to_string()),
        _ => None,
    })
    .expect("test config");
    config.job_timeout = Duration::from_secs(5);
    AppState::new(config, generator)
}

/// A posting long enough to pass request checks.
pub fn job_posting() -> String {
    "Acme is hiring a Platform Engineer to run Kubernetes clusters, \
     automate Terraform and own AWS infrastructure."
        .to_string()
}
