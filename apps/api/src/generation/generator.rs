//! Section generation seam.
//!
//! `AppState` holds an `Arc<dyn SectionGenerator>`. The Anthropic-backed
//! implementation is used when an API key is configured; otherwise
//! `UnavailableGenerator` rejects every job up front.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::generation::metadata::{JobMetadata, RawMetadata};
use crate::generation::prompts::{build_metadata_prompt, SECTION_SYSTEM};
use crate::generation::reply::GenerationReply;
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::LlmClient;

#[async_trait]
pub trait SectionGenerator: Send + Sync {
    /// Provider name reported by `/health`, `None` when generation is off.
    fn provider(&self) -> Option<&'static str>;

    /// Never fails: extraction errors fall back to the unknown placeholders.
    async fn extract_metadata(&self, job_posting: &str) -> JobMetadata;

    async fn generate_sections(&self, prompt: &str) -> Result<GenerationReply, AppError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Anthropic-backed generator
// ────────────────────────────────────────────────────────────────────────────

pub struct LlmSectionGenerator {
    llm: LlmClient,
    system_prompt: String,
}

impl LlmSectionGenerator {
    /// `system_prompt` overrides the built-in section system prompt.
    pub fn new(llm: LlmClient, system_prompt: Option<String>) -> Self {
        Self {
            llm,
            system_prompt: system_prompt.unwrap_or_else(|| SECTION_SYSTEM.to_string()),
        }
    }
}

#[async_trait]
impl SectionGenerator for LlmSectionGenerator {
    fn provider(&self) -> Option<&'static str> {
        Some("anthropic")
    }

    async fn extract_metadata(&self, job_posting: &str) -> JobMetadata {
        let prompt = build_metadata_prompt(job_posting);
        match self.llm.call_json::<RawMetadata>(&prompt, JSON_ONLY_SYSTEM).await {
            Ok(raw) => {
                let metadata = JobMetadata::from(raw);
                info!(
                    "Extracted job metadata: company={}, position={}",
                    metadata.company, metadata.position
                );
                metadata
            }
            Err(e) => {
                warn!("Metadata extraction failed, using fallback values: {e}");
                JobMetadata::default()
            }
        }
    }

    async fn generate_sections(&self, prompt: &str) -> Result<GenerationReply, AppError> {
        let text = self
            .llm
            .call_text(prompt, &self.system_prompt)
            .await
            .map_err(|e| AppError::Llm(format!("Section generation failed: {e}")))?;
        Ok(GenerationReply::Plain(text))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// No provider configured
// ────────────────────────────────────────────────────────────────────────────

pub struct UnavailableGenerator;

#[async_trait]
impl SectionGenerator for UnavailableGenerator {
    fn provider(&self) -> Option<&'static str> {
        None
    }

    async fn extract_metadata(&self, _job_posting: &str) -> JobMetadata {
        JobMetadata::default()
    }

    async fn generate_sections(&self, _prompt: &str) -> Result<GenerationReply, AppError> {
        Err(AppError::Llm(
            "no model provider configured (set ANTHROPIC_API_KEY)".to_string(),
        ))
    }
}
