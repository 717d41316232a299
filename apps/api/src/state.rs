use std::sync::Arc;

use crate::config::Config;
use crate::generation::generator::SectionGenerator;
use crate::jobs::store::JobStore;
use crate::render::PdfRenderer;
use crate::storage::Library;
use crate::tailoring::SectionPolicy;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable section generator. Anthropic-backed when a key is configured.
    pub generator: Arc<dyn SectionGenerator>,
    pub renderer: PdfRenderer,
    pub library: Library,
    pub jobs: JobStore,
    /// Which sections the engine treats specially.
    pub policy: SectionPolicy,
}

impl AppState {
    pub fn new(config: Config, generator: Arc<dyn SectionGenerator>) -> Self {
        Self {
            renderer: PdfRenderer::new(config.pdflatex_bin.clone(), config.compile_timeout),
            library: Library::new(config.originals_dir(), config.results_dir()),
            jobs: JobStore::new(config.max_job_age),
            policy: SectionPolicy::RESUME,
            generator,
            config,
        }
    }
}
