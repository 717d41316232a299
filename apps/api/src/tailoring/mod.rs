//! Tailoring engine: section surgery on a single-file LaTeX resume.
//!
//! Flow: preflight → locate/extract (prompt context) → [model generation] →
//!       normalize → merge → sanitize → validate.
//!
//! Every operation here is a pure function over document text: no I/O, no shared
//! state, no async. Callers run the pipeline inside `tokio::task::spawn_blocking`.
//! Offsets are never cached across mutations; each step re-locates against the
//! text it was handed.

pub mod handlers;
pub mod locator;
pub mod merger;
pub mod normalizer;
pub mod preflight;
pub mod sanitizer;
pub mod validator;

#[cfg(test)]
pub(crate) mod fixtures;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::tailoring::validator::ValidationReport;

/// Section header command. Headers take the form `\section{<icon>}{<name>}`.
pub const SECTION_COMMAND: &str = "\\section{";
pub const BEGIN_DOCUMENT: &str = "\\begin{document}";
pub const END_DOCUMENT: &str = "\\end{document}";

/// Reserved `SectionMap` key for the document subtitle.
pub const SUBTITLE_KEY: &str = "subtitle";

// ────────────────────────────────────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────────────────────────────────────

/// Failures the engine surfaces to the orchestration layer.
///
/// Normalizer and sanitizer never fail; only preflight, merge and the
/// post-merge validity check produce these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TailorError {
    #[error("{reason}")]
    PreflightRejected {
        reason: String,
        packages: Vec<String>,
        missing_files: Vec<String>,
    },

    #[error("section not found: {0}")]
    SectionNotFound(String),

    #[error("subtitle definition missing")]
    SubtitleMissing,

    #[error(
        "structurally invalid document: {open_braces} open / {close_braces} close braces, \
         begin marker present: {has_begin_document}, end marker present: {has_end_document}"
    )]
    StructuralInvalid {
        open_braces: usize,
        close_braces: usize,
        has_begin_document: bool,
        has_end_document: bool,
    },
}

// ────────────────────────────────────────────────────────────────────────────
// Section policy
// ────────────────────────────────────────────────────────────────────────────

/// Names the sections that carry special cleanup rules.
///
/// `RESUME` matches the supported template. Tests and alternative templates
/// can build their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionPolicy {
    /// Year-count phrases are stripped from this section.
    pub summary_section: &'static str,
    /// `\textbf{}` wrappers are unwrapped in this section.
    pub skills_section: &'static str,
    pub experience_section: &'static str,
    /// Preflight rejects only when ALL of these are absent.
    pub required_sections: &'static [&'static str],
    /// Section whose duplicate blocks the sanitizer collapses.
    pub dedup_section: &'static str,
    /// `(section, anchor)`: move `section` directly after `anchor`.
    pub reposition: Option<(&'static str, &'static str)>,
    pub document_class: &'static str,
}

impl SectionPolicy {
    pub const RESUME: SectionPolicy = SectionPolicy {
        summary_section: "Professional Summary",
        skills_section: "Technical Proficiencies",
        experience_section: "Professional Experience",
        required_sections: &["Professional Summary", "Technical Proficiencies"],
        dedup_section: "Technical Proficiencies",
        reposition: Some(("Technical Proficiencies", "Professional Experience")),
        document_class: "article",
    };
}

impl Default for SectionPolicy {
    fn default() -> Self {
        Self::RESUME
    }
}

// ────────────────────────────────────────────────────────────────────────────
// SectionMap
// ────────────────────────────────────────────────────────────────────────────

/// Replacement content keyed by section name, plus the optional subtitle.
///
/// Insertion order is the merge order. Placement in the document always follows
/// the first existing header with that name, never the map order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionMap {
    pub subtitle: Option<String>,
    sections: Vec<(String, String)>,
}

impl SectionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces content for `name`. The reserved subtitle key is
    /// routed to `subtitle`.
    pub fn insert(&mut self, name: impl Into<String>, content: impl Into<String>) {
        let name = name.into();
        let content = content.into();
        if name == SUBTITLE_KEY {
            self.subtitle = Some(content);
            return;
        }
        match self.sections.iter_mut().find(|(n, _)| *n == name) {
            Some(existing) => existing.1 = content,
            None => self.sections.push((name, content)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        if name == SUBTITLE_KEY {
            return self.subtitle.as_deref();
        }
        self.sections
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c.as_str())
    }

    /// Section entries in insertion order (subtitle excluded).
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.sections.iter().map(|(n, c)| (n.as_str(), c.as_str()))
    }

    pub fn section_names(&self) -> Vec<String> {
        self.sections.iter().map(|(n, _)| n.clone()).collect()
    }

    /// Number of entries including the subtitle.
    pub fn len(&self) -> usize {
        self.sections.len() + usize::from(self.subtitle.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline
// ────────────────────────────────────────────────────────────────────────────

/// Result of a successful tailoring pass. The document is returned even when
/// `report.is_valid` is false; the caller decides what to do with it.
#[derive(Debug, Clone, Serialize)]
pub struct TailorOutcome {
    pub document: String,
    pub report: ValidationReport,
    /// Section names replaced, in merge order. `subtitle` is listed first when set.
    pub sections_applied: Vec<String>,
}

/// Runs normalize → merge → sanitize → validate over `document`.
///
/// Preflight is NOT run here; it must happen before prompt extraction.
pub fn tailor(
    document: &str,
    generated: &SectionMap,
    policy: &SectionPolicy,
) -> Result<TailorOutcome, TailorError> {
    let mut normalized = SectionMap::new();
    if let Some(subtitle) = &generated.subtitle {
        normalized.insert(SUBTITLE_KEY, subtitle.trim());
    }
    for (name, raw) in generated.iter() {
        normalized.insert(name, normalizer::normalize(name, raw, policy));
    }

    let merged = merger::merge(document, &normalized)?;
    let sanitized = sanitizer::sanitize(&merged, policy);
    let report = validator::validate(&sanitized);

    let mut sections_applied = Vec::with_capacity(normalized.len());
    if normalized.subtitle.is_some() {
        sections_applied.push(SUBTITLE_KEY.to_string());
    }
    sections_applied.extend(normalized.section_names());

    debug!(
        "Tailored {} section(s); validation: {}",
        sections_applied.len(),
        report.summary()
    );

    Ok(TailorOutcome {
        document: sanitized,
        report,
        sections_applied,
    })
}
