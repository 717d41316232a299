//! Job metadata: company and position, used for result naming.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const UNKNOWN_COMPANY: &str = "Unknown_Company";
pub const UNKNOWN_POSITION: &str = "Unknown_Position";

const STEM_PART_MAX_CHARS: usize = 50;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));
static UNDERSCORES: Lazy<Regex> = Lazy::new(|| Regex::new(r"_+").expect("valid underscore regex"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobMetadata {
    pub company: String,
    pub position: String,
}

impl Default for JobMetadata {
    fn default() -> Self {
        Self {
            company: UNKNOWN_COMPANY.to_string(),
            position: UNKNOWN_POSITION.to_string(),
        }
    }
}

/// Shape the model is asked to return. Missing fields fall back individually.
#[derive(Debug, Default, Deserialize)]
pub struct RawMetadata {
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
}

impl From<RawMetadata> for JobMetadata {
    fn from(raw: RawMetadata) -> Self {
        let pick = |value: Option<String>, fallback: &str| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| fallback.to_string())
        };
        Self {
            company: pick(raw.company, UNKNOWN_COMPANY),
            position: pick(raw.position, UNKNOWN_POSITION),
        }
    }
}

impl JobMetadata {
    /// Caller-supplied values win over extracted ones when non-blank.
    pub fn with_overrides(mut self, company: Option<&str>, position: Option<&str>) -> Self {
        if let Some(company) = company.map(str::trim).filter(|c| !c.is_empty()) {
            self.company = company.to_string();
        }
        if let Some(position) = position.map(str::trim).filter(|p| !p.is_empty()) {
            self.position = position.to_string();
        }
        self
    }

    pub fn file_stem(&self) -> String {
        result_file_stem(&self.company, &self.position)
    }
}

/// Keeps only characters a result id may carry. Combining marks are dropped.
fn sanitize_part(text: &str) -> String {
    let text: String = text
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || matches!(c, '_' | '-'))
        .collect();
    let text = WHITESPACE.replace_all(text.trim(), "_");
    let text = UNDERSCORES.replace_all(&text, "_");
    let capped: String = text.chars().take(STEM_PART_MAX_CHARS).collect();
    capped.trim_matches('_').to_string()
}

/// `Company_Position`, safe for use as a file name.
pub fn result_file_stem(company: &str, position: &str) -> String {
    let company = sanitize_part(company);
    let position = sanitize_part(position);
    match (company.is_empty(), position.is_empty()) {
        (false, false) => format!("{company}_{position}"),
        (false, true) => company,
        (true, false) => position,
        (true, true) => "resume".to_string(),
    }
}
