//! Structural Validator: brace, marker and environment consistency checks.
//!
//! Advisory only: the report is handed back with the document and nothing is
//! auto-repaired. `validate` is the post-merge check; `validate_extended` is
//! the fuller checker exposed on its own endpoint.

use std::collections::BTreeMap;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::tailoring::{TailorError, BEGIN_DOCUMENT, END_DOCUMENT};

static BEGIN_ENV: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\begin\{(\w+)\}").expect("valid begin regex"));
static END_ENV: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\end\{(\w+)\}").expect("valid end regex"));
static HREF: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\href").expect("valid href regex"));
static HREF_WELL_FORMED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\href\{[^}]*\}\{[^}]*\}").expect("valid href shape regex"));

/// A problem that makes the document invalid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationIssue {
    UnbalancedBraces { open: usize, close: usize },
    UnbalancedBrackets { open: usize, close: usize },
    MissingMarker { marker: String },
    DuplicateMarker { marker: String, count: usize },
    UnbalancedEnvironment { name: String, begins: usize, ends: usize },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnbalancedBraces { open, close } => {
                write!(f, "Unbalanced braces: {open} open, {close} close")
            }
            Self::UnbalancedBrackets { open, close } => {
                write!(f, "Unbalanced square brackets: {open} open, {close} close")
            }
            Self::MissingMarker { marker } => write!(f, "Missing {marker}"),
            Self::DuplicateMarker { marker, count } => {
                write!(f, "{marker} appears {count} times (expected once)")
            }
            Self::UnbalancedEnvironment { name, begins, ends } => write!(
                f,
                "Unbalanced {name} environment: {begins} begin(s), {ends} end(s)"
            ),
        }
    }
}

/// A soft finding that does not affect validity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationWarning {
    MissingDocumentClass,
    MalformedHref { found: usize, well_formed: usize },
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingDocumentClass => write!(f, "No \\documentclass found"),
            Self::MalformedHref { found, well_formed } => write!(
                f,
                "Possible malformed \\href commands: {found} found, {well_formed} properly formatted"
            ),
        }
    }
}

/// Fresh per-check snapshot; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub open_braces: usize,
    pub close_braces: usize,
    /// `|open_braces - close_braces|`
    pub brace_mismatch: usize,
    pub begin_document_count: usize,
    pub end_document_count: usize,
    pub is_valid: bool,
    pub issues: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    pub fn has_begin_document(&self) -> bool {
        self.begin_document_count > 0
    }

    pub fn has_end_document(&self) -> bool {
        self.end_document_count > 0
    }

    /// One-line operator status.
    pub fn summary(&self) -> String {
        if self.is_valid {
            let mut line = format!(
                "LaTeX validation passed ({} braces balanced)",
                self.open_braces
            );
            if !self.warnings.is_empty() {
                line.push_str(&format!(", {} warning(s)", self.warnings.len()));
            }
            return line;
        }
        let details = self
            .issues
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        format!(
            "LaTeX validation failed with {} issue(s): {details}",
            self.issues.len()
        )
    }

    pub fn ensure_valid(&self) -> Result<(), TailorError> {
        if self.is_valid {
            return Ok(());
        }
        Err(TailorError::StructuralInvalid {
            open_braces: self.open_braces,
            close_braces: self.close_braces,
            has_begin_document: self.has_begin_document(),
            has_end_document: self.has_end_document(),
        })
    }

    fn finish(mut self) -> Self {
        self.is_valid = self.issues.is_empty();
        self
    }
}

fn check_marker(issues: &mut Vec<ValidationIssue>, marker: &str, count: usize) {
    match count {
        0 => issues.push(ValidationIssue::MissingMarker {
            marker: marker.to_string(),
        }),
        1 => {}
        _ => issues.push(ValidationIssue::DuplicateMarker {
            marker: marker.to_string(),
            count,
        }),
    }
}

/// Brace balance plus exactly one begin/end-of-body marker.
pub fn validate(document: &str) -> ValidationReport {
    let open_braces = document.matches('{').count();
    let close_braces = document.matches('}').count();
    let begin_document_count = document.matches(BEGIN_DOCUMENT).count();
    let end_document_count = document.matches(END_DOCUMENT).count();

    let mut issues = Vec::new();
    if open_braces != close_braces {
        issues.push(ValidationIssue::UnbalancedBraces {
            open: open_braces,
            close: close_braces,
        });
    }
    check_marker(&mut issues, BEGIN_DOCUMENT, begin_document_count);
    check_marker(&mut issues, END_DOCUMENT, end_document_count);

    ValidationReport {
        open_braces,
        close_braces,
        brace_mismatch: open_braces.abs_diff(close_braces),
        begin_document_count,
        end_document_count,
        is_valid: false,
        issues,
        warnings: Vec::new(),
    }
    .finish()
}

/// `validate` plus brackets, environment pairing and soft warnings.
pub fn validate_extended(document: &str) -> ValidationReport {
    let mut report = validate(document);

    let open_brackets = document.matches('[').count();
    let close_brackets = document.matches(']').count();
    if open_brackets != close_brackets {
        report.issues.push(ValidationIssue::UnbalancedBrackets {
            open: open_brackets,
            close: close_brackets,
        });
    }

    let mut environments: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for caps in BEGIN_ENV.captures_iter(document) {
        if let Some(name) = caps.get(1) {
            environments.entry(name.as_str()).or_default().0 += 1;
        }
    }
    for caps in END_ENV.captures_iter(document) {
        if let Some(name) = caps.get(1) {
            environments.entry(name.as_str()).or_default().1 += 1;
        }
    }
    for (name, (begins, ends)) in environments {
        if begins != ends {
            report.issues.push(ValidationIssue::UnbalancedEnvironment {
                name: name.to_string(),
                begins,
                ends,
            });
        }
    }

    if !document.contains("\\documentclass") {
        report.warnings.push(ValidationWarning::MissingDocumentClass);
    }
    let found = HREF.find_iter(document).count();
    let well_formed = HREF_WELL_FORMED.find_iter(document).count();
    if found != well_formed {
        report
            .warnings
            .push(ValidationWarning::MalformedHref { found, well_formed });
    }

    report.finish()
}
