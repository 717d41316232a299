//! Preflight Gate: rejects document shapes the engine cannot safely edit.
//!
//! Runs before any extraction or mutation. Checks, in order:
//! 1. top-level `\documentclass` is present and equals the supported class
//! 2. no `\input`/`\include`/`\subfile` references to external files
//! 3. at least one of the policy's required sections exists

use once_cell::sync::Lazy;
use regex::Regex;

use crate::tailoring::locator::locate;
use crate::tailoring::{SectionPolicy, TailorError};

static DOCUMENT_CLASS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\documentclass\s*(?:\[[^\]]*\])?\s*\{([^}]*)\}").expect("valid class regex")
});

static USE_PACKAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\(?:usepackage|RequirePackage)\s*(?:\[[^\]]*\])?\s*\{([^}]*)\}")
        .expect("valid package regex")
});

static INCLUDE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\(?:input|include|subfile)\s*\{([^}]*)\}").expect("valid include regex")
});

/// Package names declared in the preamble, in order, comma lists split.
pub fn declared_packages(document: &str) -> Vec<String> {
    USE_PACKAGE
        .captures_iter(document)
        .filter_map(|caps| caps.get(1))
        .flat_map(|m| m.as_str().split(','))
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Files referenced through include-style commands.
pub fn included_files(document: &str) -> Vec<String> {
    INCLUDE
        .captures_iter(document)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .collect()
}

/// Checks `document` against the supported template.
///
/// `file_exists` resolves an include target (as written, without the `.tex`
/// suffix added) so the engine itself stays free of I/O.
pub fn preflight<F>(document: &str, policy: &SectionPolicy, file_exists: F) -> Result<(), TailorError>
where
    F: Fn(&str) -> bool,
{
    let packages = declared_packages(document);

    let class = DOCUMENT_CLASS
        .captures(document)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string());
    match class.as_deref() {
        None => {
            return Err(TailorError::PreflightRejected {
                reason: format!(
                    "no \\documentclass declaration found; packages detected: {}",
                    list_or_none(&packages)
                ),
                packages,
                missing_files: Vec::new(),
            })
        }
        Some(class) if class != policy.document_class => {
            return Err(TailorError::PreflightRejected {
                reason: format!(
                    "unsupported document class '{class}' (only '{}' is supported); packages detected: {}",
                    policy.document_class,
                    list_or_none(&packages)
                ),
                packages,
                missing_files: Vec::new(),
            })
        }
        Some(_) => {}
    }

    let includes = included_files(document);
    if !includes.is_empty() {
        let missing_files: Vec<String> = includes
            .iter()
            .filter(|name| !file_exists(name.as_str()) && !file_exists(&format!("{name}.tex")))
            .cloned()
            .collect();
        let mut reason = format!(
            "document references external files ({}); only single-file resumes are supported",
            includes.join(", ")
        );
        if !missing_files.is_empty() {
            reason.push_str(&format!("; missing on disk: {}", missing_files.join(", ")));
        }
        return Err(TailorError::PreflightRejected {
            reason,
            packages,
            missing_files,
        });
    }

    if policy
        .required_sections
        .iter()
        .all(|name| locate(document, name).is_none())
    {
        return Err(TailorError::PreflightRejected {
            reason: format!(
                "none of the required sections were found (expected at least one of: {})",
                policy.required_sections.join(", ")
            ),
            packages,
            missing_files: Vec::new(),
        });
    }

    Ok(())
}

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}
