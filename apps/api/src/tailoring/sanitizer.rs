//! Post-Merge Sanitizer: repairs generation artifacts in a merged document.
//!
//! Steps are strictly ordered: stray labels → dedup → reposition. Each step
//! assumes the previous one already ran. The whole pass is idempotent and never
//! fails; a missing precondition turns a step into a no-op.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::tailoring::locator::{locate, locate_all};
use crate::tailoring::normalizer::LABEL_ALTERNATION;
use crate::tailoring::SectionPolicy;

/// `\resumeEntryEnd PROFESSIONAL SUMMARY:` → `\resumeEntryEnd`
static LABEL_AFTER_ENTRY_END: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)(\\resumeEntryEnd)\s+(?:{LABEL_ALTERNATION})\s*:"
    ))
    .expect("valid entry-end label regex")
});

/// `TECHNICAL PROFICIENCIES: \section{` → `\section{`
static LABEL_BEFORE_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)(?:{LABEL_ALTERNATION})\s*:\s*(\\section\{{)"))
        .expect("valid header label regex")
});

pub fn sanitize(document: &str, policy: &SectionPolicy) -> String {
    let mut out = strip_stray_labels(document);
    out = remove_duplicate_sections(&out, policy.dedup_section);
    if let Some((section, anchor)) = policy.reposition {
        out = reposition_after(&out, section, anchor);
    }
    out
}

pub fn strip_stray_labels(document: &str) -> String {
    let out = LABEL_AFTER_ENTRY_END.replace_all(document, "$1");
    LABEL_BEFORE_HEADER.replace_all(&out, "$1").into_owned()
}

/// Keeps the first `name` block intact and deletes every later one.
pub fn remove_duplicate_sections(document: &str, name: &str) -> String {
    let spans = locate_all(document, name);
    let Some((first, rest)) = spans.split_first() else {
        return document.to_string();
    };
    if rest.is_empty() {
        return document.to_string();
    }

    debug!("Removing {} duplicate '{}' section(s)", rest.len(), name);

    let mut out = String::with_capacity(document.len());
    out.push_str(&document[..first.end]);
    let mut last = first.end;
    for span in rest {
        out.push_str(&document[last..span.start]);
        last = span.end;
    }
    out.push_str(&document[last..]);
    out
}

/// Moves the `section` block so it sits directly after `anchor`.
///
/// Best-effort: if either section is missing the document is returned as-is.
/// The moved block is re-terminated with exactly one blank line so repeated
/// runs produce identical output.
pub fn reposition_after(document: &str, section: &str, anchor: &str) -> String {
    if section == anchor {
        return document.to_string();
    }
    let Some(span) = locate(document, section) else {
        return document.to_string();
    };

    let block = span.slice(document).trim_end();
    let mut without = String::with_capacity(document.len());
    without.push_str(&document[..span.start]);
    without.push_str(&document[span.end..]);

    let Some(anchor_span) = locate(&without, anchor) else {
        return document.to_string();
    };

    let (before, after) = without.split_at(anchor_span.end);
    let mut out = String::with_capacity(document.len() + 2);
    out.push_str(before);
    if !before.is_empty() && !before.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(block);
    out.push_str("\n\n");
    out.push_str(after);
    out
}
