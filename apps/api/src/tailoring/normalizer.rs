//! Section Normalizer: cleans model-generated section text before it is merged.
//!
//! Rules run in a fixed order; each one is a no-op when its pattern is absent.
//! Only generated replacement text goes through here, never untouched sections.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::tailoring::{SectionPolicy, SECTION_COMMAND};

/// Labels from the generation prompt protocol, tolerant of common misspellings.
pub(crate) const LABEL_ALTERNATION: &str =
    r"SUBTITLE|PROFESSIONAL\s+SUMMARY|TECHNICAL\s+PROF[FI]+CIENCIES?|OPTIONAL\s+EXPERIENCE";

static TRAILING_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)\s+(?:{LABEL_ALTERNATION})\s*:\s*$")).expect("valid label regex")
});

static EMPHASIS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\textbf\{([^}]*)\}").expect("valid emphasis regex"));

static YEAR_COUNT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b\d+\s*\+?\s*(?:years?|yrs?)\b(?:\s+of)?").expect("valid year regex")
});

static SPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]{2,}").expect("valid space regex"));

/// `(pattern, replacement)` pairs that put structural commands on their own lines.
static COMMAND_LAYOUT: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"\s*\\section\{", "\n\\section{"),
        (r"\s*\\resumeEntryStart\s*", "\n \\resumeEntryStart\n"),
        (r"\s*\\resumeEntryS\{", "\n  \\resumeEntryS{"),
        (r"\s*\\resumeEntryEnd\s*", "\n \\resumeEntryEnd\n"),
    ]
    .into_iter()
    .map(|(pattern, replacement)| {
        (
            Regex::new(pattern).expect("valid layout regex"),
            replacement,
        )
    })
    .collect()
});

static BLANK_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("valid newline regex"));

/// Cleans `raw` generated text for `section_name`.
pub fn normalize(section_name: &str, raw: &str, policy: &SectionPolicy) -> String {
    let mut text = strip_leading_label(raw, section_name);
    text = strip_trailing_label(&text);
    text = drop_preamble(&text);

    if section_name == policy.skills_section {
        text = unwrap_emphasis(&text);
    }
    if section_name == policy.summary_section {
        text = remove_year_counts(&text);
    }

    normalize_commands(&text)
}

/// Strips `<Section Name>:` echoed at the start of the text.
pub fn strip_leading_label(text: &str, section_name: &str) -> String {
    let words: Vec<String> = section_name
        .split_whitespace()
        .map(regex::escape)
        .collect();
    if words.is_empty() {
        return text.to_string();
    }
    let pattern = format!(r"(?i)^\s*{}\s*:\s*", words.join(r"\s+"));
    match Regex::new(&pattern) {
        Ok(re) => re.replace(text, "").into_owned(),
        Err(_) => text.to_string(),
    }
}

/// Strips a generator label left dangling at the end of the text.
pub fn strip_trailing_label(text: &str) -> String {
    TRAILING_LABEL.replace(text, "").into_owned()
}

/// Discards commentary before the first `\section{`.
pub fn drop_preamble(text: &str) -> String {
    match text.find(SECTION_COMMAND) {
        Some(idx) if idx > 0 => text[idx..].to_string(),
        _ => text.to_string(),
    }
}

/// `\textbf{X}` → `X`.
pub fn unwrap_emphasis(text: &str) -> String {
    EMPHASIS.replace_all(text, "$1").into_owned()
}

/// Removes tenure claims such as "5+ years of" or "3 yrs".
pub fn remove_year_counts(text: &str) -> String {
    let stripped = YEAR_COUNT.replace_all(text, "");
    SPACE_RUN.replace_all(&stripped, " ").into_owned()
}

pub fn normalize_commands(text: &str) -> String {
    let mut out = text.to_string();
    for (pattern, replacement) in COMMAND_LAYOUT.iter() {
        out = pattern
            .replace_all(&out, regex::NoExpand(*replacement))
            .into_owned();
    }
    BLANK_RUN.replace_all(&out, "\n\n").trim().to_string()
}
