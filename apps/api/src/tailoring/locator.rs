//! Section Locator: finds `\section{<icon>}{<name>}` headers and their spans.
//!
//! A span runs from the header start to the next header of ANY name, else to
//! `\end{document}`, else to the end of the text. Lookup is exact and
//! case-sensitive on the name; the icon argument is ignored.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::tailoring::END_DOCUMENT;

static HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\section\{[^}]*\}\{([^}]+)\}").expect("valid header regex"));

/// Half-open range `[start, end)` of one section in a specific document text.
///
/// Only meaningful against the exact text it was computed from; any mutation
/// invalidates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SectionSpan {
    pub start: usize,
    /// End of the header command itself.
    pub header_end: usize,
    pub end: usize,
}

impl SectionSpan {
    pub fn slice<'a>(&self, document: &'a str) -> &'a str {
        &document[self.start..self.end]
    }
}

/// A recognised header occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Header<'a> {
    start: usize,
    end: usize,
    name: &'a str,
}

fn headers(document: &str) -> impl Iterator<Item = Header<'_>> {
    HEADER.captures_iter(document).filter_map(|caps| {
        let whole = caps.get(0)?;
        let name = caps.get(1)?;
        Some(Header {
            start: whole.start(),
            end: whole.end(),
            name: name.as_str(),
        })
    })
}

fn span_end(document: &str, header_start: usize, header_end: usize) -> usize {
    if let Some(next) = HEADER.find_at(document, header_end) {
        return next.start();
    }
    document[header_start..]
        .find(END_DOCUMENT)
        .map(|offset| header_start + offset)
        .unwrap_or(document.len())
}

/// Locates the first section named `name`.
pub fn locate(document: &str, name: &str) -> Option<SectionSpan> {
    let header = headers(document).find(|h| h.name == name)?;
    Some(SectionSpan {
        start: header.start,
        header_end: header.end,
        end: span_end(document, header.start, header.end),
    })
}

/// Locates every section named `name`, in document order.
///
/// Each scan resumes at the previous match's end, so spans never overlap.
pub fn locate_all(document: &str, name: &str) -> Vec<SectionSpan> {
    let mut spans = Vec::new();
    let mut cursor = 0;
    while let Some(header) = headers(&document[cursor..]).find(|h| h.name == name) {
        let start = cursor + header.start;
        let header_end = cursor + header.end;
        let end = span_end(document, start, header_end);
        spans.push(SectionSpan {
            start,
            header_end,
            end,
        });
        cursor = end.max(header_end);
    }
    spans
}

/// Returns the trimmed text of the first section named `name`.
pub fn extract<'a>(document: &'a str, name: &str) -> Option<&'a str> {
    locate(document, name).map(|span| span.slice(document).trim())
}

/// All header names in document order, duplicates included.
pub fn section_names(document: &str) -> Vec<String> {
    headers(document).map(|h| h.name.to_string()).collect()
}

/// Replaces `span` in `document` with `replacement`.
pub fn splice(document: &str, span: SectionSpan, replacement: &str) -> String {
    let mut out = String::with_capacity(document.len() - (span.end - span.start) + replacement.len());
    out.push_str(&document[..span.start]);
    out.push_str(replacement);
    out.push_str(&document[span.end..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tailoring::fixtures::SAMPLE_RESUME;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_locate_span_ends_at_next_header() {
        let span = locate(SAMPLE_RESUME, "Professional Summary").unwrap();
        let text = span.slice(SAMPLE_RESUME);
        assert!(text.starts_with("\\section{\\faUser}{Professional Summary}"));
        assert!(text.ends_with("services.\n\n"));
        assert!(SAMPLE_RESUME[span.end..].starts_with("\\section{\\faCode}{Technical Proficiencies}"));
    }

    #[test]
    fn test_last_section_ends_at_end_marker() {
        let span = locate(SAMPLE_RESUME, "Education").unwrap();
        assert!(SAMPLE_RESUME[span.end..].starts_with(END_DOCUMENT));
    }

    #[test]
    fn test_span_falls_back_to_document_end() {
        let doc = "\\section{x}{Only}\nbody";
        let span = locate(doc, "Only").unwrap();
        assert_eq!(span.end, doc.len());
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        assert!(locate(SAMPLE_RESUME, "professional summary").is_none());
        assert!(locate(SAMPLE_RESUME, "Professional").is_none());
    }

    #[test]
    fn test_splice_with_own_text_is_identity() {
        for name in section_names(SAMPLE_RESUME) {
            let span = locate(SAMPLE_RESUME, &name).unwrap();
            let text = span.slice(SAMPLE_RESUME).to_string();
            assert_eq!(splice(SAMPLE_RESUME, span, &text), SAMPLE_RESUME);
        }
    }

    #[test]
    fn test_locate_all_finds_each_duplicate() {
        let doc = "\\begin{document}\n\\section{a}{Skills}\none\n\\section{b}{Work}\nw\n\\section{a}{Skills}\ntwo\n\\end{document}";
        let spans = locate_all(doc, "Skills");
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].slice(doc), "\\section{a}{Skills}\none\n");
        assert_eq!(spans[1].slice(doc), "\\section{a}{Skills}\ntwo\n");
    }

    #[test]
    fn test_extract_trims_and_section_names_in_order() {
        assert_eq!(
            extract(SAMPLE_RESUME, "Education").unwrap(),
            "\\section{\\faGraduationCap}{Education}\nB.S. Computer Science, \\href{https://example.edu}{State University}"
        );
        assert_eq!(
            section_names(SAMPLE_RESUME),
            vec![
                "Professional Summary",
                "Technical Proficiencies",
                "Professional Experience",
                "Education"
            ]
        );
    }
}
