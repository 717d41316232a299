//! Section Merger: splices generated sections and the subtitle into a document.
//!
//! Merge is atomic: all work happens on a scratch copy owned by this call, and
//! the caller only ever sees either the fully merged text or an error with its
//! own input untouched.

use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};

use crate::tailoring::locator::{locate, splice};
use crate::tailoring::{SectionMap, TailorError};

static SUBTITLE_DEF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\def\s+\\subtitle\s+\{[^}]*\}").expect("valid subtitle regex")
});

/// Replaces the argument of `\def \subtitle {...}` in place.
pub fn replace_subtitle(document: &str, subtitle: &str) -> Result<String, TailorError> {
    if !SUBTITLE_DEF.is_match(document) {
        return Err(TailorError::SubtitleMissing);
    }
    let replacement = format!("\\def \\subtitle {{{subtitle}}}");
    Ok(SUBTITLE_DEF
        .replace_all(document, NoExpand(&replacement))
        .into_owned())
}

/// Merges `sections` into `document`.
///
/// The subtitle goes first, then each section in map order. Spans are
/// re-located after every replacement since earlier splices shift offsets.
/// Each located span is replaced by `content + "\n\n"`.
pub fn merge(document: &str, sections: &SectionMap) -> Result<String, TailorError> {
    let mut scratch = match &sections.subtitle {
        Some(subtitle) => replace_subtitle(document, subtitle)?,
        None => document.to_string(),
    };

    for (name, content) in sections.iter() {
        let span =
            locate(&scratch, name).ok_or_else(|| TailorError::SectionNotFound(name.to_string()))?;
        scratch = splice(&scratch, span, &format!("{content}\n\n"));
    }

    Ok(scratch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tailoring::fixtures::SAMPLE_RESUME;
    use crate::tailoring::locator::extract;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_replace_subtitle_in_place() {
        let out = replace_subtitle(SAMPLE_RESUME, "Staff Engineer").unwrap();
        assert!(out.contains("\\def \\subtitle {Staff Engineer}"));
        assert!(!out.contains("{Software Engineer}"));
        assert_eq!(out.len(), SAMPLE_RESUME.len() + "Staff".len() - "Software".len());
    }

    #[test]
    fn test_subtitle_with_dollar_is_literal() {
        let out = replace_subtitle(SAMPLE_RESUME, "Engineer $1 \\& Co").unwrap();
        assert!(out.contains("\\def \\subtitle {Engineer $1 \\& Co}"));
    }

    #[test]
    fn test_missing_subtitle_definition_is_an_error() {
        let mut map = SectionMap::new();
        map.insert("subtitle", "Anything");
        let err = merge("\\begin{document}\n\\end{document}", &map).unwrap_err();
        assert_eq!(err, TailorError::SubtitleMissing);
    }

    #[test]
    fn test_merge_replaces_span_with_two_trailing_newlines() {
        let mut map = SectionMap::new();
        map.insert(
            "Professional Summary",
            "\\section{\\faUser}{Professional Summary}\nNew summary.",
        );
        let out = merge(SAMPLE_RESUME, &map).unwrap();
        assert!(out.contains(
            "\\section{\\faUser}{Professional Summary}\nNew summary.\n\n\\section{\\faCode}{Technical Proficiencies}"
        ));
        assert_eq!(
            extract(&out, "Education"),
            extract(SAMPLE_RESUME, "Education")
        );
    }

    #[test]
    fn test_merge_relocates_after_each_splice() {
        let mut map = SectionMap::new();
        map.insert(
            "Professional Summary",
            "\\section{\\faUser}{Professional Summary}\nA much longer summary than before, so every later offset moves.",
        );
        map.insert("Education", "\\section{\\faGraduationCap}{Education}\nM.S.");
        let out = merge(SAMPLE_RESUME, &map).unwrap();
        assert_eq!(
            extract(&out, "Education").unwrap(),
            "\\section{\\faGraduationCap}{Education}\nM.S."
        );
        assert!(out.ends_with("M.S.\n\n\\end{document}\n"));
    }

    #[test]
    fn test_merge_unknown_section_fails_without_partial_result() {
        let mut map = SectionMap::new();
        map.insert("Professional Summary", "\\section{\\faUser}{Professional Summary}\nX");
        map.insert("Publications", "\\section{\\faBook}{Publications}\nY");
        let err = merge(SAMPLE_RESUME, &map).unwrap_err();
        assert_eq!(err, TailorError::SectionNotFound("Publications".to_string()));
        assert_eq!(err.to_string(), "section not found: Publications");
    }

    #[test]
    fn test_empty_map_is_identity() {
        assert_eq!(merge(SAMPLE_RESUME, &SectionMap::new()).unwrap(), SAMPLE_RESUME);
    }
}
