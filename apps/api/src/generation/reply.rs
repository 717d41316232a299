//! Generator output: resolving a reply to text and slicing it into sections.
//!
//! The reply shape is settled once here so nothing downstream needs to look
//! for alternate field names.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::tailoring::{SectionMap, SectionPolicy, SUBTITLE_KEY};

/// Raw generator output as handed to the orchestration layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GenerationReply {
    Plain(String),
    Structured(StructuredReply),
}

/// Structured reply. The first non-empty field wins, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_text: Option<ReplyText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<ReplyText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<ReplyText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<ReplyText>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReplyText {
    Text(String),
    Segments(Vec<ReplySegment>),
}

/// One content segment: a bare string or a `{ "text": ... }` block.
/// Blocks without text contribute nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReplySegment {
    Text(String),
    Block {
        #[serde(default)]
        text: String,
    },
}

impl ReplyText {
    fn joined(&self) -> String {
        match self {
            ReplyText::Text(text) => text.clone(),
            ReplyText::Segments(segments) => segments
                .iter()
                .map(|segment| match segment {
                    ReplySegment::Text(text) => text.as_str(),
                    ReplySegment::Block { text } => text.as_str(),
                })
                .collect(),
        }
    }
}

impl GenerationReply {
    /// The reply as plain text, or `None` when every candidate field is empty.
    pub fn resolve_text(&self) -> Option<String> {
        let text = match self {
            GenerationReply::Plain(text) => Some(text.clone()),
            GenerationReply::Structured(reply) => [
                &reply.output_text,
                &reply.text,
                &reply.response,
                &reply.content,
            ]
            .into_iter()
            .flatten()
            .map(ReplyText::joined)
            .find(|text| !text.trim().is_empty()),
        };
        text.filter(|text| !text.trim().is_empty())
    }
}

impl From<String> for GenerationReply {
    fn from(text: String) -> Self {
        GenerationReply::Plain(text)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Label protocol
// ────────────────────────────────────────────────────────────────────────────

/// Upper-case labels only; mixed-case prose never splits a block.
static BLOCK_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(SUBTITLE|PROFESSIONAL\s+SUMMARY|TECHNICAL\s+PROF[FI]+CIENCIES?|OPTIONAL\s+EXPERIENCE)\s*:",
    )
    .expect("valid block label regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Subtitle,
    Summary,
    Skills,
    Experience,
}

impl BlockKind {
    fn from_label(label: &str) -> Self {
        if label.starts_with("SUBTITLE") {
            BlockKind::Subtitle
        } else if label.starts_with("PROFESSIONAL") {
            BlockKind::Summary
        } else if label.starts_with("TECHNICAL") {
            BlockKind::Skills
        } else {
            BlockKind::Experience
        }
    }
}

/// Slices labelled generator output into a `SectionMap`.
///
/// Each block runs from its label to the next label of any kind. Only the first
/// block of each kind counts. The experience block is taken only when
/// `include_experience` is set and its body is not `SKIP`. Empty blocks are
/// dropped.
pub fn parse_sections(text: &str, include_experience: bool, policy: &SectionPolicy) -> SectionMap {
    let labels: Vec<(BlockKind, usize, usize)> = BLOCK_LABEL
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let label = caps.get(1)?;
            Some((BlockKind::from_label(label.as_str()), whole.start(), whole.end()))
        })
        .collect();

    let mut blocks: Vec<(BlockKind, &str)> = Vec::new();
    for (idx, (kind, _, body_start)) in labels.iter().enumerate() {
        if blocks.iter().any(|(seen, _)| seen == kind) {
            continue;
        }
        let body_end = labels
            .get(idx + 1)
            .map(|(_, next_start, _)| *next_start)
            .unwrap_or(text.len());
        blocks.push((*kind, text[*body_start..body_end].trim()));
    }

    let mut sections = SectionMap::new();
    for (kind, body) in blocks {
        if body.is_empty() {
            continue;
        }
        let key = match kind {
            BlockKind::Subtitle => SUBTITLE_KEY,
            BlockKind::Summary => policy.summary_section,
            BlockKind::Skills => policy.skills_section,
            BlockKind::Experience => {
                if !include_experience || body.eq_ignore_ascii_case("SKIP") {
                    continue;
                }
                policy.experience_section
            }
        };
        sections.insert(key, body);
    }
    sections
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const POLICY: SectionPolicy = SectionPolicy::RESUME;

    const LABELLED: &str = "SUBTITLE:
Platform Engineer

PROFESSIONAL SUMMARY:
\\section{\\faUser}{Professional Summary}
Platform engineer focused on Kubernetes.

TECHNICAL PROFICIENCIES:
\\section{\\faCode}{Technical Proficiencies}
Go, Kubernetes, Terraform

OPTIONAL EXPERIENCE:
SKIP
";

    #[test]
    fn test_plain_reply_resolves_verbatim() {
        let reply: GenerationReply = serde_json::from_str("\"SUBTITLE: X\"").unwrap();
        assert_eq!(reply.resolve_text().as_deref(), Some("SUBTITLE: X"));
    }

    #[test]
    fn test_structured_reply_uses_first_non_empty_field() {
        let reply: GenerationReply =
            serde_json::from_str(r#"{"output_text": "", "text": "from text", "content": "later"}"#)
                .unwrap();
        assert_eq!(reply.resolve_text().as_deref(), Some("from text"));
    }

    #[test]
    fn test_structured_reply_joins_content_segments() {
        let reply: GenerationReply = serde_json::from_str(
            r#"{"content": [{"type": "text", "text": "SUBTITLE: "}, "Engineer", {"type": "tool_use"}]}"#,
        )
        .unwrap();
        assert_eq!(reply.resolve_text().as_deref(), Some("SUBTITLE: Engineer"));
    }

    #[test]
    fn test_empty_reply_resolves_to_none() {
        let reply: GenerationReply = serde_json::from_str(r#"{"response": "   "}"#).unwrap();
        assert_eq!(reply.resolve_text(), None);
        assert_eq!(GenerationReply::Plain(String::new()).resolve_text(), None);
    }

    #[test]
    fn test_parse_labelled_sections() {
        let sections = parse_sections(LABELLED, true, &POLICY);
        assert_eq!(sections.subtitle.as_deref(), Some("Platform Engineer"));
        assert_eq!(
            sections.section_names(),
            vec!["Professional Summary", "Technical Proficiencies"]
        );
        assert_eq!(
            sections.get("Technical Proficiencies"),
            Some("\\section{\\faCode}{Technical Proficiencies}\nGo, Kubernetes, Terraform")
        );
    }

    #[test]
    fn test_experience_requires_opt_in() {
        let text = LABELLED.replace("SKIP", "\\section{\\faBriefcase}{Professional Experience}\nnew");
        assert!(parse_sections(&text, false, &POLICY)
            .get("Professional Experience")
            .is_none());
        assert_eq!(
            parse_sections(&text, true, &POLICY).get("Professional Experience"),
            Some("\\section{\\faBriefcase}{Professional Experience}\nnew")
        );
    }

    #[test]
    fn test_label_mid_line_still_splits() {
        let text = "PROFESSIONAL SUMMARY: summary text \\resumeEntryEnd TECHNICAL PROFFICIENCIES: skills";
        let sections = parse_sections(text, false, &POLICY);
        assert_eq!(
            sections.get("Professional Summary"),
            Some("summary text \\resumeEntryEnd")
        );
        assert_eq!(sections.get("Technical Proficiencies"), Some("skills"));
    }

    #[test]
    fn test_first_block_of_a_kind_wins_and_empty_blocks_drop() {
        let text = "SUBTITLE:\n\nPROFESSIONAL SUMMARY: first\nPROFESSIONAL SUMMARY: second";
        let sections = parse_sections(text, false, &POLICY);
        assert_eq!(sections.subtitle, None);
        assert_eq!(sections.get("Professional Summary"), Some("first"));
        assert_eq!(sections.len(), 1);
    }

    #[test]
    fn test_unlabelled_text_yields_empty_map() {
        assert!(parse_sections("I could not do that.", true, &POLICY).is_empty());
    }
}
