// All LLM prompt constants for the Generation module.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::llm_client::prompts::{LATEX_ONLY_INSTRUCTION, TRUTHFULNESS_INSTRUCTION};
use crate::tailoring::locator::extract;
use crate::tailoring::SectionPolicy;

/// Default system prompt for section generation. `SYSTEM_PROMPT_PATH` replaces it.
pub const SECTION_SYSTEM: &str = "You are an expert technical resume writer working on LaTeX resumes. \
    You operate in SECTION-ONLY MODE: you rewrite only the sections you are given and \
    return them under the exact labels requested, in the exact order requested. \
    Never return the preamble, \\begin{document} or \\end{document}. \
    Never repeat a label inside a section body.";

/// Section generation prompt. Replace every `{placeholder}` before sending.
pub const SECTION_PROMPT_TEMPLATE: &str = r#"You are now in GENERATE MODE (section-only).

JOB POSTING:
<<<JOB_POSTING_START>>>
{job_posting}
<<<JOB_POSTING_END>>>

CURRENT SECTIONS TO UPDATE:
<<<SECTIONS_START>>>
{sections}
<<<SECTIONS_END>>>

TASK:
Based on the job posting, update ONLY these parts of the resume:

1) Subtitle: a new job title that matches the posting (escaped for LaTeX).
2) {summary_section} section.
3) {skills_section} section.
{experience_task}

STYLE NOTES:
- Within the {skills_section} section only, keep the individual skills/tools in plain text (no \textbf{} around each item).
- You may still use \textbf{} in other sections to emphasize technologies.
- If you are updating the {experience_section} section, rephrase existing bullets to emphasize the job-posting skills and responsibilities (truthful, ATS-friendly).
- Avoid mentioning total years of experience (no "X years" statements).

{latex_instruction}

{truthfulness_instruction}

Return your answer EXACTLY in this format:

SUBTITLE:
<subtitle only>

PROFESSIONAL SUMMARY:
<LaTeX for the entire {summary_section} section, header included>

TECHNICAL PROFICIENCIES:
<LaTeX for the entire {skills_section} section, header included>

OPTIONAL EXPERIENCE:
<LaTeX for the {experience_section} section, or the word "SKIP" if no changes are needed>
"#;

/// Metadata extraction prompt. Replace `{job_posting}` before sending.
pub const METADATA_PROMPT_TEMPLATE: &str = r#"Extract the company name and job position from this job posting.

JOB POSTING:
{job_posting}

Return ONLY a JSON object in this exact format:
{
  "company": "Company Name",
  "position": "Job Title"
}

Rules:
- Extract the exact company name (e.g., "Google", "Amazon Web Services", "Meta")
- Extract the full job title (e.g., "Senior ML Engineer", "Data Scientist")
- If the company is not clear, use "Unknown_Company"
- If the position is not clear, use "Unknown_Position"
"#;

/// Sections handed to the model as context, rendered as `=== name ===` blocks.
///
/// Falls back to the whole document when none of them can be extracted.
pub fn extract_context(document: &str, policy: &SectionPolicy, include_experience: bool) -> String {
    let mut names = vec![policy.summary_section, policy.skills_section];
    if include_experience {
        names.push(policy.experience_section);
    }

    let blocks: Vec<String> = names
        .into_iter()
        .filter_map(|name| extract(document, name).map(|body| format!("=== {name} ===\n{body}")))
        .collect();

    if blocks.is_empty() {
        document.to_string()
    } else {
        blocks.join("\n\n")
    }
}

pub fn build_section_prompt(
    job_posting: &str,
    context: &str,
    include_experience: bool,
    policy: &SectionPolicy,
) -> String {
    let experience_task = if include_experience {
        format!(
            "4) {} section (update the most relevant roles).",
            policy.experience_section
        )
    } else {
        String::new()
    };

    SECTION_PROMPT_TEMPLATE
        .replace("{latex_instruction}", LATEX_ONLY_INSTRUCTION)
        .replace("{truthfulness_instruction}", TRUTHFULNESS_INSTRUCTION)
        .replace("{experience_task}", &experience_task)
        .replace("{summary_section}", policy.summary_section)
        .replace("{skills_section}", policy.skills_section)
        .replace("{experience_section}", policy.experience_section)
        // caller-supplied text last so its braces are never treated as placeholders
        .replace("{sections}", context)
        .replace("{job_posting}", job_posting)
}

pub fn build_metadata_prompt(job_posting: &str) -> String {
    METADATA_PROMPT_TEMPLATE.replace("{job_posting}", job_posting)
}
