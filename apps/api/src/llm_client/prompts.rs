// Shared prompt fragments used by more than one generation path.
// Task-specific prompts live in generation/prompts.rs.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Appended to every prompt that asks for LaTeX back.
pub const LATEX_ONLY_INSTRUCTION: &str = "\
    Return raw LaTeX only. Do NOT wrap it in markdown code fences. \
    Keep every existing macro name (\\section, \\resumeEntryStart, \\resumeEntryS, \\resumeEntryEnd) \
    exactly as written and keep braces balanced. Escape LaTeX special characters (&, %, $, #, _).";

/// Truthfulness rule shared by every rewrite prompt.
pub const TRUTHFULNESS_INSTRUCTION: &str = "\
    CRITICAL: Only rephrase and reorder what the current resume already states. \
    Do NOT invent employers, titles, dates, metrics or technologies that are not present. \
    Do NOT state a total number of years of experience.";
