// Generation boundary: prompt building, model calls, reply parsing, metadata.
// All LLM calls go through llm_client; the tailoring engine never sees a reply
// until parse_sections has turned it into a SectionMap.

pub mod generator;
pub mod metadata;
pub mod prompts;
pub mod reply;
