// All LLM prompt templates for the chat flow.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::llm_client::prompts::{ASSISTANT_ROLE, LISTING_STYLE_INSTRUCTION};

/// Grounded prompt template. Replace `{message}` and `{context}` before sending.
pub const GROUNDED_PROMPT_TEMPLATE: &str = r#"{role}
User asked: "{message}"

Job listings from the search index:
{context}

Answer using ONLY the job listings above. Do NOT invent roles, companies, salaries or links.
If there are no matches, say so and suggest one way to refine the search.
{style}"#;

/// Fallback prompt template (no search index). Replace `{message}` before sending.
pub const SUGGESTION_PROMPT_TEMPLATE: &str = r#"{role}
User asked: "{message}"

Return 3–5 realistic job listings (title, company, location or 'Remote', salary range if present, and a plausible link).
Include one short tip to refine the search.
{style}"#;

pub fn grounded_prompt(message: &str, context: &str) -> String {
    fill(&GROUNDED_PROMPT_TEMPLATE.replace("{context}", context), message)
}

pub fn suggestion_prompt(message: &str) -> String {
    fill(SUGGESTION_PROMPT_TEMPLATE, message)
}

// `{message}` is substituted last so user text containing placeholders is left alone.
fn fill(template: &str, message: &str) -> String {
    template
        .replace("{role}", ASSISTANT_ROLE)
        .replace("{style}", LISTING_STYLE_INSTRUCTION)
        .replace("{message}", message)
}
