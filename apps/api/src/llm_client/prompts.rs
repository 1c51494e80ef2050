// Shared prompt fragments.
// Each module that calls the LLM defines its own prompts.rs alongside it;
// this file holds the pieces they have in common.

/// Opening line of every prompt.
pub const ASSISTANT_ROLE: &str = "You are a helpful job search assistant.";

/// Formatting rules appended to every prompt that produces listings.
pub const LISTING_STYLE_INSTRUCTION: &str = "\
    Bullet each listing on its own line. \
    Keep the answer concise and friendly. \
    Do NOT use markdown headings or tables.";
