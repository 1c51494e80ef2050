// Chat pipeline: filter extraction, answer composition, and the /chat handler.
// All LLM calls go through llm_client and all index queries through search.

pub mod composer;
pub mod filters;
pub mod handlers;
pub mod listings;
pub mod prompts;
