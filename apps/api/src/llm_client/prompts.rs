// Shared prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it;
// this file holds the cross-cutting rules they append.

/// Rules that keep the model to facts present in the supplied document.
pub const GROUNDING_RULES: &str = "\
- Extract only real information from the text.
- Do not invent any details.";

/// Rule that enforces JSON-only output.
pub const JSON_ONLY_RULE: &str = "- Keep the response as pure JSON (no explanation text).";
