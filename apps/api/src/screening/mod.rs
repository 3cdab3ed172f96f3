// Résumé screening: text extraction, AI profile extraction, criteria evaluation.
// All AI calls go through llm_client.

pub mod criteria;
pub mod extractor;
pub mod handlers;
pub mod parser;
pub mod pipeline;
pub mod profile;
pub mod prompts;
