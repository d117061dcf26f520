// Résumé analysis: PDF encoding, prompt selection, and the two analysis actions.
// All model calls go through llm_client — no direct Gemini calls here.

pub mod extractor;
pub mod handlers;
pub mod invoker;
pub mod prompts;

#[cfg(test)]
pub(crate) mod test_support;
