// Cross-cutting prompt fragments shared by every caller of the LLM client.
// Each feature that needs an LLM call keeps its own prompts.rs alongside it.

/// Appended to prompts whose response is deserialized with `LlmClient::chat_json`.
pub const STRICT_JSON_INSTRUCTION: &str = "\
    IMPORTANT: RETURN STRICT JSON ONLY. NO TEXT OUTSIDE JSON. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";
