// Shared prompt constants.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// System prompt that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Verdict contract shared by every pass/fail check.
pub const VERDICT_FORMAT: &str = r#"Respond with EXACTLY this JSON object:
{"passed": true | false, "summary": "2-4 sentences explaining the verdict"}"#;
