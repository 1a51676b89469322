// Shared prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// System prompt fragment for prose output that downstream code parses line by line.
pub const BULLET_PROSE_SYSTEM: &str = "Respond in plain Markdown. \
    Put every concrete recommendation on its own line starting with \"- \". \
    Do NOT wrap the answer in code fences. \
    Do NOT return JSON.";

/// Instruction that keeps suggestions tied to the submitted document.
pub const GROUNDING_INSTRUCTION: &str = "\
    Base every recommendation on the resume text provided. \
    Do NOT invent employers, dates, degrees, or metrics the candidate did not state. \
    When a metric is missing, tell the candidate to add one instead of making one up.";
