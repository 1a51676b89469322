// LLM prompt constants for resume feedback.
// Reuses cross-cutting fragments from llm_client::prompts.

/// System prompt for feedback narratives.
pub const FEEDBACK_SYSTEM: &str = "You are a career expert and resume reviewer. \
    You give specific, actionable, encouraging feedback that helps a candidate \
    pass applicant tracking systems and impress hiring managers.";

/// Feedback prompt template.
/// Replace: {format_instruction}, {grounding_instruction}, {scores}, {keywords},
///          {section_tips}, {personal_hints}, {resume_text}, {job_description}
pub const FEEDBACK_PROMPT_TEMPLATE: &str = r#"{format_instruction}

{grounding_instruction}

Review the resume below and give suggestions to improve:
- Grammar and clarity
- Project and experience descriptions
- ATS friendliness
- Formatting

AUTOMATED SCORES (0-100):
{scores}

KEYWORD ANALYSIS:
{keywords}

SECTION NOTES:
{section_tips}

PATTERNS FROM THIS CANDIDATE'S EARLIER REVIEWS:
{personal_hints}

RESUME:
{resume_text}

TARGET JOB DESCRIPTION:
{job_description}"#;

pub const NO_JOB_DESCRIPTION: &str = "(none provided, give general feedback)";
pub const NO_KEYWORD_ANALYSIS: &str = "(no job description, keyword matching skipped)";
pub const NO_PERSONAL_HINTS: &str = "(no earlier reviews in this session)";
