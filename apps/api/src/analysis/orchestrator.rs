//! Analysis Orchestrator — composes the pure analyzers and asks the generation
//! service for a narrative.
//!
//! Flow: calculate_scores → match_keywords (JD only) → analyze_sections →
//!       build prompt → NarrativeGenerator::generate (bounded by a timeout).
//!
//! A failed or timed-out generation call is NOT retried. The caller receives a
//! `FeedbackGenerationError` carrying the partial result (scores, keywords and
//! sections are complete; `ai_suggestions` is empty).

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

use crate::analysis::keywords::{KeywordCategory, KeywordIndex, KeywordMatches};
use crate::analysis::models::AnalysisResult;
use crate::analysis::prompts::{
    FEEDBACK_PROMPT_TEMPLATE, FEEDBACK_SYSTEM, NO_JOB_DESCRIPTION, NO_KEYWORD_ANALYSIS,
    NO_PERSONAL_HINTS,
};
use crate::analysis::scoring::calculate_scores;
use crate::analysis::sections::analyze_sections;
use crate::llm_client::prompts::{BULLET_PROSE_SYSTEM, GROUNDING_INSTRUCTION};
use crate::llm_client::{LlmClient, LlmError};

// ────────────────────────────────────────────────────────────────────────────
// Generation seam
// ────────────────────────────────────────────────────────────────────────────

/// Text-in/text-out narrative service. Implement this to swap backends without
/// touching the orchestrator or handlers.
///
/// Carried in `AppState` as `Arc<dyn NarrativeGenerator>`.
#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}

#[async_trait]
impl NarrativeGenerator for LlmClient {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.call_text(prompt, FEEDBACK_SYSTEM).await
    }
}

/// Narrative generation failed; everything else in `partial` is valid.
#[derive(Debug, Error)]
#[error("Feedback generation failed: {reason}")]
pub struct FeedbackGenerationError {
    pub reason: String,
    pub partial: Box<AnalysisResult>,
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline
// ────────────────────────────────────────────────────────────────────────────

/// Runs a full analysis. A blank job description is treated as absent.
///
/// `personal_hints` come from the session's learning state and are embedded in
/// the prompt verbatim.
pub async fn analyze_resume(
    generator: &dyn NarrativeGenerator,
    timeout: Duration,
    resume_text: &str,
    job_description: Option<&str>,
    personal_hints: &[String],
) -> Result<AnalysisResult, FeedbackGenerationError> {
    let job_description = job_description.map(str::trim).filter(|jd| !jd.is_empty());

    let scores = calculate_scores(resume_text, job_description);
    let keyword_matches =
        job_description.map(|jd| KeywordIndex::global().match_keywords(resume_text, jd));
    let section_analysis = analyze_sections(resume_text);

    let mut result = AnalysisResult {
        scores,
        keyword_matches,
        section_analysis,
        ai_suggestions: String::new(),
    };

    let prompt = build_feedback_prompt(&result, resume_text, job_description, personal_hints);
    info!(
        "Requesting feedback narrative: resume_chars={}, has_jd={}, hints={}, prompt_chars={}",
        resume_text.len(),
        job_description.is_some(),
        personal_hints.len(),
        prompt.len()
    );

    let reason = match tokio::time::timeout(timeout, generator.generate(&prompt)).await {
        Ok(Ok(narrative)) => {
            result.ai_suggestions = narrative;
            return Ok(result);
        }
        Ok(Err(e)) => e.to_string(),
        Err(_) => format!("generation timed out after {timeout:?}"),
    };

    warn!("Feedback generation failed, returning partial analysis: {reason}");
    Err(FeedbackGenerationError {
        reason,
        partial: Box::new(result),
    })
}

/// Builds the deterministic feedback prompt for an analysis.
fn build_feedback_prompt(
    result: &AnalysisResult,
    resume_text: &str,
    job_description: Option<&str>,
    personal_hints: &[String],
) -> String {
    let scores = result
        .scores
        .metrics()
        .into_iter()
        .map(|(name, value)| format!("- {name}: {value:.1}"))
        .collect::<Vec<_>>()
        .join("\n");

    let keywords = result
        .keyword_matches
        .as_ref()
        .map(describe_keywords)
        .unwrap_or_else(|| NO_KEYWORD_ANALYSIS.to_string());

    let section_tips = result
        .section_analysis
        .iter()
        .map(|(name, feedback)| {
            let found = if feedback.content.is_empty() {
                "not found"
            } else {
                "found"
            };
            format!("- {name} ({found}): {}", feedback.suggestions)
        })
        .collect::<Vec<_>>()
        .join("\n");

    let personal_hints = if personal_hints.is_empty() {
        NO_PERSONAL_HINTS.to_string()
    } else {
        personal_hints.join("\n")
    };

    fill_template(
        FEEDBACK_PROMPT_TEMPLATE,
        &[
            ("format_instruction", BULLET_PROSE_SYSTEM),
            ("grounding_instruction", GROUNDING_INSTRUCTION),
            ("scores", scores.as_str()),
            ("keywords", keywords.as_str()),
            ("section_tips", section_tips.as_str()),
            ("personal_hints", personal_hints.as_str()),
            ("resume_text", resume_text),
            ("job_description", job_description.unwrap_or(NO_JOB_DESCRIPTION)),
        ],
    )
}

/// Substitutes `{name}` placeholders in one left-to-right pass. Inserted values
/// are never rescanned, so braces in user text come through literally.
/// Unknown `{...}` sequences are copied as-is.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open + 1..];
        let hit = values.iter().find(|(name, _)| {
            tail.strip_prefix(*name)
                .is_some_and(|after| after.starts_with('}'))
        });
        match hit {
            Some((name, value)) => {
                out.push_str(value);
                rest = &tail[name.len() + 1..];
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

fn describe_keywords(matches: &KeywordMatches) -> String {
    let index = KeywordIndex::global();
    let join = |items: Vec<&str>| {
        if items.is_empty() {
            "none".to_string()
        } else {
            items.join(", ")
        }
    };
    let missing_of = |category: KeywordCategory| {
        matches
            .missing
            .iter()
            .filter(|kw| index.category_of(kw) == Some(category))
            .map(String::as_str)
            .collect::<Vec<_>>()
    };

    format!(
        "Matched: {}\nMissing technical skills: {}\nMissing soft skills: {}\nMatch rate: {:.1}%",
        join(matches.matched.iter().map(String::as_str).collect()),
        join(missing_of(KeywordCategory::Technical)),
        join(missing_of(KeywordCategory::Soft)),
        matches.match_percentage()
    )
}
