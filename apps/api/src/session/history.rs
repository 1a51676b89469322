//! History Store — append-only log of accepted analyses for one session.
//!
//! Entries are never edited after they are appended. The single exception is
//! `is_latest`, recomputed across entries that share a `resume_text` so exactly
//! one of them carries the flag. Every append is folded into the learning state.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::keywords::KeywordIndex;
use crate::analysis::models::AnalysisResult;
use crate::session::learning::{ImprovementExtractor, LearningAggregator, LearningInsights};

const CUSTOM_NOTES_HEADER: &str = "📌 Custom Notes:";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub resume_text: String,
    pub job_description: Option<String>,
    pub analysis_results: AnalysisResult,
    pub is_modified: bool,
    pub is_latest: bool,
}

pub struct HistoryStore {
    entries: Vec<HistoryEntry>,
    learning: LearningAggregator,
}

impl HistoryStore {
    pub fn new(extractor: Arc<dyn ImprovementExtractor>) -> Self {
        Self {
            entries: Vec::new(),
            learning: LearningAggregator::new(extractor),
        }
    }

    /// Stores an accepted analysis as the latest entry for its resume text.
    pub fn append(
        &mut self,
        resume_text: String,
        analysis_results: AnalysisResult,
        job_description: Option<String>,
        is_modified: bool,
    ) -> &HistoryEntry {
        for previous in self
            .entries
            .iter_mut()
            .filter(|e| e.resume_text == resume_text)
        {
            previous.is_latest = false;
        }

        self.learning.fold(&analysis_results);

        self.entries.push(HistoryEntry {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            resume_text,
            job_description: job_description.filter(|jd| !jd.trim().is_empty()),
            analysis_results,
            is_modified,
            is_latest: true,
        });

        let index = self.entries.len() - 1;
        &self.entries[index]
    }

    /// All entries in insertion order.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn insights(&self) -> LearningInsights {
        self.learning.insights()
    }

    pub fn personalized_hints(&self, resume_text: &str) -> Vec<String> {
        self.learning.personalized_hints(resume_text)
    }

    /// Drops every entry and resets the learning state.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.learning.clear();
    }
}

/// Applies the user's edits to a generated narrative before it is stored.
///
/// `modified_suggestions` replaces `ai_suggestions` outright; `custom_note` is
/// appended under a notes header. Returns whether the stored text now differs
/// from what the generator produced.
pub fn apply_user_edits(
    results: &mut AnalysisResult,
    modified_suggestions: Option<String>,
    custom_note: Option<&str>,
) -> bool {
    let original = results.ai_suggestions.clone();

    if let Some(modified) = modified_suggestions {
        results.ai_suggestions = modified;
    }

    if let Some(note) = custom_note.map(str::trim).filter(|n| !n.is_empty()) {
        results.ai_suggestions = format!(
            "{}\n\n{CUSTOM_NOTES_HEADER}\n{note}",
            results.ai_suggestions
        );
    }

    results.ai_suggestions != original
}

/// Checks a client-submitted analysis before it is stored and learned from.
///
/// Scores must be finite and within [0, 100]. Keyword data must be present exactly
/// when a non-blank job description is, use only vocabulary terms, keep `matched`
/// and `missing` disjoint, and agree with a fresh match of `resume_text` against
/// the job description.
pub fn validate_results(
    results: &AnalysisResult,
    resume_text: &str,
    job_description: Option<&str>,
) -> Result<(), String> {
    for (name, value) in results.scores.metrics() {
        if !value.is_finite() || !(0.0..=100.0).contains(&value) {
            return Err(format!("score '{name}' must be within 0-100, got {value}"));
        }
    }

    let job_description = job_description.map(str::trim).filter(|jd| !jd.is_empty());
    let (matches, keyword_match, jd) = match (
        &results.keyword_matches,
        results.scores.keyword_match,
        job_description,
    ) {
        (None, None, None) => return Ok(()),
        (Some(matches), Some(keyword_match), Some(jd)) => (matches, keyword_match, jd),
        _ => {
            return Err(
                "keyword_matches and scores.keyword_match must be present exactly when a job_description is given"
                    .to_string(),
            )
        }
    };

    let index = KeywordIndex::global();
    if let Some(unknown) = matches
        .matched
        .iter()
        .chain(&matches.missing)
        .find(|kw| index.category_of(kw).is_none())
    {
        return Err(format!("'{unknown}' is not a recognized keyword"));
    }

    if let Some(both) = matches.matched.intersection(&matches.missing).next() {
        return Err(format!("'{both}' cannot be both matched and missing"));
    }

    if *matches != index.match_keywords(resume_text, jd) {
        return Err("keyword_matches do not match the resume and job description".to_string());
    }

    if (keyword_match - matches.match_percentage()).abs() > 0.05 {
        return Err(format!(
            "scores.keyword_match {keyword_match} disagrees with keyword_matches"
        ));
    }

    Ok(())
}
