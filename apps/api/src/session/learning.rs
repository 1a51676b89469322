//! Learning Aggregator — folds accepted analyses into longitudinal session statistics.
//!
//! State is only ever folded forward: keywords are unioned, improvement phrases are
//! counted (first-seen order retained for tie-breaking), section contents are appended.
//! Nothing is evicted until the owning session is cleared.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::analysis::models::{AnalysisResult, SectionName};

const TOP_IMPROVEMENTS: usize = 5;
const HINT_IMPROVEMENTS: usize = 3;

// ────────────────────────────────────────────────────────────────────────────
// Improvement extraction strategy
// ────────────────────────────────────────────────────────────────────────────

/// Pulls recurring improvement phrases out of a feedback narrative.
/// Swap implementations without touching the history or aggregator contracts.
pub trait ImprovementExtractor: Send + Sync {
    fn extract(&self, narrative: &str) -> Vec<String>;
}

/// Treats lines starting with `-`, `•` or `* ` as improvements and strips the marker.
#[derive(Debug, Default, Clone, Copy)]
pub struct BulletLineExtractor;

impl ImprovementExtractor for BulletLineExtractor {
    fn extract(&self, narrative: &str) -> Vec<String> {
        narrative
            .lines()
            .filter_map(|line| {
                let line = line.trim();
                let rest = line
                    .strip_prefix('-')
                    .or_else(|| line.strip_prefix('•'))
                    .or_else(|| line.strip_prefix("* "))?;
                let phrase = rest.trim();
                // skips markdown rules like "---"
                phrase
                    .chars()
                    .any(char::is_alphanumeric)
                    .then(|| phrase.to_string())
            })
            .collect()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// State and insights
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImprovementCount {
    pub phrase: String,
    pub count: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LearningState {
    pub successful_keywords: BTreeSet<String>,
    /// In first-seen order.
    pub common_improvements: Vec<ImprovementCount>,
    pub section_patterns: BTreeMap<SectionName, Vec<String>>,
}

/// Read-only summary of a session's learning state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LearningInsights {
    pub top_keywords: BTreeSet<String>,
    /// At most five, count descending, ties in first-seen order.
    pub top_improvements: Vec<ImprovementCount>,
    /// Non-empty content samples recorded per section.
    pub section_coverage: BTreeMap<SectionName, usize>,
}

impl LearningInsights {
    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.top_keywords.is_empty()
            && self.top_improvements.is_empty()
            && self.section_coverage.is_empty()
    }
}

pub struct LearningAggregator {
    state: LearningState,
    improvement_index: HashMap<String, usize>,
    extractor: Arc<dyn ImprovementExtractor>,
}

impl LearningAggregator {
    pub fn new(extractor: Arc<dyn ImprovementExtractor>) -> Self {
        Self {
            state: LearningState::default(),
            improvement_index: HashMap::new(),
            extractor,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> &LearningState {
        &self.state
    }

    /// Folds one accepted analysis into the running state.
    pub fn fold(&mut self, results: &AnalysisResult) {
        if let Some(matches) = &results.keyword_matches {
            self.state
                .successful_keywords
                .extend(matches.matched.iter().cloned());
        }

        for phrase in self.extractor.extract(&results.ai_suggestions) {
            match self.improvement_index.get(&phrase) {
                Some(&i) => self.state.common_improvements[i].count += 1,
                None => {
                    self.improvement_index
                        .insert(phrase.clone(), self.state.common_improvements.len());
                    self.state
                        .common_improvements
                        .push(ImprovementCount { phrase, count: 1 });
                }
            }
        }

        for (section, feedback) in &results.section_analysis {
            self.state
                .section_patterns
                .entry(*section)
                .or_default()
                .push(feedback.content.clone());
        }
    }

    pub fn insights(&self) -> LearningInsights {
        LearningInsights {
            top_keywords: self.state.successful_keywords.clone(),
            top_improvements: self.ranked_improvements(TOP_IMPROVEMENTS),
            section_coverage: self
                .state
                .section_patterns
                .iter()
                .map(|(section, samples)| {
                    (*section, samples.iter().filter(|s| !s.is_empty()).count())
                })
                .collect(),
        }
    }

    /// Hints for the next prompt: learned keywords missing from `resume_text`,
    /// then the most frequent improvements.
    pub fn personalized_hints(&self, resume_text: &str) -> Vec<String> {
        let mut hints = Vec::new();
        let resume_lower = resume_text.to_lowercase();

        let missing: Vec<&str> = self
            .state
            .successful_keywords
            .iter()
            .filter(|kw| !resume_lower.contains(kw.as_str()))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            hints.push(format!(
                "Consider adding these successful keywords: {}",
                missing.join(", ")
            ));
        }

        let top = self.ranked_improvements(HINT_IMPROVEMENTS);
        if !top.is_empty() {
            hints.push("Common areas for improvement:".to_string());
            hints.extend(top.into_iter().map(|i| format!("- {}", i.phrase)));
        }

        hints
    }

    pub fn clear(&mut self) {
        self.state = LearningState::default();
        self.improvement_index.clear();
    }

    fn ranked_improvements(&self, limit: usize) -> Vec<ImprovementCount> {
        let mut ranked = self.state.common_improvements.clone();
        // stable sort keeps first-seen order among equal counts
        ranked.sort_by(|a, b| b.count.cmp(&a.count));
        ranked.truncate(limit);
        ranked
    }
}
