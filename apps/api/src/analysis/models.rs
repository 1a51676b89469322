use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::analysis::keywords::KeywordMatches;

/// The four resume divisions the analyzer reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionName {
    Summary,
    Experience,
    Education,
    Skills,
}

impl SectionName {
    pub const ALL: [SectionName; 4] = [
        SectionName::Summary,
        SectionName::Experience,
        SectionName::Education,
        SectionName::Skills,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionName::Summary => "summary",
            SectionName::Experience => "experience",
            SectionName::Education => "education",
            SectionName::Skills => "skills",
        }
    }
}

impl fmt::Display for SectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionFeedback {
    pub content: String,
    pub suggestions: String,
}

/// Quality metrics, each in [0, 100]. `keyword_match` only exists when a JD was given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreCard {
    pub readability: f64,
    pub formatting: f64,
    pub content: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword_match: Option<f64>,
}

impl ScoreCard {
    /// (metric_name, value) pairs in a fixed order.
    pub fn metrics(&self) -> Vec<(&'static str, f64)> {
        let mut metrics = vec![
            ("readability", self.readability),
            ("formatting", self.formatting),
            ("content", self.content),
        ];
        if let Some(keyword_match) = self.keyword_match {
            metrics.push(("keyword_match", keyword_match));
        }
        metrics
    }
}

/// Full output of one resume analysis.
///
/// `keyword_matches` is absent (not empty) when no job description was supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub scores: ScoreCard,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword_matches: Option<KeywordMatches>,
    pub section_analysis: BTreeMap<SectionName, SectionFeedback>,
    pub ai_suggestions: String,
}
