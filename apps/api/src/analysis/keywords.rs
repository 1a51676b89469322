//! Keyword Index — fixed-vocabulary skill extraction and JD overlap.
//!
//! Matching is phrase-aware: every vocabulary term is tokenized with the same
//! tokenizer as the input, and a term matches when its token sequence appears
//! contiguously in the text. Single-word terms reduce to plain word membership;
//! "machine learning" and "ci/cd" (tokens `ci`, `cd`) match as units.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

const TECHNICAL_KEYWORDS: &[&str] = &[
    "python",
    "java",
    "javascript",
    "react",
    "node",
    "aws",
    "docker",
    "kubernetes",
    "ci/cd",
    "agile",
    "scrum",
    "machine learning",
    "ai",
    "data science",
    "cloud",
    "devops",
    "frontend",
    "backend",
    "fullstack",
];

const SOFT_SKILLS: &[&str] = &[
    "leadership",
    "communication",
    "teamwork",
    "problem solving",
    "analytical",
    "project management",
    "time management",
    "collaborative",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordCategory {
    Technical,
    Soft,
}

#[derive(Debug, Clone)]
struct VocabularyTerm {
    canonical: &'static str,
    tokens: Vec<String>,
    category: KeywordCategory,
}

/// Keywords found in the JD, split by whether the resume also mentions them.
///
/// `matched` and `missing` are disjoint and together equal the JD's keyword set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeywordMatches {
    pub matched: BTreeSet<String>,
    pub missing: BTreeSet<String>,
}

impl KeywordMatches {
    /// matched / (matched + missing) × 100, or 100.0 when the JD yielded nothing.
    pub fn match_percentage(&self) -> f64 {
        let total = self.matched.len() + self.missing.len();
        if total == 0 {
            return 100.0;
        }
        self.matched.len() as f64 / total as f64 * 100.0
    }
}

/// Immutable skill vocabulary. Use [`KeywordIndex::global`] for the shared instance.
#[derive(Debug, Clone)]
pub struct KeywordIndex {
    terms: Vec<VocabularyTerm>,
}

impl KeywordIndex {
    fn from_lists(technical: &[&'static str], soft: &[&'static str]) -> Self {
        let tagged = technical
            .iter()
            .map(|t| (*t, KeywordCategory::Technical))
            .chain(soft.iter().map(|t| (*t, KeywordCategory::Soft)));

        let terms = tagged
            .map(|(canonical, category)| VocabularyTerm {
                canonical,
                tokens: tokenize(canonical),
                category,
            })
            .filter(|term| !term.tokens.is_empty())
            .collect();

        Self { terms }
    }

    /// The process-wide vocabulary, built on first use.
    pub fn global() -> &'static KeywordIndex {
        static INDEX: OnceLock<KeywordIndex> = OnceLock::new();
        INDEX.get_or_init(|| KeywordIndex::from_lists(TECHNICAL_KEYWORDS, SOFT_SKILLS))
    }

    /// Returns every vocabulary term (both partitions) present in `text`.
    pub fn extract_keywords(&self, text: &str) -> BTreeSet<String> {
        let tokens = tokenize(text);
        self.terms
            .iter()
            .filter(|term| contains_sequence(&tokens, &term.tokens))
            .map(|term| term.canonical.to_string())
            .collect()
    }

    /// Splits the JD's keywords into those the resume covers and those it lacks.
    pub fn match_keywords(&self, resume_text: &str, job_description: &str) -> KeywordMatches {
        let job_keywords = self.extract_keywords(job_description);
        let resume_keywords = self.extract_keywords(resume_text);

        let (matched, missing) = job_keywords
            .into_iter()
            .partition(|kw| resume_keywords.contains(kw));

        KeywordMatches { matched, missing }
    }

    pub fn category_of(&self, keyword: &str) -> Option<KeywordCategory> {
        self.terms
            .iter()
            .find(|term| term.canonical == keyword)
            .map(|term| term.category)
    }
}

/// Lower-cased runs of alphanumeric/underscore characters.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn contains_sequence(haystack: &[String], needle: &[String]) -> bool {
    if needle.len() == 1 {
        return haystack.iter().any(|t| *t == needle[0]);
    }
    haystack.windows(needle.len()).any(|window| window == needle)
}
