//! Score Calculator — deterministic 0–100 quality metrics derived from raw resume text.
//!
//! readability = 100 − (avg_words_per_sentence − 15) × 2, clamped.
//! formatting  = 0.35·heading coverage + 0.25·bullet density + 0.25·line length + 0.15·spacing
//! content     = 0.35·action verbs + 0.35·quantified lines + 0.2·length + 0.1·(1 − vague lines)
//! keyword_match (with a JD only) = matched / (matched + missing) × 100, 100 when both are empty.
//!
//! Every metric has a zero-guard: empty or unpunctuated text yields a value, never an error.

use crate::analysis::keywords::KeywordIndex;
use crate::analysis::models::{ScoreCard, SectionName};
use crate::analysis::sections::{detect_heading, extract_sections};

const TARGET_SENTENCE_WORDS: f64 = 15.0;
const MAX_LINE_CHARS: usize = 120;
const IDEAL_MIN_WORDS: usize = 150;
const IDEAL_MAX_WORDS: usize = 800;

const BULLET_MARKERS: &[char] = &['-', '*', '•', '▪', '◦', '·', '–', '>'];

const ACTION_VERBS: &[&str] = &[
    "achieved", "architected", "automated", "built", "collaborated", "created", "cut",
    "delivered", "designed", "developed", "drove", "engineered", "established", "implemented",
    "improved", "increased", "launched", "led", "managed", "mentored", "migrated", "optimized",
    "owned", "reduced", "refactored", "scaled", "shipped", "spearheaded", "streamlined",
];

const VAGUE_VERBS: &[&str] = &[
    "helped",
    "worked on",
    "assisted",
    "participated",
    "involved",
    "responsible for",
];

/// Computes every metric for a resume. `keyword_match` is only set for a non-blank JD.
pub fn calculate_scores(resume_text: &str, job_description: Option<&str>) -> ScoreCard {
    let keyword_match = job_description
        .map(str::trim)
        .filter(|jd| !jd.is_empty())
        .map(|jd| {
            KeywordIndex::global()
                .match_keywords(resume_text, jd)
                .match_percentage()
        });

    ScoreCard {
        readability: readability_score(resume_text),
        formatting: formatting_score(resume_text),
        content: content_score(resume_text),
        keyword_match,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Readability
// ────────────────────────────────────────────────────────────────────────────

pub fn readability_score(text: &str) -> f64 {
    let avg = average_words_per_sentence(text);
    (100.0 - (avg - TARGET_SENTENCE_WORDS) * 2.0).clamp(0.0, 100.0)
}

/// Sentences are the non-blank segments of a period split. A text with no period
/// has zero sentences and an average of 0.
///
/// The empty tail after a final period is not a sentence, so "A b c." averages 3
/// words rather than 1.5.
fn average_words_per_sentence(text: &str) -> f64 {
    if !text.contains('.') {
        return 0.0;
    }
    let counts: Vec<usize> = text
        .split('.')
        .map(|s| s.split_whitespace().count())
        .filter(|&n| n > 0)
        .collect();
    if counts.is_empty() {
        return 0.0;
    }
    counts.iter().sum::<usize>() as f64 / counts.len() as f64
}

// ────────────────────────────────────────────────────────────────────────────
// Formatting
// ────────────────────────────────────────────────────────────────────────────

pub fn formatting_score(text: &str) -> f64 {
    let non_empty: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    if non_empty.is_empty() {
        return 0.0;
    }

    let heading_coverage =
        extract_sections(text).len() as f64 / SectionName::ALL.len() as f64;

    let body: Vec<&str> = non_empty
        .iter()
        .copied()
        .filter(|l| detect_heading(l).is_none())
        .collect();
    let bullet_density = if body.is_empty() {
        0.0
    } else {
        let bullets = body.iter().filter(|l| is_bullet(l)).count();
        bullet_density_score(bullets as f64 / body.len() as f64)
    };

    let short_lines = non_empty
        .iter()
        .filter(|l| l.trim_end().chars().count() <= MAX_LINE_CHARS)
        .count();
    let line_length = short_lines as f64 / non_empty.len() as f64;

    let spacing = spacing_score(text, &non_empty);

    (100.0
        * (0.35 * heading_coverage + 0.25 * bullet_density + 0.25 * line_length + 0.15 * spacing))
        .clamp(0.0, 100.0)
}

/// Full marks inside the 30–70% band; linear ramp below, half-slope decay above.
fn bullet_density_score(ratio: f64) -> f64 {
    if ratio < 0.3 {
        ratio / 0.3
    } else if ratio <= 0.7 {
        1.0
    } else {
        1.0 - (ratio - 0.7) / 0.3 * 0.5
    }
}

fn spacing_score(text: &str, non_empty: &[&str]) -> f64 {
    let trailing = non_empty
        .iter()
        .filter(|l| l.ends_with(' ') || l.ends_with('\t'))
        .count();
    let trailing_ratio = trailing as f64 / non_empty.len() as f64;

    let mut blank_run = 0;
    let mut excessive_gaps = 0;
    for line in text.lines() {
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run == 3 {
                excessive_gaps += 1;
            }
        } else {
            blank_run = 0;
        }
    }

    (1.0 - trailing_ratio - 0.25 * excessive_gaps as f64).clamp(0.0, 1.0)
}

fn is_bullet(line: &str) -> bool {
    let trimmed = line.trim_start();
    if trimmed.starts_with(BULLET_MARKERS) {
        return true;
    }
    // "1." / "2)" numbered lists
    let digits = trimmed.chars().take_while(|c| c.is_ascii_digit()).count();
    digits > 0 && matches!(trimmed[digits..].chars().next(), Some('.') | Some(')'))
}

fn strip_bullet(line: &str) -> &str {
    line.trim()
        .trim_start_matches(|c: char| BULLET_MARKERS.contains(&c))
        .trim_start()
}

// ────────────────────────────────────────────────────────────────────────────
// Content
// ────────────────────────────────────────────────────────────────────────────

pub fn content_score(text: &str) -> f64 {
    let statements: Vec<&str> = text
        .lines()
        .filter(|l| !l.trim().is_empty() && detect_heading(l).is_none())
        .map(strip_bullet)
        .filter(|l| !l.is_empty())
        .collect();
    if statements.is_empty() {
        return 0.0;
    }
    let total = statements.len() as f64;

    let action = statements.iter().filter(|s| starts_with_action_verb(s)).count() as f64 / total;
    let quantified = statements.iter().filter(|s| is_quantified(s)).count() as f64 / total;
    let vague = statements
        .iter()
        .filter(|s| is_vague(s) && !is_quantified(s))
        .count() as f64
        / total;
    let length = length_score(text.split_whitespace().count());

    (100.0 * (0.35 * action + 0.35 * quantified + 0.2 * length + 0.1 * (1.0 - vague)))
        .clamp(0.0, 100.0)
}

fn starts_with_action_verb(statement: &str) -> bool {
    statement
        .split_whitespace()
        .next()
        .map(|w| {
            w.trim_matches(|c: char| !c.is_alphabetic())
                .to_lowercase()
        })
        .is_some_and(|w| ACTION_VERBS.contains(&w.as_str()))
}

/// Digits, percentages, or currency amounts.
fn is_quantified(statement: &str) -> bool {
    statement.chars().any(|c| c.is_ascii_digit())
        || statement.contains('%')
        || statement.contains('$')
        || statement.contains('€')
        || statement.contains('£')
}

fn is_vague(statement: &str) -> bool {
    let lower = statement.to_lowercase();
    VAGUE_VERBS.iter().any(|v| lower.contains(v))
}

fn length_score(words: usize) -> f64 {
    if words < IDEAL_MIN_WORDS {
        words as f64 / IDEAL_MIN_WORDS as f64
    } else if words <= IDEAL_MAX_WORDS {
        1.0
    } else {
        (1.0 - (words - IDEAL_MAX_WORDS) as f64 / (2 * IDEAL_MAX_WORDS) as f64).max(0.5)
    }
}
