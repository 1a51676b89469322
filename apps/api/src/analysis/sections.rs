//! Section Analyzer — heading detection and span capture for the four core sections.
//!
//! A line is a heading when, stripped of markup and case-folded, it equals a known
//! alias, or when it is styled like a heading (trailing colon, leading `#`, or all
//! caps), at most five words long, and contains an alias as a whole-word phrase.
//! Headings of other resume sections (projects, awards, ...) close the current
//! section and their bodies are dropped. Written inline (`Languages: Rust, Go`)
//! inside an open section they are ordinary body lines.

use std::collections::BTreeMap;

use crate::analysis::keywords::tokenize;
use crate::analysis::models::{SectionFeedback, SectionName};

const MAX_HEADING_WORDS: usize = 5;

const SUMMARY_ALIASES: &[&str] = &[
    "summary",
    "professional summary",
    "career summary",
    "executive summary",
    "profile",
    "professional profile",
    "about",
    "about me",
    "objective",
    "career objective",
    "overview",
];

const EXPERIENCE_ALIASES: &[&str] = &[
    "experience",
    "work experience",
    "professional experience",
    "relevant experience",
    "employment",
    "employment history",
    "work history",
    "career history",
];

const EDUCATION_ALIASES: &[&str] = &[
    "education",
    "education and training",
    "academic background",
    "academics",
    "qualifications",
    "academic qualifications",
];

const SKILLS_ALIASES: &[&str] = &[
    "skills",
    "technical skills",
    "core skills",
    "key skills",
    "skill set",
    "skillset",
    "core competencies",
    "competencies",
    "technologies",
];

const OTHER_HEADINGS: &[&str] = &[
    "projects",
    "personal projects",
    "certifications",
    "certificates",
    "awards",
    "honors",
    "achievements",
    "publications",
    "languages",
    "interests",
    "hobbies",
    "volunteer",
    "volunteering",
    "volunteer experience",
    "references",
    "contact",
    "contact information",
];

/// Canned improvement tip per section; independent of the section's content.
pub fn section_suggestion(section: SectionName) -> &'static str {
    match section {
        SectionName::Summary => {
            "Make sure to include your years of experience and key achievements."
        }
        SectionName::Experience => "Use action verbs and quantify achievements with metrics.",
        SectionName::Education => "Include relevant coursework and academic achievements.",
        SectionName::Skills => "Group skills by category and highlight proficiency levels.",
    }
}

/// What a recognized heading opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingKind {
    Section(SectionName),
    Other,
}

/// A heading line, plus any text that followed `Heading:` on the same line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub kind: HeadingKind,
    pub inline: Option<String>,
}

/// Classifies a single line as a heading, or returns `None` for body text.
pub fn detect_heading(line: &str) -> Option<Heading> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some((prefix, rest)) = trimmed.split_once(':') {
        let rest = rest.trim();
        if !rest.is_empty() {
            return classify(prefix, true).map(|kind| Heading {
                kind,
                inline: Some(rest.to_string()),
            });
        }
    }

    classify(trimmed, looks_like_heading(trimmed)).map(|kind| Heading { kind, inline: None })
}

fn looks_like_heading(line: &str) -> bool {
    if line.ends_with(':') || line.starts_with('#') {
        return true;
    }
    let letters: Vec<char> = line.chars().filter(|c| c.is_alphabetic()).collect();
    letters.len() >= 2 && letters.iter().all(|c| c.is_uppercase())
}

fn classify(text: &str, styled: bool) -> Option<HeadingKind> {
    let tokens = tokenize(text);
    if tokens.is_empty() || tokens.len() > MAX_HEADING_WORDS {
        return None;
    }

    let alias_groups = alias_groups();

    // Exact alias wins over phrase containment, so "volunteer experience" stays Other.
    for (kind, aliases) in &alias_groups {
        if aliases.iter().any(|alias| tokenize(alias) == tokens) {
            return Some(*kind);
        }
    }

    if !styled {
        return None;
    }

    alias_groups.into_iter().find_map(|(kind, aliases)| {
        aliases
            .iter()
            .any(|alias| {
                let alias_tokens = tokenize(alias);
                tokens
                    .windows(alias_tokens.len())
                    .any(|window| window == alias_tokens.as_slice())
            })
            .then_some(kind)
    })
}

fn alias_groups() -> [(HeadingKind, &'static [&'static str]); 5] {
    [
        (HeadingKind::Section(SectionName::Summary), SUMMARY_ALIASES),
        (HeadingKind::Section(SectionName::Experience), EXPERIENCE_ALIASES),
        (HeadingKind::Section(SectionName::Education), EDUCATION_ALIASES),
        (HeadingKind::Section(SectionName::Skills), SKILLS_ALIASES),
        (HeadingKind::Other, OTHER_HEADINGS),
    ]
}

/// Captures the lines under each core heading. Absent sections are simply missing.
pub fn extract_sections(text: &str) -> BTreeMap<SectionName, Vec<String>> {
    let mut captured: BTreeMap<SectionName, Vec<String>> = BTreeMap::new();
    let mut current: Option<SectionName> = None;

    for line in text.lines() {
        if let Some(heading) = detect_heading(line) {
            // "Languages: Python, Rust" under an open section is a sub-line, not a boundary
            let is_sub_line = heading.kind == HeadingKind::Other && heading.inline.is_some();
            if let (true, Some(name)) = (is_sub_line, current) {
                captured.entry(name).or_default().push(line.trim().to_string());
                continue;
            }

            current = match heading.kind {
                HeadingKind::Section(name) => Some(name),
                HeadingKind::Other => None,
            };
            if let Some(name) = current {
                let lines = captured.entry(name).or_default();
                if let Some(inline) = heading.inline {
                    lines.push(inline);
                }
            }
            continue;
        }

        let body = line.trim();
        if body.is_empty() {
            continue;
        }
        if let Some(name) = current {
            captured.entry(name).or_default().push(body.to_string());
        }
    }

    captured
}

/// Content and canned suggestions for all four sections.
pub fn analyze_sections(resume_text: &str) -> BTreeMap<SectionName, SectionFeedback> {
    let mut captured = extract_sections(resume_text);

    SectionName::ALL
        .into_iter()
        .map(|name| {
            let content = captured.remove(&name).unwrap_or_default().join("\n");
            (
                name,
                SectionFeedback {
                    content,
                    suggestions: section_suggestion(name).to_string(),
                },
            )
        })
        .collect()
}
