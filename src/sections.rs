//! Resume Section Segmentation
//!
//! Splits plain resume text into named sections by detecting header lines.
//! A header is a short line matching one of the per-section patterns, or one
//! that starts with a known header keyword. Content lines accumulate under
//! the most recent header; anything before the first header lands in
//! "other".

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Canonical section names, in output order.
pub const SECTION_NAMES: [&str; 10] = [
    "contact",
    "summary",
    "experience",
    "education",
    "skills",
    "projects",
    "certifications",
    "publications",
    "awards",
    "other",
];

/// Lines longer than this are content, never headers.
const MAX_HEADER_LEN: usize = 50;

fn section_patterns() -> &'static Vec<(&'static str, Regex)> {
    static PATTERNS: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let raw: [(&str, &str); 9] = [
            (
                "contact",
                r"contact\s*(info|information|details)?|personal\s*(info|information|details)?|email|phone|address",
            ),
            (
                "summary",
                r"(professional\s+)?summary|(career\s+)?objective|(professional\s+)?profile|about\s+me|overview",
            ),
            (
                "experience",
                r"(professional\s+|work\s+)?experience|work\s+history|employment(\s+history)?|professional\s+background|career\s+history",
            ),
            (
                "education",
                r"education(\s+&\s+training)?|academic\s+(background|qualifications|credentials)|degrees?|university|college|school",
            ),
            (
                "skills",
                r"(technical\s+|core\s+|key\s+)?skills?|(technical\s+)?competenc(ies|e)|technologies|tools|technical\s+proficienc(ies|y)|areas?\s+of\s+expertise",
            ),
            (
                "projects",
                r"(personal\s+|professional\s+|key\s+)?projects?|portfolio|notable\s+work",
            ),
            (
                "certifications",
                r"certifications?|licenses?(\s+&\s+certifications?)?|professional\s+certifications?|credentials?",
            ),
            (
                "publications",
                r"publications?|papers?|research(\s+papers?)?|articles?",
            ),
            (
                "awards",
                r"awards?(\s+&\s+honors)?|honors?(\s+&\s+awards)?|achievements?|recognition",
            ),
        ];
        raw.iter()
            .map(|(name, body)| {
                let pattern = format!(r"(?i)^\s*({})\s*:?\s*$", body);
                (*name, Regex::new(&pattern).expect("hardcoded pattern"))
            })
            .collect()
    })
}

/// Keyword fallback for headers the anchored patterns miss, e.g.
/// "Experience at Acme Corp" or headers with trailing decoration.
const HEADER_KEYWORDS: [(&str, &[&str]); 9] = [
    (
        "experience",
        &["experience", "work history", "employment", "professional background"],
    ),
    (
        "education",
        &["education", "academic", "degree", "university", "college"],
    ),
    (
        "skills",
        &["skills", "technical skills", "core skills", "competencies", "technologies"],
    ),
    ("projects", &["projects", "portfolio", "notable work"]),
    ("certifications", &["certifications", "licenses", "credentials"]),
    (
        "summary",
        &["summary", "objective", "profile", "about me", "overview"],
    ),
    ("contact", &["contact", "personal info"]),
    ("publications", &["publications", "papers", "research"]),
    ("awards", &["awards", "honors", "achievements"]),
];

/// Segments resume text into the canonical sections.
#[derive(Debug, Default)]
pub struct SectionParser;

impl SectionParser {
    pub fn new() -> Self {
        Self
    }

    /// Classify a line as a section header, if it is one.
    fn identify_section(&self, line: &str) -> Option<&'static str> {
        let cleaned = line.trim();
        if cleaned.is_empty() || cleaned.chars().count() > MAX_HEADER_LEN {
            return None;
        }

        for (name, pattern) in section_patterns() {
            if pattern.is_match(cleaned) {
                return Some(name);
            }
        }

        let lower = cleaned.to_lowercase();
        for (name, keywords) in HEADER_KEYWORDS {
            if keywords.iter().any(|k| lower.starts_with(k)) {
                return Some(name);
            }
        }
        None
    }

    /// Parse resume text into sections. Every canonical section is present
    /// in the result, empty when nothing matched. Header lines themselves
    /// are not part of the content.
    pub fn parse(&self, resume_text: &str) -> BTreeMap<String, String> {
        let mut sections: BTreeMap<String, String> = SECTION_NAMES
            .iter()
            .map(|name| (name.to_string(), String::new()))
            .collect();

        let mut current = "other";
        for line in resume_text.lines() {
            if let Some(section) = self.identify_section(line) {
                current = section;
                continue;
            }
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                let content = sections.get_mut(current).expect("canonical section");
                content.push_str(trimmed);
                content.push('\n');
            }
        }

        for content in sections.values_mut() {
            let stripped = content.trim_end().to_string();
            *content = stripped;
        }
        sections
    }

    /// Split a skills section into individual skill strings.
    pub fn parse_skills_list(&self, skills_text: &str) -> Vec<String> {
        static SPLIT_RE: OnceLock<Regex> = OnceLock::new();
        static BULLET_RE: OnceLock<Regex> = OnceLock::new();
        let split_re =
            SPLIT_RE.get_or_init(|| Regex::new(r"[,\n;•|·]+").expect("hardcoded pattern"));
        let bullet_re =
            BULLET_RE.get_or_init(|| Regex::new(r"^[-*✓►▪→]\s*").expect("hardcoded pattern"));

        split_re
            .split(skills_text)
            .map(|s| bullet_re.replace(s.trim(), "").trim().to_string())
            .filter(|s| s.chars().count() > 1)
            .collect()
    }
}
