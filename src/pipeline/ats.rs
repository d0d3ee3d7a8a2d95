//! ATS Compatibility Scorer (`analyze_resume` stage)
//!
//! Produces the overall ATS score from four independent component scores
//! (structure, keywords, content quality, formatting) combined by fixed
//! weights, plus structural-fix suggestions when the score falls below the
//! acceptance threshold.

use super::parsing::numbered_items;
use super::state::AnalysisState;
use super::clip;
use crate::generate::Generator;
use regex::Regex;
use std::collections::{BTreeMap, HashSet};

/// Below this overall score the stage asks the generator for structural
/// fixes. Policy constant, not derived.
pub const ATS_THRESHOLD: u32 = 60;

const WEIGHT_STRUCTURE: f64 = 0.25;
const WEIGHT_KEYWORDS: f64 = 0.35;
const WEIGHT_CONTENT: f64 = 0.25;
const WEIGHT_FORMATTING: f64 = 0.15;

/// Keyword score when there is no job description to match against.
const KEYWORD_DEFAULT: f64 = 75.0;

const ESSENTIAL_SECTIONS: [&str; 4] = ["contact", "experience", "education", "skills"];
const HELPFUL_SECTIONS: [&str; 5] = [
    "summary",
    "projects",
    "certifications",
    "publications",
    "awards",
];

/// Stop words stripped before keyword matching: common English plus the
/// corporate fluff that appears in every job description.
const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "with", "that", "this", "you", "not", "are", "from", "your", "have",
    "has", "had", "was", "were", "will", "would", "should", "could", "can", "our", "their",
    "his", "her", "its", "they", "them", "these", "those", "been", "being", "did", "does",
    "doing", "done", "who", "what", "when", "where", "why", "how", "all", "any", "both",
    "each", "few", "more", "most", "some", "such", "than", "too", "very", "just", "own",
    "into", "over", "also", "only", "responsibilities", "responsibility", "candidate",
    "candidates", "team", "teams", "work", "working", "duties", "duty", "role", "roles",
    "position", "positions", "company", "companies", "organization", "organizations",
    "business", "businesses", "experience", "experiences", "required", "requirements",
    "requirement", "preferred", "ability", "abilities", "opportunity", "opportunities",
    "seeking", "looking", "environment", "environments", "including", "include", "includes",
    "included", "must", "need", "needs", "needed", "ensure", "ensuring", "provide",
    "providing", "support", "supporting", "assist", "assisting", "help", "helping",
    "maintain", "maintaining", "knowledge", "understanding", "strong", "excellent", "good",
    "great", "best", "years", "year", "months", "month", "day", "days",
];

/// Action verbs recognized at the start of bullet points.
const ACTION_VERBS: &[&str] = &[
    "achieved", "accelerated", "accomplished", "administered", "advanced", "analyzed",
    "architected", "assembled", "assessed", "attained", "authored", "automated", "balanced",
    "boosted", "briefed", "budgeted", "built", "calculated", "captured", "centralized",
    "chaired", "championed", "clarified", "coached", "collaborated", "communicated",
    "compiled", "completed", "composed", "computed", "conceptualized", "conducted",
    "consolidated", "constructed", "consulted", "contacted", "contributed", "controlled",
    "converted", "coordinated", "created", "customized", "decreased", "defined", "delegated",
    "delivered", "deployed", "designed", "detected", "determined", "developed", "devised",
    "diagnosed", "directed", "discovered", "dispatched", "distributed", "documented",
    "doubled", "drafted", "drove", "earned", "edited", "eliminated", "enabled", "enhanced",
    "ensured", "established", "evaluated", "examined", "executed", "expanded", "expedited",
    "facilitated", "fixed", "formulated", "founded", "gained", "generated", "guided",
    "handled", "headed", "helped", "identified", "implemented", "improved", "increased",
    "influenced", "informed", "initiated", "inspected", "installed", "instituted",
    "instructed", "integrated", "interpreted", "interviewed", "introduced", "invented",
    "investigated", "launched", "led", "leveraged", "maintained", "managed", "marketed",
    "maximized", "measured", "mediated", "modernized", "modified", "monitored", "motivated",
    "navigated", "negotiated", "operated", "optimized", "orchestrated", "organized",
    "originated", "overhauled", "oversaw", "performed", "persuaded", "pioneered", "planned",
    "prepared", "presented", "processed", "procured", "produced", "programmed", "promoted",
    "provided", "publicized", "published", "purchased", "recommended", "reconciled",
    "recorded", "recruited", "redesigned", "reduced", "reengineered", "referred", "reformed",
    "reinvented", "released", "remodeled", "repaired", "replaced", "reported", "represented",
    "researched", "resolved", "restored", "restructured", "retrieved", "revamped",
    "reviewed", "revised", "revitalized", "saved", "scheduled", "screened", "secured",
    "selected", "separated", "served", "serviced", "set", "settled", "shaped", "shared",
    "showed", "simplified", "simulated", "solved", "sorted", "spearheaded", "specified",
    "standardized", "stimulated", "streamlined", "strengthened", "structured", "studied",
    "submitted", "summarized", "supervised", "supported", "surpassed", "surveyed",
    "synthesized", "systematized", "tabulated", "targeted", "taught", "tested", "tracked",
    "trained", "transformed", "translated", "trimmed", "tripled", "troubleshot", "tutored",
    "unified", "updated", "upgraded", "utilized", "validated", "valued", "verified",
    "visualized", "wrote",
];

/// Adverbs that may precede the action verb in a bullet.
const COMMON_ADVERBS: &[&str] = &[
    "successfully", "effectively", "efficiently", "directly", "consistently", "proactively",
    "independently", "collaboratively", "strategically", "actively", "significantly",
    "substantially", "comprehensively", "thoroughly", "rapidly", "quickly", "personally",
    "professionally", "regularly", "frequently",
];

/// Component scores plus the weighted overall score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtsBreakdown {
    pub overall: u32,
    pub structure: u32,
    pub keywords: u32,
    pub content: u32,
    pub formatting: u32,
}

impl AtsBreakdown {
    /// Component map keyed the way the report exposes it.
    pub fn components(&self) -> BTreeMap<String, u32> {
        BTreeMap::from([
            ("structure_score".to_string(), self.structure),
            ("keyword_score".to_string(), self.keywords),
            ("content_score".to_string(), self.content),
            ("formatting_score".to_string(), self.formatting),
        ])
    }

    /// The two lowest-scoring components, worst first. Ties resolve in
    /// component order, keeping the decision deterministic.
    pub fn two_lowest(&self) -> [(&'static str, u32); 2] {
        let mut ranked = [
            ("structure_score", self.structure),
            ("keyword_score", self.keywords),
            ("content_score", self.content),
            ("formatting_score", self.formatting),
        ];
        ranked.sort_by_key(|(_, score)| *score);
        [ranked[0], ranked[1]]
    }
}

/// Deterministic resume scorer. All patterns are compiled once per scorer;
/// the scorer holds no per-request state and the same input always yields
/// the same breakdown.
pub struct AtsScorer {
    token_re: Regex,
    special_token_re: Regex,
    bullet_re: Regex,
    metrics_re: Regex,
    date_res: Vec<Regex>,
    stop_words: HashSet<&'static str>,
    action_verbs: HashSet<&'static str>,
    adverbs: HashSet<&'static str>,
}

impl AtsScorer {
    pub fn new() -> Self {
        Self {
            // Keeps compound technical tokens together: "node.js" stays one
            // token via the dotted continuation.
            token_re: Regex::new(r"\b[A-Za-z][A-Za-z0-9+#]*(?:\.[A-Za-z0-9+#]+)*\b")
                .expect("hardcoded pattern"),
            // Symbol-suffixed names the word-boundary pattern cannot close:
            // C++, C#, F#, .NET.
            special_token_re: Regex::new(r"(?i)c\+\+|c#|f#|\.net").expect("hardcoded pattern"),
            bullet_re: Regex::new(r"^[-•*✓►▪→]\s*").expect("hardcoded pattern"),
            metrics_re: Regex::new(
                r"\b\d+%|\$[\d,]+|\d+\s*(?:percent|dollars|users|clients|people|customers|sales|revenue|growth|increase|decrease|reduction|projects?|teams?|members?)\b",
            )
            .expect("hardcoded pattern"),
            date_res: vec![
                Regex::new(r"(?i)\b(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)[a-z]*\.?\s+\d{4}\b")
                    .expect("hardcoded pattern"),
                Regex::new(r"\b\d{2}/\d{2}/\d{4}\b").expect("hardcoded pattern"),
                Regex::new(r"\b\d{4}-\d{2}\b").expect("hardcoded pattern"),
                Regex::new(r"(?i)\b\d{4}\s*[-–]\s*(?:Present|Current|Now|\d{4})\b")
                    .expect("hardcoded pattern"),
            ],
            stop_words: STOP_WORDS.iter().copied().collect(),
            action_verbs: ACTION_VERBS.iter().copied().collect(),
            adverbs: COMMON_ADVERBS.iter().copied().collect(),
        }
    }

    /// Score all four components and combine by fixed weights.
    pub fn score(
        &self,
        resume_text: &str,
        job_description: &str,
        sections: &BTreeMap<String, String>,
    ) -> AtsBreakdown {
        let structure = self.structure_score(sections);
        let keywords = self.keyword_score(resume_text, job_description);
        let content = self.content_score(resume_text);
        let formatting = self.formatting_score(resume_text);

        let overall = (f64::from(structure) * WEIGHT_STRUCTURE
            + f64::from(keywords) * WEIGHT_KEYWORDS
            + f64::from(content) * WEIGHT_CONTENT
            + f64::from(formatting) * WEIGHT_FORMATTING)
            .round() as u32;

        AtsBreakdown {
            overall,
            structure,
            keywords,
            content,
            formatting,
        }
    }

    /// Presence and substantive length of canonical sections. Essential
    /// sections are worth up to 25 points each (capped at 100, scaled 0.7);
    /// helpful sections up to 10 each (capped at 50, scaled 0.3).
    pub fn structure_score(&self, sections: &BTreeMap<String, String>) -> u32 {
        let substantive = |name: &str| {
            sections
                .get(name)
                .map(|content| content.trim().len() > 20)
                .unwrap_or(false)
        };

        let essential: u32 = ESSENTIAL_SECTIONS
            .iter()
            .filter(|s| substantive(s))
            .count() as u32
            * 25;
        let helpful: u32 = HELPFUL_SECTIONS.iter().filter(|s| substantive(s)).count() as u32 * 10;

        let essential = essential.min(100);
        let helpful = helpful.min(50);

        (f64::from(essential) * 0.7 + f64::from(helpful) * 0.3).round() as u32
    }

    /// Token-set overlap between resume and job description, mapped through
    /// a piecewise-linear curve that rewards early matches faster than late
    /// ones: 0-50% match scales by 1.5, 50-100% by 0.5 on top of 75.
    pub fn keyword_score(&self, resume_text: &str, job_description: &str) -> u32 {
        if job_description.trim().is_empty() {
            return KEYWORD_DEFAULT as u32;
        }

        let job_tokens = self.tokens(job_description);
        if job_tokens.is_empty() {
            return KEYWORD_DEFAULT as u32;
        }
        let resume_tokens = self.tokens(resume_text);

        let matched = job_tokens.intersection(&resume_tokens).count();
        let match_pct = (matched as f64 / job_tokens.len() as f64) * 100.0;

        let score = if match_pct <= 50.0 {
            match_pct * 1.5
        } else {
            75.0 + (match_pct - 50.0) * 0.5
        };

        score.min(100.0).round() as u32
    }

    /// Action-verb usage in bullet lines (60%) combined with the density of
    /// quantified achievements (40%, 15 points per metric, capped at 100).
    pub fn content_score(&self, resume_text: &str) -> u32 {
        let bullet_lines: Vec<&str> = resume_text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && self.bullet_re.is_match(line))
            .collect();

        let mut action_verb_count = 0usize;
        for line in &bullet_lines {
            let cleaned = self.bullet_re.replace(line, "").to_lowercase();
            let mut words = cleaned.split_whitespace();
            let Some(first) = words.next() else { continue };
            let first = first.trim_end_matches([',', '.', ':', ';']);

            if self.action_verbs.contains(first) {
                action_verb_count += 1;
                continue;
            }
            // A leading adverb defers the verb to the second word.
            if self.adverbs.contains(first) {
                if let Some(second) = words.next() {
                    let second = second.trim_end_matches([',', '.', ':', ';']);
                    if self.action_verbs.contains(second) {
                        action_verb_count += 1;
                    }
                }
            }
        }

        let action_verb_score = if bullet_lines.is_empty() {
            0.0
        } else {
            ((action_verb_count as f64 / bullet_lines.len() as f64) * 100.0).min(100.0)
        };

        let metrics_count = self.metrics_re.find_iter(&resume_text.to_lowercase()).count();
        let metrics_score = ((metrics_count * 15) as f64).min(100.0);

        (action_verb_score * 0.6 + metrics_score * 0.4).round() as u32
    }

    /// Additive formatting checks: bullet usage (30), blank-line ratio in a
    /// healthy band (40, or 20 for a loose band), and at least two
    /// recognizable date expressions (30).
    pub fn formatting_score(&self, resume_text: &str) -> u32 {
        let lines: Vec<&str> = resume_text.lines().collect();

        let has_bullets = lines
            .iter()
            .any(|line| self.bullet_re.is_match(line.trim()));

        let blank_count = lines.iter().filter(|line| line.trim().is_empty()).count();
        let blank_ratio = if lines.is_empty() {
            0.0
        } else {
            blank_count as f64 / lines.len() as f64
        };

        let date_count: usize = self
            .date_res
            .iter()
            .map(|re| re.find_iter(resume_text).count())
            .sum();

        let mut score = 0;
        if has_bullets {
            score += 30;
        }
        if (0.05..=0.30).contains(&blank_ratio) {
            score += 40;
        } else if blank_ratio > 0.0 && blank_ratio < 0.5 {
            score += 20;
        }
        if date_count >= 2 {
            score += 30;
        }
        score
    }

    /// Case-insensitive token set with stop words and single characters
    /// removed.
    fn tokens(&self, text: &str) -> HashSet<String> {
        let mut tokens: HashSet<String> = self
            .token_re
            .find_iter(text)
            .map(|m| m.as_str().to_lowercase())
            .collect();
        tokens.extend(
            self.special_token_re
                .find_iter(text)
                .map(|m| m.as_str().to_lowercase()),
        );
        tokens.retain(|t| t.len() > 1 && !self.stop_words.contains(t.as_str()));
        tokens
    }
}

impl Default for AtsScorer {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-component justification strings at the 80/60 thresholds.
pub fn justifications(breakdown: &AtsBreakdown) -> Vec<String> {
    let pick = |score: u32, high: &str, mid: &str, low: &str| {
        if score >= 80 {
            high.to_string()
        } else if score >= 60 {
            mid.to_string()
        } else {
            low.to_string()
        }
    };

    vec![
        pick(
            breakdown.structure,
            "Strong resume structure with all essential sections.",
            "Good resume structure, but could improve some sections.",
            "Resume is missing key sections that ATS systems expect.",
        ),
        pick(
            breakdown.keywords,
            "Excellent keyword matching with job description.",
            "Decent keyword matching, but some key terms are missing.",
            "Poor keyword alignment with the job description.",
        ),
        pick(
            breakdown.content,
            "Strong use of action verbs and quantifiable achievements.",
            "Good content, but could use more action verbs or metrics.",
            "Content lacks action verbs and measurable achievements.",
        ),
        pick(
            breakdown.formatting,
            "Clean, consistent formatting that ATS systems can parse easily.",
            "Acceptable formatting, but some inconsistencies may affect parsing.",
            "Formatting issues may prevent proper ATS parsing.",
        ),
    ]
}

fn build_structure_prompt(state: &AnalysisState, breakdown: &AtsBreakdown) -> String {
    let [(worst_name, worst), (second_name, second)] = breakdown.two_lowest();

    let sections_found: Vec<String> = state
        .resume_sections
        .iter()
        .filter(|(_, content)| !content.trim().is_empty())
        .map(|(name, content)| format!("- {}: {} chars", name, content.len()))
        .collect();

    format!(
        "You are an ATS optimization expert.\n\n\
         The two weakest ATS components for this resume:\n\
         - {}: {}/100\n\
         - {}: {}/100\n\n\
         Resume sections found:\n{}\n\n\
         Job description (excerpt):\n{}\n\n\
         Provide exactly 3 critical structural fixes addressing those two \
         components.\n\n\
         Format:\n\
         1. [Issue] - [Solution]\n\
         2. [Issue] - [Solution]\n\
         3. [Issue] - [Solution]\n\n\
         Be specific and actionable.",
        worst_name,
        worst,
        second_name,
        second,
        sections_found.join("\n"),
        clip(&state.job_description, 300),
    )
}

/// `analyze_resume` stage: writes `ats_score`, `ats_components`,
/// `ats_justification` and, below the threshold, `structure_suggestions`.
/// Re-entrant: every field is recomputed from the inputs and overwritten.
pub fn analyze_resume(state: &mut AnalysisState, generator: &dyn Generator) {
    state.push_message("Resume Analyzer: starting ATS analysis".to_string());

    let scorer = AtsScorer::new();
    let breakdown = scorer.score(
        &state.resume_text,
        &state.job_description,
        &state.resume_sections,
    );

    state.push_message(format!(
        "Resume Analyzer: ATS score = {}/100",
        breakdown.overall
    ));

    let mut suggestions = Vec::new();
    if breakdown.overall < ATS_THRESHOLD {
        let prompt = build_structure_prompt(state, &breakdown);
        match generator.generate(
            "You are an ATS resume structure expert. Provide exactly 3 fixes.",
            &prompt,
        ) {
            Ok(text) => {
                suggestions = numbered_items(&text);
                if suggestions.is_empty() {
                    // Unstructured reply: keep the raw text as a single item.
                    suggestions = vec![text.trim().to_string()];
                }
                state.push_message(format!(
                    "Resume Analyzer: generated {} structural fixes",
                    suggestions.len()
                ));
            }
            Err(err) => {
                log::warn!("structure suggestion generation failed: {}", err);
                state.push_message(format!("Resume Analyzer: generation failed ({})", err));
                suggestions =
                    vec!["Consider using an ATS-optimized resume template".to_string()];
            }
        }
    }

    state.ats_score = breakdown.overall;
    state.ats_components = breakdown.components();
    state.ats_justification = justifications(&breakdown);
    state.structure_suggestions = suggestions;
}
