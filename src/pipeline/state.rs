//! Pipeline State
//!
//! `AnalysisState` is the single record threaded through the pipeline. All
//! fields are declared up front with defined defaults; stages overwrite their
//! own output fields and append to `completed_stages` and `messages`. The
//! state carries no identity beyond one optimization request and is discarded
//! once the report is extracted.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Default iteration budget: one dispatch per stage.
pub const DEFAULT_MAX_ITERATIONS: u32 = 3;

// ============================================================
// STAGES
// ============================================================

/// The three analysis stages, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageName {
    AnalyzeResume,
    AnalyzeSkills,
    GenerateAdvice,
}

impl StageName {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageName::AnalyzeResume => "analyze_resume",
            StageName::AnalyzeSkills => "analyze_skills",
            StageName::GenerateAdvice => "generate_advice",
        }
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================
// SKILL ASSESSMENT
// ============================================================

/// Evidence classification for a job-relevant skill.
///
/// - `Confirmed`: explicitly mentioned AND used in projects/work with context.
/// - `Transferable`: not mentioned, but a related skill is evidenced.
/// - `Missing`: no evidence of the skill or a close relative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillStatus {
    Confirmed,
    Transferable,
    Missing,
}

impl SkillStatus {
    /// Map a free-form status string onto the canonical 3-status model.
    /// Unknown labels (including the superseded "aspirational") count as
    /// missing: an unverifiable claim is not evidence.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "confirmed" => SkillStatus::Confirmed,
            "transferable" => SkillStatus::Transferable,
            _ => SkillStatus::Missing,
        }
    }
}

/// One validated skill: status, evidence, and proficiency gap in one record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillAssessment {
    pub skill: String,
    pub status: SkillStatus,
    /// Human-readable citations; empty only when status is missing.
    pub evidence: Vec<String>,
    /// 0.0 to 1.0
    pub confidence: f64,
    /// Assessed proficiency, 0-3 (0=none, 1=basic, 2=intermediate, 3=advanced)
    pub current_level: u8,
    /// Proficiency the job demands, 0-3
    pub required_level: u8,
    /// `required_level - current_level`, floored at 0
    pub gap: u8,
    /// Free-form duration estimate; empty exactly when gap is 0.
    pub learning_time: String,
}

impl SkillAssessment {
    /// Build an assessment from untrusted generator output, enforcing every
    /// field invariant:
    /// - levels clamped to [0,3], confidence clamped to [0.0,1.0]
    /// - `gap` never negative
    /// - a confirmed/transferable claim without evidence downgrades to missing
    /// - `learning_time` cleared when gap=0, defaulted when gap>0
    pub fn normalized(
        skill: String,
        status: SkillStatus,
        evidence: Vec<String>,
        confidence: f64,
        current_level: i64,
        required_level: i64,
        learning_time: String,
    ) -> Self {
        let evidence: Vec<String> = evidence
            .into_iter()
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .collect();

        let status = if evidence.is_empty() && status != SkillStatus::Missing {
            SkillStatus::Missing
        } else {
            status
        };

        let current_level = current_level.clamp(0, 3) as u8;
        let required_level = required_level.clamp(0, 3) as u8;
        let gap = required_level.saturating_sub(current_level);

        let learning_time = if gap == 0 {
            String::new()
        } else if learning_time.trim().is_empty() {
            default_learning_time(gap).to_string()
        } else {
            learning_time.trim().to_string()
        };

        Self {
            skill,
            status,
            evidence,
            confidence: confidence.clamp(0.0, 1.0),
            current_level,
            required_level,
            gap,
            learning_time,
        }
    }

    /// Normalized key used for uniqueness within one analysis.
    pub fn key(&self) -> String {
        normalize_skill_key(&self.skill)
    }
}

/// Case-insensitive, trimmed skill name.
pub fn normalize_skill_key(skill: &str) -> String {
    skill.trim().to_lowercase()
}

fn default_learning_time(gap: u8) -> &'static str {
    match gap {
        1 => "3-4 weeks",
        2 => "2-3 months",
        _ => "4-6 months",
    }
}

// ============================================================
// LEARNING PRIORITIES AND ROADMAP
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
        }
    }
}

/// A skill gap the candidate should close, ranked by gap size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningPriority {
    pub skill: String,
    pub gap: u8,
    pub time: String,
    pub priority: Priority,
}

/// One roadmap entry derived from a learning priority.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadmapItem {
    pub skill: String,
    pub priority: Priority,
    pub time_estimate: String,
    pub recommendation: String,
}

// ============================================================
// ANALYSIS STATE
// ============================================================

/// The mutable record threaded through the pipeline. One per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisState {
    // ===== INPUT (set once at intake) =====
    pub resume_text: String,
    pub job_description: String,
    pub resume_sections: BTreeMap<String, String>,

    // ===== ATS ANALYSIS (analyze_resume) =====
    pub ats_score: u32,
    pub ats_components: BTreeMap<String, u32>,
    pub ats_justification: Vec<String>,
    pub structure_suggestions: Vec<String>,

    // ===== SKILL INTELLIGENCE (analyze_skills) =====
    pub skill_evidence: Vec<SkillAssessment>,
    /// e.g. "65% match", or "Unknown" when assessment degraded
    pub overall_readiness: String,
    pub ready_skills: Vec<String>,
    pub critical_gaps: Vec<String>,
    pub learning_priorities: Vec<LearningPriority>,

    // ===== OPTIMIZATION (generate_advice) =====
    pub honest_improvements: Vec<String>,
    pub learning_roadmap: Vec<RoadmapItem>,
    pub job_readiness_estimate: String,

    // ===== CONTROL FLOW =====
    /// Append-only; membership gates stage re-entry.
    pub completed_stages: Vec<StageName>,
    pub iteration_count: u32,
    pub max_iterations: u32,
    /// Append-only audit log. Never consulted for control decisions.
    pub messages: Vec<String>,
}

impl AnalysisState {
    pub fn new(
        resume_text: impl Into<String>,
        job_description: impl Into<String>,
        resume_sections: BTreeMap<String, String>,
    ) -> Self {
        Self {
            resume_text: resume_text.into(),
            job_description: job_description.into(),
            resume_sections,
            ats_score: 0,
            ats_components: BTreeMap::new(),
            ats_justification: Vec::new(),
            structure_suggestions: Vec::new(),
            skill_evidence: Vec::new(),
            overall_readiness: String::new(),
            ready_skills: Vec::new(),
            critical_gaps: Vec::new(),
            learning_priorities: Vec::new(),
            honest_improvements: Vec::new(),
            learning_roadmap: Vec::new(),
            job_readiness_estimate: String::new(),
            completed_stages: Vec::new(),
            iteration_count: 0,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            messages: Vec::new(),
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn is_complete(&self, stage: StageName) -> bool {
        self.completed_stages.contains(&stage)
    }

    /// Append a stage to the completion set. Idempotent: a stage name appears
    /// at most once and is never removed.
    pub fn mark_complete(&mut self, stage: StageName) {
        if !self.completed_stages.contains(&stage) {
            self.completed_stages.push(stage);
        }
    }

    pub fn push_message(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }
}
