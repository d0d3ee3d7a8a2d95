//! Optimization Report
//!
//! The immutable output record extracted from a finished `AnalysisState`.
//! Serializes to the JSON shape consumers see; the working state itself is
//! never exposed.

use super::state::{AnalysisState, LearningPriority, RoadmapItem, SkillAssessment, StageName};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationReport {
    pub id: Uuid,
    pub generated_at: DateTime<Utc>,

    // ATS analysis
    pub ats_score: u32,
    pub ats_components: BTreeMap<String, u32>,
    pub ats_justification: Vec<String>,
    pub structure_suggestions: Vec<String>,

    // Skill intelligence
    pub skill_evidence: Vec<SkillAssessment>,
    pub overall_readiness: String,
    pub ready_skills: Vec<String>,
    pub critical_gaps: Vec<String>,
    pub learning_priorities: Vec<LearningPriority>,

    // Optimization advice
    pub honest_improvements: Vec<String>,
    pub learning_roadmap: Vec<RoadmapItem>,
    pub job_readiness_estimate: String,

    // Run audit trail
    pub completed_stages: Vec<StageName>,
    pub iteration_count: u32,
    pub messages: Vec<String>,
}

impl OptimizationReport {
    /// Extract the report from a finished state, consuming it. Works on
    /// partial states too: a budget-exhausted run reports whatever its
    /// completed stages produced, with the gaps visible as empty fields.
    pub fn from_state(state: AnalysisState) -> Self {
        Self {
            id: Uuid::new_v4(),
            generated_at: Utc::now(),
            ats_score: state.ats_score,
            ats_components: state.ats_components,
            ats_justification: state.ats_justification,
            structure_suggestions: state.structure_suggestions,
            skill_evidence: state.skill_evidence,
            overall_readiness: state.overall_readiness,
            ready_skills: state.ready_skills,
            critical_gaps: state.critical_gaps,
            learning_priorities: state.learning_priorities,
            honest_improvements: state.honest_improvements,
            learning_roadmap: state.learning_roadmap,
            job_readiness_estimate: state.job_readiness_estimate,
            completed_stages: state.completed_stages,
            iteration_count: state.iteration_count,
            messages: state.messages,
        }
    }
}
