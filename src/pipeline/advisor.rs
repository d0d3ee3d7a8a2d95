//! Optimization Advisor (`generate_advice` stage)
//!
//! Produces 3-5 honest rewrite suggestions, a learning roadmap and a job
//! readiness projection. The honesty constraint is structural: the prompt is
//! built only from confirmed/transferable assessments, and missing skills
//! appear solely in the do-not-suggest list, so a suggestion to claim an
//! unevidenced skill cannot be produced by construction.

use super::parsing::numbered_items;
use super::state::{AnalysisState, RoadmapItem, SkillAssessment, SkillStatus};
use super::clip;
use crate::generate::Generator;

/// Readiness projection cap.
const PROJECTION_CAP: u32 = 95;
/// Heuristic readiness increment per addressed learning priority.
const READINESS_INCREMENT_PER_PRIORITY: u32 = 8;
/// At most this many priorities feed the roadmap and projection.
const ROADMAP_LIMIT: usize = 5;

/// Substituted whenever fewer than 3 suggestions can be parsed; downstream
/// consumers expect at least 3 entries.
fn fallback_improvements() -> Vec<String> {
    vec![
        "Highlight your strongest technical skills at the top of your Skills section"
            .to_string(),
        "Add specific metrics to your project descriptions (users, data size, performance gains)"
            .to_string(),
        "Use action verbs for your achievements (Built, Optimized, Reduced, Increased)"
            .to_string(),
    ]
}

fn evidence_line(assessment: &SkillAssessment) -> String {
    let cited: Vec<&str> = assessment
        .evidence
        .iter()
        .take(2)
        .map(String::as_str)
        .collect();
    format!("- {}: {}", assessment.skill, cited.join(", "))
}

/// Build the advice prompt from pre-filtered assessments. Missing skills are
/// named only in the forbidden list.
pub(crate) fn build_advice_prompt(
    confirmed: &[&SkillAssessment],
    transferable: &[&SkillAssessment],
    missing: &[&SkillAssessment],
    job_description: &str,
) -> String {
    let confirmed_summary: Vec<String> = confirmed.iter().map(|a| evidence_line(a)).collect();
    let transferable_summary: Vec<String> =
        transferable.iter().map(|a| evidence_line(a)).collect();
    let missing_names: Vec<&str> = missing.iter().map(|a| a.skill.as_str()).collect();

    format!(
        "You are an ethical resume coach. Help the candidate present their \
         ACTUAL skills honestly.\n\n\
         CONFIRMED SKILLS (they really have):\n{}\n\n\
         TRANSFERABLE SKILLS (related experience):\n{}\n\n\
         MISSING SKILLS (never suggest adding or claiming these):\n{}\n\n\
         JOB DESCRIPTION:\n{}\n\n\
         Provide exactly 5 honest resume improvements:\n\
         - 3 suggestions: how to HIGHLIGHT/QUANTIFY confirmed skills\n\
         - 2 suggestions: how to REFRAME transferable skills honestly\n\n\
         Format (exactly 5 items):\n\
         1. [Honest suggestion for confirmed skill]\n\
         2. [Honest suggestion for confirmed skill]\n\
         3. [Honest suggestion for confirmed skill]\n\
         4. [Honest reframing for transferable skill]\n\
         5. [Honest reframing for transferable skill]\n\n\
         Be direct, actionable, ethical. Never fabricate experience.",
        confirmed_summary.join("\n"),
        transferable_summary.join("\n"),
        missing_names.join(", "),
        clip(job_description, 800),
    )
}

/// Current readiness as an integer percentage, parsed from the leading
/// digits of strings like "65% match". "Unknown" (or anything non-numeric)
/// reads as 0.
fn current_readiness_pct(overall_readiness: &str) -> u32 {
    let digits: String = overall_readiness
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

/// Rough total months to close the top priorities, from their free-form
/// time estimates.
fn bridge_months(times: &[&str]) -> u32 {
    times
        .iter()
        .map(|t| {
            if t.contains("month") {
                if t.contains("2-3") {
                    3
                } else {
                    2
                }
            } else if t.contains("week") {
                1
            } else {
                0
            }
        })
        .sum()
}

/// `generate_advice` stage: writes `honest_improvements`,
/// `learning_roadmap` and `job_readiness_estimate`.
pub fn generate_advice(state: &mut AnalysisState, generator: &dyn Generator) {
    state.push_message("Optimization Advisor: generating honest suggestions".to_string());

    let confirmed: Vec<&SkillAssessment> = state
        .skill_evidence
        .iter()
        .filter(|a| a.status == SkillStatus::Confirmed)
        .collect();
    let transferable: Vec<&SkillAssessment> = state
        .skill_evidence
        .iter()
        .filter(|a| a.status == SkillStatus::Transferable)
        .collect();
    let missing: Vec<&SkillAssessment> = state
        .skill_evidence
        .iter()
        .filter(|a| a.status == SkillStatus::Missing)
        .collect();

    let prompt = build_advice_prompt(&confirmed, &transferable, &missing, &state.job_description);
    let improvements = match generator.generate(
        "You are an ethical career coach. Never suggest fabricating experience.",
        &prompt,
    ) {
        Ok(text) => {
            let mut items = numbered_items(&text);
            items.truncate(5);
            if items.len() < 3 {
                state.push_message(
                    "Optimization Advisor: too few suggestions parsed, using fallback"
                        .to_string(),
                );
                fallback_improvements()
            } else {
                items
            }
        }
        Err(err) => {
            log::warn!("advice generation failed: {}", err);
            state.push_message(format!("Optimization Advisor: generation failed ({})", err));
            fallback_improvements()
        }
    };
    state.push_message(format!(
        "Optimization Advisor: {} suggestions ready",
        improvements.len()
    ));

    let top_priorities = &state.learning_priorities[..state.learning_priorities.len().min(ROADMAP_LIMIT)];
    let roadmap: Vec<RoadmapItem> = top_priorities
        .iter()
        .map(|p| RoadmapItem {
            skill: p.skill.clone(),
            priority: p.priority,
            time_estimate: p.time.clone(),
            recommendation: format!(
                "Focus on {} ({} priority) - {}",
                p.skill,
                p.priority.as_str(),
                p.time
            ),
        })
        .collect();

    let current = current_readiness_pct(&state.overall_readiness);
    let projected = (current + top_priorities.len() as u32 * READINESS_INCREMENT_PER_PRIORITY)
        .min(PROJECTION_CAP);
    let times: Vec<&str> = top_priorities.iter().map(|p| p.time.as_str()).collect();
    let months = bridge_months(&times);
    let estimate = format!("{}% now -> {}% in {} months", current, projected, months);

    state.honest_improvements = improvements;
    state.learning_roadmap = roadmap;
    state.job_readiness_estimate = estimate;
}
