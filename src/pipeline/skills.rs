//! Skill Evidence Analyzer (`analyze_skills` stage)
//!
//! One fused generation call produces validation, gap sizing and proficiency
//! leveling per skill. Fusing the three keeps a skill's status and its level
//! numbers internally consistent; a separate-pass design can mark a skill
//! confirmed while scoring its current level at zero.

use super::parsing::extract_json_array;
use super::state::{
    normalize_skill_key, AnalysisState, LearningPriority, Priority, SkillAssessment, SkillStatus,
};
use super::clip;
use crate::generate::Generator;
use serde::Deserialize;
use std::collections::HashSet;

/// Raw per-skill entry as the generator emits it. Everything is optional;
/// `SkillAssessment::normalized` turns it into a valid assessment.
#[derive(Debug, Deserialize)]
struct RawSkillEntry {
    #[serde(default)]
    skill: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    evidence: Vec<String>,
    #[serde(default)]
    confidence: f64,
    #[serde(default)]
    current_level: i64,
    #[serde(default)]
    required_level: i64,
    #[serde(default)]
    learning_time: String,
}

fn build_skills_prompt(resume_text: &str, job_description: &str) -> String {
    format!(
        "You are an expert technical recruiter performing honest skill assessment.\n\n\
         RESUME:\n{}\n\n\
         JOB DESCRIPTION:\n{}\n\n\
         For EVERY skill/technology mentioned in the job description, determine:\n\
         1. Status:\n\
            - \"confirmed\": explicitly mentioned AND used in projects/work with context\n\
            - \"transferable\": similar/related skill present (e.g. has Heroku, JD wants AWS)\n\
            - \"missing\": no evidence whatsoever\n\
         2. Proficiency levels (0-3): 0=none, 1=basic (guided use, 0-1 year),\n\
            2=intermediate (independent work, 1-3 years), 3=advanced (teaches others, 3+ years).\n\
            required_level from JD emphasis: bare mention=1, \"experience with\"=2, \"expert\"/\"lead\"=3.\n\
            current_level from resume evidence only: mention without context=0-1,\n\
            multiple projects/metrics/years=2, leadership/teaching/architecture=3.\n\
         3. learning_time to bridge the gap (e.g. \"3-4 weeks\", \"2-3 months\", \"0 months\" if ready).\n\n\
         Return ONLY a JSON array (10-15 key skills), one object per skill:\n\
         [{{\"skill\": \"Python\", \"status\": \"confirmed\",\n\
            \"evidence\": [\"Listed in Skills\", \"Used in 3 projects\"],\n\
            \"confidence\": 0.95, \"current_level\": 2, \"required_level\": 2,\n\
            \"gap\": 0, \"learning_time\": \"0 months\"}}]\n\n\
         Be strict: only mark \"confirmed\" when there is real evidence of use.",
        clip(resume_text, 2500),
        clip(job_description, 1200),
    )
}

/// Parse and normalize the generator's JSON into assessments, deduplicated
/// by normalized skill name (first occurrence wins).
fn parse_assessments(text: &str) -> Option<Vec<SkillAssessment>> {
    let json = extract_json_array(text)?;
    let raw: Vec<RawSkillEntry> = serde_json::from_str(json).ok()?;

    let mut seen: HashSet<String> = HashSet::new();
    let mut assessments = Vec::new();
    for entry in raw {
        let skill = entry.skill.trim().to_string();
        if skill.is_empty() || !seen.insert(normalize_skill_key(&skill)) {
            continue;
        }
        assessments.push(SkillAssessment::normalized(
            skill,
            SkillStatus::parse(&entry.status),
            entry.evidence,
            entry.confidence,
            entry.current_level,
            entry.required_level,
            entry.learning_time,
        ));
    }
    Some(assessments)
}

/// Derived views over the assessment list.
struct Aggregates {
    overall_readiness: String,
    ready_skills: Vec<String>,
    critical_gaps: Vec<String>,
    learning_priorities: Vec<LearningPriority>,
}

fn aggregate(assessments: &[SkillAssessment]) -> Aggregates {
    let ready_skills: Vec<String> = assessments
        .iter()
        .filter(|a| a.gap == 0)
        .map(|a| a.skill.clone())
        .collect();

    let critical_gaps: Vec<String> = assessments
        .iter()
        .filter(|a| a.status == SkillStatus::Missing && a.gap >= 2)
        .map(|a| a.skill.clone())
        .collect();

    let mut learning_priorities: Vec<LearningPriority> = assessments
        .iter()
        .filter(|a| a.gap > 0)
        .map(|a| LearningPriority {
            skill: a.skill.clone(),
            gap: a.gap,
            time: a.learning_time.clone(),
            priority: if a.gap >= 2 {
                Priority::High
            } else {
                Priority::Medium
            },
        })
        .collect();
    // Biggest gap first; stable sort keeps assessment order among ties.
    learning_priorities.sort_by(|a, b| b.gap.cmp(&a.gap));

    let overall_readiness = if assessments.is_empty() {
        "Unknown".to_string()
    } else {
        let pct = ready_skills.len() as f64 / assessments.len() as f64 * 100.0;
        format!("{:.0}% match", pct)
    };

    Aggregates {
        overall_readiness,
        ready_skills,
        critical_gaps,
        learning_priorities,
    }
}

/// `analyze_skills` stage: writes `skill_evidence` and its aggregates.
/// Unparsable or failed generation degrades to an empty assessment list and
/// an "Unknown" readiness; the stage still completes.
pub fn analyze_skills(state: &mut AnalysisState, generator: &dyn Generator) {
    state.push_message("Skill Intelligence: analyzing skills with evidence".to_string());

    let prompt = build_skills_prompt(&state.resume_text, &state.job_description);
    let assessments = match generator.generate(
        "You are a technical recruiter expert. Return ONLY a valid JSON array.",
        &prompt,
    ) {
        Ok(text) => match parse_assessments(&text) {
            Some(assessments) => assessments,
            None => {
                log::warn!("skill assessment output was unparsable");
                state.push_message(
                    "Skill Intelligence: unparsable output, recording empty assessment"
                        .to_string(),
                );
                Vec::new()
            }
        },
        Err(err) => {
            log::warn!("skill assessment generation failed: {}", err);
            state.push_message(format!("Skill Intelligence: generation failed ({})", err));
            Vec::new()
        }
    };

    let aggregates = aggregate(&assessments);
    state.push_message(format!(
        "Skill Intelligence: {} | ready {}/{} | critical gaps: {}",
        aggregates.overall_readiness,
        aggregates.ready_skills.len(),
        assessments.len(),
        aggregates.critical_gaps.len()
    ));

    state.skill_evidence = assessments;
    state.overall_readiness = aggregates.overall_readiness;
    state.ready_skills = aggregates.ready_skills;
    state.critical_gaps = aggregates.critical_gaps;
    state.learning_priorities = aggregates.learning_priorities;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::GenerateError;
    use std::collections::BTreeMap;

    struct FixedGenerator(String);

    impl Generator for FixedGenerator {
        fn generate(&self, _system: &str, _user: &str) -> Result<String, GenerateError> {
            Ok(self.0.clone())
        }
    }

    struct FailingGenerator;

    impl Generator for FailingGenerator {
        fn generate(&self, _system: &str, _user: &str) -> Result<String, GenerateError> {
            Err(GenerateError::ExecutionFailed("connection refused".into()))
        }
    }

    const SAMPLE_JSON: &str = r#"[
        {"skill": "Python", "status": "confirmed",
         "evidence": ["Listed in Skills", "Used in 3 projects"],
         "confidence": 0.95, "current_level": 2, "required_level": 2,
         "gap": 0, "learning_time": "0 months"},
        {"skill": "AWS", "status": "transferable",
         "evidence": ["Used Heroku"], "confidence": 0.4,
         "current_level": 0, "required_level": 2,
         "gap": 2, "learning_time": "2-3 months"},
        {"skill": "Kubernetes", "status": "missing", "evidence": [],
         "confidence": 0.0, "current_level": 0, "required_level": 2,
         "gap": 2, "learning_time": "2-3 months"},
        {"skill": "Docker", "status": "missing", "evidence": [],
         "confidence": 0.0, "current_level": 0, "required_level": 1,
         "gap": 1, "learning_time": "3-4 weeks"}
    ]"#;

    fn run_stage(output: &str) -> AnalysisState {
        let mut state = AnalysisState::new("resume", "jd", BTreeMap::new());
        analyze_skills(&mut state, &FixedGenerator(output.to_string()));
        state
    }

    #[test]
    fn test_assessments_and_aggregates() {
        let state = run_stage(SAMPLE_JSON);
        assert_eq!(state.skill_evidence.len(), 4);
        assert_eq!(state.ready_skills, vec!["Python"]);
        // Transferable AWS with gap 2 is not a critical gap; missing K8s is.
        assert_eq!(state.critical_gaps, vec!["Kubernetes"]);
        assert_eq!(state.overall_readiness, "25% match");

        let priorities = &state.learning_priorities;
        assert_eq!(priorities.len(), 3);
        assert_eq!(priorities[0].skill, "AWS");
        assert_eq!(priorities[0].priority, Priority::High);
        assert_eq!(priorities[1].skill, "Kubernetes");
        assert_eq!(priorities[2].skill, "Docker");
        assert_eq!(priorities[2].priority, Priority::Medium);
    }

    #[test]
    fn test_ready_skill_excluded_from_priorities() {
        let state = run_stage(SAMPLE_JSON);
        assert!(state
            .learning_priorities
            .iter()
            .all(|p| p.skill != "Python"));
    }

    #[test]
    fn test_markdown_fenced_json_accepted() {
        let fenced = format!("Here is my analysis:\n```json\n{}\n```", SAMPLE_JSON);
        let state = run_stage(&fenced);
        assert_eq!(state.skill_evidence.len(), 4);
    }

    #[test]
    fn test_duplicate_skills_keyed_once() {
        let json = r#"[
            {"skill": "Python", "status": "confirmed", "evidence": ["a"],
             "confidence": 0.9, "current_level": 2, "required_level": 2},
            {"skill": " python ", "status": "missing", "evidence": [],
             "confidence": 0.0, "current_level": 0, "required_level": 3}
        ]"#;
        let state = run_stage(json);
        assert_eq!(state.skill_evidence.len(), 1);
        assert_eq!(state.skill_evidence[0].status, SkillStatus::Confirmed);
    }

    #[test]
    fn test_unparsable_output_degrades() {
        let state = run_stage("I could not produce the analysis, sorry.");
        assert!(state.skill_evidence.is_empty());
        assert_eq!(state.overall_readiness, "Unknown");
        assert!(state.ready_skills.is_empty());
        assert!(state.learning_priorities.is_empty());
    }

    #[test]
    fn test_upstream_failure_degrades() {
        let mut state = AnalysisState::new("resume", "jd", BTreeMap::new());
        analyze_skills(&mut state, &FailingGenerator);
        assert!(state.skill_evidence.is_empty());
        assert_eq!(state.overall_readiness, "Unknown");
        assert!(state
            .messages
            .iter()
            .any(|m| m.contains("generation failed")));
    }

    #[test]
    fn test_gap_recomputed_not_trusted() {
        // The generator claims gap=3 but levels say otherwise.
        let json = r#"[{"skill": "SQL", "status": "confirmed", "evidence": ["queries"],
                        "confidence": 0.8, "current_level": 2, "required_level": 2,
                        "gap": 3, "learning_time": "6 months"}]"#;
        let state = run_stage(json);
        assert_eq!(state.skill_evidence[0].gap, 0);
        assert!(state.skill_evidence[0].learning_time.is_empty());
    }
}
