//! Analysis Pipeline
//!
//! The pipeline threads a single `AnalysisState` through three stages in a
//! fixed order decided by the coordinator:
//!
//! `Intake -> analyze_resume -> analyze_skills -> generate_advice -> Report`
//!
//! Each stage is a pure function of the accumulated state: it recomputes its
//! outputs from the state's inputs on every invocation, so a retried stage
//! produces the same result. Stages never fail the pipeline; upstream
//! generation failures degrade into stage-specific fallback outputs.

pub mod advisor;
pub mod ats;
pub mod coordinator;
pub mod parsing;
pub mod report;
pub mod skills;
pub mod state;

pub use coordinator::{next_stage, CompletionReason, Decision, Pipeline};
pub use report::OptimizationReport;
pub use state::{
    AnalysisState, LearningPriority, Priority, RoadmapItem, SkillAssessment, SkillStatus,
    StageName,
};

/// Clip a string to at most `max_chars` characters on a char boundary.
/// Prompts embed resume and job-description excerpts; unbounded input would
/// blow the generation context.
pub(crate) fn clip(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::clip;

    #[test]
    fn test_clip_respects_char_boundaries() {
        assert_eq!(clip("hello", 10), "hello");
        assert_eq!(clip("hello", 3), "hel");
        // Multi-byte chars must not be split
        assert_eq!(clip("héllo", 2), "hé");
    }
}
