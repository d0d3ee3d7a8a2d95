//! Pipeline Coordinator
//!
//! Decides which stage runs next and detects completion. `next_stage` is a
//! pure function of the state: same state, same decision. The runner owns
//! sequencing only; all analysis lives in the stage modules.

use super::state::{AnalysisState, StageName};
use super::{advisor, ats, report::OptimizationReport, skills};
use crate::generate::Generator;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Why the pipeline stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionReason {
    /// Iteration cap hit before all stages completed. A defined terminal
    /// state, not an error: the report reflects whatever did complete.
    BudgetExhausted,
    AllStagesDone,
}

impl CompletionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompletionReason::BudgetExhausted => "budget exhausted",
            CompletionReason::AllStagesDone => "all stages done",
        }
    }
}

impl fmt::Display for CompletionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one coordinator decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Run(StageName),
    Complete(CompletionReason),
}

const STAGE_ORDER: [StageName; 3] = [
    StageName::AnalyzeResume,
    StageName::AnalyzeSkills,
    StageName::GenerateAdvice,
];

/// The priority-ordered decision table. First match wins:
///
/// 1. Budget hard stop: the iteration cap is hit while work is still
///    pending. This guarantees termination regardless of stage bugs.
///    (Budget exhaustion is defined as cap-hit-before-completion; a run
///    whose stages all finished reports "all stages done" even when it
///    used its whole budget.)
/// 2-4. The first stage, in pipeline order, not yet in `completed_stages`.
/// 5. All stages done.
pub fn next_stage(state: &AnalysisState) -> Decision {
    let pending = STAGE_ORDER.iter().find(|s| !state.is_complete(**s));

    if state.iteration_count >= state.max_iterations && pending.is_some() {
        return Decision::Complete(CompletionReason::BudgetExhausted);
    }

    match pending {
        Some(stage) => Decision::Run(*stage),
        None => Decision::Complete(CompletionReason::AllStagesDone),
    }
}

/// Drives a state through the stages until the coordinator reports
/// completion. Stateless apart from the generator handle: a fresh `Pipeline`
/// per request is cheap, and nothing is shared across requests.
pub struct Pipeline<'a> {
    generator: &'a dyn Generator,
}

impl<'a> Pipeline<'a> {
    pub fn new(generator: &'a dyn Generator) -> Self {
        Self { generator }
    }

    /// Run the pipeline to completion. Each dispatch increments the
    /// iteration counter before the stage executes; the stage is marked
    /// complete afterwards. Stages degrade internally instead of failing,
    /// so the loop itself cannot error.
    pub fn run(&self, state: &mut AnalysisState) -> CompletionReason {
        loop {
            match next_stage(state) {
                Decision::Complete(reason) => {
                    log::info!("pipeline complete: {}", reason);
                    state.push_message(format!("Coordinator: complete ({})", reason));
                    return reason;
                }
                Decision::Run(stage) => {
                    log::info!(
                        "dispatching stage {} (iteration {}/{})",
                        stage,
                        state.iteration_count + 1,
                        state.max_iterations
                    );
                    state.iteration_count += 1;
                    match stage {
                        StageName::AnalyzeResume => ats::analyze_resume(state, self.generator),
                        StageName::AnalyzeSkills => skills::analyze_skills(state, self.generator),
                        StageName::GenerateAdvice => {
                            advisor::generate_advice(state, self.generator)
                        }
                    }
                    state.mark_complete(stage);
                }
            }
        }
    }

    /// Convenience entry point: build a fresh state, run it, and extract the
    /// report. The state is discarded afterwards.
    pub fn analyze(
        &self,
        resume_text: &str,
        job_description: &str,
        resume_sections: BTreeMap<String, String>,
    ) -> OptimizationReport {
        let mut state = AnalysisState::new(resume_text, job_description, resume_sections);
        self.run(&mut state);
        OptimizationReport::from_state(state)
    }
}
