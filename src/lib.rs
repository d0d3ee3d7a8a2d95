//! Resume Optimizer Core
//!
//! Evaluates a candidate resume against a job description through a
//! deterministic multi-stage analysis pipeline:
//! - ATS compatibility scoring (structure, keywords, content, formatting)
//! - Evidence-based skill assessment (validation + gaps + levels in one pass)
//! - Honesty-constrained optimization advice and learning roadmap
//!
//! Text generation is an abstract collaborator (`Generator`); PDF extraction,
//! HTTP and persistence live outside this crate.

pub mod generate;
pub mod pipeline;
pub mod sections;

pub use generate::{CommandGenerator, GenerateError, Generator, GeneratorConfig};
pub use pipeline::{
    next_stage, AnalysisState, CompletionReason, Decision, OptimizationReport, Pipeline,
    SkillAssessment, SkillStatus, StageName,
};
pub use sections::SectionParser;
