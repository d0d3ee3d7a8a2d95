//! Resume Optimizer - Main Entry Point
//!
//! Runs the full analysis pipeline against a resume and a job description
//! read from files, printing the optimization report as JSON.

use resume_optimizer::{CommandGenerator, GeneratorConfig, Pipeline, SectionParser};
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let mut args = std::env::args().skip(1);
    let (resume_path, jd_path) = match (args.next(), args.next()) {
        (Some(r), Some(j)) => (r, j),
        _ => {
            eprintln!("Usage: resume_optimizer <resume-file> <job-description-file>");
            return ExitCode::from(2);
        }
    };

    let resume_text = match std::fs::read_to_string(&resume_path) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Cannot read resume file '{}': {}", resume_path, e);
            return ExitCode::FAILURE;
        }
    };
    let job_description = match std::fs::read_to_string(&jd_path) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Cannot read job description file '{}': {}", jd_path, e);
            return ExitCode::FAILURE;
        }
    };

    let sections = SectionParser::new().parse(&resume_text);
    log::info!(
        "analyzing resume ({} chars) against job description ({} chars)",
        resume_text.len(),
        job_description.len()
    );

    let generator = CommandGenerator::new(GeneratorConfig::from_env());
    let pipeline = Pipeline::new(&generator);
    let report = pipeline.analyze(&resume_text, &job_description, sections);

    match serde_json::to_string_pretty(&report) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to serialize report: {}", e);
            ExitCode::FAILURE
        }
    }
}
