//! Text Generation Integration
//!
//! The pipeline needs a text generation capability for its analysis prompts;
//! everything else is deterministic Rust. `Generator` is the seam: production
//! uses `CommandGenerator`, which shells out to an external script, and tests
//! substitute scripted fakes.

use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use std::process::Command;
use thiserror::Error;

/// Abstract text generation capability. Implementations take a system prompt
/// and a user prompt and return the generated text.
pub trait Generator {
    fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String, GenerateError>;
}

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("Generator script not found at {0}")]
    ScriptNotFound(String),

    #[error("Failed to execute generator: {0}")]
    ExecutionFailed(String),

    #[error("Generator error: {0}")]
    Upstream(String),

    #[error("Invalid generator output: {0}")]
    InvalidOutput(String),
}

/// Request payload handed to the external script via a temp file. Prompts go
/// through a file rather than argv; shell quoting mangles multi-line text.
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    system_prompt: &'a str,
    user_prompt: &'a str,
}

/// Error response shape from the script
#[derive(Debug, Deserialize)]
struct UpstreamError {
    error: String,
}

/// Success response shape from the script
#[derive(Debug, Deserialize)]
struct GeneratedText {
    text: String,
}

/// Configuration for the command-backed generator
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Interpreter or executable (e.g. "python3")
    pub command: String,
    /// Path to the generation script
    pub script_path: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            command: "python3".to_string(),
            script_path: "./scripts/generate.py".to_string(),
        }
    }
}

impl GeneratorConfig {
    /// Build from `GENERATOR_COMMAND` / `GENERATOR_SCRIPT` env vars, falling
    /// back to the defaults for whichever is unset.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            command: std::env::var("GENERATOR_COMMAND").unwrap_or(defaults.command),
            script_path: std::env::var("GENERATOR_SCRIPT").unwrap_or(defaults.script_path),
        }
    }
}

/// Generator that invokes an external script: request JSON is written to a
/// temp file, the file path is passed as the single argument, and the reply
/// is read from stdout as `{"text": ...}` (or `{"error": ...}` on failure).
pub struct CommandGenerator {
    config: GeneratorConfig,
}

impl CommandGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }
}

impl Generator for CommandGenerator {
    fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String, GenerateError> {
        if !Path::new(&self.config.script_path).exists() {
            return Err(GenerateError::ScriptNotFound(
                self.config.script_path.clone(),
            ));
        }

        let request = GenerateRequest {
            system_prompt,
            user_prompt,
        };
        let request_json = serde_json::to_string(&request)
            .map_err(|e| GenerateError::InvalidOutput(e.to_string()))?;

        // Temp file is cleaned up on drop, including the error paths.
        let mut request_file = tempfile::NamedTempFile::new()
            .map_err(|e| GenerateError::ExecutionFailed(e.to_string()))?;
        request_file
            .write_all(request_json.as_bytes())
            .map_err(|e| GenerateError::ExecutionFailed(e.to_string()))?;

        log::debug!(
            "invoking generator: {} {} ({} byte request)",
            self.config.command,
            self.config.script_path,
            request_json.len()
        );

        let output = Command::new(&self.config.command)
            .arg(&self.config.script_path)
            .arg(request_file.path())
            .output()
            .map_err(|e| GenerateError::ExecutionFailed(e.to_string()))?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            return Err(GenerateError::ExecutionFailed(format!(
                "exit code {:?} | stderr: {}",
                output.status.code(),
                stderr
            )));
        }

        parse_reply(&stdout)
    }
}

/// Decode the script's stdout. An `{"error": ...}` object wins over any
/// other interpretation.
fn parse_reply(stdout: &str) -> Result<String, GenerateError> {
    if let Ok(upstream) = serde_json::from_str::<UpstreamError>(stdout) {
        return Err(GenerateError::Upstream(upstream.error));
    }
    let reply: GeneratedText = serde_json::from_str(stdout).map_err(|e| {
        let preview = crate::pipeline::clip(stdout, 200);
        GenerateError::InvalidOutput(format!(
            "JSON error: {} | stdout length: {} bytes | preview: {}",
            e,
            stdout.len(),
            preview
        ))
    })?;
    Ok(reply.text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reply_text() {
        let out = parse_reply(r#"{"text": "1. First suggestion"}"#).unwrap();
        assert_eq!(out, "1. First suggestion");
    }

    #[test]
    fn test_parse_reply_upstream_error() {
        let err = parse_reply(r#"{"error": "rate limited"}"#).unwrap_err();
        assert!(matches!(err, GenerateError::Upstream(msg) if msg == "rate limited"));
    }

    #[test]
    fn test_parse_reply_garbage() {
        let err = parse_reply("Traceback (most recent call last):").unwrap_err();
        assert!(matches!(err, GenerateError::InvalidOutput(_)));
    }

    #[test]
    fn test_missing_script_detected_before_spawn() {
        let generator = CommandGenerator::new(GeneratorConfig {
            command: "python3".to_string(),
            script_path: "/nonexistent/generate.py".to_string(),
        });
        let err = generator.generate("sys", "user").unwrap_err();
        assert!(matches!(err, GenerateError::ScriptNotFound(_)));
    }

    #[test]
    fn test_request_serializes_both_prompts() {
        let request = GenerateRequest {
            system_prompt: "be honest",
            user_prompt: "analyze this",
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["system_prompt"], "be honest");
        assert_eq!(json["user_prompt"], "analyze this");
    }
}
