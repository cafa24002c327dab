pub mod types;

pub mod ollama;
pub mod openai;

mod error;

pub use error::GatewayError;
pub use types::*;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

/// The one place allowed to block on network I/O. Implementations take a
/// fully assembled request and return the model's structured findings.
#[async_trait]
pub trait Gateway: Send + Sync {
    fn name(&self) -> &str;

    async fn review(&self, request: &ReviewRequest) -> Result<ReviewPayload, GatewayError>;
}

/// Instructions appended to every user prompt so the model's reply
/// deserializes as a [`ReviewPayload`].
pub const FORMAT_INSTRUCTIONS: &str = r#"Respond with a single JSON object of this shape:
{
  "issues": [
    {
      "type": "security" | "quality" | "performance" | "testing" | "documentation" | "style" | "bug",
      "severity": "critical" | "high" | "medium" | "low" | "info",
      "line_number": <integer, omit if unknown>,
      "description": "<what is wrong>",
      "suggestion": "<how to fix it>",
      "code_snippet": "<the offending code, optional>",
      "confidence": <number between 0 and 1, optional>
    }
  ],
  "summary": "<one or two sentences on overall quality>"
}
The "issues" array is mandatory; return it empty if you found nothing."#;

/// Assemble the shared user message carrying the template variables every
/// specialist receives: format instructions, path, type, code, and diff.
pub fn build_user_prompt(request: &ReviewRequest) -> String {
    format!(
        "{FORMAT_INSTRUCTIONS}\n\n\
         File: {path}\n\
         File Type: {file_type}\n\n\
         Code to review:\n```\n{code}\n```\n\n\
         Diff (changes made):\n```\n{diff}\n```\n",
        path = request.file_path,
        file_type = request.file_type,
        code = request.code,
        diff = request.diff,
    )
}

pub fn create_gateway(config: &quorum_config::Config) -> Result<Arc<dyn Gateway>> {
    let gw = &config.gateway;
    match gw.backend.as_str() {
        "ollama" => Ok(Arc::new(ollama::OllamaGateway::new(
            gw.model.clone(),
            gw.base_url.clone(),
            gw.temperature,
        ))),
        "openai" => {
            let api_key = gw
                .api_key
                .clone()
                .or_else(|| std::env::var("OPENAI_API_KEY").ok())
                .ok_or_else(|| {
                    anyhow::anyhow!("openai backend selected but no api_key configured")
                })?;
            Ok(Arc::new(openai::OpenAiGateway::new(
                api_key,
                gw.model.clone(),
                gw.base_url.clone(),
                gw.temperature,
            )))
        }
        other => anyhow::bail!("Unsupported gateway backend '{other}'"),
    }
}
