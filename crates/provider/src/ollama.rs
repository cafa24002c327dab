use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::types::{ReviewPayload, ReviewRequest};
use crate::{build_user_prompt, Gateway, GatewayError};

const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Gateway backed by a local Ollama server. `format: "json"` forces the
/// model to emit a single JSON object, which we decode as a payload.
pub struct OllamaGateway {
    client: reqwest::Client,
    base_url: String,
    model: String,
    temperature: f32,
}

impl OllamaGateway {
    pub fn new(model: String, base_url: Option<String>, temperature: f32) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .unwrap_or_default(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model,
            temperature,
        }
    }
}

#[async_trait]
impl Gateway for OllamaGateway {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn review(&self, request: &ReviewRequest) -> Result<ReviewPayload, GatewayError> {
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": request.system_prompt},
                {"role": "user", "content": build_user_prompt(request)},
            ],
            "stream": false,
            "format": "json",
            "options": {"temperature": self.temperature},
        });

        let resp = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let retry_after = resp
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string());
            let body = resp.text().await.unwrap_or_default();
            return Err(GatewayError::from_http(
                status.as_u16(),
                body,
                retry_after.as_deref(),
            ));
        }

        let data: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))?;
        let content = data["message"]["content"].as_str().unwrap_or("");
        debug!(model = %self.model, bytes = content.len(), "ollama reply");

        serde_json::from_str(content).map_err(|e| GatewayError::Decode(e.to_string()))
    }
}
