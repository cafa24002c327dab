use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::types::{ReviewPayload, ReviewRequest};
use crate::{build_user_prompt, Gateway, GatewayError};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Gateway for any OpenAI-compatible chat-completions endpoint, with
/// `response_format: json_object` to force a decodable reply.
pub struct OpenAiGateway {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl OpenAiGateway {
    pub fn new(
        api_key: String,
        model: String,
        base_url: Option<String>,
        temperature: f32,
    ) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .unwrap_or_default(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key,
            model,
            temperature,
        }
    }
}

#[async_trait]
impl Gateway for OpenAiGateway {
    fn name(&self) -> &str {
        "openai"
    }

    async fn review(&self, request: &ReviewRequest) -> Result<ReviewPayload, GatewayError> {
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": request.system_prompt},
                {"role": "user", "content": build_user_prompt(request)},
            ],
            "temperature": self.temperature,
            "response_format": {"type": "json_object"},
        });

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
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
        let content = data["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or("");
        debug!(model = %self.model, bytes = content.len(), "chat completion reply");

        serde_json::from_str(content).map_err(|e| GatewayError::Decode(e.to_string()))
    }
}
