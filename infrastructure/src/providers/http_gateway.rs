//! OpenAI-compatible chat-completions gateway over `reqwest`

use super::ProviderKind;
use async_trait::async_trait;
use council_application::ports::model_gateway::{Completion, GatewayError, ModelGateway};
use council_domain::{GenerationOptions, TokenUsage};
use reqwest::Client;
use serde_json::{Value, json};
use std::time::{Duration, Instant};
use tracing::debug;

/// Connection settings of one provider
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSettings {
    pub kind: ProviderKind,
    pub model: String,
    pub base_url: String,
    pub api_key: Option<String>,
}

/// Read a non-empty API key from the environment
pub fn read_key(var: &str) -> Option<String> {
    std::env::var(var)
        .ok()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
}

pub struct HttpGateway {
    client: Client,
    settings: ProviderSettings,
}

impl HttpGateway {
    pub fn new(client: Client, settings: ProviderSettings) -> Self {
        Self { client, settings }
    }

    pub fn settings(&self) -> &ProviderSettings {
        &self.settings
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.settings.base_url.trim_end_matches('/'), path)
    }

    fn request_body(&self, prompt: &str, options: &GenerationOptions) -> Value {
        let mut body = json!({
            "model": self.settings.model,
            "messages": [{ "role": "user", "content": prompt }],
        });
        if let Some(temperature) = options.temperature {
            body["temperature"] = json!(temperature);
        }
        if let Some(max_tokens) = options.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }
        if let Some(top_p) = options.top_p {
            body["top_p"] = json!(top_p);
        }
        body
    }
}

#[async_trait]
impl ModelGateway for HttpGateway {
    async fn invoke(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<Completion, GatewayError> {
        let Some(api_key) = self.settings.api_key.as_deref() else {
            return Err(GatewayError::Unavailable(format!(
                "no API key configured for {}",
                self.settings.kind
            )));
        };

        let start = Instant::now();
        debug!(
            "{} request: model={}, prompt={} chars",
            self.settings.kind,
            self.settings.model,
            prompt.chars().count()
        );

        let response = self
            .client
            .post(self.url("chat/completions"))
            .bearer_auth(api_key)
            .json(&self.request_body(prompt, options))
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(classify_status(status.as_u16(), &error_text));
        }

        let raw: Value = response
            .json()
            .await
            .map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;
        parse_completion(&raw, &self.settings.model, start.elapsed())
    }

    fn is_available(&self) -> bool {
        self.settings.api_key.is_some()
    }

    async fn health_check(&self) -> bool {
        let Some(api_key) = self.settings.api_key.as_deref() else {
            return false;
        };
        match self
            .client
            .get(self.url("models"))
            .bearer_auth(api_key)
            .timeout(Duration::from_secs(10))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!("{} health check failed: {}", self.settings.kind, e);
                false
            }
        }
    }
}

fn transport_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Network(format!("request timed out: {}", e))
    } else {
        GatewayError::Network(e.to_string())
    }
}

/// Map a non-success HTTP status onto the gateway error taxonomy
pub fn classify_status(status: u16, body: &str) -> GatewayError {
    let message = error_message(body);
    match status {
        401 | 403 => GatewayError::Auth(message),
        408 => GatewayError::Network(message),
        429 => GatewayError::RateLimited(message),
        500..=599 => GatewayError::Server { status, message },
        _ => GatewayError::InvalidRequest(format!("HTTP {}: {}", status, message)),
    }
}

/// `error.message` of a JSON error body, or the raw body
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(String::from))
        .unwrap_or_else(|| body.trim().to_string())
}

/// Extract a [`Completion`] from a chat-completions response body
pub fn parse_completion(
    raw: &Value,
    requested_model: &str,
    latency: Duration,
) -> Result<Completion, GatewayError> {
    let content = raw["choices"][0]["message"]["content"]
        .as_str()
        .ok_or_else(|| GatewayError::MalformedResponse("no content in response".to_string()))?;

    let model = raw["model"].as_str().unwrap_or(requested_model);
    let reported = &raw["usage"];
    let mut usage = TokenUsage::new(
        token_count(&reported["prompt_tokens"]).unwrap_or(0),
        token_count(&reported["completion_tokens"]).unwrap_or(0),
    );
    if let Some(total) = token_count(&reported["total_tokens"]) {
        usage.total_tokens = total;
    }

    Ok(Completion::new(model, content)
        .with_usage(usage)
        .with_latency(latency)
        .with_confidence(raw["confidence"].as_f64().map(|c| c as f32)))
}

fn token_count(value: &Value) -> Option<u32> {
    value.as_u64().map(|n| u32::try_from(n).unwrap_or(u32::MAX))
}
