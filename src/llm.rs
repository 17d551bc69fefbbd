use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::config::LlmConfig;

/// A single text-generation call.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub prompt: String,
    /// When set, the provider is asked to emit JSON matching this schema.
    pub response_schema: Option<Value>,
    pub temperature: f32,
}

impl GenerateRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            response_schema: None,
            temperature: 0.4,
        }
    }

    pub fn json(prompt: impl Into<String>, schema: Option<Value>) -> Self {
        Self {
            prompt: prompt.into(),
            response_schema: schema,
            temperature: 0.0,
        }
    }
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<String>;
}

#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(config: &LlmConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("build http client")?;

        Ok(Self {
            http,
            endpoint: endpoint_url(config),
            api_key: config.api_key.clone(),
        })
    }
}

fn endpoint_url(config: &LlmConfig) -> String {
    format!(
        "{}/v1beta/models/{}:generateContent",
        config.base_url.trim_end_matches('/'),
        config.model
    )
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentBody<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<PartIn<'a>>,
}

#[derive(Debug, Serialize)]
struct PartIn<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<&'a Value>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ContentOut>,
}

#[derive(Debug, Deserialize)]
struct ContentOut {
    #[serde(default)]
    parts: Vec<PartOut>,
}

#[derive(Debug, Deserialize)]
struct PartOut {
    text: Option<String>,
}

fn build_body(request: &GenerateRequest) -> GenerateContentBody<'_> {
    GenerateContentBody {
        contents: vec![Content {
            role: "user",
            parts: vec![PartIn {
                text: &request.prompt,
            }],
        }],
        generation_config: GenerationConfig {
            temperature: request.temperature,
            response_mime_type: request
                .response_schema
                .as_ref()
                .map(|_| "application/json"),
            response_schema: request.response_schema.as_ref(),
        },
    }
}

fn extract_text(response: GenerateContentResponse) -> anyhow::Result<String> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .context("model returned no candidates")?;
    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    anyhow::ensure!(!text.trim().is_empty(), "model returned empty text");
    Ok(text)
}

#[async_trait]
impl LlmClient for GeminiClient {
    #[instrument(skip_all, fields(structured = request.response_schema.is_some()))]
    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<String> {
        let res = self
            .http
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&build_body(request))
            .send()
            .await
            .context("gemini generateContent")?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            anyhow::bail!("gemini returned {}: {}", status, body);
        }

        let parsed: GenerateContentResponse =
            res.json().await.context("decode gemini response")?;
        let text = extract_text(parsed)?;
        debug!(chars = text.len(), "model response received");
        Ok(text)
    }
}
