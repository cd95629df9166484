//! Remote advisory through the OpenAI Chat Completions API

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use super::{prompts, AdvisoryService};
use crate::{
    errors::{GuardianError, GuardianResult},
    types::{MarketContext, Opportunity, RiskAssessment},
};

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MAX_TOKENS: u32 = 256;
const TEMPERATURE: f32 = 0.3;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ChatMessage>,
}

pub struct OpenAiAdvisor {
    http: Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl OpenAiAdvisor {
    pub fn new(api_key: String, model: String, timeout: Duration) -> GuardianResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GuardianError::config(format!("failed to build advisory HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_key,
            model,
            endpoint: OPENAI_API_URL.to_string(),
        })
    }

    /// Points the client at a different completions URL (proxies, tests).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    async fn complete(&self, user_message: String) -> anyhow::Result<String> {
        let request = ChatRequest {
            model: &self.model,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: TEMPERATURE,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: prompts::SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_message,
                },
            ],
        };

        let response = self.http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("advisory request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("advisory API error: {} - {}", status, body));
        }

        let parsed: ChatResponse = response.json().await
            .context("failed to parse advisory response")?;

        parsed.choices
            .into_iter()
            .find_map(|choice| choice.message)
            .map(|message| message.content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| anyhow::anyhow!("advisory response had no content"))
    }
}

#[async_trait]
impl AdvisoryService for OpenAiAdvisor {
    async fn explain(
        &self,
        opportunity: &Opportunity,
        assessment: &RiskAssessment,
        context: &MarketContext,
    ) -> GuardianResult<String> {
        let prompt = prompts::opportunity_prompt(opportunity, assessment, context);
        debug!(model = %self.model, opportunity_id = %opportunity.id, "Requesting advisory");

        self.complete(prompt)
            .await
            .map_err(|e| GuardianError::AdvisoryUnavailable { message: format!("{:#}", e) })
    }

    fn name(&self) -> &str {
        &self.model
    }
}
