//! Language-model advisory generator over an OpenAI-compatible chat completions API.
//!
//! With no API key the advisor answers with the canned fallback lists, so the analysis
//! pipeline works offline. With a key, every reply is parsed strictly.

use super::advisory::{
    AdvisoryGenerator, Insight, Recommendation, fallback_insights, fallback_recommendations,
    insight_prompt, parse_insights, parse_recommendations, recommendation_prompt,
};
use super::metrics::MarketplaceSummary;
use crate::{
    config::settings::AnalyticsSettings,
    errors::{Error, Result},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Environment variable holding the API key. Never stored in settings files.
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// Minimal chat completions client.
#[derive(Debug, Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
    model: String,
    temperature: f32,
}

impl ChatClient {
    /// Builds a client with the configured model, endpoint and timeout.
    pub fn new(api_key: String, settings: &AnalyticsSettings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            api_key,
            endpoint: format!(
                "{}/chat/completions",
                settings.api_base_url.trim_end_matches('/')
            ),
            model: settings.model.clone(),
            temperature: settings.temperature,
        })
    }

    /// Sends one user message and returns the first choice's text.
    ///
    /// A reply without content is treated as an empty JSON array.
    #[instrument(skip(self, prompt), fields(model = %self.model))]
    pub async fn complete(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Advisory {
                message: format!("Chat completions API returned {status}"),
            });
        }

        let body: ChatResponse = response.json().await?;
        let choice = body.choices.into_iter().next().ok_or_else(|| Error::Advisory {
            message: "Chat completions reply had no choices".to_string(),
        })?;

        let content = choice.message.content.unwrap_or_else(|| "[]".to_string());
        debug!(bytes = content.len(), "Received completion");
        Ok(content)
    }
}

/// Advisory generator backed by a language model, falling back to canned output when
/// no client is configured.
#[derive(Debug, Clone, Default)]
pub struct LanguageModelAdvisor {
    client: Option<ChatClient>,
}

impl LanguageModelAdvisor {
    /// Builds the advisor from settings and the `OPENAI_API_KEY` environment variable.
    ///
    /// A missing or blank key yields an unconfigured advisor.
    pub fn from_env(settings: &AnalyticsSettings) -> Result<Self> {
        match std::env::var(API_KEY_VAR) {
            Ok(key) if !key.trim().is_empty() => Self::with_api_key(key, settings),
            _ => {
                warn!("{API_KEY_VAR} not set, revenue analysis will use fallback advice");
                Ok(Self::unconfigured())
            }
        }
    }

    /// Advisor that always calls the API with `api_key`.
    pub fn with_api_key(api_key: String, settings: &AnalyticsSettings) -> Result<Self> {
        info!(model = %settings.model, "Language model advisor configured");
        Ok(Self {
            client: Some(ChatClient::new(api_key, settings)?),
        })
    }

    /// Advisor that only ever returns the canned fallback.
    #[must_use]
    pub const fn unconfigured() -> Self {
        Self { client: None }
    }

    /// Whether a client is present.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.client.is_some()
    }
}

impl AdvisoryGenerator for LanguageModelAdvisor {
    async fn generate_insights(&self, summary: &MarketplaceSummary) -> Result<Vec<Insight>> {
        let Some(client) = &self.client else {
            return Ok(fallback_insights());
        };
        let content = client.complete(&insight_prompt(summary)).await?;
        parse_insights(&content)
    }

    async fn generate_recommendations(&self, insights: &[Insight]) -> Result<Vec<Recommendation>> {
        let Some(client) = &self.client else {
            return Ok(fallback_recommendations());
        };
        let content = client.complete(&recommendation_prompt(insights)).await?;
        parse_recommendations(&content)
    }
}
