//! Model provider client for collecting sort responses.
//!
//! Providers are declared up front in an [`InferenceConfig`] rather than
//! looked up from the environment inside the request logic. The client
//! speaks the OpenAI chat-completions shape and the Anthropic messages
//! shape, retries transient failures with a bounded wait, and gives up on
//! one (config, model) pairing without affecting the rest of a run.

use std::time::Duration;

use serde_json::{json, Value};
use tracing::{info, warn};

use crate::error::{Result, SortBenchError};
use crate::store::{ListSet, ModelRun};
use crate::value::render_list;

/// The fixed instruction sent with every sort request.
pub const SYSTEM_PROMPT: &str = "Your task is to sort a list according to the common sorting \
of the used data type in Python. The output must only contain the sorted list and nothing \
else. The format of the list must stay the same.";

const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1000;

/// Wire protocol a provider speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// `POST {base_url}/chat/completions` with a bearer token.
    OpenAi,
    /// `POST {base_url}/v1/messages` with an `x-api-key` header.
    Anthropic,
}

/// One configured model provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub api_key: String,
    pub base_url: String,
    /// Models served by this provider.
    pub models: Vec<String>,
}

/// Full inference configuration: providers plus the retry policy.
#[derive(Debug, Clone)]
pub struct InferenceConfig {
    pub providers: Vec<ProviderConfig>,
    pub max_attempts: u32,
    pub retry_delay: Duration,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            providers: Vec::new(),
            max_attempts: 2,
            retry_delay: Duration::from_secs(60),
        }
    }
}

/// Async client that sorts lists through configured providers.
pub struct InferenceClient {
    http: reqwest::Client,
    config: InferenceConfig,
}

impl InferenceClient {
    pub fn new(config: InferenceConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Whether any configured provider serves `model`.
    pub fn supports_model(&self, model: &str) -> bool {
        self.provider_for(model).is_some()
    }

    fn provider_for(&self, model: &str) -> Option<&ProviderConfig> {
        self.config
            .providers
            .iter()
            .find(|p| p.models.iter().any(|m| m == model))
    }

    /// Ask `model` to sort one list, returning the raw response text.
    ///
    /// Retries up to the configured attempt budget, waiting between
    /// attempts; exhausting the budget is an error for this pairing only.
    pub async fn sort_list(&self, model: &str, list: &[crate::value::Scalar]) -> Result<String> {
        let provider = self
            .provider_for(model)
            .ok_or_else(|| SortBenchError::UnsupportedModel(model.to_string()))?;
        let prompt = format!("Sort the following list: {}", render_list(list));

        let mut last_error = String::new();
        for attempt in 1..=self.config.max_attempts {
            match self.request_once(provider, model, &prompt).await {
                Ok(text) => return Ok(text),
                Err(e) => {
                    warn!(model, attempt, error = %e, "inference attempt failed");
                    last_error = e.to_string();
                    if attempt < self.config.max_attempts {
                        tokio::time::sleep(self.config.retry_delay).await;
                    }
                }
            }
        }
        Err(SortBenchError::Inference {
            model: model.to_string(),
            reason: format!("retries exhausted: {last_error}"),
        })
    }

    async fn request_once(
        &self,
        provider: &ProviderConfig,
        model: &str,
        prompt: &str,
    ) -> Result<String> {
        match provider.kind {
            ProviderKind::OpenAi => self.request_openai(provider, model, prompt).await,
            ProviderKind::Anthropic => self.request_anthropic(provider, model, prompt).await,
        }
    }

    async fn request_openai(
        &self,
        provider: &ProviderConfig,
        model: &str,
        prompt: &str,
    ) -> Result<String> {
        let url = format!("{}/chat/completions", provider.base_url.trim_end_matches('/'));
        let body = json!({
            "model": model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": prompt },
            ],
        });
        let response: Value = self
            .http
            .post(&url)
            .bearer_auth(&provider.api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.trim().to_string())
            .ok_or_else(|| SortBenchError::Inference {
                model: model.to_string(),
                reason: "response without message content".to_string(),
            })
    }

    async fn request_anthropic(
        &self,
        provider: &ProviderConfig,
        model: &str,
        prompt: &str,
    ) -> Result<String> {
        let url = format!("{}/v1/messages", provider.base_url.trim_end_matches('/'));
        let body = json!({
            "model": model,
            "max_tokens": MAX_TOKENS,
            "temperature": 1,
            "system": SYSTEM_PROMPT,
            "messages": [
                { "role": "user", "content": prompt },
            ],
        });
        let response: Value = self
            .http
            .post(&url)
            .header("x-api-key", &provider.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response["content"][0]["text"]
            .as_str()
            .map(|s| s.trim().to_string())
            .ok_or_else(|| SortBenchError::Inference {
                model: model.to_string(),
                reason: "response without text content".to_string(),
            })
    }

    /// Run one model over every list of a config.
    ///
    /// Any list failing after retries aborts the whole (config, model)
    /// pairing; the caller moves on to the next pairing.
    pub async fn run_config(
        &self,
        model: &str,
        config_name: &str,
        lists: &ListSet,
    ) -> Result<ModelRun> {
        let mut run = ModelRun {
            model: model.to_string(),
            sorted_lists: Default::default(),
        };
        for (list_name, list) in lists {
            info!(config = config_name, list = %list_name, model, "sorting list");
            let response = self.sort_list(model, list).await?;
            run.sorted_lists.insert(list_name.clone(), response);
        }
        Ok(run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> InferenceConfig {
        InferenceConfig {
            providers: vec![
                ProviderConfig {
                    kind: ProviderKind::OpenAi,
                    api_key: "k".to_string(),
                    base_url: "https://api.openai.com/v1".to_string(),
                    models: vec!["gpt-4o-mini".to_string(), "gpt-4o".to_string()],
                },
                ProviderConfig {
                    kind: ProviderKind::Anthropic,
                    api_key: "k".to_string(),
                    base_url: "https://api.anthropic.com".to_string(),
                    models: vec!["claude-3-5-haiku-20241022".to_string()],
                },
            ],
            ..InferenceConfig::default()
        }
    }

    #[test]
    fn model_routing() {
        let client = InferenceClient::new(config());
        assert!(client.supports_model("gpt-4o-mini"));
        assert!(client.supports_model("claude-3-5-haiku-20241022"));
        assert!(!client.supports_model("unknown-model"));
        assert_eq!(
            client.provider_for("claude-3-5-haiku-20241022").unwrap().kind,
            ProviderKind::Anthropic
        );
    }

    #[tokio::test]
    async fn unsupported_model_is_an_error() {
        let client = InferenceClient::new(InferenceConfig::default());
        let result = client.sort_list("nope", &[crate::value::Scalar::Int(1)]).await;
        assert!(matches!(result, Err(SortBenchError::UnsupportedModel(_))));
    }
}
