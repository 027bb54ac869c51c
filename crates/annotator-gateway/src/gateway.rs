//! Single-turn chat completion against Groq or OpenAI

use crate::error::GatewayError;
use crate::provider::{Credentials, ProviderId};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Output cap applied to every request regardless of provider
pub const DEFAULT_MAX_TOKENS: u32 = 300;

/// Endpoint and request settings for the gateway
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub groq_base_url: String,
    pub openai_base_url: String,
    pub max_tokens: u32,
    /// `None` leaves the transport default in place
    pub timeout: Option<Duration>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            groq_base_url: "https://api.groq.com/openai/v1".to_string(),
            openai_base_url: "https://api.openai.com/v1".to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: None,
        }
    }
}

/// Outcome of one completion request
///
/// A failed request still yields displayable `content`, prefixed with the
/// provider name, e.g. `[Groq Error] HTTP 401 Unauthorized: Invalid API Key`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionResult {
    pub provider: ProviderId,
    pub model: String,
    pub content: String,
    pub is_error: bool,
}

impl CompletionResult {
    fn success(provider: ProviderId, model: &str, content: String) -> Self {
        Self {
            provider,
            model: model.to_string(),
            content,
            is_error: false,
        }
    }

    fn failure(provider: ProviderId, model: &str, detail: &ProviderFailure) -> Self {
        Self {
            provider,
            model: model.to_string(),
            content: format!("[{} Error] {}", provider.name(), detail),
            is_error: true,
        }
    }
}

/// Why a request that left the process did not produce text
#[derive(Debug, thiserror::Error)]
enum ProviderFailure {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status}: {message}")]
    Status {
        status: reqwest::StatusCode,
        message: String,
    },

    #[error("response had no completion text")]
    EmptyChoice,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// One OpenAI-compatible chat endpoint
#[derive(Debug, Clone)]
struct Endpoint {
    provider: ProviderId,
    url: String,
}

impl Endpoint {
    fn new(provider: ProviderId, base_url: &str) -> Self {
        Self {
            provider,
            url: format!("{}/chat/completions", base_url.trim_end_matches('/')),
        }
    }

    async fn chat(
        &self,
        client: &reqwest::Client,
        token: &str,
        request: &ChatRequest<'_>,
    ) -> Result<String, ProviderFailure> {
        let response = client
            .post(&self.url)
            .bearer_auth(token)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderFailure::Status {
                status,
                message: error_message(&body),
            });
        }

        let body: ChatResponse = response.json().await?;
        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(ProviderFailure::EmptyChoice)
    }
}

fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => envelope.error.message,
        Err(_) if body.trim().is_empty() => "no error details".to_string(),
        Err(_) => body.trim().to_string(),
    }
}

/// Request text completions from either provider through one call
#[derive(Debug, Clone)]
pub struct CompletionGateway {
    client: reqwest::Client,
    groq: Endpoint,
    openai: Endpoint,
    max_tokens: u32,
}

impl CompletionGateway {
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(GatewayError::Client)?;

        Ok(Self {
            client,
            groq: Endpoint::new(ProviderId::Groq, &config.groq_base_url),
            openai: Endpoint::new(ProviderId::OpenAi, &config.openai_base_url),
            max_tokens: config.max_tokens,
        })
    }

    fn endpoint(&self, provider: ProviderId) -> &Endpoint {
        match provider {
            ProviderId::Groq => &self.groq,
            ProviderId::OpenAi => &self.openai,
        }
    }

    /// Ask `provider` to complete `prompt` with `model`
    ///
    /// Fails only for a missing credential or a model outside the provider's
    /// allow-list, both checked before any network I/O.
    pub async fn complete(
        &self,
        prompt: &str,
        provider: ProviderId,
        model: &str,
        credentials: &Credentials,
    ) -> Result<CompletionResult, GatewayError> {
        let token = credentials
            .get(provider)
            .ok_or(GatewayError::MissingCredential(provider))?;
        if !provider.supports_model(model) {
            return Err(GatewayError::UnknownModel {
                provider,
                model: model.to_string(),
            });
        }

        let endpoint = self.endpoint(provider);
        let request = ChatRequest {
            model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: self.max_tokens,
        };

        debug!(provider = %endpoint.provider, model, url = %endpoint.url, "Requesting completion");
        match endpoint.chat(&self.client, token, &request).await {
            Ok(text) => {
                info!(provider = %provider, model, chars = text.len(), "Completion received");
                Ok(CompletionResult::success(provider, model, text))
            }
            Err(failure) => {
                warn!(provider = %provider, model, error = %failure, "Completion failed");
                Ok(CompletionResult::failure(provider, model, &failure))
            }
        }
    }
}
