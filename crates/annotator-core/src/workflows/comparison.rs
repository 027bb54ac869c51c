//! Text comparison: two responses to one prompt, judged on three criteria

use crate::error::WorkflowError;
use crate::session::Session;
use annotator_gateway::{CompletionGateway, CompletionResult, GatewayError, ProviderId};
use annotator_store::{RecordStore, Scores, TextComparison};
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};

/// Provider and model used to generate one response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelChoice {
    pub provider: ProviderId,
    pub model: String,
}

impl ModelChoice {
    pub fn new(provider: ProviderId, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    /// Every allowed provider/model pair, in display order
    pub fn options() -> impl Iterator<Item = ModelChoice> {
        ProviderId::ALL.into_iter().flat_map(|provider| {
            provider
                .models()
                .iter()
                .map(move |model| ModelChoice::new(provider, *model))
        })
    }
}

impl Default for ModelChoice {
    fn default() -> Self {
        let provider = ProviderId::Groq;
        Self::new(provider, provider.default_model())
    }
}

impl fmt::Display for ModelChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.provider, self.model)
    }
}

impl FromStr for ModelChoice {
    type Err = String;

    /// Parse `Provider/model`, rejecting models outside the provider's list
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (provider, model) = s
            .split_once('/')
            .ok_or_else(|| format!("expected provider/model, got {}", s))?;
        let provider: ProviderId = provider.parse()?;
        if !provider.supports_model(model) {
            return Err(format!("{} does not offer model {}", provider, model));
        }
        Ok(Self::new(provider, model))
    }
}

/// Comparison form slots
#[derive(Debug, Clone, Default)]
pub struct ComparisonForm {
    pub prompt: String,
    pub response_a: String,
    pub response_b: String,
    pub slot_a: ModelChoice,
    pub slot_b: ModelChoice,
    pub scores: Scores,
}

/// Both completions from one generate action
#[derive(Debug, Clone)]
pub struct Generated {
    pub a: CompletionResult,
    pub b: CompletionResult,
}

impl Generated {
    pub fn any_failed(&self) -> bool {
        self.a.is_error || self.b.is_error
    }
}

/// Fill both response slots from the gateway, one request per slot
///
/// Nothing is sent unless every selected provider has a key and every
/// selected model is allowed; missing keys are reported per provider.
/// Provider failures land in the slot as `[Provider Error] ...` text.
pub async fn generate(
    session: &mut Session,
    gateway: &CompletionGateway,
) -> Result<Generated, WorkflowError> {
    let form = &session.comparison;
    if form.prompt.trim().is_empty() {
        return Err(WorkflowError::MissingField("prompt"));
    }

    let mut missing = Vec::new();
    for slot in [&form.slot_a, &form.slot_b] {
        if !session.credentials.has(slot.provider) && !missing.contains(&slot.provider) {
            missing.push(slot.provider);
        }
        if !slot.provider.supports_model(&slot.model) {
            return Err(GatewayError::UnknownModel {
                provider: slot.provider,
                model: slot.model.clone(),
            }
            .into());
        }
    }
    if !missing.is_empty() {
        warn!(?missing, "Generation blocked by missing credentials");
        return Err(WorkflowError::MissingCredentials(missing));
    }

    let a = gateway
        .complete(
            &form.prompt,
            form.slot_a.provider,
            &form.slot_a.model,
            &session.credentials,
        )
        .await?;
    let b = gateway
        .complete(
            &form.prompt,
            form.slot_b.provider,
            &form.slot_b.model,
            &session.credentials,
        )
        .await?;

    info!(
        a = %form.slot_a,
        b = %form.slot_b,
        a_failed = a.is_error,
        b_failed = b.is_error,
        "Generated comparison responses"
    );

    session.comparison.response_a = a.content.clone();
    session.comparison.response_b = b.content.clone();
    Ok(Generated { a, b })
}

/// Save the current comparison form as a `text-comparison` record
pub fn save(session: &Session, store: &mut RecordStore) -> Result<(), WorkflowError> {
    let form = &session.comparison;
    let record = TextComparison {
        session_id: session.id().clone(),
        prompt: form.prompt.clone(),
        response_a: form.response_a.clone(),
        response_b: form.response_b.clone(),
        scores: form.scores,
    };
    store.append(record.into())?;
    Ok(())
}
