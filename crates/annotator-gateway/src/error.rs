use crate::provider::ProviderId;

/// Caller-side failures, raised before any request leaves the process
///
/// Transport and provider failures are not errors; they come back as a
/// [`crate::CompletionResult`] with `is_error` set.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("{0} API key required")]
    MissingCredential(ProviderId),

    #[error("{provider} does not offer model {model}")]
    UnknownModel { provider: ProviderId, model: String },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}
