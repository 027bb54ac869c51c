use crate::workflows::image::UploadError;
use annotator_gateway::{GatewayError, ProviderId};
use annotator_store::StoreError;

/// Everything a workflow action can report back to the operator
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("{}", missing_keys(.0))]
    MissingCredentials(Vec<ProviderId>),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("could not save annotation: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error("{0} is required")]
    MissingField(&'static str),
}

fn missing_keys(providers: &[ProviderId]) -> String {
    providers
        .iter()
        .map(|p| format!("{} API key required", p))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credentials_names_each_provider() {
        let err = WorkflowError::MissingCredentials(vec![ProviderId::Groq, ProviderId::OpenAi]);
        assert_eq!(
            err.to_string(),
            "Groq API key required; OpenAI API key required"
        );
    }
}
