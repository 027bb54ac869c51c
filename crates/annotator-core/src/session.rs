//! Per-run session context

use crate::workflows::comparison::ComparisonForm;
use crate::workflows::hallucination::HallucinationForm;
use crate::workflows::image::ImageForm;
use annotator_gateway::Credentials;
use annotator_store::SessionId;
use tracing::info;

/// State held for one interactive session and never persisted
///
/// The identifier is fixed at creation and copied into every record saved
/// during the session. Form slots keep whatever the operator entered, so a
/// failed action never loses input.
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    pub credentials: Credentials,
    pub comparison: ComparisonForm,
    pub hallucination: HallucinationForm,
    pub image: ImageForm,
}

impl Session {
    pub fn new(credentials: Credentials) -> Self {
        let id = SessionId::generate();
        info!(session = %id, "Session started");
        Self {
            id,
            credentials,
            comparison: ComparisonForm::default(),
            hallucination: HallucinationForm::default(),
            image: ImageForm::default(),
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }
}
