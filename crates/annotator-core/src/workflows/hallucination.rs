//! Manual hallucination tagging of a pasted response

use crate::error::WorkflowError;
use crate::session::Session;
use annotator_store::{Hallucination, HallucinationFlags, RecordStore};
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct HallucinationForm {
    pub response: String,
    pub flags: HallucinationFlags,
    pub notes: String,
}

/// Save the current form as a `hallucination` record
pub fn save(session: &Session, store: &mut RecordStore) -> Result<(), WorkflowError> {
    let form = &session.hallucination;
    debug!(flagged = form.flags.any(), "Saving hallucination annotation");
    let record = Hallucination {
        session_id: session.id().clone(),
        response: form.response.clone(),
        flags: form.flags,
        notes: form.notes.clone(),
    };
    store.append(record.into())?;
    Ok(())
}
