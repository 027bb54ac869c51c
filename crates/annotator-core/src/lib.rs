//! Session context, configuration and the three annotation workflows

mod config;
mod error;
mod session;
pub mod workflows;

pub use config::{Config, CONFIG_FILE};
pub use error::WorkflowError;
pub use session::Session;
pub use workflows::comparison::{ComparisonForm, Generated, ModelChoice};
pub use workflows::hallucination::HallucinationForm;
pub use workflows::image::{ImageForm, UploadError, UploadedImage};
