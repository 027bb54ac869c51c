//! Annotation records and the flat-file store that persists them

mod error;
mod io;
mod record;
mod store;

pub use error::{LoadError, StoreError};
pub use io::{atomic_write, to_pretty_json};
pub use record::{
    AnnotationRecord, Hallucination, HallucinationFlags, ImageEval, Preference, Scores, SessionId,
    TextComparison, Verdict,
};
pub use store::{load_all, RecordStore};
