//! Annotation workflows
//!
//! Each flow reads its form from the [`crate::Session`], optionally calls the
//! completion gateway, and hands a finished record to the record store.

pub mod comparison;
pub mod hallucination;
pub mod image;
