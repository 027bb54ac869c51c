//! Image label verification
//!
//! The uploaded image is decoded only to validate it and read its size. The
//! original bytes stay in session memory for display and are never written
//! to the record store.

use crate::error::WorkflowError;
use crate::session::Session;
use annotator_store::{ImageEval, RecordStore, Verdict};
use image::ImageFormat;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("uploaded file is empty")]
    Empty,

    #[error("unsupported image format (expected PNG or JPEG)")]
    Unsupported,

    #[error("could not decode image: {0}")]
    Decode(#[from] image::ImageError),
}

/// A decoded PNG or JPEG upload, kept as the bytes the operator sent
#[derive(Clone)]
pub struct UploadedImage {
    pub file_name: String,
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

impl UploadedImage {
    /// Decode `bytes`, accepting only PNG and JPEG
    pub fn decode(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, UploadError> {
        if bytes.is_empty() {
            return Err(UploadError::Empty);
        }
        let format = image::guess_format(&bytes).map_err(|_| UploadError::Unsupported)?;
        if !matches!(format, ImageFormat::Png | ImageFormat::Jpeg) {
            return Err(UploadError::Unsupported);
        }

        let decoded = image::load_from_memory_with_format(&bytes, format)?;
        Ok(Self {
            file_name: file_name.into(),
            format,
            width: decoded.width(),
            height: decoded.height(),
            bytes,
        })
    }

    pub fn content_type(&self) -> &'static str {
        self.format.to_mime_type()
    }
}

impl std::fmt::Debug for UploadedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadedImage")
            .field("file_name", &self.file_name)
            .field("format", &self.format)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ImageForm {
    pub upload: Option<UploadedImage>,
    pub predicted_label: String,
    pub verdict: Verdict,
    /// Only used when the verdict is "No"
    pub correct_label: String,
}

/// Decode an upload and make it the image shown in the form
///
/// A rejected upload leaves any previous image in place.
pub fn attach_upload<'a>(
    session: &'a mut Session,
    file_name: &str,
    bytes: Vec<u8>,
) -> Result<&'a UploadedImage, WorkflowError> {
    let upload = UploadedImage::decode(file_name, bytes)?;
    info!(
        file = %upload.file_name,
        width = upload.width,
        height = upload.height,
        "Image attached"
    );
    Ok(session.image.upload.insert(upload))
}

/// Save the current form as an `image-eval` record
pub fn save(session: &Session, store: &mut RecordStore) -> Result<(), WorkflowError> {
    let form = &session.image;
    let record = ImageEval::new(
        session.id().clone(),
        form.predicted_label.clone(),
        form.verdict,
        Some(form.correct_label.clone()),
    );
    store.append(record.into())?;
    Ok(())
}
