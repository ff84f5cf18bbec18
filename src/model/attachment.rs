//! The single file attached to a draft.
//!
//! The whole payload is read into memory when the user picks the file; the
//! gateway receives it as the `file` part of the multipart body.

use std::path::Path;

use crate::error::{ComposerError, Result};

/// Fallback MIME type when the extension is unknown.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// A file chosen by the user, held in memory until sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// File name sent with the multipart part (no directory components).
    pub filename: String,

    /// MIME content type (e.g. `"image/jpeg"`, `"application/pdf"`).
    pub content_type: String,

    /// Raw file contents.
    pub bytes: Vec<u8>,
}

impl Attachment {
    /// Build an attachment from in-memory data.
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk, guessing its content type from the extension.
    ///
    /// Files larger than `max_size` bytes (0 = unlimited) and empty files are
    /// rejected before they are read into memory.
    pub fn from_path(path: &Path, max_size: u64) -> Result<Self> {
        let meta = std::fs::metadata(path).map_err(|e| ComposerError::io(path, e))?;
        if !meta.is_file() {
            return Err(ComposerError::io(
                path,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a regular file"),
            ));
        }
        let size = meta.len();
        if max_size > 0 && size > max_size {
            return Err(ComposerError::AttachmentTooLarge {
                path: path.to_path_buf(),
                size,
                limit: max_size,
            });
        }
        if size == 0 {
            return Err(ComposerError::EmptyAttachment(path.to_path_buf()));
        }

        let bytes = std::fs::read(path).map_err(|e| ComposerError::io(path, e))?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "attachment".to_string());
        let content_type = mime_guess::from_path(path)
            .first()
            .map(|m| m.essence_str().to_string())
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

        tracing::debug!(
            file = %filename,
            content_type = %content_type,
            size,
            "Loaded attachment"
        );

        Ok(Self {
            filename,
            content_type,
            bytes,
        })
    }

    /// Payload size in bytes.
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// An attachment counts as present only when it carries data.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
