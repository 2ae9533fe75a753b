//! Uploaded photo and its data-URL encoding.

use std::fs;
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::error::{Error, Result};

/// Largest photo accepted, matching what vision endpoints take inline.
pub const MAX_IMAGE_BYTES: usize = 20 * 1024 * 1024;

/// Raw photo bytes plus the reference the card keeps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    /// File name or other caller-chosen reference
    pub image_ref: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImageAsset {
    pub fn new(image_ref: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            image_ref: image_ref.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Read a photo from disk, inferring its MIME type from the extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let mime_type = mime_for_path(path).ok_or_else(|| Error::ImageLoad {
            path: path.to_path_buf(),
            message: "unsupported file extension".to_string(),
        })?;

        let bytes = fs::read(path).map_err(|e| Error::IoRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        if bytes.is_empty() {
            return Err(Error::ImageLoad {
                path: path.to_path_buf(),
                message: "file is empty".to_string(),
            });
        }
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(Error::ImageLoad {
                path: path.to_path_buf(),
                message: format!(
                    "file is {} bytes, limit is {}",
                    bytes.len(),
                    MAX_IMAGE_BYTES
                ),
            });
        }

        let image_ref = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();

        Ok(Self::new(image_ref, mime_type, bytes))
    }

    /// `data:<mime>;base64,<payload>` form sent to the vision model and kept on the card.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.bytes))
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}
