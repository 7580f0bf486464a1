//! Uploaded photos and the advisory upload policy

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

/// Size guidance shown next to the upload button (5 MB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// MIME types the upload button advertises
pub const ADVERTISED_MIME_TYPES: [&str; 2] = ["image/jpeg", "image/png"];

/// A photo selected by the user
///
/// The payload is opaque. `data_url` is the display-ready encoding a UI can
/// put straight into an image element.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadedImage {
    file_name: String,
    mime_type: String,
    bytes: Arc<[u8]>,
    data_url: Arc<str>,
}

impl UploadedImage {
    /// Wrap raw bytes, guessing the MIME type from the file name
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        let file_name = file_name.into();
        let mime_type = mime_guess::from_path(&file_name)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Self::with_mime_type(file_name, mime_type, bytes)
    }

    pub fn with_mime_type(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        let mime_type = mime_type.into();
        let bytes: Arc<[u8]> = bytes.into();
        let data_url = format!("data:{mime_type};base64,{}", STANDARD.encode(&bytes));
        Self {
            file_name: file_name.into(),
            mime_type,
            bytes,
            data_url: data_url.into(),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn data_url(&self) -> &str {
        &self.data_url
    }
}

impl fmt::Debug for UploadedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadedImage")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("size", &self.size())
            .finish_non_exhaustive()
    }
}

// Snapshots carry metadata only; the payload stays in memory.
impl Serialize for UploadedImage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct View<'a> {
            file_name: &'a str,
            mime_type: &'a str,
            size: usize,
        }

        View {
            file_name: &self.file_name,
            mime_type: &self.mime_type,
            size: self.size(),
        }
        .serialize(serializer)
    }
}

/// Something about an upload that falls outside the advertised limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UploadAdvisory {
    UnsupportedType { mime_type: String },
    TooLarge { size: usize, limit: usize },
    Empty,
}

impl fmt::Display for UploadAdvisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadAdvisory::UnsupportedType { mime_type } => {
                write!(f, "unsupported type {mime_type}")
            }
            UploadAdvisory::TooLarge { size, limit } => {
                write!(f, "{size} bytes exceeds the {limit} byte limit")
            }
            UploadAdvisory::Empty => write!(f, "file is empty"),
        }
    }
}

/// Advertised upload limits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    pub max_bytes: usize,
    pub allowed_mime_types: Vec<String>,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            allowed_mime_types: ADVERTISED_MIME_TYPES.iter().map(ToString::to_string).collect(),
        }
    }
}

impl UploadPolicy {
    /// List every way `image` departs from the policy. Empty means compliant.
    pub fn check(&self, image: &UploadedImage) -> Vec<UploadAdvisory> {
        let mut advisories = Vec::new();
        if image.size() == 0 {
            advisories.push(UploadAdvisory::Empty);
        }
        if image.size() > self.max_bytes {
            advisories.push(UploadAdvisory::TooLarge {
                size: image.size(),
                limit: self.max_bytes,
            });
        }
        if !self
            .allowed_mime_types
            .iter()
            .any(|m| m.eq_ignore_ascii_case(image.mime_type()))
        {
            advisories.push(UploadAdvisory::UnsupportedType {
                mime_type: image.mime_type().to_string(),
            });
        }
        advisories
    }
}
