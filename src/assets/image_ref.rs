use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::foundation::error::{SocialGenError, SocialGenResult};

/// Reference to an image: a remote URL, a local file, or an embedded payload.
#[derive(Clone, PartialEq, Eq)]
pub enum ImageRef {
    /// `http://` or `https://` resource.
    Url(String),
    /// Local filesystem path (`file://` URLs are normalized to this).
    Path(PathBuf),
    /// Self-contained `data:<mime>;base64,<payload>` image.
    Data {
        /// Media type, e.g. `image/png`.
        mime: String,
        /// Encoded image bytes.
        bytes: Arc<[u8]>,
    },
}

impl ImageRef {
    /// Parse a URL, `data:` URL, or path.
    pub fn parse(s: &str) -> SocialGenResult<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(SocialGenError::validation("image reference must be non-empty"));
        }
        if let Some(rest) = s.strip_prefix("data:") {
            return parse_data_url(rest);
        }
        if s.starts_with("http://") || s.starts_with("https://") {
            return Ok(ImageRef::Url(s.to_string()));
        }
        if let Some(path) = s.strip_prefix("file://") {
            return Ok(ImageRef::Path(PathBuf::from(path)));
        }
        Ok(ImageRef::Path(PathBuf::from(s)))
    }

    /// Wrap encoded bytes as an embedded payload.
    pub fn from_bytes(mime: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        ImageRef::Data {
            mime: mime.into(),
            bytes: bytes.into(),
        }
    }

    pub fn is_embedded(&self) -> bool {
        matches!(self, ImageRef::Data { .. })
    }

    /// Render as a string usable wherever the original reference was accepted.
    pub fn to_uri(&self) -> String {
        match self {
            ImageRef::Url(u) => u.clone(),
            ImageRef::Path(p) => p.display().to_string(),
            ImageRef::Data { mime, bytes } => {
                format!("data:{mime};base64,{}", STANDARD.encode(bytes))
            }
        }
    }
}

fn parse_data_url(rest: &str) -> SocialGenResult<ImageRef> {
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| SocialGenError::validation("data url is missing ',' separator"))?;
    let Some(mime) = meta.strip_suffix(";base64") else {
        return Err(SocialGenError::validation(
            "only base64-encoded data urls are supported",
        ));
    };
    let mime = if mime.is_empty() {
        "application/octet-stream"
    } else {
        mime
    };
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| SocialGenError::validation(format!("invalid base64 in data url: {e}")))?;
    Ok(ImageRef::Data {
        mime: mime.to_string(),
        bytes: bytes.into(),
    })
}

impl fmt::Debug for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageRef::Url(u) => f.debug_tuple("Url").field(u).finish(),
            ImageRef::Path(p) => f.debug_tuple("Path").field(p).finish(),
            // Payloads run to megabytes; keep logs readable.
            ImageRef::Data { mime, bytes } => f
                .debug_struct("Data")
                .field("mime", mime)
                .field("len", &bytes.len())
                .finish(),
        }
    }
}

impl std::str::FromStr for ImageRef {
    type Err = SocialGenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ImageRef::parse(s)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/image_ref.rs"]
mod tests;
