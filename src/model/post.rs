use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::assets::image_ref::ImageRef;

/// Post identifier, `"<unix-millis>-<index>"`; unique within a batch.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(String);

impl PostId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Id of the `index`-th post of a batch created at `created`.
    pub fn for_batch(created: SystemTime, index: usize) -> Self {
        Self(format!("{}-{index}", unix_millis(created)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Milliseconds since the Unix epoch; times before the epoch count as zero.
pub(crate) fn unix_millis(t: SystemTime) -> u128 {
    t.duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

/// One generated image with its caption.
///
/// `original` never changes after creation. `processed` is derived from `original` and the
/// current watermark settings and is only replaced by compositor results.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratedPost {
    pub id: PostId,
    pub original: ImageRef,
    pub processed: ImageRef,
    pub prompt: String,
    pub caption: String,
}

impl GeneratedPost {
    /// New post whose processed image starts out as the original.
    pub fn new(id: PostId, original: ImageRef, prompt: impl Into<String>, caption: String) -> Self {
        Self {
            id,
            processed: original.clone(),
            original,
            prompt: prompt.into(),
            caption,
        }
    }

    /// True once a compositor result has replaced the original.
    pub fn is_processed(&self) -> bool {
        self.processed != self.original
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/post.rs"]
mod tests;
