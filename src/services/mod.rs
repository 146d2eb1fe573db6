//! Remote collaborators: image generation, caption generation, and credential selection.

pub(crate) mod credentials;
pub(crate) mod gemini;

use async_trait::async_trait;

use crate::assets::image_ref::ImageRef;
use crate::foundation::error::SocialGenResult;
use crate::model::settings::{Platform, Resolution, Style};

/// Inputs for one image-generation batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageRequest {
    pub prompt: String,
    pub platform: Platform,
    pub resolution: Resolution,
    pub style: Style,
    pub count: u32,
}

/// Produces images for a prompt.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Return the generated images in order, each as a URL or embedded payload.
    async fn generate_images(&self, request: &ImageRequest) -> SocialGenResult<Vec<ImageRef>>;
}

/// Produces a caption (prose plus hashtags) for a topic.
#[async_trait]
pub trait CaptionGenerator: Send + Sync {
    async fn generate_caption(&self, topic: &str, style: &Style) -> SocialGenResult<String>;
}

/// Source of the API credential used by generation calls.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Whether a usable credential is currently selected.
    async fn has_selected_key(&self) -> bool;

    /// Prompt the user to select or establish a credential.
    async fn open_select_key(&self) -> SocialGenResult<()>;

    /// The current key, read fresh on every call so a newly selected key is picked up.
    fn api_key(&self) -> Option<String>;
}
