//! Watermark compositor: load a source image, draw the overlay, re-encode.

use std::sync::Arc;

use crate::assets::decode::decode_image;
use crate::assets::image_ref::ImageRef;
use crate::assets::loader::{DefaultImageLoader, ImageLoader};
use crate::assets::text::WatermarkFont;
use crate::encode::{EncodedImage, encode_frame};
use crate::foundation::error::{SocialGenError, SocialGenResult};
use crate::model::settings::{ExportFormat, WatermarkSettings};
use crate::render::watermark::{WatermarkStyle, render_watermark};

/// Produces watermarked PNG payloads from image references.
///
/// Each call runs the whole pipeline from scratch on its own surfaces, so any number of calls
/// may be in flight at once.
#[derive(Clone)]
pub struct Compositor {
    loader: Arc<dyn ImageLoader>,
    font: WatermarkFont,
    style: WatermarkStyle,
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new(Arc::new(DefaultImageLoader::default()))
    }
}

impl Compositor {
    pub fn new(loader: Arc<dyn ImageLoader>) -> Self {
        Self {
            loader,
            font: WatermarkFont::bundled(),
            style: WatermarkStyle::default(),
        }
    }

    pub fn with_style(mut self, style: WatermarkStyle) -> SocialGenResult<Self> {
        style.validate()?;
        self.style = style;
        Ok(self)
    }

    pub fn with_font(mut self, font: WatermarkFont) -> Self {
        self.font = font;
        self
    }

    pub fn style(&self) -> &WatermarkStyle {
        &self.style
    }

    /// Loader used for sources; downloads reuse it.
    pub fn loader(&self) -> &Arc<dyn ImageLoader> {
        &self.loader
    }

    /// Load `source`, draw `overlay`, and return the PNG-encoded composite.
    ///
    /// Resolves exactly once. Load and decode failures surface as
    /// [`SocialGenError::ImageLoad`].
    #[tracing::instrument(skip_all, fields(source = ?source, visible = overlay.visible))]
    pub async fn composite(
        &self,
        source: &ImageRef,
        overlay: &WatermarkSettings,
    ) -> SocialGenResult<EncodedImage> {
        let bytes = self.loader.load(source).await?;
        let overlay = overlay.clone();
        let style = self.style.clone();
        let font = self.font.clone();
        let out = tokio::task::spawn_blocking(move || {
            composite_bytes(&bytes, &overlay, &style, &font)
        })
        .await
        .map_err(|e| SocialGenError::render(format!("compositor task failed: {e}")))??;
        tracing::debug!(width = out.width, height = out.height, "composite ready");
        Ok(out)
    }
}

/// Synchronous pipeline over already-loaded bytes.
pub fn composite_bytes(
    bytes: &[u8],
    overlay: &WatermarkSettings,
    style: &WatermarkStyle,
    font: &WatermarkFont,
) -> SocialGenResult<EncodedImage> {
    let frame = decode_image(bytes)?;
    let out = render_watermark(&frame, overlay, style, font)?;
    encode_frame(&out, ExportFormat::Png)
}
