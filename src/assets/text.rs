use std::path::Path;
use std::sync::Arc;

use crate::foundation::error::{SocialGenError, SocialGenResult};

/// DejaVu Sans Bold, shipped so watermark output does not depend on installed system fonts.
const BUNDLED_FONT: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans-Bold.ttf");

/// Font used to draw watermark text.
#[derive(Clone)]
pub struct WatermarkFont {
    bytes: Arc<Vec<u8>>,
}

impl std::fmt::Debug for WatermarkFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatermarkFont")
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl Default for WatermarkFont {
    fn default() -> Self {
        Self::bundled()
    }
}

impl WatermarkFont {
    /// The bundled bold sans-serif face.
    pub fn bundled() -> Self {
        Self {
            bytes: Arc::new(BUNDLED_FONT.to_vec()),
        }
    }

    /// Use caller-provided TrueType/OpenType bytes. The face is validated eagerly.
    pub fn from_bytes(bytes: Vec<u8>) -> SocialGenResult<Self> {
        if bytes.is_empty() {
            return Err(SocialGenError::validation("font bytes are empty"));
        }
        let font = Self {
            bytes: Arc::new(bytes),
        };
        TextLayoutEngine::new(&font)?;
        Ok(font)
    }

    pub fn from_path(path: &Path) -> SocialGenResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            SocialGenError::validation(format!("failed to read font '{}': {e}", path.display()))
        })?;
        Self::from_bytes(bytes)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

impl TextBrushRgba8 {
    pub(crate) const WHITE: Self = Self {
        r: 255,
        g: 255,
        b: 255,
        a: 255,
    };
}

/// Stateful helper for building single-line Parley layouts in one registered face.
pub(crate) struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    family_name: String,
    font_data: vello_cpu::peniko::FontData,
}

impl TextLayoutEngine {
    /// Register `font` in fresh Parley contexts.
    pub(crate) fn new(font: &WatermarkFont) -> SocialGenResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font.bytes().to_vec()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            SocialGenError::validation("no font families registered from font bytes")
        })?;

        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| SocialGenError::validation("registered font family has no name"))?
            .to_string();

        let font_data = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(font.bytes().to_vec()),
            0,
        );

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
            font_data,
        })
    }

    pub(crate) fn family_name(&self) -> &str {
        &self.family_name
    }

    /// Face handle for glyph rasterization.
    pub(crate) fn font_data(&self) -> &vello_cpu::peniko::FontData {
        &self.font_data
    }

    /// Shape and lay out `text` on a single line. Line breaks render as spaces.
    pub(crate) fn layout_line(
        &mut self,
        text: &str,
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> SocialGenResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(SocialGenError::validation(
                "text size_px must be finite and > 0",
            ));
        }

        let text: String = text
            .chars()
            .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
            .collect();

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, &text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(&text);
        layout.break_all_lines(None);
        Ok(layout)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/text.rs"]
mod tests;
