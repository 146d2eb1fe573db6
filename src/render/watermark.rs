use serde::{Deserialize, Serialize};

use crate::assets::text::{TextBrushRgba8, TextLayoutEngine, WatermarkFont};
use crate::foundation::core::{PixelRect, RgbaFrame, mul_div255, unit_to_u8};
use crate::foundation::error::{SocialGenError, SocialGenResult};
use crate::model::settings::{WatermarkSettings, validate_opacity};
use crate::render::blur::{blur_alpha8, radius_for_sigma};
use crate::render::composite::over_tile_in_place;

/// Rendering constants for the watermark overlay.
///
/// Defaults reproduce the browser canvas treatment: bold text at `max(24, width / 20)` px,
/// inset by half the font size from the bottom-right corner, over a 50% black shadow with a
/// 10 px blur.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatermarkStyle {
    /// Smallest font size in pixels, regardless of image width.
    pub min_font_px: u32,
    /// Font size is `image_width / width_divisor` above the floor.
    pub width_divisor: u32,
    /// Right and bottom inset as a fraction of the font size.
    pub margin_ratio: f32,
    /// Shadow alpha before the overlay opacity is applied.
    pub shadow_alpha: f32,
    /// Canvas-style shadow blur; the Gaussian sigma is half of it.
    pub shadow_blur_px: f32,
}

impl Default for WatermarkStyle {
    fn default() -> Self {
        Self {
            min_font_px: 24,
            width_divisor: 20,
            margin_ratio: 0.5,
            shadow_alpha: 0.5,
            shadow_blur_px: 10.0,
        }
    }
}

impl WatermarkStyle {
    pub fn validate(&self) -> SocialGenResult<()> {
        if self.min_font_px == 0 {
            return Err(SocialGenError::validation("min_font_px must be > 0"));
        }
        if self.width_divisor == 0 {
            return Err(SocialGenError::validation("width_divisor must be > 0"));
        }
        if !self.margin_ratio.is_finite() || self.margin_ratio < 0.0 {
            return Err(SocialGenError::validation("margin_ratio must be >= 0"));
        }
        if !self.shadow_alpha.is_finite() || !(0.0..=1.0).contains(&self.shadow_alpha) {
            return Err(SocialGenError::validation("shadow_alpha must be in [0, 1]"));
        }
        if !self.shadow_blur_px.is_finite() || self.shadow_blur_px < 0.0 {
            return Err(SocialGenError::validation("shadow_blur_px must be >= 0"));
        }
        Ok(())
    }

    /// Font size in pixels for an image `width` pixels wide.
    pub fn font_size_for(&self, width: u32) -> u32 {
        (width / self.width_divisor.max(1)).max(self.min_font_px)
    }

    fn shadow_sigma(&self) -> f32 {
        self.shadow_blur_px / 2.0
    }
}

/// Where the text lands on an image.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Placement {
    pub(crate) font_px: f32,
    /// Top-left of the text layout box in image pixels.
    pub(crate) origin: (f64, f64),
    /// Pixels that may be touched: text box grown by the shadow reach, clipped to the image.
    pub(crate) tile: PixelRect,
}

pub(crate) fn place(
    image_w: u32,
    image_h: u32,
    text_w: f32,
    text_h: f32,
    font_px: f32,
    style: &WatermarkStyle,
) -> Placement {
    let margin = f64::from(font_px) * f64::from(style.margin_ratio);
    let (text_w, text_h) = (f64::from(text_w), f64::from(text_h));
    let origin_x = f64::from(image_w) - margin - text_w;
    let origin_y = f64::from(image_h) - margin - text_h;

    // Bold faces overhang their advance box a little; the shadow reaches three sigma further.
    let pad = f64::from(radius_for_sigma(style.shadow_sigma())) + f64::from(font_px) * 0.25;
    let tile = PixelRect::clipped_outward(
        origin_x - pad,
        origin_y - pad,
        origin_x + text_w + pad,
        origin_y + text_h + pad,
        image_w,
        image_h,
    );
    Placement {
        font_px,
        origin: (origin_x, origin_y),
        tile,
    }
}

/// Draw the watermark onto a copy of `src`.
///
/// When the overlay is hidden or the text is empty the copy is returned untouched. Otherwise
/// only pixels inside the text tile change.
pub fn render_watermark(
    src: &RgbaFrame,
    overlay: &WatermarkSettings,
    style: &WatermarkStyle,
    font: &WatermarkFont,
) -> SocialGenResult<RgbaFrame> {
    let mut out = src.clone();
    if !overlay.draws_overlay() {
        return Ok(out);
    }
    let opacity = validate_opacity(overlay.opacity)?;
    style.validate()?;

    let font_px = style.font_size_for(src.width) as f32;
    let mut engine = TextLayoutEngine::new(font)?;
    let layout = engine.layout_line(&overlay.text, font_px, TextBrushRgba8::WHITE)?;
    let placement = place(
        src.width,
        src.height,
        layout.width(),
        layout.height(),
        font_px,
        style,
    );
    tracing::trace!(
        family = engine.family_name(),
        font_px,
        tile = ?placement.tile,
        "watermark placed"
    );
    if placement.tile.is_empty() {
        return Ok(out);
    }

    let coverage = rasterize_coverage(&layout, engine.font_data(), &placement)?;
    let tile = placement.tile;

    let shadow_q = unit_to_u8(style.shadow_alpha * opacity);
    if shadow_q > 0 {
        let shadow_src: Vec<u8> = coverage
            .iter()
            .map(|&c| mul_div255(u16::from(c), u16::from(shadow_q)))
            .collect();
        let shadow = blur_alpha8(
            &shadow_src,
            tile.width(),
            tile.height(),
            radius_for_sigma(style.shadow_sigma()),
            style.shadow_sigma(),
        )?;
        let layer: Vec<u8> = shadow.iter().flat_map(|&a| [0, 0, 0, a]).collect();
        over_tile_in_place(&mut out, tile, &layer)?;
    }

    let fill_q = unit_to_u8(opacity);
    let layer: Vec<u8> = coverage
        .iter()
        .flat_map(|&c| {
            let v = mul_div255(u16::from(c), u16::from(fill_q));
            [v, v, v, v]
        })
        .collect();
    over_tile_in_place(&mut out, tile, &layer)?;

    Ok(out)
}

/// Rasterize glyph coverage for the tile as one 8-bit plane.
fn rasterize_coverage(
    layout: &parley::Layout<TextBrushRgba8>,
    font: &vello_cpu::peniko::FontData,
    placement: &Placement,
) -> SocialGenResult<Vec<u8>> {
    let tile = placement.tile;
    let w: u16 = tile
        .width()
        .try_into()
        .map_err(|_| SocialGenError::render("watermark tile width exceeds u16"))?;
    let h: u16 = tile
        .height()
        .try_into()
        .map_err(|_| SocialGenError::render("watermark tile height exceeds u16"))?;

    let mut ctx = vello_cpu::RenderContext::new(w, h);
    ctx.set_transform(vello_cpu::kurbo::Affine::translate((
        placement.origin.0 - f64::from(tile.x0),
        placement.origin.1 - f64::from(tile.y0),
    )));
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(255, 255, 255, 255));
    for line in layout.lines() {
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };
            // Positioned glyphs carry the run offset, running advance and baseline.
            let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
            });
            ctx.glyph_run(font)
                .font_size(run.run().font_size())
                .fill_glyphs(glyphs);
        }
    }
    ctx.flush();

    let mut pixmap = vello_cpu::Pixmap::new(w, h);
    ctx.render_to_pixmap(&mut pixmap);
    Ok(pixmap
        .data_as_u8_slice()
        .chunks_exact(4)
        .map(|px| px[3])
        .collect())
}

#[cfg(test)]
#[path = "../../tests/unit/render/watermark.rs"]
mod tests;
