use crate::foundation::error::{SocialGenError, SocialGenResult};

/// A decoded image as straight (non-premultiplied) RGBA8 pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RgbaFrame {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
}

impl RgbaFrame {
    /// Wrap raw straight-alpha RGBA8 bytes, checking the buffer length.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> SocialGenResult<Self> {
        let expected = byte_len(width, height)?;
        if data.len() != expected {
            return Err(SocialGenError::validation(format!(
                "rgba frame expects {expected} bytes for {width}x{height}, got {}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// A frame filled with one straight RGBA8 color.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        Self {
            width,
            height,
            data: rgba.repeat((width as usize) * (height as usize)),
        }
    }

    /// Read the pixel at `(x, y)`, or `None` outside the frame.
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Read the pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics when `(x, y)` lies outside the frame. Use [`RgbaFrame::get_pixel`] for a checked
    /// read.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        match self.get_pixel(x, y) {
            Some(px) => px,
            None => panic!(
                "pixel ({x}, {y}) is outside the {}x{} frame",
                self.width, self.height
            ),
        }
    }
}

/// Pixel-space rectangle with integer bounds, `x1`/`y1` exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl PixelRect {
    /// Build from floating-point bounds, rounding outward and clipping to `width`x`height`.
    pub fn clipped_outward(x0: f64, y0: f64, x1: f64, y1: f64, width: u32, height: u32) -> Self {
        let clip = |v: f64, max: u32| -> u32 { v.clamp(0.0, f64::from(max)) as u32 };
        Self {
            x0: clip(x0.floor(), width),
            y0: clip(y0.floor(), height),
            x1: clip(x1.ceil(), width),
            y1: clip(y1.ceil(), height),
        }
    }

    pub fn width(self) -> u32 {
        self.x1.saturating_sub(self.x0)
    }

    pub fn height(self) -> u32 {
        self.y1.saturating_sub(self.y0)
    }

    pub fn is_empty(self) -> bool {
        self.width() == 0 || self.height() == 0
    }
}

pub(crate) fn byte_len(width: u32, height: u32) -> SocialGenResult<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| SocialGenError::render("rgba buffer size overflow"))
}

pub(crate) fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

/// Quantize a `[0, 1]` factor to `0..=255`.
pub(crate) fn unit_to_u8(v: f32) -> u8 {
    ((v.clamp(0.0, 1.0) * 255.0).round() as i32).clamp(0, 255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
