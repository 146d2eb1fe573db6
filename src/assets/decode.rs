use crate::foundation::core::RgbaFrame;
use crate::foundation::error::{SocialGenError, SocialGenResult};

/// Decode encoded image bytes (PNG, JPEG, WebP, ...) into straight RGBA8 at natural size.
pub fn decode_image(bytes: &[u8]) -> SocialGenResult<RgbaFrame> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| SocialGenError::image_load(format!("decode image from memory: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(SocialGenError::image_load("decoded image has zero size"));
    }
    RgbaFrame::from_raw(width, height, rgba.into_raw())
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
