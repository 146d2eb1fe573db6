//! Image encoding for compositor output and downloads.

use std::sync::Arc;

use image::ImageEncoder as _;

use crate::assets::decode::premultiply_rgba8_in_place;
use crate::assets::image_ref::ImageRef;
use crate::foundation::core::RgbaFrame;
use crate::foundation::error::{SocialGenError, SocialGenResult};
use crate::model::settings::ExportFormat;

/// JPEG quality used for downloads, matching the browser `toDataURL` default.
pub const JPEG_QUALITY: u8 = 92;

/// A fully encoded image, ready to embed or save.
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub format: ExportFormat,
    pub width: u32,
    pub height: u32,
    pub bytes: Arc<[u8]>,
}

impl std::fmt::Debug for EncodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncodedImage")
            .field("format", &self.format)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl EncodedImage {
    /// Self-contained reference carrying the encoded bytes.
    pub fn to_image_ref(&self) -> ImageRef {
        ImageRef::Data {
            mime: self.format.mime().to_string(),
            bytes: self.bytes.clone(),
        }
    }

    /// `data:<mime>;base64,...` form.
    pub fn to_data_url(&self) -> String {
        self.to_image_ref().to_uri()
    }
}

/// Encode `frame` in `format`.
///
/// PNG keeps alpha losslessly. JPEG has no alpha channel, so transparent areas are flattened
/// onto black the way a browser canvas exports them.
pub fn encode_frame(frame: &RgbaFrame, format: ExportFormat) -> SocialGenResult<EncodedImage> {
    let mut buf = Vec::new();
    match format {
        ExportFormat::Png => {
            image::codecs::png::PngEncoder::new(&mut buf)
                .write_image(
                    &frame.data,
                    frame.width,
                    frame.height,
                    image::ExtendedColorType::Rgba8,
                )
                .map_err(|e| SocialGenError::encode(format!("png: {e}")))?;
        }
        ExportFormat::Jpg => {
            let mut premul = frame.data.clone();
            premultiply_rgba8_in_place(&mut premul);
            let rgb: Vec<u8> = premul
                .chunks_exact(4)
                .flat_map(|px| [px[0], px[1], px[2]])
                .collect();
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY)
                .write_image(
                    &rgb,
                    frame.width,
                    frame.height,
                    image::ExtendedColorType::Rgb8,
                )
                .map_err(|e| SocialGenError::encode(format!("jpeg: {e}")))?;
        }
    }
    Ok(EncodedImage {
        format,
        width: frame.width,
        height: frame.height,
        bytes: buf.into(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/encode/frame.rs"]
mod tests;
