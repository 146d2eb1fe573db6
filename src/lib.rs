//! SocialGen: AI-generated social posts with a client-side watermark.
//!
//! The crate is organized around one compositing step and the session that drives it:
//!
//! - [`Compositor`] loads a source image, draws the watermark text with a blurred shadow in the
//!   bottom-right corner, and re-encodes the result as PNG.
//! - [`SessionController`] owns a [`SessionState`], calls the generation services, and keeps
//!   every post's processed image in sync with the watermark settings. Results from superseded
//!   watermark jobs are discarded by per-post revision counters.
//! - [`GeminiClient`] implements the image and caption services over HTTP.
//!
//! Rasterization is CPU only (`vello_cpu` + `parley`) with a bundled font, so identical inputs
//! produce identical bytes.

#![forbid(unsafe_code)]

mod assets;
mod compositor;
mod config;
mod encode;
mod export;
mod foundation;
mod model;
mod render;
mod services;
mod session;

pub use assets::decode::decode_image;
pub use assets::image_ref::ImageRef;
pub use assets::loader::{DefaultImageLoader, ImageLoader};
pub use assets::text::WatermarkFont;
pub use compositor::{Compositor, composite_bytes};
pub use config::AppConfig;
pub use encode::{EncodedImage, JPEG_QUALITY, encode_frame};
pub use export::{Clipboard, MemoryClipboard, download_filename, export_image, save_image};
pub use foundation::core::{PixelRect, RgbaFrame};
pub use foundation::error::{SocialGenError, SocialGenResult};
pub use model::post::{GeneratedPost, PostId};
pub use model::settings::{
    ExportFormat, GenerationSettings, MAX_COUNT, Platform, Resolution, Style, StylePreset,
    WatermarkSettings, validate_count, validate_opacity,
};
pub use render::watermark::{WatermarkStyle, render_watermark};
pub use services::credentials::{API_KEY_VARS, EnvCredentials, StaticCredentials};
pub use services::gemini::{
    DEFAULT_API_BASE, DEFAULT_CAPTION_MODEL, DEFAULT_IMAGE_MODEL, ENTITY_NOT_FOUND, GeminiClient,
};
pub use services::{CaptionGenerator, CredentialProvider, ImageGenerator, ImageRequest};
pub use session::controller::{BlockReason, GenerateOutcome, SessionController, WatermarkOutcome};
pub use session::state::{COPY_FEEDBACK, STATUS_GENERATING, STATUS_READY, SessionState};
