//! Application configuration: JSON file with defaults, overridden by the command line.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::assets::loader::DefaultImageLoader;
use crate::assets::text::WatermarkFont;
use crate::compositor::Compositor;
use crate::foundation::error::{SocialGenError, SocialGenResult};
use crate::model::settings::GenerationSettings;
use crate::render::watermark::WatermarkStyle;
use crate::services::CredentialProvider;
use crate::services::gemini::{
    DEFAULT_API_BASE, DEFAULT_CAPTION_MODEL, DEFAULT_IMAGE_MODEL, GeminiClient,
};

/// Settings that are not part of a session. The API key is never stored here.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub api_base_url: String,
    pub image_model: String,
    pub caption_model: String,
    pub watermark: WatermarkStyle,
    /// Font used for the overlay instead of the bundled one.
    pub font_path: Option<PathBuf>,
    /// Initial generation and watermark settings of a new session.
    pub defaults: GenerationSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            caption_model: DEFAULT_CAPTION_MODEL.to_string(),
            watermark: WatermarkStyle::default(),
            font_path: None,
            defaults: GenerationSettings::default(),
        }
    }
}

impl AppConfig {
    pub fn from_reader<R: std::io::Read>(r: R) -> SocialGenResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| SocialGenError::serde(format!("parse config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: impl AsRef<Path>) -> SocialGenResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            SocialGenError::validation(format!("open config '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Read `path` when given, otherwise use the defaults.
    pub fn load(path: Option<&Path>) -> SocialGenResult<Self> {
        match path {
            Some(p) => Self::from_path(p),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> SocialGenResult<()> {
        if self.api_base_url.trim().is_empty() {
            return Err(SocialGenError::validation("api_base_url must be non-empty"));
        }
        if self.image_model.trim().is_empty() || self.caption_model.trim().is_empty() {
            return Err(SocialGenError::validation("model names must be non-empty"));
        }
        self.watermark.validate()?;
        self.defaults.validate()
    }

    /// Compositor with the configured style and font.
    pub fn compositor(&self, http: reqwest::Client) -> SocialGenResult<Compositor> {
        let mut compositor = Compositor::new(Arc::new(DefaultImageLoader::new(http)))
            .with_style(self.watermark.clone())?;
        if let Some(path) = &self.font_path {
            compositor = compositor.with_font(WatermarkFont::from_path(path)?);
        }
        Ok(compositor)
    }

    pub fn gemini_client(
        &self,
        http: reqwest::Client,
        credentials: Arc<dyn CredentialProvider>,
    ) -> GeminiClient {
        GeminiClient::new(http, credentials)
            .with_base_url(self.api_base_url.clone())
            .with_models(self.image_model.clone(), self.caption_model.clone())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
