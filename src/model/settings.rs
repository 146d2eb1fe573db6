use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::foundation::error::{SocialGenError, SocialGenResult};

/// Upper bound for images requested in one generation batch.
pub const MAX_COUNT: u32 = 4;

/// Target platform aspect ratio.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    /// Square feed post (`1:1`).
    #[default]
    #[serde(rename = "1:1")]
    Square,
    /// Vertical story (`9:16`).
    #[serde(rename = "9:16")]
    Story,
    /// Landscape feed post (`4:3`).
    #[serde(rename = "4:3")]
    FbPost,
    /// Widescreen post (`16:9`).
    #[serde(rename = "16:9")]
    Widescreen,
}

impl Platform {
    /// All platforms in picker order.
    pub const ALL: [Platform; 4] = [
        Platform::Square,
        Platform::Story,
        Platform::FbPost,
        Platform::Widescreen,
    ];

    /// Aspect-ratio selector understood by the image service.
    pub fn aspect_ratio(self) -> &'static str {
        match self {
            Platform::Square => "1:1",
            Platform::Story => "9:16",
            Platform::FbPost => "4:3",
            Platform::Widescreen => "16:9",
        }
    }

    /// `(width, height)` ratio terms.
    pub fn ratio(self) -> (u32, u32) {
        match self {
            Platform::Square => (1, 1),
            Platform::Story => (9, 16),
            Platform::FbPost => (4, 3),
            Platform::Widescreen => (16, 9),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.aspect_ratio())
    }
}

impl FromStr for Platform {
    type Err = SocialGenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1:1" | "square" => Ok(Platform::Square),
            "9:16" | "story" => Ok(Platform::Story),
            "4:3" | "fb-post" | "fb" => Ok(Platform::FbPost),
            "16:9" | "widescreen" | "x" => Ok(Platform::Widescreen),
            other => Err(SocialGenError::validation(format!(
                "unknown platform '{other}' (expected 1:1, 9:16, 4:3 or 16:9)"
            ))),
        }
    }
}

/// Output resolution tier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resolution {
    #[default]
    #[serde(rename = "1K")]
    Res1K,
    #[serde(rename = "2K")]
    Res2K,
    #[serde(rename = "4K")]
    Res4K,
}

impl Resolution {
    /// Image-size selector understood by the image service.
    pub fn as_str(self) -> &'static str {
        match self {
            Resolution::Res1K => "1K",
            Resolution::Res2K => "2K",
            Resolution::Res4K => "4K",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resolution {
    type Err = SocialGenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "1K" => Ok(Resolution::Res1K),
            "2K" => Ok(Resolution::Res2K),
            "4K" => Ok(Resolution::Res4K),
            other => Err(SocialGenError::validation(format!(
                "unknown resolution '{other}' (expected 1K, 2K or 4K)"
            ))),
        }
    }
}

/// Built-in visual style presets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StylePreset {
    ModernMinimal,
    JapaneseMagazine,
    FilmNostalgia,
    AmericanRetro,
    Cyberpunk,
    NaturalFresh,
    HealingIllustration,
    LuxuryTexture,
}

impl StylePreset {
    /// All presets in picker order.
    pub const ALL: [StylePreset; 8] = [
        StylePreset::ModernMinimal,
        StylePreset::JapaneseMagazine,
        StylePreset::FilmNostalgia,
        StylePreset::AmericanRetro,
        StylePreset::Cyberpunk,
        StylePreset::NaturalFresh,
        StylePreset::HealingIllustration,
        StylePreset::LuxuryTexture,
    ];

    /// Label sent to the generation services.
    pub fn label(self) -> &'static str {
        match self {
            StylePreset::ModernMinimal => "現代簡約",
            StylePreset::JapaneseMagazine => "日系雜誌",
            StylePreset::FilmNostalgia => "底片懷舊",
            StylePreset::AmericanRetro => "美式復古",
            StylePreset::Cyberpunk => "賽博龐克",
            StylePreset::NaturalFresh => "自然清新",
            StylePreset::HealingIllustration => "療癒插畫",
            StylePreset::LuxuryTexture => "奢華質感",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            StylePreset::ModernMinimal => "modern-minimal",
            StylePreset::JapaneseMagazine => "japanese-magazine",
            StylePreset::FilmNostalgia => "film-nostalgia",
            StylePreset::AmericanRetro => "american-retro",
            StylePreset::Cyberpunk => "cyberpunk",
            StylePreset::NaturalFresh => "natural-fresh",
            StylePreset::HealingIllustration => "healing-illustration",
            StylePreset::LuxuryTexture => "luxury-texture",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            StylePreset::ModernMinimal => "✨",
            StylePreset::JapaneseMagazine => "📖",
            StylePreset::FilmNostalgia => "🎞️",
            StylePreset::AmericanRetro => "🇺🇸",
            StylePreset::Cyberpunk => "🌃",
            StylePreset::NaturalFresh => "🌿",
            StylePreset::HealingIllustration => "🎨",
            StylePreset::LuxuryTexture => "💎",
        }
    }
}

/// Style label: a preset or free text.
///
/// Serialized as the preset key (`"cyberpunk"`) or the custom text.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Style {
    Preset(StylePreset),
    Custom(String),
}

impl Default for Style {
    fn default() -> Self {
        Style::Preset(StylePreset::ModernMinimal)
    }
}

impl Style {
    /// Map a preset key or label to the preset; anything else becomes a custom style.
    pub fn parse(s: &str) -> SocialGenResult<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(SocialGenError::validation("style must be non-empty"));
        }
        let preset = StylePreset::ALL
            .into_iter()
            .find(|p| p.label() == s || p.key().eq_ignore_ascii_case(s));
        Ok(match preset {
            Some(p) => Style::Preset(p),
            None => Style::Custom(s.to_string()),
        })
    }

    /// Label sent to the generation services.
    pub fn label(&self) -> &str {
        match self {
            Style::Preset(p) => p.label(),
            Style::Custom(s) => s,
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl TryFrom<String> for Style {
    type Error = SocialGenError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Style::parse(&s)
    }
}

impl From<Style> for String {
    fn from(style: Style) -> Self {
        match style {
            Style::Preset(p) => p.key().to_string(),
            Style::Custom(s) => s,
        }
    }
}

impl FromStr for Style {
    type Err = SocialGenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Style::parse(s)
    }
}

/// Download format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Png,
    Jpg,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpg => "jpg",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpg => "image/jpeg",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = SocialGenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(ExportFormat::Png),
            "jpg" | "jpeg" => Ok(ExportFormat::Jpg),
            other => Err(SocialGenError::validation(format!(
                "unknown export format '{other}' (expected png or jpg)"
            ))),
        }
    }
}

/// Watermark overlay inputs. The processed image of every post is a function of these and the
/// post's original image.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatermarkSettings {
    pub text: String,
    /// Fill alpha in `[0, 1]`.
    pub opacity: f32,
    pub visible: bool,
}

impl Default for WatermarkSettings {
    fn default() -> Self {
        Self {
            text: "@SocialGenAI".to_string(),
            opacity: 0.6,
            visible: true,
        }
    }
}

impl WatermarkSettings {
    pub fn new(text: impl Into<String>, opacity: f32, visible: bool) -> SocialGenResult<Self> {
        Ok(Self {
            text: text.into(),
            opacity: validate_opacity(opacity)?,
            visible,
        })
    }

    /// True when compositing draws anything.
    pub fn draws_overlay(&self) -> bool {
        self.visible && !self.text.is_empty()
    }
}

/// Clamp opacity into `[0, 1]`; non-finite values are rejected.
pub fn validate_opacity(opacity: f32) -> SocialGenResult<f32> {
    if !opacity.is_finite() {
        return Err(SocialGenError::validation("watermark opacity must be finite"));
    }
    Ok(opacity.clamp(0.0, 1.0))
}

pub fn validate_count(count: u32) -> SocialGenResult<u32> {
    if count == 0 || count > MAX_COUNT {
        return Err(SocialGenError::validation(format!(
            "count must be in 1..={MAX_COUNT}, got {count}"
        )));
    }
    Ok(count)
}

/// User-editable generation settings for a session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    pub platform: Platform,
    pub resolution: Resolution,
    pub style: Style,
    pub count: u32,
    pub watermark: WatermarkSettings,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            platform: Platform::default(),
            resolution: Resolution::default(),
            style: Style::default(),
            count: 1,
            watermark: WatermarkSettings::default(),
        }
    }
}

impl GenerationSettings {
    /// Check field ranges after deserialization.
    pub fn validate(&self) -> SocialGenResult<()> {
        validate_count(self.count)?;
        if !self.watermark.opacity.is_finite()
            || !(0.0..=1.0).contains(&self.watermark.opacity)
        {
            return Err(SocialGenError::validation(
                "watermark opacity must be in [0, 1]",
            ));
        }
        if self.style.label().trim().is_empty() {
            return Err(SocialGenError::validation("style must be non-empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/settings.rs"]
mod tests;
