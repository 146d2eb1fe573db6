use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use serde_json::json;

use crate::assets::image_ref::ImageRef;
use crate::foundation::error::{SocialGenError, SocialGenResult};
use crate::model::settings::Style;
use crate::services::{CaptionGenerator, CredentialProvider, ImageGenerator, ImageRequest};

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-3-pro-image-preview";
pub const DEFAULT_CAPTION_MODEL: &str = "gemini-3-flash-preview";

/// Message the service returns when the selected key no longer resolves.
pub const ENTITY_NOT_FOUND: &str = "Requested entity was not found.";

/// Gemini `generateContent` client for both images and captions.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    image_model: String,
    caption_model: String,
    credentials: Arc<dyn CredentialProvider>,
}

impl GeminiClient {
    pub fn new(http: reqwest::Client, credentials: Arc<dyn CredentialProvider>) -> Self {
        Self {
            http,
            base_url: DEFAULT_API_BASE.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            caption_model: DEFAULT_CAPTION_MODEL.to_string(),
            credentials,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_models(
        mut self,
        image_model: impl Into<String>,
        caption_model: impl Into<String>,
    ) -> Self {
        self.image_model = image_model.into();
        self.caption_model = caption_model.into();
        self
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{model}:generateContent", self.base_url)
    }

    async fn generate_content(
        &self,
        model: &str,
        body: &serde_json::Value,
    ) -> SocialGenResult<GenerateContentResponse> {
        // Read per call so a key selected mid-session is used immediately.
        let key = self
            .credentials
            .api_key()
            .ok_or_else(|| SocialGenError::credential_missing("no API key selected"))?;

        let resp = self
            .http
            .post(self.endpoint(model))
            .header("x-goog-api-key", key)
            .json(body)
            .send()
            .await
            .map_err(|e| SocialGenError::generation(format!("request to {model} failed: {e}")))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| SocialGenError::generation(format!("read {model} response: {e}")))?;
        if !status.is_success() {
            return Err(classify_error(status.as_u16(), &text));
        }
        serde_json::from_str(&text)
            .map_err(|e| SocialGenError::serde(format!("parse {model} response: {e}")))
    }
}

#[async_trait]
impl ImageGenerator for GeminiClient {
    #[tracing::instrument(skip_all, fields(model = %self.image_model, count = request.count))]
    async fn generate_images(&self, request: &ImageRequest) -> SocialGenResult<Vec<ImageRef>> {
        let body = image_request_body(request);
        let mut out = Vec::new();
        // The image model answers one image per call.
        for i in 0..request.count {
            let resp = self.generate_content(&self.image_model, &body).await?;
            let images = resp.images()?;
            tracing::debug!(call = i, images = images.len(), "image call complete");
            out.extend(images);
        }
        Ok(out)
    }
}

#[async_trait]
impl CaptionGenerator for GeminiClient {
    #[tracing::instrument(skip_all, fields(model = %self.caption_model))]
    async fn generate_caption(&self, topic: &str, style: &Style) -> SocialGenResult<String> {
        let body = json!({
            "contents": [{ "parts": [{ "text": caption_prompt(topic, style) }] }],
        });
        let resp = self.generate_content(&self.caption_model, &body).await?;
        Ok(resp.text())
    }
}

pub(crate) fn image_prompt(request: &ImageRequest) -> String {
    format!(
        "Create a high-quality social media visual.\n\
         Subject: {}.\n\
         Style: {}.\n\
         The image should be aesthetic, modern, and suitable for social media sharing.\n\
         Avoid cluttered text in the image.",
        request.prompt,
        request.style.label()
    )
}

pub(crate) fn caption_prompt(topic: &str, style: &Style) -> String {
    format!(
        "請為這張主題為「{topic}」且風格為「{}」的社群貼文撰寫一段吸引人的繁體中文文案。包含 3-5 個相關的 Hashtags。",
        style.label()
    )
}

pub(crate) fn image_request_body(request: &ImageRequest) -> serde_json::Value {
    json!({
        "contents": [{ "parts": [{ "text": image_prompt(request) }] }],
        "generationConfig": {
            "imageConfig": {
                "aspectRatio": request.platform.aspect_ratio(),
                "imageSize": request.resolution.as_str(),
            },
        },
        "tools": [{ "googleSearch": {} }],
    })
}

/// Map a non-2xx response to the error taxonomy.
pub(crate) fn classify_error(status: u16, body: &str) -> SocialGenError {
    let parsed: Option<ErrorEnvelope> = serde_json::from_str(body).ok();
    let (message, api_status) = match parsed {
        Some(env) => (env.error.message, env.error.status),
        None => (body.trim().to_string(), String::new()),
    };
    if message.contains(ENTITY_NOT_FOUND) || api_status == "NOT_FOUND" {
        return SocialGenError::credential_rejected(if message.is_empty() {
            ENTITY_NOT_FOUND.to_string()
        } else {
            message
        });
    }
    if message.is_empty() {
        return SocialGenError::generation(format!("http status {status}"));
    }
    SocialGenError::generation(format!("http status {status}: {message}"))
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ApiError {
    message: String,
    status: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct GenerateContentResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Part {
    text: Option<String>,
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

impl GenerateContentResponse {
    fn parts(&self) -> &[Part] {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.as_slice())
            .unwrap_or_default()
    }

    /// Every inline image part of the first candidate, in order.
    pub(crate) fn images(&self) -> SocialGenResult<Vec<ImageRef>> {
        self.parts()
            .iter()
            .filter_map(|p| p.inline_data.as_ref())
            .map(|d| {
                let bytes = STANDARD.decode(d.data.trim()).map_err(|e| {
                    SocialGenError::generation(format!("invalid inline image data: {e}"))
                })?;
                Ok(ImageRef::from_bytes(d.mime_type.clone(), bytes))
            })
            .collect()
    }

    /// Concatenated text parts of the first candidate; empty when there are none.
    pub(crate) fn text(&self) -> String {
        self.parts()
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/services/gemini.rs"]
mod tests;
