use async_trait::async_trait;

use crate::assets::image_ref::ImageRef;
use crate::foundation::error::{SocialGenError, SocialGenResult};

/// Fetches the encoded bytes behind an [`ImageRef`].
///
/// This is the compositor's only suspension point. Implementations must fail with
/// [`SocialGenError::ImageLoad`] rather than return an empty buffer.
#[async_trait]
pub trait ImageLoader: Send + Sync {
    /// Load the full encoded payload.
    async fn load(&self, source: &ImageRef) -> SocialGenResult<Vec<u8>>;
}

/// Loader for every [`ImageRef`] kind: HTTP(S) through `reqwest`, files through `tokio::fs`,
/// and embedded payloads in place.
#[derive(Clone, Debug, Default)]
pub struct DefaultImageLoader {
    http: reqwest::Client,
}

impl DefaultImageLoader {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ImageLoader for DefaultImageLoader {
    async fn load(&self, source: &ImageRef) -> SocialGenResult<Vec<u8>> {
        match source {
            ImageRef::Data { bytes, .. } => {
                if bytes.is_empty() {
                    return Err(SocialGenError::image_load("embedded image payload is empty"));
                }
                Ok(bytes.to_vec())
            }
            ImageRef::Path(p) => tokio::fs::read(p).await.map_err(|e| {
                SocialGenError::image_load(format!("failed to read '{}': {e}", p.display()))
            }),
            ImageRef::Url(url) => {
                tracing::debug!(%url, "fetching remote image");
                let resp = self
                    .http
                    .get(url)
                    .send()
                    .await
                    .map_err(|e| SocialGenError::image_load(format!("GET {url}: {e}")))?;
                let status = resp.status();
                if !status.is_success() {
                    return Err(SocialGenError::image_load(format!(
                        "GET {url}: http status {status}"
                    )));
                }
                let bytes = resp
                    .bytes()
                    .await
                    .map_err(|e| SocialGenError::image_load(format!("GET {url}: {e}")))?;
                if bytes.is_empty() {
                    return Err(SocialGenError::image_load(format!("GET {url}: empty body")));
                }
                Ok(bytes.to_vec())
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
