//! Downloads and clipboard.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::SystemTime;

use tokio::io::AsyncWriteExt;

use crate::assets::decode::decode_image;
use crate::assets::image_ref::ImageRef;
use crate::assets::loader::ImageLoader;
use crate::encode::{EncodedImage, encode_frame};
use crate::foundation::error::{SocialGenError, SocialGenResult};
use crate::model::post::unix_millis;
use crate::model::settings::ExportFormat;

/// `social-post-<unix-millis>.<ext>`
pub fn download_filename(format: ExportFormat, at: SystemTime) -> String {
    format!("social-post-{}.{}", unix_millis(at), format.extension())
}

/// Name tried after `download_filename` is already taken in the target directory.
fn numbered_filename(format: ExportFormat, at: SystemTime, n: u32) -> String {
    format!("social-post-{}-{n}.{}", unix_millis(at), format.extension())
}

/// Load `image` and re-encode it in `format`.
pub async fn export_image(
    loader: &dyn ImageLoader,
    image: &ImageRef,
    format: ExportFormat,
) -> SocialGenResult<EncodedImage> {
    let bytes = loader.load(image).await?;
    tokio::task::spawn_blocking(move || {
        let frame = decode_image(&bytes)?;
        encode_frame(&frame, format)
    })
    .await
    .map_err(|e| SocialGenError::encode(format!("export task failed: {e}")))?
}

/// Export `image` into `dir` under its download name and return the written path.
///
/// Existing files are never overwritten: when the name is taken a `-<n>` suffix is added.
#[tracing::instrument(skip(loader, image, dir), fields(dir = %dir.display()))]
pub async fn save_image(
    loader: &dyn ImageLoader,
    image: &ImageRef,
    format: ExportFormat,
    dir: &Path,
    at: SystemTime,
) -> SocialGenResult<PathBuf> {
    let encoded = export_image(loader, image, format).await?;
    tokio::fs::create_dir_all(dir).await?;
    let (path, mut file) = create_unique(dir, format, at).await?;
    file.write_all(&encoded.bytes).await?;
    file.flush().await?;
    tracing::info!(path = %path.display(), bytes = encoded.bytes.len(), "saved image");
    Ok(path)
}

async fn create_unique(
    dir: &Path,
    format: ExportFormat,
    at: SystemTime,
) -> SocialGenResult<(PathBuf, tokio::fs::File)> {
    let mut n = 0u32;
    loop {
        let name = match n {
            0 => download_filename(format, at),
            _ => numbered_filename(format, at, n),
        };
        let path = dir.join(name);
        match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => n += 1,
            Err(e) => return Err(e.into()),
        }
    }
}

/// Destination for copied captions.
pub trait Clipboard: Send + Sync {
    fn write_text(&self, text: &str) -> SocialGenResult<()>;
}

/// Clipboard that keeps the last copied text in memory.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Mutex<Option<String>>,
}

impl MemoryClipboard {
    pub fn contents(&self) -> Option<String> {
        self.contents.lock().ok().and_then(|g| g.clone())
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&self, text: &str) -> SocialGenResult<()> {
        let mut guard = self
            .contents
            .lock()
            .map_err(|_| SocialGenError::validation("clipboard lock poisoned"))?;
        *guard = Some(text.to_string());
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/export.rs"]
mod tests;
