use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Instant, SystemTime};

use futures::future::try_join_all;
use tokio::sync::mpsc;

use crate::compositor::Compositor;
use crate::encode::EncodedImage;
use crate::export::{Clipboard, MemoryClipboard, save_image};
use crate::foundation::error::{SocialGenError, SocialGenResult};
use crate::model::post::{GeneratedPost, PostId};
use crate::model::settings::{ExportFormat, Platform, Resolution, Style};
use crate::services::{CaptionGenerator, CredentialProvider, ImageGenerator, ImageRequest};
use crate::session::state::SessionState;

/// Why `generate` did nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockReason {
    NoCredential,
    InProgress,
    EmptyPrompt,
}

/// Result of one `generate` call. Failures are also reflected in the session state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GenerateOutcome {
    /// Nothing was called.
    Blocked(BlockReason),
    /// A new batch replaced the posts.
    Generated { posts: usize },
    /// The credential was rejected and marked unselected; the selector has been opened.
    CredentialRejected,
    /// Any other failure; the status message carries it.
    Failed { message: String },
}

/// What happened to one finished watermark job.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WatermarkOutcome {
    Applied { post: PostId, revision: u64 },
    /// A newer job was scheduled for the post, or the post is gone.
    Stale { post: PostId, revision: u64 },
    /// The previous processed image is kept.
    Failed {
        post: PostId,
        revision: u64,
        error: String,
    },
}

struct WatermarkCompletion {
    post: PostId,
    revision: u64,
    result: SocialGenResult<EncodedImage>,
}

/// Drives a [`SessionState`] against the generation services and the compositor.
///
/// The controller owns the state; watermark jobs run as separate tasks and report back over a
/// channel, so the state is only ever mutated through `&mut self`. Methods that schedule jobs
/// must be called from within a Tokio runtime.
pub struct SessionController {
    state: SessionState,
    images: Arc<dyn ImageGenerator>,
    captions: Arc<dyn CaptionGenerator>,
    credentials: Arc<dyn CredentialProvider>,
    compositor: Compositor,
    clipboard: Arc<dyn Clipboard>,
    tx: mpsc::UnboundedSender<WatermarkCompletion>,
    rx: mpsc::UnboundedReceiver<WatermarkCompletion>,
    in_flight: usize,
}

impl SessionController {
    pub fn new(
        state: SessionState,
        images: Arc<dyn ImageGenerator>,
        captions: Arc<dyn CaptionGenerator>,
        credentials: Arc<dyn CredentialProvider>,
        compositor: Compositor,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            state,
            images,
            captions,
            credentials,
            compositor,
            clipboard: Arc::new(MemoryClipboard::default()),
            tx,
            rx,
            in_flight: 0,
        }
    }

    pub fn with_clipboard(mut self, clipboard: Arc<dyn Clipboard>) -> Self {
        self.clipboard = clipboard;
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    /// Watermark jobs scheduled but not yet applied or discarded.
    pub fn pending_jobs(&self) -> usize {
        self.in_flight
    }

    /// Mark the credential as selected if the provider already has one.
    pub async fn initialize(&mut self) {
        if self.credentials.has_selected_key().await {
            self.state.set_api_key_selected(true);
        }
        tracing::debug!(selected = self.state.api_key_selected(), "credential status");
    }

    /// Open the provider's key selector. The credential is assumed selected afterwards.
    pub async fn open_key_selector(&mut self) -> SocialGenResult<()> {
        let res = self.credentials.open_select_key().await;
        self.state.set_api_key_selected(true);
        if let Err(e) = &res {
            tracing::warn!(error = %e, "key selector failed");
        }
        res
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.state.set_prompt(prompt);
    }

    pub fn set_platform(&mut self, platform: Platform) {
        self.state.set_platform(platform);
    }

    pub fn set_resolution(&mut self, resolution: Resolution) {
        self.state.set_resolution(resolution);
    }

    pub fn set_style(&mut self, style: Style) {
        self.state.set_style(style);
    }

    pub fn set_count(&mut self, count: u32) -> SocialGenResult<()> {
        self.state.set_count(count)
    }

    pub fn set_watermark_text(&mut self, text: impl Into<String>) {
        self.state.set_watermark_text(text);
        self.schedule_watermark();
    }

    pub fn set_watermark_opacity(&mut self, opacity: f32) -> SocialGenResult<()> {
        self.state.set_watermark_opacity(opacity)?;
        self.schedule_watermark();
        Ok(())
    }

    pub fn set_watermark_visible(&mut self, visible: bool) {
        self.state.set_watermark_visible(visible);
        self.schedule_watermark();
    }

    fn block_reason(&self) -> Option<BlockReason> {
        if !self.state.api_key_selected() {
            Some(BlockReason::NoCredential)
        } else if self.state.is_generating() {
            Some(BlockReason::InProgress)
        } else if self.state.prompt().is_empty() {
            Some(BlockReason::EmptyPrompt)
        } else {
            None
        }
    }

    /// Generate a new batch of posts from the current prompt and settings.
    #[tracing::instrument(skip(self))]
    pub async fn generate(&mut self) -> GenerateOutcome {
        if let Some(reason) = self.block_reason() {
            tracing::debug!(?reason, "generate blocked");
            return GenerateOutcome::Blocked(reason);
        }
        self.state.begin_generation();

        match self.run_generation().await {
            Ok(posts) => {
                let n = posts.len();
                self.state.finish_generation(posts);
                tracing::info!(posts = n, "batch ready");
                self.schedule_watermark();
                GenerateOutcome::Generated { posts: n }
            }
            Err(e) if e.is_credential_error() => {
                tracing::warn!(error = %e, "credential rejected");
                self.state.reject_credential();
                // Prompt without re-marking the key as selected; the user confirms through
                // `open_key_selector`.
                if let Err(e) = self.credentials.open_select_key().await {
                    tracing::warn!(error = %e, "key selector failed");
                }
                GenerateOutcome::CredentialRejected
            }
            Err(e) => {
                let message = e.to_string();
                tracing::error!(error = %message, "generation failed");
                self.state.fail_generation(&message);
                GenerateOutcome::Failed { message }
            }
        }
    }

    async fn run_generation(&self) -> SocialGenResult<Vec<GeneratedPost>> {
        let prompt = self.state.prompt().to_string();
        let settings = self.state.settings();
        let style = settings.style.clone();
        let request = ImageRequest {
            prompt: prompt.clone(),
            platform: settings.platform,
            resolution: settings.resolution,
            style: style.clone(),
            count: settings.count,
        };

        let images = self.images.generate_images(&request).await?;
        let captions = try_join_all(
            images
                .iter()
                .map(|_| self.captions.generate_caption(&prompt, &style)),
        )
        .await?;

        let created = SystemTime::now();
        Ok(images
            .into_iter()
            .zip(captions)
            .enumerate()
            .map(|(i, (image, caption))| {
                GeneratedPost::new(PostId::for_batch(created, i), image, prompt.clone(), caption)
            })
            .collect())
    }

    /// Start a watermark job for every post with the current overlay settings.
    ///
    /// Returns the number of jobs started.
    pub fn schedule_watermark(&mut self) -> usize {
        let overlay = self.state.settings().watermark.clone();
        let jobs: Vec<_> = self
            .state
            .posts()
            .iter()
            .map(|p| (p.id.clone(), p.original.clone()))
            .collect();

        let mut started = 0;
        for (post, original) in jobs {
            let Some(revision) = self.state.next_revision(&post) else {
                continue;
            };
            let compositor = self.compositor.clone();
            let overlay = overlay.clone();
            let tx = self.tx.clone();
            tokio::spawn(async move {
                // A panicking job still reports, so pending jobs always reach zero.
                let job =
                    tokio::spawn(async move { compositor.composite(&original, &overlay).await });
                let result = job.await.unwrap_or_else(|e| {
                    Err(SocialGenError::render(format!("watermark task failed: {e}")))
                });
                // The receiver lives as long as the controller.
                let _ = tx.send(WatermarkCompletion {
                    post,
                    revision,
                    result,
                });
            });
            self.in_flight += 1;
            started += 1;
        }
        tracing::debug!(jobs = started, "watermark scheduled");
        started
    }

    fn apply_completion(&mut self, done: WatermarkCompletion) -> WatermarkOutcome {
        self.in_flight = self.in_flight.saturating_sub(1);
        let WatermarkCompletion {
            post,
            revision,
            result,
        } = done;

        if !self.state.is_latest(&post, revision) {
            tracing::debug!(%post, revision, "discarding stale watermark result");
            return WatermarkOutcome::Stale { post, revision };
        }
        match result {
            Ok(image) => {
                if self.state.set_processed(&post, image.to_image_ref()) {
                    WatermarkOutcome::Applied { post, revision }
                } else {
                    WatermarkOutcome::Stale { post, revision }
                }
            }
            Err(e) => {
                tracing::warn!(%post, revision, error = %e, "watermark failed");
                WatermarkOutcome::Failed {
                    post,
                    revision,
                    error: e.to_string(),
                }
            }
        }
    }

    /// Wait for the next watermark job to finish and apply it. `None` when nothing is pending.
    pub async fn next_completion(&mut self) -> Option<WatermarkOutcome> {
        if self.in_flight == 0 {
            return None;
        }
        let done = self.rx.recv().await?;
        Some(self.apply_completion(done))
    }

    /// Wait until no watermark jobs are pending.
    pub async fn settle(&mut self) -> Vec<WatermarkOutcome> {
        let mut out = Vec::new();
        while let Some(outcome) = self.next_completion().await {
            out.push(outcome);
        }
        out
    }

    /// Copy the caption of `post` and flag it as copied.
    pub fn copy_caption(&mut self, post: &PostId) -> SocialGenResult<()> {
        let caption = &self
            .state
            .post(post)
            .ok_or_else(|| SocialGenError::validation(format!("unknown post '{post}'")))?
            .caption;
        self.clipboard.write_text(caption)?;
        self.state.mark_copied(post.clone(), Instant::now());
        Ok(())
    }

    pub fn copied_post(&self, now: Instant) -> Option<&PostId> {
        self.state.copied_post(now)
    }

    /// Save the processed image of `post` into `dir`; returns the written path.
    pub async fn download(
        &self,
        post: &PostId,
        format: ExportFormat,
        dir: &Path,
    ) -> SocialGenResult<PathBuf> {
        let image = &self
            .state
            .post(post)
            .ok_or_else(|| SocialGenError::validation(format!("unknown post '{post}'")))?
            .processed;
        save_image(
            self.compositor.loader().as_ref(),
            image,
            format,
            dir,
            SystemTime::now(),
        )
        .await
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/controller.rs"]
mod tests;
