use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::assets::image_ref::ImageRef;
use crate::foundation::error::SocialGenResult;
use crate::model::post::{GeneratedPost, PostId};
use crate::model::settings::{
    GenerationSettings, Platform, Resolution, Style, validate_count, validate_opacity,
};

/// How long a copied caption stays flagged as copied.
pub const COPY_FEEDBACK: Duration = Duration::from_secs(2);

pub const STATUS_GENERATING: &str = "AI 正在為您構思視覺設計...";
pub const STATUS_READY: &str = "設計已準備就緒！";

/// All mutable state of one session.
///
/// Fields are private; the setters below are the only way to change them. Each post carries a
/// revision that only grows. Watermark jobs are stamped with the revision current when they were
/// scheduled, and their results are accepted only while that stamp is still the latest.
/// Revisions come from one session-wide clock, so a post id reused by a later batch never
/// matches a job scheduled for the earlier one.
#[derive(Clone, Debug, Default)]
pub struct SessionState {
    api_key_selected: bool,
    is_generating: bool,
    status_message: String,
    prompt: String,
    settings: GenerationSettings,
    posts: Vec<GeneratedPost>,
    revisions: HashMap<PostId, u64>,
    revision_clock: u64,
    copied: Option<(PostId, Instant)>,
}

impl SessionState {
    pub fn new(settings: GenerationSettings) -> SocialGenResult<Self> {
        settings.validate()?;
        Ok(Self {
            settings,
            ..Self::default()
        })
    }

    pub fn api_key_selected(&self) -> bool {
        self.api_key_selected
    }

    pub fn is_generating(&self) -> bool {
        self.is_generating
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    pub fn posts(&self) -> &[GeneratedPost] {
        &self.posts
    }

    pub fn post(&self, id: &PostId) -> Option<&GeneratedPost> {
        self.posts.iter().find(|p| &p.id == id)
    }

    pub fn set_api_key_selected(&mut self, selected: bool) {
        self.api_key_selected = selected;
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    pub fn set_platform(&mut self, platform: Platform) {
        self.settings.platform = platform;
    }

    pub fn set_resolution(&mut self, resolution: Resolution) {
        self.settings.resolution = resolution;
    }

    pub fn set_style(&mut self, style: Style) {
        self.settings.style = style;
    }

    pub fn set_count(&mut self, count: u32) -> SocialGenResult<()> {
        self.settings.count = validate_count(count)?;
        Ok(())
    }

    pub fn set_watermark_text(&mut self, text: impl Into<String>) {
        self.settings.watermark.text = text.into();
    }

    /// Clamps into `[0, 1]`; non-finite values are rejected and leave the opacity unchanged.
    pub fn set_watermark_opacity(&mut self, opacity: f32) -> SocialGenResult<()> {
        self.settings.watermark.opacity = validate_opacity(opacity)?;
        Ok(())
    }

    pub fn set_watermark_visible(&mut self, visible: bool) {
        self.settings.watermark.visible = visible;
    }

    /// Enter the generating phase: previous posts are dropped.
    pub(crate) fn begin_generation(&mut self) {
        self.is_generating = true;
        self.status_message = STATUS_GENERATING.to_string();
        self.replace_posts(Vec::new());
    }

    pub(crate) fn finish_generation(&mut self, posts: Vec<GeneratedPost>) {
        self.replace_posts(posts);
        self.is_generating = false;
        self.status_message = STATUS_READY.to_string();
    }

    pub(crate) fn fail_generation(&mut self, message: &str) {
        self.is_generating = false;
        self.status_message = format!("生成出錯: {message}");
    }

    /// Leave the generating phase with the credential marked unusable.
    pub(crate) fn reject_credential(&mut self) {
        self.is_generating = false;
        self.api_key_selected = false;
    }

    fn replace_posts(&mut self, posts: Vec<GeneratedPost>) {
        self.revisions = posts.iter().map(|p| (p.id.clone(), 0)).collect();
        self.posts = posts;
        if self
            .copied
            .as_ref()
            .is_some_and(|(id, _)| !self.revisions.contains_key(id))
        {
            self.copied = None;
        }
    }

    /// Bump and return the revision of `id`, or `None` when the post does not exist.
    pub(crate) fn next_revision(&mut self, id: &PostId) -> Option<u64> {
        let rev = self.revisions.get_mut(id)?;
        self.revision_clock += 1;
        *rev = self.revision_clock;
        Some(*rev)
    }

    pub fn latest_revision(&self, id: &PostId) -> Option<u64> {
        self.revisions.get(id).copied()
    }

    pub(crate) fn is_latest(&self, id: &PostId, revision: u64) -> bool {
        self.latest_revision(id) == Some(revision)
    }

    /// Replace the processed image of `id`. Returns false when the post is gone.
    pub(crate) fn set_processed(&mut self, id: &PostId, image: ImageRef) -> bool {
        match self.posts.iter_mut().find(|p| &p.id == id) {
            Some(post) => {
                post.processed = image;
                true
            }
            None => false,
        }
    }

    pub(crate) fn mark_copied(&mut self, id: PostId, at: Instant) {
        self.copied = Some((id, at));
    }

    /// The post whose caption was copied within [`COPY_FEEDBACK`] of `now`.
    pub fn copied_post(&self, now: Instant) -> Option<&PostId> {
        self.copied
            .as_ref()
            .filter(|(_, at)| now.saturating_duration_since(*at) < COPY_FEEDBACK)
            .map(|(id, _)| id)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/state.rs"]
mod tests;
