/// Convenience result type used across SocialGen.
pub type SocialGenResult<T> = Result<T, SocialGenError>;

/// Top-level error taxonomy used by library APIs.
#[derive(thiserror::Error, Debug)]
pub enum SocialGenError {
    /// Invalid user-provided settings or data.
    #[error("validation error: {0}")]
    Validation(String),

    /// No usable API credential is selected.
    #[error("credential missing: {0}")]
    CredentialMissing(String),

    /// The generation service rejected the selected credential ("entity not found").
    #[error("credential rejected: {0}")]
    CredentialRejected(String),

    /// Any other failure reported by a generation collaborator.
    #[error("generation error: {0}")]
    Generation(String),

    /// A source image could not be fetched or decoded.
    #[error("image load error: {0}")]
    ImageLoad(String),

    /// Errors while rasterizing or compositing the overlay.
    #[error("render error: {0}")]
    Render(String),

    /// Errors while encoding the final image.
    #[error("encode error: {0}")]
    Encode(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Filesystem errors while reading configuration or writing exports.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SocialGenError {
    /// Build a [`SocialGenError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SocialGenError::CredentialMissing`] value.
    pub fn credential_missing(msg: impl Into<String>) -> Self {
        Self::CredentialMissing(msg.into())
    }

    /// Build a [`SocialGenError::CredentialRejected`] value.
    pub fn credential_rejected(msg: impl Into<String>) -> Self {
        Self::CredentialRejected(msg.into())
    }

    /// Build a [`SocialGenError::Generation`] value.
    pub fn generation(msg: impl Into<String>) -> Self {
        Self::Generation(msg.into())
    }

    /// Build a [`SocialGenError::ImageLoad`] value.
    pub fn image_load(msg: impl Into<String>) -> Self {
        Self::ImageLoad(msg.into())
    }

    /// Build a [`SocialGenError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`SocialGenError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`SocialGenError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// True when the error means the selected credential must be re-established.
    pub fn is_credential_error(&self) -> bool {
        matches!(self, Self::CredentialMissing(_) | Self::CredentialRejected(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
