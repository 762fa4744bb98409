/// Error types for engagement-service
use thiserror::Error;

/// Feed load failure - surfaced to the user and blocks rendering of the feed.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to load posts: {0}")]
    Posts(#[source] anyhow::Error),

    #[error("Failed to load user profile: {0}")]
    Profile(#[source] anyhow::Error),

    #[error("No profile found for user {0}")]
    ProfileNotFound(uuid::Uuid),

    #[error("Failed to load like set: {0}")]
    Likes(#[source] anyhow::Error),
}

/// Like/comment mutation failure - logged only, never surfaced.
///
/// For likes the store rolls local state back before returning this; for
/// comments nothing was appended, so local state is already correct.
#[derive(Error, Debug)]
pub enum InteractionError {
    #[error("Like mutation failed: {0}")]
    Like(#[source] anyhow::Error),

    #[error("Comment insert failed: {0}")]
    CommentInsert(#[source] anyhow::Error),
}

/// Identity provider failure
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Provider rejected credentials: {0}")]
    Rejected(String),

    #[error("Unknown or expired state token")]
    InvalidState,

    #[error("Identity provider request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Malformed provider response: {0}")]
    Malformed(String),
}

/// Result type alias for store operations
pub type InteractionResult<T> = Result<T, InteractionError>;
