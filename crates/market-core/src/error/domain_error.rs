//! Domain errors - error types for the domain layer and its ports

use thiserror::Error;

use crate::value_objects::Id;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Post not found: {0}")]
    PostNotFound(Id),

    #[error("Comment not found: {0}")]
    CommentNotFound(Id),

    #[error("No post has its comments open")]
    NoActivePost,

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Content is empty")]
    EmptyContent,

    #[error("Content too long: max {max} characters")]
    ContentTooLong { max: usize },

    #[error("Unknown reaction: {0}")]
    UnknownReaction(String),

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Not signed in")]
    MissingSession,

    #[error("Credentials rejected by server")]
    Unauthorized,

    // =========================================================================
    // Remote Errors (wrapped)
    // =========================================================================
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Server rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for logs and UI mapping
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::PostNotFound(_) => "UNKNOWN_POST",
            Self::CommentNotFound(_) => "UNKNOWN_COMMENT",
            Self::NoActivePost => "NO_ACTIVE_POST",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::EmptyContent => "EMPTY_CONTENT",
            Self::ContentTooLong { .. } => "CONTENT_TOO_LONG",
            Self::UnknownReaction(_) => "UNKNOWN_REACTION",

            // Authorization
            Self::MissingSession => "MISSING_SESSION",
            Self::Unauthorized => "UNAUTHORIZED",

            // Remote
            Self::Transport(_) => "TRANSPORT_ERROR",
            Self::Rejected { .. } => "REJECTED",
            Self::MalformedResponse(_) => "MALFORMED_RESPONSE",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::PostNotFound(_) | Self::CommentNotFound(_) | Self::NoActivePost
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_)
                | Self::EmptyContent
                | Self::ContentTooLong { .. }
                | Self::UnknownReaction(_)
        )
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::MissingSession | Self::Unauthorized)
    }

    /// Check if this error came from talking to the backend
    ///
    /// Covers transport failures, rejections and malformed payloads alike;
    /// none of them is retried.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::Transport(_)
                | Self::Rejected { .. }
                | Self::MalformedResponse(_)
                | Self::Unauthorized
        )
    }

    /// HTTP status carried by a server rejection
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            Self::Unauthorized => Some(401),
            _ => None,
        }
    }
}
