//! Error types for annotation service calls.

use thiserror::Error;

use crate::model::{ImageId, ServerId};

/// Errors returned by [`AnnotationApi`](super::AnnotationApi) implementations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// The service could not be reached
    #[error("Transport error: {0}")]
    Transport(String),

    /// The service answered with a non-success status
    #[error("HTTP {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body or reason phrase
        message: String,
    },

    /// The annotation does not exist on the service
    #[error("Annotation not found: {id}")]
    AnnotationNotFound {
        /// The missing annotation id
        id: ServerId,
    },

    /// The image does not exist on the service
    #[error("Image not found: {id}")]
    ImageNotFound {
        /// The missing image id
        id: ImageId,
    },

    /// The response body could not be decoded
    #[error("Invalid response: {0}")]
    Decode(String),

    /// The background sync worker is gone
    #[error("Sync worker disconnected")]
    Disconnected,
}

impl ApiError {
    /// Create a transport error with a message.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }
}
