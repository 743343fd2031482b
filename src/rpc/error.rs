use thiserror::Error;

/// Client-surface error taxonomy.
///
/// In-flight store fetches share their outcome with every joined waiter,
/// so the error must be `Clone`; all variants carry plain strings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// No response was received (connect failure or timeout).
    #[error("transport error: {message}")]
    Transport { message: String },
    /// The backend answered with a non-success status.
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },
    /// The request could not be constructed.
    #[error("client error: {message}")]
    Client { message: String },
    /// A local precondition failed before any request was made.
    #[error("validation failed: {message}")]
    Validation { message: String },
}

impl ApiError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: message.into(),
        }
    }

    pub fn client(message: impl Into<String>) -> Self {
        Self::Client {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}
