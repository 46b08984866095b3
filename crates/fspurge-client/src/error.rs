//! Client error types.

/// Errors that can occur while setting up a store client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// An I/O error while probing the mount.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),
}

/// Convenience result type.
pub type ClientResult<T> = std::result::Result<T, ClientError>;
