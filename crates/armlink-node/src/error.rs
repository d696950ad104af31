use std::path::PathBuf;

/// Errors that can occur in node operations.
#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] armlink_transport::TransportError),

    /// The bus message could not be turned into a command.
    #[error("frame error: {0}")]
    Frame(#[from] armlink_frame::FrameError),

    /// The link was open but has since closed.
    #[error("arm link not connected")]
    NotConnected,

    /// The configuration file could not be loaded.
    #[error("invalid config {path}: {reason}")]
    Config { path: PathBuf, reason: String },
}

pub type Result<T> = std::result::Result<T, NodeError>;
