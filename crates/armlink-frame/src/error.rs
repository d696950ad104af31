/// Errors that can occur while turning bus messages into commands.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The bus message is not a valid arm command.
    #[error("invalid arm command: {0}")]
    InvalidCommand(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FrameError>;
