/// Errors that can occur in link transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to open the serial device.
    #[error("failed to open {path}: {source}")]
    Open {
        path: String,
        source: serialport::Error,
    },

    /// Failed to enumerate serial devices on this host.
    #[error("failed to list serial ports: {0}")]
    Enumerate(serialport::Error),

    /// The device string is neither a plain path nor a `serial://` URL.
    #[error("invalid link url: {0}")]
    InvalidUrl(String),

    /// The link has been closed; nothing can be sent on it.
    #[error("link not connected")]
    NotConnected,

    /// An I/O error occurred on the open link.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransportError {
    /// Whether the device exists but this process may not open it.
    pub fn is_permission_denied(&self) -> bool {
        match self {
            TransportError::Open { source, .. } => {
                source.kind() == serialport::ErrorKind::Io(std::io::ErrorKind::PermissionDenied)
            }
            TransportError::Io(err) => err.kind() == std::io::ErrorKind::PermissionDenied,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;
