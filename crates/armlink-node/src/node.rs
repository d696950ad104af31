use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use armlink_frame::{ArmCommand, ReceiveBuffer, ARM_COMMAND_TOPIC};
use armlink_transport::{Connection, SerialConnection, TransportError};
use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, error, info, trace, warn};

use crate::config::NodeConfig;
use crate::error::{NodeError, Result};

/// Forwards arm commands to the controller board and keeps what it sends back.
///
/// A node whose link could not be opened is *disabled*: it accepts commands
/// and drops them without error, and never receives anything.
pub struct ArmNode {
    link: Option<Box<dyn Connection>>,
    received: Arc<Mutex<ReceiveBuffer>>,
    frames_sent: AtomicU64,
}

/// Point-in-time counters for a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeStats {
    pub enabled: bool,
    pub connected: bool,
    pub frames_sent: u64,
    pub bytes_received: usize,
    pub chunks_received: u64,
    pub bytes_dropped: u64,
}

impl ArmNode {
    /// Open the configured serial link and wire it up.
    ///
    /// Never fails: if the device cannot be opened the error is logged and a
    /// disabled node is returned.
    pub fn new(config: &NodeConfig) -> Self {
        match SerialConnection::open_url(
            &config.serial_port,
            config.baudrate,
            config.read_timeout(),
        ) {
            Ok(link) => Self::with_connection(Box::new(link), config),
            Err(err) => {
                error!(
                    device = %config.serial_port,
                    baud = config.baudrate,
                    error = %err,
                    "cannot open arm link; node disabled"
                );
                Self::disabled(config)
            }
        }
    }

    /// Wire up an already-open link.
    pub fn with_connection(link: Box<dyn Connection>, config: &NodeConfig) -> Self {
        let received = Arc::new(Mutex::new(new_buffer(config)));

        let sink = Arc::clone(&received);
        link.on_receive(Box::new(move |chunk| {
            let mut buffer = sink.lock().unwrap_or_else(PoisonError::into_inner);
            buffer.append(chunk);
            trace!(len = chunk.len(), total = buffer.len(), "accumulated bytes");
        }));

        let endpoint = link.describe();
        link.on_closed(Box::new(move || {
            warn!(link = %endpoint, "arm link closed");
        }));

        info!(link = %link.describe(), topic = ARM_COMMAND_TOPIC, "arm node ready");

        Self {
            link: Some(link),
            received,
            frames_sent: AtomicU64::new(0),
        }
    }

    /// A node with no link.
    pub fn disabled(config: &NodeConfig) -> Self {
        Self {
            link: None,
            received: Arc::new(Mutex::new(new_buffer(config))),
            frames_sent: AtomicU64::new(0),
        }
    }

    /// Whether the link was opened at startup.
    pub fn is_enabled(&self) -> bool {
        self.link.is_some()
    }

    /// Whether the link is open right now.
    pub fn is_connected(&self) -> bool {
        self.link.as_ref().is_some_and(|link| link.is_open())
    }

    /// Encode a command and write it to the board.
    ///
    /// Fire-and-forget: no acknowledgement is awaited. A disabled node returns
    /// `Ok(())` without writing; a node whose link has since closed returns
    /// [`NodeError::NotConnected`].
    pub fn handle_command(&self, command: &ArmCommand) -> Result<()> {
        let Some(link) = &self.link else {
            return Ok(());
        };

        let frame = command.to_frame();
        match link.send_bytes(&frame) {
            Ok(()) => {
                self.frames_sent.fetch_add(1, Ordering::Relaxed);
                debug!(
                    turret = command.turret,
                    shoulder = command.shoulder,
                    "forwarded arm command"
                );
                Ok(())
            }
            Err(TransportError::NotConnected) => Err(NodeError::NotConnected),
            Err(err) => Err(err.into()),
        }
    }

    /// Send a turret/shoulder pair.
    pub fn send(&self, turret: u16, shoulder: u16) -> Result<()> {
        self.handle_command(&ArmCommand::new(turret, shoulder))
    }

    /// Decode a JSON bus message and forward it.
    pub fn handle_message(&self, message: &[u8]) -> Result<()> {
        let command = ArmCommand::from_json(message)?;
        self.handle_command(&command)
    }

    /// Everything received so far, as text.
    pub fn received_text(&self) -> String {
        self.buffer().text()
    }

    /// Everything received so far, byte for byte.
    pub fn received_bytes(&self) -> Bytes {
        self.buffer().snapshot()
    }

    /// Bytes received so far.
    pub fn received_len(&self) -> usize {
        self.buffer().len()
    }

    /// Whether the board has sent anything at all.
    pub fn has_received(&self) -> bool {
        self.buffer().has_received()
    }

    pub fn stats(&self) -> NodeStats {
        let buffer = self.buffer();
        NodeStats {
            enabled: self.is_enabled(),
            connected: self.is_connected(),
            frames_sent: self.frames_sent.load(Ordering::Relaxed),
            bytes_received: buffer.len(),
            chunks_received: buffer.chunk_count(),
            bytes_dropped: buffer.dropped(),
        }
    }

    fn buffer(&self) -> MutexGuard<'_, ReceiveBuffer> {
        self.received.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for ArmNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArmNode")
            .field("link", &self.link.as_ref().map(|link| link.describe()))
            .field("frames_sent", &self.frames_sent.load(Ordering::Relaxed))
            .finish()
    }
}

fn new_buffer(config: &NodeConfig) -> ReceiveBuffer {
    match config.receive_limit {
        Some(limit) => ReceiveBuffer::with_limit(limit),
        None => ReceiveBuffer::new(),
    }
}
