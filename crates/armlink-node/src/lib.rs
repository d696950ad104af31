//! Adapter node between the command bus and the arm controller board.
//!
//! An [`ArmNode`] owns one link. Commands handed to it are encoded and
//! written straight out; whatever the board sends back is accumulated,
//! unparsed, in the node's receive buffer. If the link cannot be opened the
//! node stays up but does nothing.

pub mod config;
pub mod error;
pub mod node;

pub use config::{NodeConfig, DEFAULT_BAUDRATE, DEFAULT_SERIAL_PORT};
pub use error::{NodeError, Result};
pub use node::{ArmNode, NodeStats};
