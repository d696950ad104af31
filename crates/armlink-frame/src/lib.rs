//! Arm command framing for the controller board.
//!
//! Every command goes out as exactly six bytes:
//! - A 2-byte sync marker (`0xEA 0xE3`)
//! - The turret position, 2 bytes little-endian
//! - The shoulder position, 2 bytes little-endian
//!
//! Bytes coming back from the board are not framed. They are accumulated
//! as-is in a [`ReceiveBuffer`].

pub mod buffer;
pub mod codec;
pub mod command;
pub mod error;

pub use buffer::ReceiveBuffer;
pub use codec::{encode_frame, FRAME_SIZE, MAGIC};
pub use command::{ArmCommand, ARM_COMMAND_TOPIC};
pub use error::{FrameError, Result};
