//! Serial adapter node for the rover arm controller board.
//!
//! armlink takes turret/shoulder position commands, writes each one to the
//! board as a fixed 6-byte frame, and keeps whatever the board sends back.
//!
//! # Crate Structure
//!
//! - [`transport`] — Serial link with callback-based receive delivery
//! - [`frame`] — Command frames and the receive buffer
//! - [`node`] — The adapter node wiring the two together (behind `node` feature)

/// Re-export transport types.
pub mod transport {
    pub use armlink_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use armlink_frame::*;
}

/// Re-export node types (requires `node` feature).
#[cfg(feature = "node")]
pub mod node {
    pub use armlink_node::*;
}
