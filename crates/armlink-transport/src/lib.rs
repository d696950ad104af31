//! Serial link to the arm controller board.
//!
//! This is the lowest layer of armlink. A [`Connection`] owns the device,
//! delivers raw byte chunks to registered receive handlers, accepts raw
//! buffers for transmission and reports when the device goes away.
//!
//! - [`SerialConnection`] talks to a real tty through `serialport`.
//! - [`MemoryConnection`] is an in-process loopback used for dry runs and tests.

pub mod error;
pub mod memory;
pub mod serial;
pub mod traits;
pub mod url;

pub use error::{Result, TransportError};
pub use memory::MemoryConnection;
pub use serial::{available_ports, PortSummary, SerialConnection, DEFAULT_READ_TIMEOUT};
pub use traits::{ClosedHandler, Connection, ReceiveHandler};
pub use url::{LinkTarget, SERIAL_SCHEME};
