use std::sync::{Arc, Mutex, PoisonError};

use tracing::trace;

use crate::error::{Result, TransportError};
use crate::traits::{ClosedHandler, Connection, LinkSignals, ReceiveHandler};

/// In-process loopback link.
///
/// Everything sent is recorded; [`inject`](Self::inject) plays the part of the
/// device writing back. Clones share the same link, so a test can keep one
/// handle while the node owns another.
#[derive(Clone)]
pub struct MemoryConnection {
    inner: Arc<Inner>,
}

struct Inner {
    signals: LinkSignals,
    sent: Mutex<Vec<u8>>,
}

impl MemoryConnection {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                signals: LinkSignals::new_open(),
                sent: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Deliver `chunk` as if the device had written it.
    ///
    /// Ignored once the link is closed.
    pub fn inject(&self, chunk: &[u8]) {
        if self.inner.signals.is_open() {
            self.inner.signals.deliver(chunk);
        }
    }

    /// Simulate the device going away.
    pub fn close(&self) {
        self.inner.signals.mark_closed();
    }

    /// All bytes sent so far, in order.
    pub fn sent(&self) -> Vec<u8> {
        self.inner
            .sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for MemoryConnection {
    fn default() -> Self {
        Self::new()
    }
}

impl Connection for MemoryConnection {
    fn send_bytes(&self, bytes: &[u8]) -> Result<()> {
        if !self.inner.signals.is_open() {
            return Err(TransportError::NotConnected);
        }
        self.inner
            .sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(bytes);
        trace!(len = bytes.len(), "loopback send");
        Ok(())
    }

    fn on_receive(&self, handler: ReceiveHandler) {
        self.inner.signals.add_receive(handler);
    }

    fn on_closed(&self, handler: ClosedHandler) {
        self.inner.signals.add_closed(handler);
    }

    fn is_open(&self) -> bool {
        self.inner.signals.is_open()
    }

    fn describe(&self) -> String {
        "memory://loopback".to_string()
    }
}

impl std::fmt::Debug for MemoryConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryConnection")
            .field("open", &self.inner.signals.is_open())
            .finish()
    }
}
