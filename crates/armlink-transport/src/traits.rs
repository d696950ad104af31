use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::Result;

/// Callback invoked with every chunk of bytes read from the link.
pub type ReceiveHandler = Box<dyn FnMut(&[u8]) + Send + 'static>;

/// Callback invoked once when the link goes away.
pub type ClosedHandler = Box<dyn FnMut() + Send + 'static>;

/// An open link to the controller board.
///
/// Receive handlers run on the connection's own I/O thread, so they must be
/// `Send` and must not register further handlers from inside the callback.
/// Chunks that arrive before any receive handler is registered are dropped.
pub trait Connection: Send + Sync {
    /// Write `bytes` to the link.
    ///
    /// Returns [`TransportError::NotConnected`](crate::TransportError::NotConnected)
    /// once the link has closed.
    fn send_bytes(&self, bytes: &[u8]) -> Result<()>;

    /// Register a handler for received chunks.
    fn on_receive(&self, handler: ReceiveHandler);

    /// Register a handler for link closure.
    fn on_closed(&self, handler: ClosedHandler);

    /// Whether the link is still usable.
    fn is_open(&self) -> bool;

    /// Human-readable endpoint, for logs.
    fn describe(&self) -> String;
}

#[derive(Default)]
struct Handlers {
    receive: Vec<ReceiveHandler>,
    closed: Vec<ClosedHandler>,
}

/// Open flag plus registered callbacks, shared between a connection and its
/// I/O side.
pub(crate) struct LinkSignals {
    open: AtomicBool,
    handlers: Mutex<Handlers>,
}

impl LinkSignals {
    pub(crate) fn new_open() -> Self {
        Self {
            open: AtomicBool::new(true),
            handlers: Mutex::new(Handlers::default()),
        }
    }

    pub(crate) fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    pub(crate) fn add_receive(&self, handler: ReceiveHandler) {
        self.lock().receive.push(handler);
    }

    pub(crate) fn add_closed(&self, handler: ClosedHandler) {
        self.lock().closed.push(handler);
    }

    /// Hand a chunk to every receive handler. Returns false if nobody listened.
    pub(crate) fn deliver(&self, chunk: &[u8]) -> bool {
        let mut handlers = self.lock();
        for handler in handlers.receive.iter_mut() {
            handler(chunk);
        }
        !handlers.receive.is_empty()
    }

    /// Mark the link closed and run the closed handlers, at most once.
    pub(crate) fn mark_closed(&self) -> bool {
        if !self.open.swap(false, Ordering::SeqCst) {
            return false;
        }
        for handler in self.lock().closed.iter_mut() {
            handler();
        }
        true
    }

    /// Mark the link closed without notifying anyone (local teardown).
    pub(crate) fn shut(&self) {
        self.open.store(false, Ordering::SeqCst);
    }

    fn lock(&self) -> MutexGuard<'_, Handlers> {
        self.handlers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    use super::*;

    #[test]
    fn deliver_reaches_every_handler() {
        let signals = LinkSignals::new_open();
        let hits = Arc::new(AtomicUsize::new(0));
        for _ in 0..2 {
            let hits = Arc::clone(&hits);
            signals.add_receive(Box::new(move |chunk| {
                hits.fetch_add(chunk.len(), Ordering::SeqCst);
            }));
        }

        assert!(signals.deliver(b"abc"));
        assert_eq!(hits.load(Ordering::SeqCst), 6);
    }

    #[test]
    fn deliver_without_handlers_reports_drop() {
        let signals = LinkSignals::new_open();
        assert!(!signals.deliver(b"lost"));
    }

    #[test]
    fn closed_handlers_fire_once() {
        let signals = LinkSignals::new_open();
        let closed = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&closed);
        signals.add_closed(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        assert!(signals.mark_closed());
        assert!(!signals.mark_closed());
        assert!(!signals.is_open());
        assert_eq!(closed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn shut_skips_closed_handlers() {
        let signals = LinkSignals::new_open();
        let closed = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&closed);
        signals.add_closed(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        signals.shut();
        assert!(!signals.mark_closed());
        assert_eq!(closed.load(Ordering::SeqCst), 0);
    }
}
