use bytes::{Bytes, BytesMut};
use tracing::warn;

const INITIAL_BUFFER_CAPACITY: usize = 1024;

/// Append-only store of everything the board has sent back.
///
/// Bytes are kept raw and only decoded when read back through
/// [`text`](Self::text), so a multi-byte character split across two chunks
/// still comes out whole.
///
/// Known limitation: by default the buffer grows for as long as the process
/// lives; nothing parses, drains or truncates it. [`with_limit`](Self::with_limit)
/// caps it, after which further bytes are discarded rather than evicting old
/// ones, so the length never shrinks.
#[derive(Debug, Default)]
pub struct ReceiveBuffer {
    bytes: BytesMut,
    limit: Option<usize>,
    chunks: u64,
    dropped: u64,
}

impl ReceiveBuffer {
    /// An unbounded buffer.
    pub fn new() -> Self {
        Self {
            bytes: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            ..Self::default()
        }
    }

    /// A buffer that stops accepting bytes once it holds `limit` of them.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::new()
        }
    }

    /// Append a received chunk. Returns how many bytes were kept.
    pub fn append(&mut self, chunk: &[u8]) -> usize {
        self.chunks += 1;

        let keep = match self.limit {
            Some(limit) => chunk.len().min(limit.saturating_sub(self.bytes.len())),
            None => chunk.len(),
        };
        self.bytes.extend_from_slice(&chunk[..keep]);

        let discarded = chunk.len() - keep;
        if discarded > 0 {
            if self.dropped == 0 {
                warn!(
                    limit = self.limit.unwrap_or_default(),
                    "receive buffer full; discarding further bytes"
                );
            }
            self.dropped += discarded as u64;
        }
        keep
    }

    /// Everything received so far, decoded as UTF-8 with invalid sequences
    /// replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }

    /// A copy of the raw bytes received so far.
    pub fn snapshot(&self) -> Bytes {
        Bytes::copy_from_slice(&self.bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Whether a receive callback has ever run, even with an empty chunk.
    pub fn has_received(&self) -> bool {
        self.chunks > 0
    }

    /// Number of chunks appended.
    pub fn chunk_count(&self) -> u64 {
        self.chunks
    }

    /// Bytes discarded because the limit was reached.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }
}
