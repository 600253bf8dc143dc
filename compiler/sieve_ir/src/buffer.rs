//! Append-only byte stream fed to the parse runtime.
//!
//! Positions are absolute byte offsets from the start of the stream. The
//! stream grows as data arrives and is closed once the producer knows no more
//! bytes will follow; only then does a short read become an error.

/// Returned when appending to a closed stream.
#[derive(Copy, Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("byte stream is closed")]
pub struct StreamClosed;

/// Byte stream with an explicit end-of-data marker.
#[derive(Clone, Debug, Default)]
pub struct ByteStream {
    data: Vec<u8>,
    closed: bool,
}

impl ByteStream {
    /// Open, empty stream.
    pub fn new() -> Self {
        ByteStream::default()
    }

    /// Closed stream holding exactly `bytes`.
    pub fn complete(bytes: impl Into<Vec<u8>>) -> Self {
        ByteStream {
            data: bytes.into(),
            closed: true,
        }
    }

    /// Append bytes to an open stream.
    pub fn push(&mut self, bytes: &[u8]) -> Result<(), StreamClosed> {
        if self.closed {
            return Err(StreamClosed);
        }
        self.data.extend_from_slice(bytes);
        Ok(())
    }

    /// Mark end of data.
    pub fn close(&mut self) {
        self.closed = true;
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Offset one past the last byte received so far.
    #[inline]
    pub fn end(&self) -> usize {
        self.data.len()
    }

    /// Bytes available from `position` to the current end.
    #[inline]
    pub fn available(&self, position: usize) -> usize {
        self.data.len().saturating_sub(position)
    }

    /// Exactly `len` bytes at `position`, if that many have arrived.
    #[inline]
    pub fn slice(&self, position: usize, len: usize) -> Option<&[u8]> {
        let end = position.checked_add(len)?;
        self.data.get(position..end)
    }

    /// Read-only view of at most `max_len` bytes at `position`.
    ///
    /// Never reads past the end: the view is truncated (possibly empty) when
    /// fewer bytes remain.
    pub fn view(&self, position: usize, max_len: usize) -> BoundedView<'_> {
        let start = position.min(self.data.len());
        let end = start.saturating_add(max_len).min(self.data.len());
        BoundedView {
            position,
            bytes: &self.data[start..end],
        }
    }
}

/// A bounded window into a [`ByteStream`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct BoundedView<'a> {
    position: usize,
    bytes: &'a [u8],
}

impl<'a> BoundedView<'a> {
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    #[inline]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
