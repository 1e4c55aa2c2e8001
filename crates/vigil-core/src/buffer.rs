//! Fixed-capacity buffer for in-progress passphrase input.
//!
//! The backing storage is allocated once and never grows, so secret bytes
//! are confined to one known allocation for the buffer's whole lifetime.
//! Disposal overwrites the full capacity through `zeroize`, which guarantees
//! the writes survive optimisation; `Drop` performs the same disposal so no
//! exit path can skip it.

use zeroize::Zeroize;

/// Append-only byte buffer with a reserved terminator slot and guaranteed
/// zeroing on disposal.
#[derive(Debug)]
pub struct SecureBuffer {
    bytes: Box<[u8]>,
    len: usize,
}

impl SecureBuffer {
    /// Create an empty buffer with `capacity` bytes of backing storage.
    /// One slot is reserved, so at most `capacity - 1` bytes of input are
    /// ever held.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: vec![0u8; capacity].into_boxed_slice(),
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn usable(&self) -> usize {
        self.capacity().saturating_sub(1)
    }

    /// Append the bytes of `text` at the current length.
    ///
    /// When the append would exceed the usable capacity the buffer restarts:
    /// length is reset to zero before the new text is stored. Overflow is
    /// deliberately silent; the user keeps typing and the oldest input is
    /// abandoned rather than truncated or rejected. Text longer than the
    /// whole usable capacity is stored up to that capacity.
    pub fn push_str(&mut self, text: &str) {
        let incoming = text.as_bytes();
        if self.len + incoming.len() > self.usable() {
            self.reset();
        }
        let stored = incoming.len().min(self.usable());
        self.bytes[self.len..self.len + stored].copy_from_slice(&incoming[..stored]);
        self.len += stored;
    }

    /// Forget the logical contents without touching the backing storage.
    /// Stale bytes are overwritten by later appends or by disposal.
    pub fn reset(&mut self) {
        self.len = 0;
    }

    /// Borrow the logical contents for the duration of one conversation
    /// turn. Empty (never absent) when nothing has been collected.
    pub fn contents(&self) -> &str {
        std::str::from_utf8(&self.bytes[..self.len]).unwrap_or_default()
    }

    /// Overwrite every byte of the backing storage with zero.
    ///
    /// Covers the full capacity, not just the logical length, so residue in
    /// the unused tail is destroyed as well. Runs again harmlessly from
    /// `Drop`.
    pub fn dispose(&mut self) {
        self.bytes.zeroize();
        self.len = 0;
    }

    #[cfg(test)]
    fn backing(&self) -> &[u8] {
        &self.bytes
    }
}

impl Drop for SecureBuffer {
    fn drop(&mut self) {
        self.dispose();
    }
}
