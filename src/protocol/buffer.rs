//! Bounds-checked reader over a response packet
//!
//! `bytes::Buf` panics when asked for more than it holds, so every read
//! goes through a length guard first.

use bytes::Buf;

use crate::error::{Result, RowWireError};

/// Cursor over a received packet
pub struct ResponseBuf<'a> {
    inner: &'a [u8],
}

impl<'a> ResponseBuf<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { inner: bytes }
    }

    /// Bytes left to read
    pub fn remaining(&self) -> usize {
        self.inner.remaining()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    fn ensure(&self, needed: usize, what: &str) -> Result<()> {
        if self.inner.remaining() < needed {
            return Err(RowWireError::Protocol(format!(
                "Incomplete {}: expected {} bytes, got {}",
                what,
                needed,
                self.inner.remaining()
            )));
        }
        Ok(())
    }

    pub fn read_i32(&mut self, what: &str) -> Result<i32> {
        self.ensure(4, what)?;
        Ok(self.inner.get_i32())
    }

    pub fn read_i64(&mut self, what: &str) -> Result<i64> {
        self.ensure(8, what)?;
        Ok(self.inner.get_i64())
    }

    pub fn read_f64(&mut self, what: &str) -> Result<f64> {
        self.ensure(8, what)?;
        Ok(self.inner.get_f64())
    }

    /// Borrow the next `len` bytes
    pub fn read_slice(&mut self, len: usize, what: &str) -> Result<&'a [u8]> {
        self.ensure(len, what)?;
        let (head, tail) = self.inner.split_at(len);
        self.inner = tail;
        Ok(head)
    }
}
