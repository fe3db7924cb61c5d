//! Position-tracking reader over a payload buffer.
//!
//! Every read is total: truncated input yields a best-effort value instead
//! of an error. The first irregularity the cursor papers over is kept as a
//! fault so that callers that care (strict nested decoding) can reject the
//! buffer after the fact.

use crate::error::Error;
use bytes::Bytes;

/// Varints are at most 10 bytes for a 64-bit value
const MAX_VARINT_LEN: usize = 10;

/// Forward-only reader over an immutable payload
#[derive(Debug)]
pub struct Cursor {
    data: Bytes,
    position: usize,
    fault: Option<Error>,
}

impl Cursor {
    /// Creates a cursor at offset 0 of `data`
    pub fn new(data: Bytes) -> Self {
        Self {
            data,
            position: 0,
            fault: None,
        }
    }

    /// Current read offset
    pub fn position(&self) -> usize {
        self.position
    }

    /// Bytes left between the position and the end of the buffer
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    /// Returns true once every byte has been consumed
    pub fn is_exhausted(&self) -> bool {
        self.position >= self.data.len()
    }

    /// The first fault absorbed since the last call, if any
    pub fn take_fault(&mut self) -> Option<Error> {
        self.fault.take()
    }

    fn record_fault(&mut self, fault: Error) {
        if self.fault.is_none() {
            self.fault = Some(fault);
        }
    }

    /// Reads a base-128 varint, least significant group first.
    ///
    /// Running off the end of the buffer returns whatever was accumulated.
    /// Groups past the 64th bit are consumed but their bits are dropped.
    pub fn read_varint(&mut self) -> u64 {
        let start = self.position;
        let mut value: u64 = 0;
        let mut shift: u32 = 0;

        loop {
            let Some(&byte) = self.data.get(self.position) else {
                let consumed = self.position - start;
                self.record_fault(Error::truncated(start, consumed + 1, consumed));
                return value;
            };
            self.position += 1;

            if shift < u64::BITS {
                value |= u64::from(byte & 0x7F) << shift;
            }
            if byte & 0x80 == 0 {
                break;
            }
            shift = shift.saturating_add(7);
        }

        if self.position - start > MAX_VARINT_LEN {
            self.record_fault(Error::varint_decode(start));
        }
        value
    }

    /// Reads a little-endian `u32`, or returns 0 without moving if fewer
    /// than 4 bytes remain
    pub fn read_fixed32(&mut self) -> u32 {
        match self.read_array::<4>() {
            Some(bytes) => u32::from_le_bytes(bytes),
            None => 0,
        }
    }

    /// Reads a little-endian `u64`, or returns 0 without moving if fewer
    /// than 8 bytes remain
    pub fn read_fixed64(&mut self) -> u64 {
        match self.read_array::<8>() {
            Some(bytes) => u64::from_le_bytes(bytes),
            None => 0,
        }
    }

    fn read_array<const N: usize>(&mut self) -> Option<[u8; N]> {
        let available = self.remaining();
        if available < N {
            self.record_fault(Error::truncated(self.position, N, available));
            return None;
        }

        let mut out = [0u8; N];
        out.copy_from_slice(&self.data[self.position..self.position + N]);
        self.position += N;
        Some(out)
    }

    /// Returns the next `length` bytes as a shared slice of the buffer.
    ///
    /// A length past the end is clamped to what is left.
    pub fn read_slice(&mut self, length: u64) -> Bytes {
        let available = self.remaining();
        let wanted = usize::try_from(length).unwrap_or(usize::MAX);
        if wanted > available {
            self.record_fault(Error::truncated(self.position, wanted, available));
        }

        let end = self.position + wanted.min(available);
        let slice = self.data.slice(self.position..end);
        self.position = end;
        slice
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cursor(data: &'static [u8]) -> Cursor {
        Cursor::new(Bytes::from_static(data))
    }

    #[test]
    fn test_read_varint_single_byte() {
        let mut c = cursor(&[0x08]);
        assert_eq!(c.read_varint(), 8);
        assert_eq!(c.position(), 1);
        assert!(c.take_fault().is_none());
    }

    #[test]
    fn test_read_varint_multi_byte() {
        let mut c = cursor(&[0xAC, 0x02]);
        assert_eq!(c.read_varint(), 300);
        assert!(c.is_exhausted());
    }

    #[test]
    fn test_read_varint_max() {
        let mut c = cursor(&[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01]);
        assert_eq!(c.read_varint(), u64::MAX);
        assert_eq!(c.position(), 10);
        assert!(c.take_fault().is_none());
    }

    #[test]
    fn test_read_varint_truncated_keeps_partial_value() {
        // 0x96 has the continuation bit set but nothing follows
        let mut c = cursor(&[0x96]);
        assert_eq!(c.read_varint(), 0x16);
        assert!(c.is_exhausted());
        assert!(matches!(c.take_fault(), Some(Error::Truncated { offset: 0, .. })));
    }

    #[test]
    fn test_read_varint_overlong_does_not_overflow() {
        let mut c = cursor(&[
            0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01,
        ]);
        assert_eq!(c.read_varint(), u64::MAX);
        assert_eq!(c.position(), 11);
        assert!(matches!(c.take_fault(), Some(Error::VarintDecode { offset: 0 })));
    }

    #[test]
    fn test_read_fixed32() {
        let mut c = cursor(&[0x01, 0x02, 0x03, 0x04]);
        assert_eq!(c.read_fixed32(), 0x0403_0201);
        assert!(c.is_exhausted());
    }

    #[test]
    fn test_read_fixed64() {
        let mut c = cursor(&[0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08]);
        assert_eq!(c.read_fixed64(), 0x0807_0605_0403_0201);
    }

    #[test]
    fn test_read_fixed_truncated_returns_zero_in_place() {
        let mut c = cursor(&[0x01, 0x02, 0x03]);
        assert_eq!(c.read_fixed32(), 0);
        assert_eq!(c.position(), 0);
        assert_eq!(c.read_fixed64(), 0);
        assert_eq!(c.position(), 0);
        assert!(matches!(
            c.take_fault(),
            Some(Error::Truncated { needed: 4, available: 3, .. })
        ));
    }

    #[test]
    fn test_read_slice_clamps() {
        let mut c = cursor(b"hello");
        assert_eq!(&c.read_slice(2)[..], b"he");
        assert_eq!(&c.read_slice(u64::MAX)[..], b"llo");
        assert!(c.is_exhausted());
        assert!(c.take_fault().is_some());
        assert!(c.read_slice(4).is_empty());
    }

    #[test]
    fn test_take_fault_keeps_first() {
        let mut c = cursor(&[0x01]);
        c.read_fixed64();
        c.read_fixed32();
        assert!(matches!(c.take_fault(), Some(Error::Truncated { needed: 8, .. })));
        assert!(c.take_fault().is_none());
    }
}
