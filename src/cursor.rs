//! Big-endian byte cursor the PICT decoder reads through.
//!
//! [`ByteCursor`] is the seam between the decoder and its byte source.
//! [`SliceCursor`] is the in-memory implementation used by
//! [`crate::DecodeRequest`].

use crate::error::PictError;

/// Sequential big-endian reader with skip, word alignment and bounded lookahead.
///
/// The decoder never byte-swaps on its own; every multi-byte field goes
/// through one of these methods.
pub trait ByteCursor {
    fn read_u8(&mut self) -> Result<u8, PictError>;

    fn read_u16_be(&mut self) -> Result<u16, PictError>;

    fn read_i32_be(&mut self) -> Result<i32, PictError>;

    /// Advance `n` bytes without looking at them.
    fn skip(&mut self, n: usize) -> Result<(), PictError>;

    /// Move forward to the next even offset (no-op when already even).
    fn align_to_even(&mut self) -> Result<(), PictError>;

    /// Borrow the next `n` bytes without consuming them.
    fn peek(&self, n: usize) -> Result<&[u8], PictError>;

    /// Consume and borrow the next `n` bytes.
    fn read_exact(&mut self, n: usize) -> Result<&[u8], PictError>;

    /// Current offset from the start of the source.
    fn position(&self) -> usize;

    /// Bytes left before end of input.
    fn remaining(&self) -> usize;

    fn read_i16_be(&mut self) -> Result<i16, PictError> {
        Ok(self.read_u16_be()? as i16)
    }

    fn read_u32_be(&mut self) -> Result<u32, PictError> {
        Ok(self.read_i32_be()? as u32)
    }
}

/// [`ByteCursor`] over an in-memory byte slice.
pub struct SliceCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> SliceCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Bytes from the current position to the end of input.
    pub fn rest(&self) -> &'a [u8] {
        &self.data[self.pos.min(self.data.len())..]
    }

    fn read_fixed_bytes<const N: usize>(&mut self) -> Result<[u8; N], PictError> {
        let end = self.pos.checked_add(N).ok_or(PictError::UnexpectedEof)?;
        let src = self
            .data
            .get(self.pos..end)
            .ok_or(PictError::UnexpectedEof)?;
        let mut buf = [0u8; N];
        buf.copy_from_slice(src);
        self.pos = end;
        Ok(buf)
    }
}

impl ByteCursor for SliceCursor<'_> {
    fn read_u8(&mut self) -> Result<u8, PictError> {
        if self.pos < self.data.len() {
            let b = self.data[self.pos];
            self.pos += 1;
            Ok(b)
        } else {
            Err(PictError::UnexpectedEof)
        }
    }

    fn read_u16_be(&mut self) -> Result<u16, PictError> {
        Ok(u16::from_be_bytes(self.read_fixed_bytes()?))
    }

    fn read_i32_be(&mut self) -> Result<i32, PictError> {
        Ok(i32::from_be_bytes(self.read_fixed_bytes()?))
    }

    fn skip(&mut self, n: usize) -> Result<(), PictError> {
        let new_pos = self.pos.checked_add(n).ok_or(PictError::UnexpectedEof)?;
        if new_pos > self.data.len() {
            return Err(PictError::UnexpectedEof);
        }
        self.pos = new_pos;
        Ok(())
    }

    fn align_to_even(&mut self) -> Result<(), PictError> {
        if self.pos % 2 == 1 {
            self.skip(1)?;
        }
        Ok(())
    }

    fn peek(&self, n: usize) -> Result<&[u8], PictError> {
        let end = self.pos.checked_add(n).ok_or(PictError::UnexpectedEof)?;
        self.data.get(self.pos..end).ok_or(PictError::UnexpectedEof)
    }

    fn read_exact(&mut self, n: usize) -> Result<&[u8], PictError> {
        let end = self.pos.checked_add(n).ok_or(PictError::UnexpectedEof)?;
        let bytes = self
            .data
            .get(self.pos..end)
            .ok_or(PictError::UnexpectedEof)?;
        self.pos = end;
        Ok(bytes)
    }

    fn position(&self) -> usize {
        self.pos
    }

    fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn big_endian_reads() {
        let data = [0x12, 0x34, 0xFF, 0xFF, 0xFF, 0xFE, 0x80, 0x01];
        let mut c = SliceCursor::new(&data);
        assert_eq!(c.read_u16_be().unwrap(), 0x1234);
        assert_eq!(c.read_i32_be().unwrap(), -2);
        assert_eq!(c.read_i16_be().unwrap(), -32767);
        assert_eq!(c.remaining(), 0);
        assert!(matches!(c.read_u8(), Err(PictError::UnexpectedEof)));
    }

    #[test]
    fn align_only_moves_from_odd_offsets() {
        let data = [0u8; 4];
        let mut c = SliceCursor::new(&data);
        c.align_to_even().unwrap();
        assert_eq!(c.position(), 0);
        c.read_u8().unwrap();
        c.align_to_even().unwrap();
        assert_eq!(c.position(), 2);
    }

    #[test]
    fn peek_does_not_consume() {
        let data = [0xFF, 0xD8, 0xFF, 0xE0];
        let mut c = SliceCursor::new(&data);
        assert_eq!(c.peek(3).unwrap(), &[0xFF, 0xD8, 0xFF]);
        assert_eq!(c.position(), 0);
        assert_eq!(c.read_exact(2).unwrap(), &[0xFF, 0xD8]);
        assert!(c.peek(3).is_err());
        assert_eq!(c.rest(), &[0xFF, 0xE0]);
    }

    #[test]
    fn skip_past_end_fails() {
        let data = [0u8; 3];
        let mut c = SliceCursor::new(&data);
        assert!(c.skip(3).is_ok());
        assert!(matches!(c.skip(1), Err(PictError::UnexpectedEof)));
    }
}
