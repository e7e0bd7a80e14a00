//! Bounds-checked forward cursor over an immutable byte buffer.

use super::MAX_VARINT_LEN;
use crate::error::{Error, Result};

/// Cursor walks a byte buffer once, failing instead of over-reading.
///
/// Every advance is checked against the bytes remaining and every retreat
/// against the start of the buffer, so no read ever leaves the slice. A
/// cursor is one linear scan and is not `Clone`; split off sub-ranges with
/// [`Cursor::sub_cursor`].
#[derive(Debug)]
pub struct Cursor<'a> {
    buffer: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Creates a cursor at the start of `data`
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            buffer: data,
            pos: 0,
        }
    }

    /// Returns the current position in the buffer
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Returns the total buffer size
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns true if the underlying buffer is empty
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Returns the number of bytes remaining
    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.pos
    }

    /// Returns true once every byte has been consumed
    pub fn is_exhausted(&self) -> bool {
        self.pos == self.buffer.len()
    }

    fn check_available(&self, needed: usize) -> Result<()> {
        if needed > self.remaining() {
            return Err(Error::buffer_underrun(self.pos, needed, self.remaining()));
        }
        Ok(())
    }

    /// Returns the byte at the current position without consuming it
    pub fn current(&self) -> Result<u8> {
        self.check_available(1)?;
        Ok(self.buffer[self.pos])
    }

    /// Moves forward by `count` bytes
    pub fn advance(&mut self, count: usize) -> Result<()> {
        self.check_available(count)?;
        self.pos += count;
        Ok(())
    }

    /// Moves back by `count` bytes, for lookahead
    pub fn retreat(&mut self, count: usize) -> Result<()> {
        if count > self.pos {
            return Err(Error::buffer_underrun(self.pos, count, self.pos));
        }
        self.pos -= count;
        Ok(())
    }

    /// Reads one byte
    pub fn read_byte(&mut self) -> Result<u8> {
        let value = self.current()?;
        self.pos += 1;
        Ok(value)
    }

    /// Reads `length` raw bytes
    pub fn read_slice(&mut self, length: usize) -> Result<&'a [u8]> {
        self.check_available(length)?;
        let bytes = &self.buffer[self.pos..self.pos + length];
        self.pos += length;
        Ok(bytes)
    }

    /// Reads exactly `N` bytes into an array
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_slice(N)?);
        Ok(out)
    }

    /// Reads an unsigned varint of at most [`MAX_VARINT_LEN`] bytes
    pub fn read_varint(&mut self) -> Result<u64> {
        let start = self.pos;
        let mut result: u64 = 0;

        for i in 0..MAX_VARINT_LEN {
            let b = match self.read_byte() {
                Ok(b) => b,
                Err(_) => {
                    // Report the whole varint, not just the missing byte
                    return Err(Error::buffer_underrun(start, i + 1, self.buffer.len() - start));
                }
            };

            // The 10th byte can only contribute bit 63
            if i == MAX_VARINT_LEN - 1 && b > 1 {
                return Err(Error::varint_overflow(start));
            }

            result |= u64::from(b & 0x7f) << (7 * i);
            if b & 0x80 == 0 {
                return Ok(result);
            }
        }

        Err(Error::varint_overflow(start))
    }

    /// Reads a varint length prefix and checks it against the bytes left
    pub fn read_length(&mut self) -> Result<usize> {
        let offset = self.pos;
        let length = self.read_varint()?;
        let length = usize::try_from(length).unwrap_or(usize::MAX);
        if length > self.remaining() {
            return Err(Error::buffer_underrun(offset, length, self.remaining()));
        }
        Ok(length)
    }

    /// Reads a varint length prefix followed by that many bytes
    pub fn read_length_delimited(&mut self) -> Result<&'a [u8]> {
        let length = self.read_length()?;
        self.read_slice(length)
    }

    /// Splits off the next `length` bytes as an independent cursor and
    /// advances past them
    pub fn sub_cursor(&mut self, length: usize) -> Result<Cursor<'a>> {
        let bytes = self.read_slice(length)?;
        Ok(Cursor::new(bytes))
    }

    /// Reads a length prefix and returns a cursor over the payload
    pub fn length_delimited_cursor(&mut self) -> Result<Cursor<'a>> {
        let length = self.read_length()?;
        self.sub_cursor(length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_and_exhaust() {
        let data = [1, 2, 3];
        let mut cursor = Cursor::new(&data);
        assert_eq!(cursor.remaining(), 3);
        assert_eq!(cursor.read_byte().unwrap(), 1);
        cursor.advance(2).unwrap();
        assert!(cursor.is_exhausted());
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn test_over_read_fails_without_moving() {
        let data = [1, 2, 3];
        let mut cursor = Cursor::new(&data);
        cursor.advance(1).unwrap();
        let err = cursor.advance(3).unwrap_err();
        assert!(matches!(
            err,
            Error::BufferUnderrun {
                offset: 1,
                needed: 3,
                available: 2
            }
        ));
        assert_eq!(cursor.position(), 1);
        assert!(cursor.read_slice(5).is_err());
        assert!(Cursor::new(&[]).current().is_err());
    }

    #[test]
    fn test_retreat_is_bounded() {
        let data = [1, 2, 3];
        let mut cursor = Cursor::new(&data);
        cursor.advance(2).unwrap();
        cursor.retreat(1).unwrap();
        assert_eq!(cursor.current().unwrap(), 2);
        assert!(cursor.retreat(2).is_err());
        assert_eq!(cursor.position(), 1);
    }

    #[test]
    fn test_read_array() {
        let data = [0xcd, 0xcc, 0xcc, 0x3d, 0xff];
        let mut cursor = Cursor::new(&data);
        let bytes: [u8; 4] = cursor.read_array().unwrap();
        assert_eq!(bytes, [0xcd, 0xcc, 0xcc, 0x3d]);
        assert!(cursor.read_array::<4>().is_err());
    }

    #[test]
    fn test_length_delimited_claims_too_much() {
        let data = [0x0a, b'q', b'w'];
        let mut cursor = Cursor::new(&data);
        let err = cursor.read_length_delimited().unwrap_err();
        assert!(matches!(
            err,
            Error::BufferUnderrun {
                needed: 10,
                available: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_sub_cursor() {
        let data = [0x03, 1, 2, 3, 4];
        let mut cursor = Cursor::new(&data);
        let mut sub = cursor.length_delimited_cursor().unwrap();
        assert_eq!(sub.len(), 3);
        assert_eq!(sub.read_slice(3).unwrap(), &[1, 2, 3]);
        assert!(sub.is_exhausted());
        assert_eq!(cursor.read_byte().unwrap(), 4);
    }
}
