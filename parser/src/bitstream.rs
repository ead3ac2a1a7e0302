use bitreader::{BitReader, BitReaderError};

use crate::error::DecodeError;

/// Forward-only bit reader over a frame's bytes. Bits are consumed most
/// significant first within each byte.
pub struct BitCursor<'a> {
    reader: BitReader<'a>,
}

impl<'a> BitCursor<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            reader: BitReader::new(bytes),
        }
    }

    /// Reads the next `n` bits (`1..=32`) as an unsigned integer.
    pub fn read_bits(&mut self, n: u8) -> Result<u32, DecodeError> {
        if n == 0 || n > 32 {
            return Err(DecodeError::InvalidWidth(n));
        }
        let remaining = self.bits_remaining();
        if remaining < u64::from(n) {
            return Err(DecodeError::OutOfData {
                requested: n,
                remaining,
            });
        }
        self.reader.read_u32(n).map_err(|e| into_decode_error(e, n))
    }

    pub fn read_bit(&mut self) -> Result<bool, DecodeError> {
        Ok(self.read_bits(1)? == 1)
    }

    pub fn bits_remaining(&self) -> u64 {
        self.reader.remaining()
    }

    pub fn position(&self) -> u64 {
        self.reader.position()
    }

    /// Consumes the rest of the buffer and reports whether every remaining
    /// bit was zero.
    pub fn rest_is_zero(&mut self) -> Result<bool, DecodeError> {
        let mut clean = true;
        while self.bits_remaining() > 0 {
            let n = self.bits_remaining().min(32) as u8;
            clean &= self.read_bits(n)? == 0;
        }
        Ok(clean)
    }
}

fn into_decode_error(err: BitReaderError, requested: u8) -> DecodeError {
    match err {
        BitReaderError::NotEnoughData {
            position, length, ..
        } => DecodeError::OutOfData {
            requested,
            remaining: length.saturating_sub(position),
        },
        _ => DecodeError::InvalidWidth(requested),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_msb_first() {
        let mut cursor = BitCursor::new(&[0b1010_0000, 0xFF]);
        assert!(cursor.read_bit().unwrap());
        assert!(!cursor.read_bit().unwrap());
        assert_eq!(cursor.read_bits(2).unwrap(), 0b10);
        assert_eq!(cursor.bits_remaining(), 12);
        assert_eq!(cursor.read_bits(12).unwrap(), 0x0FF);
        assert_eq!(cursor.bits_remaining(), 0);
    }

    #[test]
    fn reads_full_words() {
        let mut cursor = BitCursor::new(&[0xDE, 0xAD, 0xBE, 0xEF]);
        assert_eq!(cursor.read_bits(32).unwrap(), 0xDEADBEEF);
    }

    #[test]
    fn out_of_data() {
        let mut cursor = BitCursor::new(&[0xAB]);
        cursor.read_bits(5).unwrap();
        assert_eq!(
            cursor.read_bits(4),
            Err(DecodeError::OutOfData {
                requested: 4,
                remaining: 3
            })
        );
        // a failed read doesn't move the cursor
        assert_eq!(cursor.read_bits(3).unwrap(), 0b011);
    }

    #[test]
    fn rejects_bad_widths() {
        let mut cursor = BitCursor::new(&[0; 8]);
        assert_eq!(cursor.read_bits(0), Err(DecodeError::InvalidWidth(0)));
        assert_eq!(cursor.read_bits(33), Err(DecodeError::InvalidWidth(33)));
    }

    #[test]
    fn zero_tail() {
        let mut cursor = BitCursor::new(&[0xF0, 0, 0, 0, 0, 0]);
        cursor.read_bits(4).unwrap();
        assert!(cursor.rest_is_zero().unwrap());

        let mut cursor = BitCursor::new(&[0xF0, 0, 0, 0, 0, 1]);
        cursor.read_bits(4).unwrap();
        assert!(!cursor.rest_is_zero().unwrap());
    }
}
