use super::cursor::{WireReader, WireValue, WireWriter};
use crate::error::CodecError;

/// A double carried as 16 upper-case hex digits and a trailing NUL, so
/// federates can read it in a packet dump.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Tag(pub f64);

fn hex_digit(nibble: u8) -> u8 {
    match nibble {
        0..=9 => b'0' + nibble,
        _ => b'A' + nibble - 10,
    }
}

fn nibble(digit: u8) -> Result<u8, CodecError> {
    match digit {
        b'0'..=b'9' => Ok(digit - b'0'),
        b'A'..=b'F' => Ok(digit - b'A' + 10),
        b'a'..=b'f' => Ok(digit - b'a' + 10),
        _ => Err(CodecError::BadTagDigit(digit)),
    }
}

impl WireValue for Tag {
    const ENCODED_LENGTH: usize = 17;

    fn encode(&self, writer: &mut WireWriter<'_>) -> Result<(), CodecError> {
        let mut digits = [0u8; 17];
        for (i, byte) in self.0.to_be_bytes().into_iter().enumerate() {
            digits[2 * i] = hex_digit(byte >> 4);
            digits[2 * i + 1] = hex_digit(byte & 0x0F);
        }
        writer.write_bytes(&digits)
    }

    fn decode(reader: &mut WireReader<'_>) -> Result<Self, CodecError> {
        let digits = reader.read_bytes(Self::ENCODED_LENGTH)?;
        let mut raw = [0u8; 8];
        for (i, byte) in raw.iter_mut().enumerate() {
            *byte = (nibble(digits[2 * i])? << 4) | nibble(digits[2 * i + 1])?;
        }
        Ok(Tag(f64::from_be_bytes(raw)))
    }
}
