use crate::error::CodecError;

pub trait WireValue: Sized {
    const ENCODED_LENGTH: usize;

    fn encode(&self, writer: &mut WireWriter<'_>) -> Result<(), CodecError>;

    fn decode(reader: &mut WireReader<'_>) -> Result<Self, CodecError>;

    fn encoded_length(&self) -> usize {
        Self::ENCODED_LENGTH
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut buf = vec![0u8; Self::ENCODED_LENGTH];
        let mut writer = WireWriter::new(&mut buf);
        // The buffer is sized from ENCODED_LENGTH, so encoding cannot run short.
        if self.encode(&mut writer).is_err() {
            buf.clear();
        }
        buf
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut reader = WireReader::new(bytes);
        Self::decode(&mut reader)
    }
}

#[derive(Debug)]
pub struct WireReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], CodecError> {
        if self.remaining() < len {
            return Err(CodecError::BufferTooShort {
                needed: len,
                available: self.remaining(),
            });
        }
        let out = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(out)
    }

    pub fn skip(&mut self, len: usize) -> Result<(), CodecError> {
        self.read_bytes(len).map(|_| ())
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, CodecError> {
        self.read_array().map(u16::from_be_bytes)
    }

    pub fn read_u32(&mut self) -> Result<u32, CodecError> {
        self.read_array().map(u32::from_be_bytes)
    }

    pub fn read_f32(&mut self) -> Result<f32, CodecError> {
        self.read_array().map(f32::from_be_bytes)
    }

    pub fn read_f64(&mut self) -> Result<f64, CodecError> {
        self.read_array().map(f64::from_be_bytes)
    }
}

#[derive(Debug)]
pub struct WireWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> WireWriter<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), CodecError> {
        if self.remaining() < bytes.len() {
            return Err(CodecError::BufferTooShort {
                needed: bytes.len(),
                available: self.remaining(),
            });
        }
        self.buf[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
        Ok(())
    }

    pub fn write_zeros(&mut self, len: usize) -> Result<(), CodecError> {
        if self.remaining() < len {
            return Err(CodecError::BufferTooShort {
                needed: len,
                available: self.remaining(),
            });
        }
        self.buf[self.pos..self.pos + len].fill(0);
        self.pos += len;
        Ok(())
    }

    pub fn write_u8(&mut self, value: u8) -> Result<(), CodecError> {
        self.write_bytes(&[value])
    }

    pub fn write_u16(&mut self, value: u16) -> Result<(), CodecError> {
        self.write_bytes(&value.to_be_bytes())
    }

    pub fn write_u32(&mut self, value: u32) -> Result<(), CodecError> {
        self.write_bytes(&value.to_be_bytes())
    }

    pub fn write_f32(&mut self, value: f32) -> Result<(), CodecError> {
        self.write_bytes(&value.to_be_bytes())
    }

    pub fn write_f64(&mut self, value: f64) -> Result<(), CodecError> {
        self.write_bytes(&value.to_be_bytes())
    }
}
