//! Reading TL values out of a byte slice.

use crate::serialize::{BOOL_FALSE, BOOL_TRUE, LONG_LEN_MARKER, padding};

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("unexpected end of buffer")]
    UnexpectedEof,
    /// The tag read does not belong to the expected type.
    #[error("unexpected constructor id: {id:#010x}")]
    UnexpectedConstructor { id: u32 },
    #[error("string is not valid utf-8")]
    InvalidUtf8,
    #[error("gzip payload could not be decompressed")]
    Decompress,
}

pub type Result<T> = std::result::Result<T, Error>;

/// Read position over a borrowed buffer. Reads past the end fail with
/// [`Error::UnexpectedEof`] and leave the position untouched.
pub struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn from_slice(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn rest(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }

    pub fn read_slice(&mut self, len: usize) -> Result<&'a [u8]> {
        let taken = self.rest().get(..len).ok_or(Error::UnexpectedEof)?;
        self.pos += len;
        Ok(taken)
    }

    pub fn read_byte(&mut self) -> Result<u8> {
        self.read_slice(1).map(|b| b[0])
    }

    pub fn read_exact(&mut self, out: &mut [u8]) -> Result<()> {
        out.copy_from_slice(self.read_slice(out.len())?);
        Ok(())
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0; N];
        self.read_exact(&mut out)?;
        Ok(out)
    }

    /// The next four bytes as a constructor id, without consuming them.
    pub fn peek_id(&self) -> Result<u32> {
        match self.rest() {
            [a, b, c, d, ..] => Ok(u32::from_le_bytes([*a, *b, *c, *d])),
            _ => Err(Error::UnexpectedEof),
        }
    }

    /// Append everything left to `out`; returns how many bytes that was.
    pub fn read_to_end(&mut self, out: &mut Vec<u8>) -> usize {
        let rest = self.rest();
        out.extend_from_slice(rest);
        self.pos = self.buf.len();
        rest.len()
    }
}

pub type Buffer<'a, 'b> = &'a mut Cursor<'b>;

pub trait Deserializable: Sized {
    fn deserialize(buf: Buffer) -> Result<Self>;

    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::deserialize(&mut Cursor::from_slice(bytes))
    }
}

// ─── Primitives ───────────────────────────────────────────────────────────────

impl Deserializable for bool {
    fn deserialize(buf: Buffer) -> Result<Self> {
        match u32::deserialize(buf)? {
            BOOL_TRUE => Ok(true),
            BOOL_FALSE => Ok(false),
            id => Err(Error::UnexpectedConstructor { id }),
        }
    }
}

macro_rules! impl_le {
    ($($ty:ty),+) => {$(
        impl Deserializable for $ty {
            fn deserialize(buf: Buffer) -> Result<Self> {
                buf.read_array().map(<$ty>::from_le_bytes)
            }
        }
    )+};
}

impl_le!(i32, u32, i64, f64);

impl Deserializable for [u8; 16] {
    fn deserialize(buf: Buffer) -> Result<Self> {
        buf.read_array()
    }
}

impl Deserializable for [u8; 32] {
    fn deserialize(buf: Buffer) -> Result<Self> {
        buf.read_array()
    }
}

impl Deserializable for Vec<u8> {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let (len, header) = match buf.read_byte()? {
            LONG_LEN_MARKER => {
                let [a, b, c] = buf.read_array()?;
                (u32::from_le_bytes([a, b, c, 0]) as usize, 4)
            }
            short => (short as usize, 1),
        };
        let data = buf.read_slice(len)?.to_vec();
        buf.read_slice(padding(header + len))?;
        Ok(data)
    }
}

impl Deserializable for String {
    fn deserialize(buf: Buffer) -> Result<Self> {
        String::from_utf8(Vec::<u8>::deserialize(buf)?).map_err(|_| Error::InvalidUtf8)
    }
}

// ─── Vectors ──────────────────────────────────────────────────────────────────

/// `count` items; a count the remaining bytes cannot hold is rejected up front.
fn items<T: Deserializable>(buf: Buffer) -> Result<Vec<T>> {
    let count = usize::try_from(i32::deserialize(buf)?).unwrap_or(0);
    if count > buf.remaining() / 4 {
        return Err(Error::UnexpectedEof);
    }
    (0..count).map(|_| T::deserialize(buf)).collect()
}

impl<T: Deserializable> Deserializable for Vec<T> {
    fn deserialize(buf: Buffer) -> Result<Self> {
        match u32::deserialize(buf)? {
            crate::VECTOR_ID => items(buf),
            id => Err(Error::UnexpectedConstructor { id }),
        }
    }
}

impl<T: Deserializable> Deserializable for crate::RawVec<T> {
    fn deserialize(buf: Buffer) -> Result<Self> {
        items(buf).map(crate::RawVec)
    }
}

/// Takes the rest of the buffer.
impl Deserializable for crate::Blob {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let mut out = Vec::new();
        buf.read_to_end(&mut out);
        Ok(crate::Blob(out))
    }
}
