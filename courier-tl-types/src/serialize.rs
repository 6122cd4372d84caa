//! Writing TL values.
//!
//! Integers are little-endian, `int128`/`int256` are raw byte arrays, and
//! byte strings carry a one- or four-byte length header followed by zero
//! padding up to the next multiple of four.

pub(crate) const BOOL_TRUE: u32 = 0x997275b5;
pub(crate) const BOOL_FALSE: u32 = 0xbc799737;

/// Longest byte string whose length fits the one-byte header.
pub(crate) const SHORT_LEN_MAX: usize = 253;
pub(crate) const LONG_LEN_MARKER: u8 = 0xfe;

/// Zero bytes needed after `written` bytes to reach 4-byte alignment.
pub(crate) const fn padding(written: usize) -> usize {
    (4 - written % 4) % 4
}

pub trait Serializable {
    fn serialize(&self, buf: &mut impl Extend<u8>);

    fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.serialize(&mut out);
        out
    }
}

impl Serializable for bool {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        let id = if *self { BOOL_TRUE } else { BOOL_FALSE };
        id.serialize(buf)
    }
}

macro_rules! impl_le {
    ($($ty:ty),+) => {$(
        impl Serializable for $ty {
            fn serialize(&self, buf: &mut impl Extend<u8>) {
                buf.extend(self.to_le_bytes())
            }
        }
    )+};
}

impl_le!(i32, u32, i64, f64);

impl<const N: usize> Serializable for [u8; N] {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        buf.extend(*self)
    }
}

impl Serializable for [u8] {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        let header = match self.len() {
            n @ 0..=SHORT_LEN_MAX => {
                buf.extend([n as u8]);
                1
            }
            n => {
                let [a, b, c, _] = (n as u32).to_le_bytes();
                buf.extend([LONG_LEN_MARKER, a, b, c]);
                4
            }
        };
        buf.extend(self.iter().copied());
        buf.extend(std::iter::repeat_n(0, padding(header + self.len())));
    }
}

impl Serializable for &[u8] {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        (**self).serialize(buf)
    }
}

impl Serializable for Vec<u8> {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self[..].serialize(buf)
    }
}

impl Serializable for String {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self.as_bytes().serialize(buf)
    }
}

fn count_and_items<'a, T: Serializable + 'a>(items: &'a [T], buf: &mut impl Extend<u8>) {
    (items.len() as i32).serialize(buf);
    items.iter().for_each(|item| item.serialize(buf));
}

/// Boxed `Vector<T>`.
impl<T: Serializable> Serializable for Vec<T> {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        crate::VECTOR_ID.serialize(buf);
        count_and_items(self, buf);
    }
}

/// Bare `vector<T>`: no leading constructor id.
impl<T: Serializable> Serializable for crate::RawVec<T> {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        count_and_items(&self.0, buf);
    }
}

impl Serializable for crate::Blob {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        buf.extend(self.0.iter().copied())
    }
}

/// Flag-guarded fields: absence is recorded in the flags word, so `None`
/// writes nothing.
impl<T: Serializable> Serializable for Option<T> {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        if let Some(value) = self {
            value.serialize(buf)
        }
    }
}
