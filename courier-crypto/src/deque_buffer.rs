//! Byte buffer with reserved headroom, so the 24-byte encryption header can
//! be prepended to a packed message without moving the payload.

/// Growable byte buffer with cheap prepends.
#[derive(Clone, Debug)]
pub struct DequeBuffer {
    buf: Vec<u8>,
    head: usize,
}

impl DequeBuffer {
    /// Reserve room for `back` payload bytes and `front` header bytes.
    pub fn with_capacity(back: usize, front: usize) -> Self {
        let mut buf = Vec::with_capacity(front + back);
        buf.resize(front, 0);
        Self { buf, head: front }
    }

    /// Prepend `slice`. Falls back to shifting the contents once the reserved
    /// headroom is used up.
    pub fn extend_front(&mut self, slice: &[u8]) {
        if slice.len() > self.head {
            let grow = slice.len() - self.head;
            self.buf.splice(0..0, std::iter::repeat_n(0, grow));
            self.head += grow;
        }
        self.head -= slice.len();
        self.buf[self.head..self.head + slice.len()].copy_from_slice(slice);
    }

    pub fn len(&self) -> usize {
        self.buf.len() - self.head
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Take the contents, dropping unused headroom.
    pub fn into_vec(mut self) -> Vec<u8> {
        self.buf.drain(..self.head);
        self.buf
    }
}

impl AsRef<[u8]> for DequeBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.buf[self.head..]
    }
}

impl AsMut<[u8]> for DequeBuffer {
    fn as_mut(&mut self) -> &mut [u8] {
        &mut self.buf[self.head..]
    }
}

impl Extend<u8> for DequeBuffer {
    fn extend<T: IntoIterator<Item = u8>>(&mut self, iter: T) {
        self.buf.extend(iter);
    }
}

impl<'a> Extend<&'a u8> for DequeBuffer {
    fn extend<T: IntoIterator<Item = &'a u8>>(&mut self, iter: T) {
        self.buf.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prepend_within_headroom() {
        let mut b = DequeBuffer::with_capacity(4, 8);
        b.extend([3u8, 4]);
        b.extend_front(&[1, 2]);
        assert_eq!(b.as_ref(), &[1, 2, 3, 4]);
        assert_eq!(b.into_vec(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn prepend_past_headroom() {
        let mut b = DequeBuffer::with_capacity(2, 1);
        b.extend([9u8]);
        b.extend_front(&[1, 2, 3]);
        assert_eq!(b.as_ref(), &[1, 2, 3, 9]);
        assert_eq!(b.len(), 4);
    }
}
