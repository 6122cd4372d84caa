//! Sans-IO framing strategies for the byte stream under MTProto.
//!
//! | Mode           | Init bytes     | Frame layout                                   |
//! |----------------|----------------|------------------------------------------------|
//! | `Abridged`     | `0xef`         | `len/4` as 1 byte, or `0x7f` + 3 LE bytes      |
//! | `Intermediate` | `0xeeeeeeee`   | `len` as 4 LE bytes                            |
//! | `Full`         | none           | `len ‖ seqno ‖ payload ‖ crc32`, all LE        |
//!
//! A codec instance belongs to exactly one connection. The init bytes are
//! emitted in front of the first encoded frame.

/// Largest frame accepted from the server: a 1 MiB file part plus envelope
/// fits comfortably.
pub const MAX_FRAME_LEN: usize = 2 * 1024 * 1024;

/// Framing violations. All of them are fatal for the connection.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    /// The server answered with a bare 4-byte error code instead of a
    /// message (`-404`: auth key unknown, `-429`: too many connections).
    #[error("transport error {0}")]
    TransportError(i32),
    #[error("invalid frame length {0}")]
    BadLength(usize),
    #[error("frame checksum mismatch")]
    BadCrc,
    #[error("frame sequence {got} (expected {expected})")]
    BadSeqNo { got: u32, expected: u32 },
}

/// Framing strategy selected at connection time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Framing {
    #[default]
    Abridged,
    Intermediate,
    Full,
}

/// Stateful encoder/decoder for one connection.
#[derive(Clone, Debug)]
pub struct FrameCodec {
    framing: Framing,
    init_sent: bool,
    send_seq: u32,
    recv_seq: u32,
}

impl FrameCodec {
    pub fn new(framing: Framing) -> Self {
        Self { framing, init_sent: false, send_seq: 0, recv_seq: 0 }
    }

    pub fn framing(&self) -> Framing {
        self.framing
    }

    fn init_bytes(&self) -> &'static [u8] {
        match self.framing {
            Framing::Abridged => &[0xef],
            Framing::Intermediate => &[0xee, 0xee, 0xee, 0xee],
            Framing::Full => &[],
        }
    }

    /// Append one framed `payload` to `out`. `payload.len()` must be a
    /// multiple of 4.
    pub fn encode(&mut self, payload: &[u8], out: &mut Vec<u8>) {
        if !self.init_sent {
            out.extend_from_slice(self.init_bytes());
            self.init_sent = true;
        }
        match self.framing {
            Framing::Abridged => {
                let words = payload.len() / 4;
                if words < 0x7f {
                    out.push(words as u8);
                } else {
                    out.push(0x7f);
                    out.extend_from_slice(&(words as u32).to_le_bytes()[..3]);
                }
                out.extend_from_slice(payload);
            }
            Framing::Intermediate => {
                out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
                out.extend_from_slice(payload);
            }
            Framing::Full => {
                let start = out.len();
                let total = (payload.len() + 12) as u32;
                out.extend_from_slice(&total.to_le_bytes());
                out.extend_from_slice(&self.send_seq.to_le_bytes());
                out.extend_from_slice(payload);
                let crc = crc32_ieee(&out[start..]);
                out.extend_from_slice(&crc.to_le_bytes());
                self.send_seq = self.send_seq.wrapping_add(1);
            }
        }
    }

    /// Try to take one complete frame from the front of `buf`.
    ///
    /// Returns `Ok(None)` when more bytes are needed; consumed bytes are
    /// drained from `buf` only when a frame (or an error) is produced.
    pub fn decode(&mut self, buf: &mut Vec<u8>) -> Result<Option<Vec<u8>>, FrameError> {
        let (header_len, payload_len) = match self.framing {
            Framing::Abridged => {
                let Some(&first) = buf.first() else { return Ok(None) };
                if first < 0x7f {
                    (1, first as usize * 4)
                } else {
                    if buf.len() < 4 {
                        return Ok(None);
                    }
                    let words = buf[1] as usize | (buf[2] as usize) << 8 | (buf[3] as usize) << 16;
                    (4, words * 4)
                }
            }
            Framing::Intermediate => {
                if buf.len() < 4 {
                    return Ok(None);
                }
                (4, u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]) as usize)
            }
            Framing::Full => {
                if buf.len() < 4 {
                    return Ok(None);
                }
                let total = u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]) as usize;
                // A lone error code arrives as a 4-byte negative length.
                if (total as i32) < 0 {
                    buf.drain(..4);
                    return Err(FrameError::TransportError(total as i32));
                }
                if total < 12 {
                    return Err(FrameError::BadLength(total));
                }
                (8, total - 12)
            }
        };

        if payload_len == 0 || payload_len > MAX_FRAME_LEN {
            return Err(FrameError::BadLength(payload_len));
        }
        let trailer = if self.framing == Framing::Full { 4 } else { 0 };
        let frame_len = header_len + payload_len + trailer;
        if buf.len() < frame_len {
            return Ok(None);
        }

        if self.framing == Framing::Full {
            let crc_at = header_len + payload_len;
            let got = u32::from_le_bytes([buf[crc_at], buf[crc_at + 1], buf[crc_at + 2], buf[crc_at + 3]]);
            if got != crc32_ieee(&buf[..crc_at]) {
                return Err(FrameError::BadCrc);
            }
            let seq = u32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]);
            if seq != self.recv_seq {
                return Err(FrameError::BadSeqNo { got: seq, expected: self.recv_seq });
            }
            self.recv_seq = self.recv_seq.wrapping_add(1);
        }

        let payload: Vec<u8> = buf.drain(..frame_len).skip(header_len).take(payload_len).collect();
        if payload.len() == 4 {
            let code = i32::from_le_bytes([payload[0], payload[1], payload[2], payload[3]]);
            return Err(FrameError::TransportError(code));
        }
        Ok(Some(payload))
    }
}

/// CRC-32 (IEEE 802.3) as used by the full transport.
pub fn crc32_ieee(data: &[u8]) -> u32 {
    let mut crc = 0xffff_ffffu32;
    for &byte in data {
        crc ^= byte as u32;
        for _ in 0..8 {
            let mask = (crc & 1).wrapping_neg();
            crc = (crc >> 1) ^ (0xedb8_8320 & mask);
        }
    }
    !crc
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(framing: Framing, payload: &[u8]) -> Vec<u8> {
        let mut tx = FrameCodec::new(framing);
        let mut rx = FrameCodec::new(framing);
        let mut wire = Vec::new();
        tx.encode(payload, &mut wire);
        let init = tx.init_bytes().len();
        let mut incoming = wire[init..].to_vec();
        let frame = rx.decode(&mut incoming).unwrap().unwrap();
        assert!(incoming.is_empty());
        frame
    }

    #[test]
    fn abridged_init_is_sent_once() {
        let mut codec = FrameCodec::new(Framing::Abridged);
        let mut out = Vec::new();
        codec.encode(&[0; 8], &mut out);
        assert_eq!(out[..2], [0xef, 2]);
        let second = out.len();
        codec.encode(&[0; 8], &mut out);
        assert_eq!(out[second], 2);
    }

    #[test]
    fn abridged_long_header() {
        let payload = vec![1u8; 0x7f * 4];
        let mut codec = FrameCodec::new(Framing::Abridged);
        let mut out = Vec::new();
        codec.encode(&payload, &mut out);
        assert_eq!(out[1..5], [0x7f, 0x7f, 0, 0]);
        assert_eq!(roundtrip(Framing::Abridged, &payload), payload);
    }

    #[test]
    fn intermediate_and_full_carry_payload() {
        let payload: Vec<u8> = (0..64).collect();
        assert_eq!(roundtrip(Framing::Intermediate, &payload), payload);
        assert_eq!(roundtrip(Framing::Full, &payload), payload);
    }

    #[test]
    fn partial_frame_waits_for_more() {
        let mut codec = FrameCodec::new(Framing::Intermediate);
        let mut buf = vec![16, 0, 0, 0, 1, 2];
        assert_eq!(codec.decode(&mut buf), Ok(None));
        assert_eq!(buf.len(), 6);
    }

    #[test]
    fn four_byte_frame_is_transport_error() {
        let mut codec = FrameCodec::new(Framing::Abridged);
        let mut buf = vec![1];
        buf.extend((-404i32).to_le_bytes());
        assert_eq!(codec.decode(&mut buf), Err(FrameError::TransportError(-404)));
    }

    #[test]
    fn full_rejects_corruption_and_reordering() {
        let mut tx = FrameCodec::new(Framing::Full);
        let mut wire = Vec::new();
        tx.encode(&[7; 8], &mut wire);
        tx.encode(&[8; 8], &mut wire);

        let mut corrupted = wire.clone();
        corrupted[10] ^= 1;
        assert_eq!(FrameCodec::new(Framing::Full).decode(&mut corrupted), Err(FrameError::BadCrc));

        let second_only = wire[20..].to_vec();
        let mut buf = second_only;
        assert_eq!(
            FrameCodec::new(Framing::Full).decode(&mut buf),
            Err(FrameError::BadSeqNo { got: 1, expected: 0 })
        );
    }

    #[test]
    fn empty_frame_is_rejected() {
        let mut codec = FrameCodec::new(Framing::Abridged);
        let mut buf = vec![0];
        assert_eq!(codec.decode(&mut buf), Err(FrameError::BadLength(0)));
    }

    #[test]
    fn crc_known_value() {
        assert_eq!(crc32_ieee(b"123456789"), 0xcbf4_3926);
    }
}
