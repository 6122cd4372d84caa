//! Message identifiers and the plaintext message used during key exchange.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Who produced a message, as encoded in the low two bits of its id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKind {
    /// `0b00`: sent by the client.
    Client,
    /// `0b01`: a server response to a client message.
    Response,
    /// `0b11`: a message the server initiated.
    Push,
}

impl MessageKind {
    /// `None` for `0b10`, which no valid message uses.
    pub fn of(msg_id: i64) -> Option<Self> {
        match msg_id & 3 {
            0 => Some(Self::Client),
            1 => Some(Self::Response),
            3 => Some(Self::Push),
            _ => None,
        }
    }
}

/// Allocates client message ids.
///
/// An id is `(unix_seconds + time_offset) << 32 | nanoseconds << 2`, so its
/// low two bits are zero. Ids are strictly increasing for the lifetime of the
/// generator: when the clock would produce an id not above the previous one,
/// the previous id plus 4 is used instead.
#[derive(Clone, Debug, Default)]
pub struct MsgIdGenerator {
    last: i64,
    time_offset: i32,
}

impl MsgIdGenerator {
    pub fn new(time_offset: i32) -> Self {
        Self { last: 0, time_offset }
    }

    pub fn next(&mut self) -> i64 {
        let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
        self.next_at(now)
    }

    /// Same as [`next`](Self::next) with an explicit wall-clock reading.
    pub fn next_at(&mut self, since_epoch: Duration) -> i64 {
        let secs = (since_epoch.as_secs() as i64 + self.time_offset as i64) as u64;
        let nanos = since_epoch.subsec_nanos() as u64;
        let mut id = ((secs << 32) | (nanos << 2)) as i64;
        if id <= self.last {
            id = self.last + 4;
        }
        self.last = id;
        id
    }

    pub fn time_offset(&self) -> i32 {
        self.time_offset
    }

    /// Re-derive the clock offset from a trusted server message id. Ids
    /// already handed out stay valid; the next one is still above them.
    pub fn correct_time_offset(&mut self, server_msg_id: i64) {
        let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
        self.correct_time_offset_at(server_msg_id, now);
    }

    pub fn correct_time_offset_at(&mut self, server_msg_id: i64, since_epoch: Duration) {
        let server_secs = server_msg_id >> 32;
        let offset = server_secs - since_epoch.as_secs() as i64;
        log::debug!("[courier] time offset corrected: {} -> {offset}", self.time_offset);
        self.time_offset = offset as i32;
    }
}

/// A message sent before an auth key exists (`auth_key_id = 0`).
#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    pub msg_id: i64,
    pub body: Vec<u8>,
}

impl Message {
    /// Plaintext wire layout:
    ///
    /// ```text
    /// auth_key_id:long  (0)
    /// message_id:long
    /// message_data_length:int
    /// message_data:bytes
    /// ```
    pub fn to_plaintext_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(20 + self.body.len());
        buf.extend(0i64.to_le_bytes());
        buf.extend(self.msg_id.to_le_bytes());
        buf.extend((self.body.len() as u32).to_le_bytes());
        buf.extend(&self.body);
        buf
    }

    /// Parse a plaintext frame. Returns `None` if the frame is not plaintext
    /// or its length field does not fit.
    pub fn from_plaintext_bytes(frame: &[u8]) -> Option<Self> {
        if frame.len() < 20 || frame[..8] != [0u8; 8] {
            return None;
        }
        let msg_id = i64::from_le_bytes(frame[8..16].try_into().ok()?);
        let len = u32::from_le_bytes(frame[16..20].try_into().ok()?) as usize;
        let body = frame.get(20..20 + len)?.to_vec();
        Some(Self { msg_id, body })
    }
}
