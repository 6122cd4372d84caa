//! Encrypted MTProto 2.0 session (post auth-key).
//!
//! Once the handshake has produced a key, every message goes through an
//! [`EncryptedSession`]: it owns the salt, the session id, the sequence
//! counter and the message-id clock, and turns bodies into wire payloads
//! and back.

use courier_crypto::{AuthKey, DequeBuffer, decrypt_data_v2, encrypt_data_v2};
use courier_tl_types::{RemoteCall, Serializable};

use crate::message::MsgIdGenerator;

/// salt + session_id + msg_id + seq_no + length
const HEADER_LEN: usize = 8 + 8 + 8 + 4 + 4;

/// Errors that can occur when decrypting a server message.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum DecryptError {
    /// The crypto layer rejected the message (wrong key or failed integrity check).
    #[error("crypto: {0}")]
    Crypto(#[from] courier_crypto::DecryptError),
    /// The decrypted plaintext is too short to hold the inner header.
    #[error("inner plaintext too short")]
    FrameTooShort,
    /// The message belongs to another session.
    #[error("session_id mismatch")]
    SessionMismatch,
    /// The declared body length does not fit the plaintext, or leaves
    /// padding outside the 12..=1024 byte window.
    #[error("message_data_length {declared} does not fit {available} bytes")]
    LengthMismatch { declared: usize, available: usize },
}

/// The inner payload extracted from a successfully decrypted server frame.
#[derive(Clone, Debug, PartialEq)]
pub struct DecryptedMessage {
    pub salt: i64,
    pub session_id: i64,
    pub msg_id: i64,
    pub seq_no: i32,
    pub body: Vec<u8>,
}

/// MTProto 2.0 encrypted session state.
pub struct EncryptedSession {
    auth_key: AuthKey,
    session_id: i64,
    sequence: i32,
    ids: MsgIdGenerator,
    salt: i64,
}

impl EncryptedSession {
    /// Start a new session on `auth_key` with a random session id.
    pub fn new(auth_key: AuthKey, first_salt: i64, time_offset: i32) -> Self {
        Self {
            auth_key,
            session_id: random_i64(),
            sequence: 0,
            ids: MsgIdGenerator::new(time_offset),
            salt: first_salt,
        }
    }

    pub fn auth_key(&self) -> &AuthKey {
        &self.auth_key
    }

    pub fn session_id(&self) -> i64 {
        self.session_id
    }

    pub fn salt(&self) -> i64 {
        self.salt
    }

    pub fn set_salt(&mut self, salt: i64) {
        self.salt = salt;
    }

    pub fn time_offset(&self) -> i32 {
        self.ids.time_offset()
    }

    /// Adopt the server clock after a `bad_msg_notification` 16/17.
    pub fn correct_time_offset(&mut self, server_msg_id: i64) {
        self.ids.correct_time_offset(server_msg_id);
    }

    pub fn next_msg_id(&mut self) -> i64 {
        self.ids.next()
    }

    /// Content-related messages get `2n + 1` and advance the counter;
    /// service messages get `2n`.
    pub fn next_seq_no(&mut self, content_related: bool) -> i32 {
        if content_related {
            let n = self.sequence * 2 + 1;
            self.sequence += 1;
            n
        } else {
            self.sequence * 2
        }
    }

    /// Wrap and encrypt `body` under a fresh message id.
    ///
    /// Returns `(wire_payload, msg_id, seq_no)`; keep the last two if the
    /// message may have to be retransmitted with [`repack`](Self::repack).
    pub fn pack_body(&mut self, body: &[u8], content_related: bool) -> (Vec<u8>, i64, i32) {
        let msg_id = self.next_msg_id();
        let seq_no = self.next_seq_no(content_related);
        (self.repack(msg_id, seq_no, body), msg_id, seq_no)
    }

    /// Encrypt `body` under an id and sequence number allocated earlier,
    /// using the current salt.
    pub fn repack(&self, msg_id: i64, seq_no: i32, body: &[u8]) -> Vec<u8> {
        let mut buf = DequeBuffer::with_capacity(HEADER_LEN + body.len() + 32, 24);
        buf.extend(self.salt.to_le_bytes());
        buf.extend(self.session_id.to_le_bytes());
        buf.extend(msg_id.to_le_bytes());
        buf.extend(seq_no.to_le_bytes());
        buf.extend((body.len() as u32).to_le_bytes());
        buf.extend(body.iter().copied());
        encrypt_data_v2(&mut buf, &self.auth_key);
        buf.into_vec()
    }

    /// Serialize and pack an RPC as a content-related message.
    pub fn pack<R: RemoteCall>(&mut self, call: &R) -> (Vec<u8>, i64) {
        let (wire, msg_id, _) = self.pack_body(&call.to_bytes(), true);
        (wire, msg_id)
    }

    /// Decrypt an incoming frame and check that it belongs to this session.
    pub fn decrypt_frame(&self, frame: &mut [u8]) -> Result<DecryptedMessage, DecryptError> {
        let plaintext = decrypt_data_v2(frame, &self.auth_key)?;
        let msg = parse_plaintext(plaintext)?;
        if msg.session_id != self.session_id {
            return Err(DecryptError::SessionMismatch);
        }
        Ok(msg)
    }
}

/// Split a decrypted plaintext into header fields and body.
pub fn parse_plaintext(plaintext: &[u8]) -> Result<DecryptedMessage, DecryptError> {
    if plaintext.len() < HEADER_LEN {
        return Err(DecryptError::FrameTooShort);
    }
    let le_i64 = |at: usize| {
        let mut b = [0u8; 8];
        b.copy_from_slice(&plaintext[at..at + 8]);
        i64::from_le_bytes(b)
    };
    let le_u32 = |at: usize| {
        let mut b = [0u8; 4];
        b.copy_from_slice(&plaintext[at..at + 4]);
        u32::from_le_bytes(b)
    };

    let declared = le_u32(28) as usize;
    let available = plaintext.len() - HEADER_LEN;
    let padding = available.checked_sub(declared);
    if !matches!(padding, Some(12..=1024)) || declared % 4 != 0 {
        return Err(DecryptError::LengthMismatch { declared, available });
    }

    Ok(DecryptedMessage {
        salt: le_i64(0),
        session_id: le_i64(8),
        msg_id: le_i64(16),
        seq_no: le_u32(24) as i32,
        body: plaintext[HEADER_LEN..HEADER_LEN + declared].to_vec(),
    })
}

fn random_i64() -> i64 {
    let mut rnd = [0u8; 8];
    getrandom::getrandom(&mut rnd).expect("OS random source unavailable");
    i64::from_le_bytes(rnd)
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_crypto::{Side, decrypt_data_v2_as, encrypt_data_v2_as};

    fn session() -> EncryptedSession {
        EncryptedSession::new(AuthKey::from_bytes([0x5a; 256]), 77, 0)
    }

    /// Build a frame the way the server would.
    fn server_frame(s: &EncryptedSession, session_id: i64, body: &[u8], body_len: u32) -> Vec<u8> {
        let mut buf = DequeBuffer::with_capacity(HEADER_LEN + body.len(), 24);
        buf.extend(1i64.to_le_bytes());
        buf.extend(session_id.to_le_bytes());
        buf.extend(((100i64 << 32) | 1).to_le_bytes());
        buf.extend(1i32.to_le_bytes());
        buf.extend(body_len.to_le_bytes());
        buf.extend(body.iter().copied());
        encrypt_data_v2_as(&mut buf, s.auth_key(), Side::Server);
        buf.into_vec()
    }

    #[test]
    fn seq_no_parity() {
        let mut s = session();
        assert_eq!(s.next_seq_no(false), 0);
        assert_eq!(s.next_seq_no(true), 1);
        assert_eq!(s.next_seq_no(true), 3);
        assert_eq!(s.next_seq_no(false), 4);
    }

    #[test]
    fn repack_keeps_id_and_adopts_salt() {
        let mut s = session();
        let (_, msg_id, seq_no) = s.pack_body(&[1, 2, 3, 4], true);
        s.set_salt(99);
        let mut wire = s.repack(msg_id, seq_no, &[1, 2, 3, 4]);

        let plain = decrypt_data_v2_as(&mut wire, s.auth_key(), Side::Server).unwrap();
        let msg = parse_plaintext(plain).unwrap();
        assert_eq!(msg.salt, 99);
        assert_eq!(msg.msg_id, msg_id);
        assert_eq!(msg.seq_no, seq_no);
        assert_eq!(msg.body, [1, 2, 3, 4]);
    }

    #[test]
    fn decrypts_server_frame() {
        let s = session();
        let mut frame = server_frame(&s, s.session_id(), &[9; 8], 8);
        let msg = s.decrypt_frame(&mut frame).unwrap();
        assert_eq!(msg.body, [9; 8]);
        assert_eq!(msg.seq_no, 1);
    }

    #[test]
    fn foreign_session_is_rejected() {
        let s = session();
        let mut frame = server_frame(&s, s.session_id() ^ 1, &[9; 8], 8);
        assert_eq!(s.decrypt_frame(&mut frame), Err(DecryptError::SessionMismatch));
    }

    #[test]
    fn oversized_length_is_rejected() {
        let s = session();
        let mut frame = server_frame(&s, s.session_id(), &[9; 8], 4096);
        assert!(matches!(s.decrypt_frame(&mut frame), Err(DecryptError::LengthMismatch { .. })));
    }
}
