//! Plaintext message packing for the key exchange.

use courier_tl_types::{RemoteCall, Serializable};

use crate::message::{Message, MsgIdGenerator};

/// Packs handshake requests before an auth key exists.
///
/// Plaintext messages carry no sequence number or salt; only the message id
/// has to be fresh.
///
/// # Example
///
/// ```rust
/// use courier_mtproto::Session;
/// use courier_tl_types::functions;
///
/// let mut session = Session::new();
/// let msg = session.pack(&functions::ReqPqMulti { nonce: [0; 16] });
/// let wire = msg.to_plaintext_bytes();
/// assert_eq!(&wire[..8], &[0u8; 8]);
/// ```
#[derive(Debug, Default)]
pub struct Session {
    ids: MsgIdGenerator,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_msg_id(&mut self) -> i64 {
        self.ids.next()
    }

    /// Serialize `call` into a plaintext [`Message`].
    pub fn pack<R: RemoteCall>(&mut self, call: &R) -> Message {
        Message { msg_id: self.next_msg_id(), body: call.to_bytes() }
    }
}
