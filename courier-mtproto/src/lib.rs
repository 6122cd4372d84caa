//! Sans-IO MTProto 2.0.
//!
//! This crate handles:
//! * Stream framing ([`transport`]): abridged, intermediate and full
//! * Message ids and the plaintext envelope used during key exchange
//! * The DH handshake that produces an auth key ([`authentication`])
//! * Packing and opening encrypted messages ([`EncryptedSession`])
//!
//! No sockets are opened here: feed bytes in, take bytes out.

#![deny(unsafe_code)]

pub mod authentication;
pub mod encrypted;
pub mod message;
pub mod session;
pub mod transport;

pub use encrypted::{DecryptedMessage, EncryptedSession};
pub use message::{Message, MessageKind, MsgIdGenerator};
pub use session::Session;
pub use transport::{FrameCodec, FrameError, Framing};
