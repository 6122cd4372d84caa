//! TL binary codec for MTProto.
//!
//! Primitive encodings, the service-message envelopes, and the subset of the
//! Telegram API schema that the client core reads on its own (update
//! containers, update-state recovery, file transfer, DC authorization).
//! A full generated schema plugs into the same traits.
//!
//! [`types`] holds constructors, [`enums`] the boxed types that dispatch on
//! the leading tag, [`functions`] the requests, and [`message`] the decoded
//! body of an incoming MTProto message.
//!
//! # Example
//!
//! ```rust
//! use courier_tl_types::{functions, Deserializable, Serializable};
//!
//! let req = functions::updates::GetState {};
//! let bytes = req.to_bytes();
//! assert_eq!(bytes, 0xedd4882a_u32.to_le_bytes());
//!
//! let back = i32::from_bytes(&7i32.to_bytes()).unwrap();
//! assert_eq!(back, 7);
//! ```

#![deny(unsafe_code)]
#![allow(clippy::large_enum_variant)]

pub mod deserialize;
pub mod serialize;
#[macro_use]
mod macros;
pub mod enums;
pub mod functions;
pub mod message;
pub mod types;

pub use deserialize::{Cursor, Deserializable};
pub use message::{ContainerMessage, LogicalMessage};
pub use serialize::Serializable;

/// API layer the schema subset is taken from.
pub const LAYER: i32 = 224;

/// Constructor id of the boxed `Vector` type.
pub const VECTOR_ID: u32 = 0x1cb5c415;

/// Bare `vector<T>`: a count and the items, with no `Vector` tag in front.
#[derive(Clone, Debug, PartialEq)]
pub struct RawVec<T>(pub Vec<T>);

/// Undecoded bytes, kept for answers the core forwards without reading.
#[derive(Clone, Debug, PartialEq)]
pub struct Blob(pub Vec<u8>);

impl From<Vec<u8>> for Blob {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

// ─── Core traits ──────────────────────────────────────────────────────────────

pub trait Identifiable {
    const CONSTRUCTOR_ID: u32;
}

/// A request whose answer decodes as `Return`.
pub trait RemoteCall: Serializable {
    type Return: Deserializable;
}

// ─── Flag helpers ─────────────────────────────────────────────────────────────

pub(crate) fn flag(on: bool, bit: u32) -> u32 {
    u32::from(on) << bit
}

pub(crate) fn has(flags: u32, bit: u32) -> bool {
    flags >> bit & 1 == 1
}

/// The field behind `bit`, if the flags word has it set.
pub(crate) fn read_if<T: Deserializable>(
    flags: u32,
    bit: u32,
    buf: deserialize::Buffer,
) -> deserialize::Result<Option<T>> {
    match flags >> bit & 1 {
        1 => T::deserialize(buf).map(Some),
        _ => Ok(None),
    }
}

/// Fails on a present field whose type this schema subset does not model,
/// naming the tag found there.
pub(crate) fn unsupported<T>(buf: deserialize::Buffer) -> deserialize::Result<T> {
    Err(deserialize::Error::UnexpectedConstructor { id: buf.peek_id()? })
}
