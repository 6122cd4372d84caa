//! Top-level bodies of incoming MTProto messages.
//!
//! A decrypted message body is either a service object (ack, pong, salt
//! correction, …), a container of further messages, a compressed object, an
//! RPC result, or an `Updates` push. [`LogicalMessage::decode`] peeks the
//! leading constructor id and dispatches through a static table.

use crate::deserialize::{Buffer, Cursor, Error, Result};
use crate::{Deserializable, Identifiable, Serializable, enums, types};

/// `rpc_result#f35c6d01 req_msg_id:long result:Object`
pub const RPC_RESULT_ID: u32 = 0xf35c6d01;

/// `msg_container#73f1f8dc messages:vector<message>`
pub const MSG_CONTAINER_ID: u32 = 0x73f1f8dc;

/// One inner message of a `msg_container`.
#[derive(Clone, Debug, PartialEq)]
pub struct ContainerMessage {
    pub msg_id: i64,
    pub seqno: i32,
    pub body: Vec<u8>,
}

impl ContainerMessage {
    /// Content-related messages carry an odd sequence number and must be acknowledged.
    pub fn is_content_related(&self) -> bool {
        self.seqno & 1 == 1
    }
}

/// The decoded top-level body of an incoming message.
#[derive(Clone, Debug, PartialEq)]
pub enum LogicalMessage {
    /// Answer to the request sent under `req_msg_id`. `result` is the raw
    /// serialized object; it may itself be an `rpc_error` or `gzip_packed`.
    RpcResult { req_msg_id: i64, result: Vec<u8> },
    Container(Vec<ContainerMessage>),
    Gzip(types::GzipPacked),
    Ack(types::MsgsAck),
    Pong(types::Pong),
    BadServerSalt(types::BadServerSalt),
    BadMsgNotification(types::BadMsgNotification),
    NewSessionCreated(types::NewSessionCreated),
    DetailedInfo(enums::MsgDetailedInfo),
    Updates(enums::Updates),
}

type DecodeFn = fn(Buffer) -> Result<LogicalMessage>;

/// Decoders receive the cursor positioned on the constructor id.
static REGISTRY: &[(u32, DecodeFn)] = &[
    (RPC_RESULT_ID, decode_rpc_result),
    (MSG_CONTAINER_ID, decode_container),
    (types::GzipPacked::CONSTRUCTOR_ID, |b| bare(b).map(LogicalMessage::Gzip)),
    (types::MsgsAck::CONSTRUCTOR_ID, |b| bare(b).map(LogicalMessage::Ack)),
    (types::Pong::CONSTRUCTOR_ID, |b| bare(b).map(LogicalMessage::Pong)),
    (types::BadServerSalt::CONSTRUCTOR_ID, |b| bare(b).map(LogicalMessage::BadServerSalt)),
    (types::BadMsgNotification::CONSTRUCTOR_ID, |b| bare(b).map(LogicalMessage::BadMsgNotification)),
    (types::NewSessionCreated::CONSTRUCTOR_ID, |b| bare(b).map(LogicalMessage::NewSessionCreated)),
    (types::MsgDetailedInfo::CONSTRUCTOR_ID, decode_detailed_info),
    (types::MsgNewDetailedInfo::CONSTRUCTOR_ID, decode_detailed_info),
    (types::UpdatesTooLong::CONSTRUCTOR_ID, decode_updates),
    (types::UpdateShortMessage::CONSTRUCTOR_ID, decode_updates),
    (types::UpdateShortChatMessage::CONSTRUCTOR_ID, decode_updates),
    (types::UpdateShort::CONSTRUCTOR_ID, decode_updates),
    (types::UpdatesCombined::CONSTRUCTOR_ID, decode_updates),
    (types::Updates::CONSTRUCTOR_ID, decode_updates),
    (types::UpdateShortSentMessage::CONSTRUCTOR_ID, decode_updates),
];

fn bare<T: Deserializable>(buf: Buffer) -> Result<T> {
    u32::deserialize(buf)?;
    T::deserialize(buf)
}

fn decode_rpc_result(buf: Buffer) -> Result<LogicalMessage> {
    u32::deserialize(buf)?;
    let req_msg_id = i64::deserialize(buf)?;
    let mut result = Vec::new();
    buf.read_to_end(&mut result);
    Ok(LogicalMessage::RpcResult { req_msg_id, result })
}

fn decode_container(buf: Buffer) -> Result<LogicalMessage> {
    u32::deserialize(buf)?;
    let count = i32::deserialize(buf)?.max(0) as usize;
    // msg_id + seqno + length
    if count > buf.remaining() / 16 {
        return Err(Error::UnexpectedEof);
    }
    let mut messages = Vec::with_capacity(count);
    for _ in 0..count {
        let msg_id = i64::deserialize(buf)?;
        let seqno = i32::deserialize(buf)?;
        let len = i32::deserialize(buf)?.max(0) as usize;
        let body = buf.read_slice(len)?.to_vec();
        messages.push(ContainerMessage { msg_id, seqno, body });
    }
    Ok(LogicalMessage::Container(messages))
}

fn decode_detailed_info(buf: Buffer) -> Result<LogicalMessage> {
    enums::MsgDetailedInfo::deserialize(buf).map(LogicalMessage::DetailedInfo)
}

fn decode_updates(buf: Buffer) -> Result<LogicalMessage> {
    enums::Updates::deserialize(buf).map(LogicalMessage::Updates)
}

impl LogicalMessage {
    /// Decode a message body. Unknown constructor ids are reported, not skipped.
    pub fn decode(body: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::from_slice(body);
        let id = cursor.peek_id()?;
        let (_, decode) = REGISTRY
            .iter()
            .find(|(tag, _)| *tag == id)
            .ok_or(Error::UnexpectedConstructor { id })?;
        decode(&mut cursor)
    }

    /// Serialize back to the exact bytes [`decode`](Self::decode) accepts.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        match self {
            Self::RpcResult { req_msg_id, result } => {
                RPC_RESULT_ID.serialize(&mut buf);
                req_msg_id.serialize(&mut buf);
                buf.extend_from_slice(result);
            }
            Self::Container(messages) => {
                MSG_CONTAINER_ID.serialize(&mut buf);
                (messages.len() as i32).serialize(&mut buf);
                for m in messages {
                    m.msg_id.serialize(&mut buf);
                    m.seqno.serialize(&mut buf);
                    (m.body.len() as i32).serialize(&mut buf);
                    buf.extend_from_slice(&m.body);
                }
            }
            Self::Gzip(x) => x.serialize(&mut buf),
            Self::Ack(x) => x.serialize(&mut buf),
            Self::Pong(x) => x.serialize(&mut buf),
            Self::BadServerSalt(x) => x.serialize(&mut buf),
            Self::BadMsgNotification(x) => x.serialize(&mut buf),
            Self::NewSessionCreated(x) => x.serialize(&mut buf),
            Self::DetailedInfo(x) => x.serialize(&mut buf),
            Self::Updates(x) => x.serialize(&mut buf),
        }
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_tag_is_reported() {
        let body = 0xdeadbeef_u32.to_le_bytes();
        assert_eq!(
            LogicalMessage::decode(&body),
            Err(Error::UnexpectedConstructor { id: 0xdeadbeef })
        );
    }

    #[test]
    fn container_keeps_inner_order() {
        let msg = LogicalMessage::Container(vec![
            ContainerMessage { msg_id: 8, seqno: 3, body: vec![1, 2, 3, 4] },
            ContainerMessage { msg_id: 4, seqno: 2, body: vec![] },
        ]);
        let bytes = msg.encode();
        assert_eq!(LogicalMessage::decode(&bytes), Ok(msg));
    }

    #[test]
    fn truncated_container_fails() {
        let mut bytes = LogicalMessage::Container(vec![ContainerMessage {
            msg_id: 1,
            seqno: 1,
            body: vec![0; 8],
        }])
        .encode();
        bytes.truncate(bytes.len() - 2);
        assert_eq!(LogicalMessage::decode(&bytes), Err(Error::UnexpectedEof));
    }
}
