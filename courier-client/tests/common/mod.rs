//! In-memory loopback server for session tests.
//!
//! [`Loopback`] is a [`Connector`] that hands every new connection's far end
//! to the test through [`Accept`]. [`ServerConn`] speaks the intermediate
//! framing and encrypts as the server side of a preset auth key.

#![allow(dead_code)]

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use courier_client::session::{Session, SessionConfig};
use courier_client::transport::{BoxFuture, BoxedStream, Connector};
use courier_client::{Framing, NoRetries};
use courier_crypto::{AuthKey, DequeBuffer, Side, decrypt_data_v2_as, encrypt_data_v2_as};
use courier_mtproto::encrypted::parse_plaintext;
use courier_mtproto::{FrameCodec, Message};
use courier_tl_types::{LogicalMessage, Serializable, types};
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};
use tokio::sync::{Mutex, mpsc};
use tokio::time::timeout;

pub const KEY: [u8; 256] = [0x5a; 256];
const MSGS_ACK_ID: u32 = 0x62d6b459;

pub fn auth_key() -> AuthKey {
    AuthKey::from_bytes(KEY)
}

pub struct Loopback {
    tx: mpsc::UnboundedSender<DuplexStream>,
}

pub struct Accept {
    rx: mpsc::UnboundedReceiver<DuplexStream>,
}

pub fn loopback() -> (Arc<Loopback>, Accept) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Arc::new(Loopback { tx }), Accept { rx })
}

impl Connector for Loopback {
    fn connect<'a>(&'a self, _addr: &'a str) -> BoxFuture<'a, io::Result<BoxedStream>> {
        let (client, server) = tokio::io::duplex(1 << 20);
        let sent = self.tx.send(server);
        Box::pin(async move {
            sent.map_err(|_| io::Error::new(io::ErrorKind::ConnectionRefused, "server gone"))?;
            Ok(Box::new(client) as BoxedStream)
        })
    }
}

impl Accept {
    pub async fn next(&mut self) -> ServerConn {
        let stream = timeout(Duration::from_secs(5), self.rx.recv())
            .await
            .expect("no connection within 5s")
            .expect("connector dropped");
        ServerConn::new(stream)
    }
}

/// Session settings pointing at the loopback, with a preset key and no
/// background traffic.
pub fn session_config(connector: Arc<Loopback>) -> SessionConfig {
    let mut config = SessionConfig::new(2, "loopback");
    config.framing       = Framing::Intermediate;
    config.connector     = connector;
    config.auth_key      = Some(auth_key());
    config.ping_interval = Duration::from_secs(3600);
    config.retry_policy  = Arc::new(NoRetries);
    config
}

/// Start `session` against `accept`, answering its `initConnection`.
pub async fn start(session: &Session, accept: &mut Accept) -> ServerConn {
    let starting = {
        let session = session.clone();
        tokio::spawn(async move { session.start().await })
    };
    let mut conn = accept.next().await;
    conn.serve_init().await;
    starting.await.expect("start panicked").expect("start failed");
    conn
}

/// One decrypted client message.
#[derive(Debug)]
pub struct Incoming {
    pub salt:   i64,
    pub msg_id: i64,
    pub seq_no: i32,
    pub body:   Vec<u8>,
}

impl Incoming {
    pub fn constructor_id(&self) -> u32 {
        u32::from_le_bytes([self.body[0], self.body[1], self.body[2], self.body[3]])
    }
}

static SERVER_MSG_ID: AtomicI64 = AtomicI64::new(1 << 32);

fn server_msg_id() -> i64 {
    SERVER_MSG_ID.fetch_add(4, Ordering::Relaxed) | 1
}

pub struct ServerConn {
    stream:         DuplexStream,
    codec:          FrameCodec,
    buf:            Vec<u8>,
    tag_seen:       bool,
    key:            AuthKey,
    pub session_id: i64,
    pub salt:       i64,
    seq:            i32,
}

impl ServerConn {
    fn new(stream: DuplexStream) -> Self {
        Self {
            stream,
            codec: FrameCodec::new(Framing::Intermediate),
            buf: Vec::new(),
            tag_seen: false,
            key: auth_key(),
            session_id: 0,
            salt: 0,
            seq: 0,
        }
    }

    /// Next raw frame; the leading `0xeeeeeeee` tag is stripped.
    pub async fn recv_frame(&mut self) -> Vec<u8> {
        let mut chunk = [0u8; 64 * 1024];
        loop {
            if !self.tag_seen && self.buf.len() >= 4 {
                assert_eq!(&self.buf[..4], &[0xee; 4], "missing intermediate tag");
                self.buf.drain(..4);
                self.tag_seen = true;
            }
            if self.tag_seen {
                if let Some(frame) = self.codec.decode(&mut self.buf).expect("bad client frame") {
                    return frame;
                }
            }
            let n = timeout(Duration::from_secs(5), self.stream.read(&mut chunk))
                .await
                .expect("client silent for 5s")
                .expect("read failed");
            assert!(n > 0, "client closed the connection");
            self.buf.extend_from_slice(&chunk[..n]);
        }
    }

    /// Next plaintext (handshake) message.
    pub async fn recv_plain(&mut self) -> Message {
        let frame = self.recv_frame().await;
        Message::from_plaintext_bytes(&frame).expect("expected a plaintext message")
    }

    /// Next encrypted message, acks included.
    pub async fn recv(&mut self) -> Incoming {
        let mut frame = self.recv_frame().await;
        let plain = decrypt_data_v2_as(&mut frame, &self.key, Side::Server).expect("undecryptable client frame");
        let msg = parse_plaintext(plain).expect("bad plaintext");
        self.session_id = msg.session_id;
        Incoming { salt: msg.salt, msg_id: msg.msg_id, seq_no: msg.seq_no, body: msg.body }
    }

    /// Next request, skipping acknowledgements.
    pub async fn recv_request(&mut self) -> Incoming {
        loop {
            let msg = self.recv().await;
            if msg.constructor_id() != MSGS_ACK_ID {
                return msg;
            }
        }
    }

    /// Answer `initConnection` with a `nearestDc`.
    pub async fn serve_init(&mut self) -> Incoming {
        let init = self.recv_request().await;
        assert_eq!(init.constructor_id(), 0xda9b0d0d, "expected invokeWithLayer");
        let dc = types::NearestDc { country: "NL".into(), this_dc: 2, nearest_dc: 2 };
        self.reply(init.msg_id, &dc.to_bytes()).await;
        init
    }

    pub async fn send_raw(&mut self, payload: &[u8]) {
        let mut wire = (payload.len() as u32).to_le_bytes().to_vec();
        wire.extend_from_slice(payload);
        self.stream.write_all(&wire).await.expect("write failed");
    }

    /// Encrypt and send one message; returns its id.
    pub async fn send(&mut self, body: &[u8], content_related: bool) -> i64 {
        let msg_id = server_msg_id();
        let seq_no = if content_related {
            self.seq += 1;
            self.seq * 2 - 1
        } else {
            self.seq * 2
        };
        let mut buf = DequeBuffer::with_capacity(32 + body.len() + 32, 24);
        buf.extend(self.salt.to_le_bytes());
        buf.extend(self.session_id.to_le_bytes());
        buf.extend(msg_id.to_le_bytes());
        buf.extend(seq_no.to_le_bytes());
        buf.extend((body.len() as u32).to_le_bytes());
        buf.extend(body.iter().copied());
        encrypt_data_v2_as(&mut buf, &self.key, Side::Server);
        self.send_raw(&buf.into_vec()).await;
        msg_id
    }

    pub async fn reply(&mut self, req_msg_id: i64, result: &[u8]) {
        let body = LogicalMessage::RpcResult { req_msg_id, result: result.to_vec() }.encode();
        self.send(&body, true).await;
    }

    pub async fn reply_error(&mut self, req_msg_id: i64, code: i32, message: &str) {
        let err = types::RpcError { error_code: code, error_message: message.into() };
        self.reply(req_msg_id, &err.to_bytes()).await;
    }

    /// A transport-level error code, as a bare 4-byte frame.
    pub async fn send_transport_error(&mut self, code: i32) {
        self.send_raw(&code.to_le_bytes()).await;
    }
}
