//! Async byte-stream transport: connects, then moves whole frames.
//!
//! Framing itself lives in [`courier_mtproto::FrameCodec`]; this module only
//! pumps bytes between a socket and the codec. Every I/O error and framing
//! violation is returned to the caller as fatal for the connection. Nothing
//! here retries.

use std::future::Future;
use std::io;
use std::pin::Pin;

use courier_mtproto::{FrameCodec, Framing};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::net::TcpStream;

use crate::errors::InvocationError;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Anything that can carry the MTProto byte stream.
pub trait AsyncStream: AsyncRead + AsyncWrite + Send + Unpin + 'static {}

impl<T: AsyncRead + AsyncWrite + Send + Unpin + 'static> AsyncStream for T {}

pub type BoxedStream = Box<dyn AsyncStream>;

/// Opens the raw stream to a DC address.
///
/// The default is [`TcpConnector`]; tests plug in in-memory duplex pipes.
pub trait Connector: Send + Sync + 'static {
    fn connect<'a>(&'a self, addr: &'a str) -> BoxFuture<'a, io::Result<BoxedStream>>;
}

/// Plain TCP with Nagle disabled.
#[derive(Clone, Copy, Debug, Default)]
pub struct TcpConnector;

impl Connector for TcpConnector {
    fn connect<'a>(&'a self, addr: &'a str) -> BoxFuture<'a, io::Result<BoxedStream>> {
        Box::pin(async move {
            let stream = TcpStream::connect(addr).await?;
            stream.set_nodelay(true)?;
            Ok(Box::new(stream) as BoxedStream)
        })
    }
}

/// Open a connection and split it into framed halves.
pub async fn connect(
    connector: &dyn Connector,
    addr: &str,
    framing: Framing,
) -> io::Result<(FrameReader, FrameWriter)> {
    let stream = connector.connect(addr).await?;
    let (read, write) = tokio::io::split(stream);
    Ok((
        FrameReader { half: read, codec: FrameCodec::new(framing), buf: Vec::new() },
        FrameWriter { half: write, codec: FrameCodec::new(framing), out: Vec::new() },
    ))
}

/// Receiving half of a connection.
pub struct FrameReader {
    half:  ReadHalf<BoxedStream>,
    codec: FrameCodec,
    buf:   Vec<u8>,
}

impl FrameReader {
    /// Wait for the next complete frame. EOF is an I/O error.
    pub async fn next_frame(&mut self) -> Result<Vec<u8>, InvocationError> {
        let mut chunk = [0u8; 16 * 1024];
        loop {
            if let Some(frame) = self.codec.decode(&mut self.buf)? {
                return Ok(frame);
            }
            let n = self.half.read(&mut chunk).await?;
            if n == 0 {
                return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "connection closed by peer").into());
            }
            self.buf.extend_from_slice(&chunk[..n]);
        }
    }
}

/// Sending half of a connection.
pub struct FrameWriter {
    half:  WriteHalf<BoxedStream>,
    codec: FrameCodec,
    out:   Vec<u8>,
}

impl FrameWriter {
    pub async fn send(&mut self, payload: &[u8]) -> io::Result<()> {
        self.out.clear();
        self.codec.encode(payload, &mut self.out);
        self.half.write_all(&self.out).await?;
        self.half.flush().await
    }

    pub async fn close(&mut self) -> io::Result<()> {
        self.half.shutdown().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Duplex(std::sync::Mutex<Option<tokio::io::DuplexStream>>);

    impl Connector for Duplex {
        fn connect<'a>(&'a self, _: &'a str) -> BoxFuture<'a, io::Result<BoxedStream>> {
            let stream = self.0.lock().unwrap().take();
            Box::pin(async move {
                stream
                    .map(|s| Box::new(s) as BoxedStream)
                    .ok_or_else(|| io::Error::new(io::ErrorKind::ConnectionRefused, "used"))
            })
        }
    }

    #[tokio::test]
    async fn frames_cross_the_pipe() {
        let (client, mut server) = tokio::io::duplex(1024);
        let connector = Duplex(std::sync::Mutex::new(Some(client)));
        let (mut rx, mut tx) = connect(&connector, "loopback", Framing::Intermediate).await.unwrap();

        tx.send(&[1, 2, 3, 4]).await.unwrap();
        let mut wire = [0u8; 12];
        server.read_exact(&mut wire).await.unwrap();
        assert_eq!(wire, [0xee, 0xee, 0xee, 0xee, 4, 0, 0, 0, 1, 2, 3, 4]);

        // Split across two writes.
        server.write_all(&[8, 0, 0, 0, 9, 9]).await.unwrap();
        server.write_all(&[9, 9, 9, 9, 9, 9]).await.unwrap();
        assert_eq!(rx.next_frame().await.unwrap(), vec![9; 8]);
    }

    #[tokio::test]
    async fn eof_is_fatal() {
        let (client, server) = tokio::io::duplex(64);
        let connector = Duplex(std::sync::Mutex::new(Some(client)));
        let (mut rx, _tx) = connect(&connector, "loopback", Framing::Abridged).await.unwrap();
        drop(server);
        assert!(matches!(rx.next_frame().await, Err(InvocationError::Io(_))));
    }

    #[tokio::test]
    async fn transport_error_code_surfaces() {
        let (client, mut server) = tokio::io::duplex(64);
        let connector = Duplex(std::sync::Mutex::new(Some(client)));
        let (mut rx, _tx) = connect(&connector, "loopback", Framing::Abridged).await.unwrap();
        server.write_all(&[1]).await.unwrap();
        server.write_all(&(-404i32).to_le_bytes()).await.unwrap();
        assert!(matches!(
            rx.next_frame().await,
            Err(InvocationError::Transport(courier_mtproto::FrameError::TransportError(-404)))
        ));
    }
}
