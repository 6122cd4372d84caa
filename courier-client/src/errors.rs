//! Errors surfaced by sessions, the client and update handlers.

use std::{fmt, io};

use courier_mtproto::{FrameError, authentication, encrypted};
use courier_tl_types::deserialize;

// ─── RpcError ─────────────────────────────────────────────────────────────────

/// An `rpc_error` answer, split into its name and optional numeric argument:
/// `420 FLOOD_WAIT_30` becomes `code: 420, name: "FLOOD_WAIT", value: Some(30)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RpcError {
    pub code:  i32,
    pub name:  String,
    pub value: Option<u32>,
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Some(v) => write!(f, "rpc error {} {}_{v}", self.code, self.name),
            None    => write!(f, "rpc error {} {}", self.code, self.name),
        }
    }
}

impl std::error::Error for RpcError {}

impl RpcError {
    pub fn from_telegram(code: i32, message: &str) -> Self {
        let split = message
            .rsplit_once('_')
            .filter(|(_, digits)| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|(name, digits)| Some((name, digits.parse().ok()?)));
        match split {
            Some((name, value)) => Self { code, name: name.to_string(), value: Some(value) },
            None                => Self { code, name: message.to_string(), value: None },
        }
    }

    /// Name match; a leading or trailing `*` matches any suffix or prefix
    /// (`"PHONE_*"`, `"*_INVALID"`).
    pub fn is(&self, pattern: &str) -> bool {
        match (pattern.strip_suffix('*'), pattern.strip_prefix('*')) {
            (Some(head), _) => self.name.starts_with(head),
            (None, Some(tail)) => self.name.ends_with(tail),
            (None, None) => self.name == pattern,
        }
    }

    /// Seconds to wait for `420 FLOOD_WAIT_X` and `420 FLOOD_PREMIUM_WAIT_X`.
    pub fn flood_wait_seconds(&self) -> Option<u64> {
        let flood = matches!(self.name.as_str(), "FLOOD_WAIT" | "FLOOD_PREMIUM_WAIT");
        self.value.filter(|_| self.code == 420 && flood).map(u64::from)
    }

    /// Target DC of a `303 *_MIGRATE_X` redirect.
    pub fn migrate_dc(&self) -> Option<i32> {
        let value = self.value.filter(|_| self.code == 303 && self.is("*_MIGRATE"))?;
        i32::try_from(value).ok()
    }
}

// ─── InvocationError ──────────────────────────────────────────────────────────

/// Why a call to the server did not produce a result.
#[derive(Debug, thiserror::Error)]
pub enum InvocationError {
    #[error(transparent)]
    Rpc(RpcError),
    #[error("i/o: {0}")]
    Io(#[from] io::Error),
    /// The answer did not decode as the expected type.
    #[error("undecodable answer: {0}")]
    Deserialize(#[from] deserialize::Error),
    /// The byte stream violated the framing contract.
    #[error("transport error: {0}")]
    Transport(#[from] FrameError),
    /// A server message failed decryption or its integrity check.
    #[error("integrity failure: {0}")]
    Integrity(#[from] encrypted::DecryptError),
    /// Auth key generation failed.
    #[error("handshake failed: {0}")]
    Handshake(#[from] authentication::Error),
    /// No answer arrived within the request timeout.
    #[error("request timed out")]
    Timeout,
    /// Reconnect attempts were exhausted.
    #[error("connection lost")]
    ConnectionLost,
    /// The session shut down before the request resolved.
    #[error("request dropped")]
    Dropped,
    /// The session never reached the connected state.
    #[error("not connected")]
    NotConnected,
    /// A CDN chunk did not match the hash the server published for it.
    #[error("CDN chunk at offset {offset} failed hash verification")]
    CdnHashMismatch { offset: i64 },
}

impl InvocationError {
    /// [`RpcError::is`] for RPC errors; `false` otherwise.
    pub fn is(&self, pattern: &str) -> bool {
        self.rpc().is_some_and(|e| e.is(pattern))
    }

    pub fn flood_wait_seconds(&self) -> Option<u64> {
        self.rpc()?.flood_wait_seconds()
    }

    pub fn rpc(&self) -> Option<&RpcError> {
        match self {
            Self::Rpc(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RpcError> for InvocationError {
    fn from(e: RpcError) -> Self { Self::Rpc(e) }
}

// ─── HandlerError ─────────────────────────────────────────────────────────────

/// What an update handler returns instead of `Ok(())`.
///
/// The two propagation variants are control flow, not failures: they steer
/// the dispatch pass (see [`crate::dispatcher`]).
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// End the dispatch pass for this update.
    #[error("stop propagation")]
    StopPropagation,
    /// Let the next handler of the same group try the update.
    #[error("continue propagation")]
    ContinuePropagation,
    /// The handler failed; the error is logged and the pass moves to the next group.
    #[error(transparent)]
    Failed(Box<dyn std::error::Error + Send + Sync>),
}

impl From<InvocationError> for HandlerError {
    fn from(e: InvocationError) -> Self { Self::Failed(Box::new(e)) }
}

impl From<io::Error> for HandlerError {
    fn from(e: io::Error) -> Self { Self::Failed(Box::new(e)) }
}
