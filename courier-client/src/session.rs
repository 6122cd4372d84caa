//! One encrypted MTProto session to one data center.
//!
//! A [`Session`] owns the connection, the auth key, the in-flight request
//! table and the background tasks that keep all of them alive:
//!
//! * the **supervisor** reads frames, routes every decoded message and
//!   reconnects with backoff when the connection dies;
//! * the **pinger** sends `ping_delay_disconnect` so the server keeps the
//!   socket open;
//! * the **watchdog** polls `updates.getState` when no push arrived for a
//!   while.
//!
//! ```text
//! Disconnected ─start()─▶ Connecting ─(no key)─▶ Handshaking ─▶ Connected
//!                              ▲                                    │
//!                              └──────── I/O or framing error ──────┘
//! ```
//!
//! Lock order: the writer lock may be held while briefly taking the crypto
//! or pending lock; those two are never nested.

use std::collections::VecDeque;
use std::io;
use std::num::NonZeroU32;
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use courier_crypto::AuthKey;
use courier_mtproto::authentication::{self, Finished, Outcome};
use courier_mtproto::encrypted::DecryptError;
use courier_mtproto::{DecryptedMessage, EncryptedSession, FrameError, Framing, Message};
use courier_tl_types::{
    Blob, Cursor, Deserializable, Identifiable, LogicalMessage, RemoteCall, Serializable, enums, functions, types,
};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{Instant, sleep, timeout, timeout_at};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::errors::{InvocationError, RpcError};
use crate::pending::{Pending, PendingGuard, PendingTable, Reply};
use crate::retry::{AutoSleep, RetryContext, RetryPolicy};
use crate::sequence::DifferenceSource;
use crate::storage::Storage;
use crate::transport::{self, Connector, FrameReader, FrameWriter, TcpConnector};

const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(15);

const UPDATES_IDS: [u32; 7] = [
    types::UpdatesTooLong::CONSTRUCTOR_ID,
    types::UpdateShortMessage::CONSTRUCTOR_ID,
    types::UpdateShortChatMessage::CONSTRUCTOR_ID,
    types::UpdateShort::CONSTRUCTOR_ID,
    types::UpdatesCombined::CONSTRUCTOR_ID,
    types::Updates::CONSTRUCTOR_ID,
    types::UpdateShortSentMessage::CONSTRUCTOR_ID,
];

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn random_i64() -> i64 {
    let mut buf = [0u8; 8];
    if getrandom::getrandom(&mut buf).is_err() {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();
        buf = nanos.to_le_bytes();
    }
    i64::from_le_bytes(buf)
}

// ─── Public types ─────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Handshaking,
    Connected,
}

/// Server-initiated events handed to the update sequencer.
#[derive(Clone, Debug)]
pub enum Push {
    Updates(enums::Updates),
    /// The server opened a new session for us; updates may have been lost.
    SessionCreated,
    /// The connection was re-established; updates may have been lost.
    Reconnected,
}

/// Strings sent in `initConnection`.
#[derive(Clone, Debug)]
pub struct InitParams {
    pub api_id:           i32,
    pub device_model:     String,
    pub system_version:   String,
    pub app_version:      String,
    pub system_lang_code: String,
    pub lang_pack:        String,
    pub lang_code:        String,
}

impl Default for InitParams {
    fn default() -> Self {
        Self {
            api_id:           0,
            device_model:     "courier".to_string(),
            system_version:   std::env::consts::OS.to_string(),
            app_version:      env!("CARGO_PKG_VERSION").to_string(),
            system_lang_code: "en".to_string(),
            lang_pack:        String::new(),
            lang_code:        "en".to_string(),
        }
    }
}

impl InitParams {
    /// `invokeWithLayer(initConnection(help.getNearestDc))`.
    fn request(&self) -> Vec<u8> {
        functions::InvokeWithLayer {
            layer: courier_tl_types::LAYER,
            query: functions::InitConnection {
                api_id:           self.api_id,
                device_model:     self.device_model.clone(),
                system_version:   self.system_version.clone(),
                app_version:      self.app_version.clone(),
                system_lang_code: self.system_lang_code.clone(),
                lang_pack:        self.lang_pack.clone(),
                lang_code:        self.lang_code.clone(),
                query:            functions::help::GetNearestDc {},
            },
        }
        .to_bytes()
    }
}

pub struct SessionConfig {
    pub dc_id:                 i32,
    pub addr:                  String,
    pub framing:               Framing,
    pub connector:             Arc<dyn Connector>,
    /// Where a newly generated (or rejected) auth key is recorded.
    pub storage:               Option<Arc<dyn Storage>>,
    /// Reuse this key instead of running the handshake.
    pub auth_key:              Option<AuthKey>,
    pub init:                  InitParams,
    pub ping_interval:         Duration,
    pub max_reconnect_retries: u32,
    pub request_timeout:       Duration,
    pub sleep_threshold:       Duration,
    pub retry_policy:          Arc<dyn RetryPolicy>,
    pub watchdog_interval:     Option<Duration>,
    pub push_tx:               Option<mpsc::UnboundedSender<Push>>,
}

impl SessionConfig {
    pub fn new(dc_id: i32, addr: impl Into<String>) -> Self {
        Self {
            dc_id,
            addr:                  addr.into(),
            framing:               Framing::Abridged,
            connector:             Arc::new(TcpConnector),
            storage:               None,
            auth_key:              None,
            init:                  InitParams::default(),
            ping_interval:         Duration::from_secs(5),
            max_reconnect_retries: 5,
            request_timeout:       Duration::from_secs(15),
            sleep_threshold:       Duration::from_secs(10),
            retry_policy:          Arc::new(AutoSleep),
            watchdog_interval:     None,
            push_tx:               None,
        }
    }
}

/// Per-call overrides for [`Session::invoke_with`].
#[derive(Clone, Debug, Default)]
pub struct InvokeOptions {
    /// Longest flood wait absorbed by sleeping; defaults to the session's.
    pub sleep_threshold:        Option<Duration>,
    /// Run the request on behalf of this business connection.
    pub business_connection_id: Option<String>,
    pub timeout:                Option<Duration>,
}

// ─── Session ──────────────────────────────────────────────────────────────────

/// Cheap to clone; all clones drive the same connection.
#[derive(Clone)]
pub struct Session {
    inner: Arc<Inner>,
}

struct Inner {
    dc_id:                 i32,
    addr:                  String,
    framing:               Framing,
    connector:             Arc<dyn Connector>,
    storage:               Option<Arc<dyn Storage>>,
    init_body:             Vec<u8>,
    ping_interval:         Duration,
    max_reconnect_retries: u32,
    request_timeout:       Duration,
    sleep_threshold:       Duration,
    retry_policy:          Arc<dyn RetryPolicy>,
    watchdog_interval:     Option<Duration>,
    push_tx:               Option<mpsc::UnboundedSender<Push>>,

    /// Survives reconnects until the server rejects the key.
    crypto:       Mutex<Option<EncryptedSession>>,
    writer:       tokio::sync::Mutex<Option<FrameWriter>>,
    generation:   AtomicU64,
    next_request: AtomicU64,
    pending:      Mutex<PendingTable>,
    acks:         Mutex<Vec<i64>>,
    state:        watch::Sender<SessionState>,
    last_push:    Mutex<Instant>,
    cancel:       CancellationToken,
    /// Cancelled to tear down the current connection only.
    conn:         Mutex<CancellationToken>,
    tasks:        TaskTracker,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        let SessionConfig {
            dc_id,
            addr,
            framing,
            connector,
            storage,
            auth_key,
            init,
            ping_interval,
            max_reconnect_retries,
            request_timeout,
            sleep_threshold,
            retry_policy,
            watchdog_interval,
            push_tx,
        } = config;

        let cancel = CancellationToken::new();
        let conn = cancel.child_token();
        Self {
            inner: Arc::new(Inner {
                dc_id,
                addr,
                framing,
                connector,
                storage,
                init_body: init.request(),
                ping_interval,
                max_reconnect_retries,
                request_timeout,
                sleep_threshold,
                retry_policy,
                watchdog_interval,
                push_tx,
                crypto:       Mutex::new(auth_key.map(|key| EncryptedSession::new(key, 0, 0))),
                writer:       tokio::sync::Mutex::new(None),
                generation:   AtomicU64::new(0),
                next_request: AtomicU64::new(1),
                pending:      Mutex::new(PendingTable::default()),
                acks:         Mutex::new(Vec::new()),
                state:        watch::Sender::new(SessionState::Disconnected),
                last_push:    Mutex::new(Instant::now()),
                cancel,
                conn:         Mutex::new(conn),
                tasks:        TaskTracker::new(),
            }),
        }
    }

    pub fn dc_id(&self) -> i32 {
        self.inner.dc_id
    }

    pub fn state(&self) -> SessionState {
        *self.inner.state.borrow()
    }

    pub fn watch_state(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    /// Bytes of the key in use, if one exists yet.
    pub fn auth_key(&self) -> Option<[u8; 256]> {
        lock(&self.inner.crypto).as_ref().map(|c| c.auth_key().to_bytes())
    }

    /// Requests sent and not yet answered.
    pub fn in_flight(&self) -> usize {
        lock(&self.inner.pending).len()
    }

    /// Connect, run the handshake if there is no key, send `initConnection`
    /// and start the background tasks.
    ///
    /// A stopped session cannot be started again.
    pub async fn start(&self) -> Result<(), InvocationError> {
        let inner = &self.inner;
        if inner.cancel.is_cancelled() {
            return Err(InvocationError::Dropped);
        }
        let (reader, writer) = match inner.connect_once().await {
            Ok(halves) => halves,
            Err(e) => {
                inner.set_state(SessionState::Disconnected);
                return Err(e);
            }
        };
        let (conn, init_id, init) = inner.install(writer).await;
        inner.set_state(SessionState::Connected);
        inner.tasks.spawn(Arc::clone(inner).supervise(reader, conn));

        if let Err(e) = inner.await_init(init_id, init).await {
            tracing::warn!("[courier] DC{} initConnection failed: {e}", inner.dc_id);
            self.stop().await;
            return Err(e);
        }

        inner.tasks.spawn(Arc::clone(inner).ping_loop());
        if let Some(every) = inner.watchdog_interval {
            inner.tasks.spawn(Arc::clone(inner).watchdog_loop(every));
        }
        tracing::info!("[courier] DC{} session ready", inner.dc_id);
        Ok(())
    }

    /// Close the connection, fail everything in flight with
    /// [`InvocationError::Dropped`] and wait for the background tasks.
    pub async fn stop(&self) {
        let inner = &self.inner;
        inner.cancel.cancel();
        inner.set_state(SessionState::Disconnected);
        let writer = inner.writer.lock().await.take();
        if let Some(mut writer) = writer {
            let _ = writer.close().await;
        }
        lock(&inner.pending).fail_all(|| InvocationError::Dropped);
        inner.tasks.close();
        inner.tasks.wait().await;
        tracing::info!("[courier] DC{} session stopped", inner.dc_id);
    }

    /// Invoke any TL function with the session's defaults.
    pub async fn invoke<R: RemoteCall>(&self, req: &R) -> Result<R::Return, InvocationError> {
        self.invoke_with(req, &InvokeOptions::default()).await
    }

    pub async fn invoke_with<R: RemoteCall>(
        &self,
        req:  &R,
        opts: &InvokeOptions,
    ) -> Result<R::Return, InvocationError> {
        let body = match &opts.business_connection_id {
            Some(id) => functions::InvokeWithBusinessConnection {
                connection_id: id.clone(),
                query:         Blob(req.to_bytes()),
            }
            .to_bytes(),
            None => req.to_bytes(),
        };
        let answer = self.invoke_raw(body, opts).await?;
        Ok(R::Return::from_bytes(&answer)?)
    }

    /// Send an already-serialized request and return the raw answer,
    /// retrying through the configured [`RetryPolicy`].
    pub async fn invoke_raw(&self, body: Vec<u8>, opts: &InvokeOptions) -> Result<Vec<u8>, InvocationError> {
        let inner = &self.inner;
        let sleep_threshold = opts.sleep_threshold.unwrap_or(inner.sleep_threshold);
        let request_timeout = opts.timeout.unwrap_or(inner.request_timeout);

        let mut fail_count   = NonZeroU32::MIN;
        let mut slept_so_far = Duration::default();
        loop {
            match inner.call(body.clone(), request_timeout).await {
                Ok(answer) => return Ok(answer),
                Err(error) => {
                    let ctx = RetryContext { fail_count, slept_so_far, sleep_threshold, error };
                    match inner.retry_policy.should_retry(&ctx) {
                        ControlFlow::Continue(delay) => {
                            sleep(delay).await;
                            slept_so_far += delay;
                            fail_count = fail_count.saturating_add(1);
                        }
                        ControlFlow::Break(()) => return Err(ctx.error),
                    }
                }
            }
        }
    }
}

impl DifferenceSource for Session {
    async fn get_state(&self) -> Result<enums::updates::State, InvocationError> {
        self.invoke(&functions::updates::GetState {}).await
    }

    async fn get_difference(
        &self,
        req: functions::updates::GetDifference,
    ) -> Result<enums::updates::Difference, InvocationError> {
        self.invoke(&req).await
    }

    async fn get_channel_difference(
        &self,
        req: functions::updates::GetChannelDifference,
    ) -> Result<enums::updates::ChannelDifference, InvocationError> {
        self.invoke(&req).await
    }
}

// ─── Connection lifecycle ─────────────────────────────────────────────────────

impl Inner {
    fn set_state(&self, state: SessionState) {
        self.state.send_replace(state);
    }

    fn push(&self, push: Push) {
        if let Some(tx) = &self.push_tx {
            let _ = tx.send(push);
        }
    }

    /// Open the transport and make sure an auth key exists.
    async fn connect_once(&self) -> Result<(FrameReader, FrameWriter), InvocationError> {
        self.set_state(SessionState::Connecting);
        tracing::info!("[courier] connecting to DC{} at {}", self.dc_id, self.addr);
        let (mut reader, mut writer) = timeout(
            self.request_timeout,
            transport::connect(&*self.connector, &self.addr, self.framing),
        )
        .await
        .map_err(|_| InvocationError::Timeout)??;

        let needs_key = lock(&self.crypto).is_none();
        if needs_key {
            self.set_state(SessionState::Handshaking);
            let done = timeout(HANDSHAKE_TIMEOUT, handshake(&mut reader, &mut writer))
                .await
                .map_err(|_| InvocationError::Timeout)??;
            tracing::info!("[courier] DC{} auth key generated", self.dc_id);
            if let Some(storage) = &self.storage {
                if let Err(e) = storage.set_auth_key(Some(&done.auth_key[..])) {
                    tracing::warn!("[courier] could not persist the auth key: {e}");
                }
            }
            let session = EncryptedSession::new(AuthKey::from_bytes(done.auth_key), done.first_salt, done.time_offset);
            *lock(&self.crypto) = Some(session);
        }
        Ok((reader, writer))
    }

    /// Make `writer` the live connection: send `initConnection`, then
    /// everything still unanswered from earlier connections.
    async fn install(&self, writer: FrameWriter) -> (CancellationToken, u64, oneshot::Receiver<Reply>) {
        let conn = self.cancel.child_token();
        *lock(&self.conn) = conn.clone();

        let mut slot = self.writer.lock().await;
        *slot = Some(writer);
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;

        let request_id = self.next_request.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        let packed = {
            let mut crypto = lock(&self.crypto);
            crypto.as_mut().map(|c| {
                let (wire, msg_id, seq_no) = c.pack_body(&self.init_body, true);
                (wire, msg_id, seq_no, c.session_id())
            })
        };
        if let Some((wire, msg_id, seq_no, session_id)) = packed {
            let entry = Pending::new(request_id, seq_no, self.init_body.clone(), session_id, generation, tx);
            lock(&self.pending).insert(msg_id, entry);
            self.write(&mut slot, &wire).await;
        }

        let stale = lock(&self.pending).stale(generation);
        if !stale.is_empty() {
            tracing::debug!("[courier] DC{} retransmitting {} request(s)", self.dc_id, stale.len());
        }
        for msg_id in stale {
            self.retransmit(&mut slot, msg_id, generation, false).await;
        }
        (conn, request_id, rx)
    }

    async fn await_init(&self, request_id: u64, init: oneshot::Receiver<Reply>) -> Result<(), InvocationError> {
        let _guard = PendingGuard { table: &self.pending, request_id };
        match timeout(self.request_timeout, init).await {
            Ok(Ok(Ok(_))) => {
                tracing::debug!("[courier] DC{} initConnection done", self.dc_id);
                Ok(())
            }
            Ok(Ok(Err(e))) => Err(e),
            Ok(Err(_)) => Err(InvocationError::Dropped),
            Err(_) => Err(InvocationError::Timeout),
        }
    }

    /// Read until the connection dies, reconnect, repeat. Exits on stop or
    /// when the reconnect budget is spent.
    async fn supervise(self: Arc<Self>, mut reader: FrameReader, mut conn: CancellationToken) {
        loop {
            let error = self.read_loop(&mut reader, &conn).await;
            if self.cancel.is_cancelled() {
                return;
            }
            tracing::warn!("[courier] DC{} connection lost: {error}", self.dc_id);
            self.set_state(SessionState::Connecting);
            let _ = self.writer.lock().await.take();
            self.forget_rejected_key(&error);

            match self.reconnect().await {
                Some((next_reader, next_conn)) => {
                    reader = next_reader;
                    conn = next_conn;
                }
                None => return,
            }
        }
    }

    /// `-404` means the server does not know our key: generate a new one on
    /// the next connect. Any other failure keeps the key.
    fn forget_rejected_key(&self, error: &InvocationError) {
        if !matches!(error, InvocationError::Transport(FrameError::TransportError(-404))) {
            return;
        }
        tracing::warn!("[courier] DC{} rejected the auth key; a new one will be generated", self.dc_id);
        *lock(&self.crypto) = None;
        if let Some(storage) = &self.storage {
            if let Err(e) = storage.set_auth_key(None) {
                tracing::warn!("[courier] could not clear the stored auth key: {e}");
            }
        }
    }

    async fn reconnect(self: &Arc<Self>) -> Option<(FrameReader, CancellationToken)> {
        for attempt in 1..=self.max_reconnect_retries {
            let delay = Duration::from_secs(u64::from(attempt.min(5)));
            tokio::select! {
                _ = self.cancel.cancelled() => return None,
                _ = sleep(delay) => {}
            }
            tracing::info!(
                "[courier] reconnecting to DC{} (attempt {attempt}/{})",
                self.dc_id,
                self.max_reconnect_retries
            );
            let connected = tokio::select! {
                _ = self.cancel.cancelled() => return None,
                connected = self.connect_once() => connected,
            };
            match connected {
                Ok((reader, writer)) => {
                    let (conn, init_id, init) = self.install(writer).await;
                    self.set_state(SessionState::Connected);
                    let session = Arc::clone(self);
                    self.tasks.spawn(async move {
                        if let Err(e) = session.await_init(init_id, init).await {
                            tracing::warn!("[courier] DC{} initConnection failed: {e}", session.dc_id);
                        }
                    });
                    self.push(Push::Reconnected);
                    return Some((reader, conn));
                }
                Err(e) => tracing::warn!("[courier] DC{} reconnect attempt {attempt} failed: {e}", self.dc_id),
            }
        }
        tracing::error!(
            "[courier] DC{} unreachable after {} attempts; failing pending requests",
            self.dc_id,
            self.max_reconnect_retries
        );
        self.set_state(SessionState::Disconnected);
        lock(&self.pending).fail_all(|| InvocationError::ConnectionLost);
        None
    }

    /// Returns the error that ended the connection.
    async fn read_loop(&self, reader: &mut FrameReader, conn: &CancellationToken) -> InvocationError {
        loop {
            let frame = tokio::select! {
                _ = conn.cancelled() => {
                    return io::Error::new(io::ErrorKind::ConnectionAborted, "connection closed locally").into();
                }
                frame = reader.next_frame() => frame,
            };
            let mut frame = match frame {
                Ok(frame) => frame,
                Err(e) => return e,
            };

            let decrypted = {
                let crypto = lock(&self.crypto);
                match crypto.as_ref() {
                    Some(c) => c.decrypt_frame(&mut frame),
                    None => return InvocationError::NotConnected,
                }
            };
            let msg = match decrypted {
                Ok(msg) => msg,
                Err(DecryptError::SessionMismatch) => {
                    tracing::debug!("[courier] DC{} dropped a message for another session", self.dc_id);
                    continue;
                }
                Err(e) => return e.into(),
            };

            let resend = self.route(msg);
            if !resend.is_empty() {
                self.resend(resend).await;
            }
            self.flush_acks().await;
        }
    }

    // ─── Outgoing ─────────────────────────────────────────────────────────────

    async fn write(&self, slot: &mut Option<FrameWriter>, wire: &[u8]) {
        let Some(writer) = slot.as_mut() else { return };
        if let Err(e) = writer.send(wire).await {
            tracing::warn!("[courier] DC{} write failed: {e}", self.dc_id);
            *slot = None;
            lock(&self.conn).cancel();
        }
    }

    /// Pack and send a new request. Hands the sender back if there is no key
    /// to pack with.
    async fn transmit(
        &self,
        request_id: u64,
        body:       &[u8],
        tx:         oneshot::Sender<Reply>,
    ) -> Result<(), oneshot::Sender<Reply>> {
        let mut slot = self.writer.lock().await;
        let generation = self.generation.load(Ordering::Acquire);
        let packed = {
            let mut crypto = lock(&self.crypto);
            crypto.as_mut().map(|c| {
                let (wire, msg_id, seq_no) = c.pack_body(body, true);
                (wire, msg_id, seq_no, c.session_id())
            })
        };
        let Some((wire, msg_id, seq_no, session_id)) = packed else { return Err(tx) };
        tracing::trace!("[courier] DC{} sending request {request_id} as {msg_id}", self.dc_id);
        let entry = Pending::new(request_id, seq_no, body.to_vec(), session_id, generation, tx);
        lock(&self.pending).insert(msg_id, entry);
        self.write(&mut slot, &wire).await;
        Ok(())
    }

    /// Send the entry filed under `old` again. Within the same session and
    /// with `fresh_id` unset the original id and sequence number are kept.
    async fn retransmit(&self, slot: &mut Option<FrameWriter>, old: i64, generation: u64, fresh_id: bool) {
        let Some(mut entry) = lock(&self.pending).take(old) else { return };
        let packed = {
            let mut crypto = lock(&self.crypto);
            crypto.as_mut().map(|c| {
                if !fresh_id && entry.session_id == c.session_id() {
                    (c.repack(old, entry.seq_no, &entry.body), old, entry.seq_no, c.session_id())
                } else {
                    let (wire, msg_id, seq_no) = c.pack_body(&entry.body, true);
                    (wire, msg_id, seq_no, c.session_id())
                }
            })
        };
        let Some((wire, msg_id, seq_no, session_id)) = packed else {
            lock(&self.pending).insert(old, entry);
            return;
        };
        entry.seq_no = seq_no;
        entry.session_id = session_id;
        entry.generation = generation;
        lock(&self.pending).insert(msg_id, entry);
        self.write(slot, &wire).await;
    }

    /// Re-send after a salt or clock correction, under new ids.
    async fn resend(&self, msg_ids: Vec<i64>) {
        let mut slot = self.writer.lock().await;
        let generation = self.generation.load(Ordering::Acquire);
        for msg_id in msg_ids {
            self.retransmit(&mut slot, msg_id, generation, true).await;
        }
    }

    async fn flush_acks(&self) {
        let msg_ids = std::mem::take(&mut *lock(&self.acks));
        if msg_ids.is_empty() {
            return;
        }
        let body = types::MsgsAck { msg_ids }.to_bytes();
        let mut slot = self.writer.lock().await;
        let packed = lock(&self.crypto).as_mut().map(|c| c.pack_body(&body, false).0);
        if let Some(wire) = packed {
            self.write(&mut slot, &wire).await;
        }
    }

    async fn wait_connected(&self, deadline: Instant) -> Result<(), InvocationError> {
        let mut rx = self.state.subscribe();
        loop {
            let state = *rx.borrow_and_update();
            match state {
                SessionState::Connected => return Ok(()),
                SessionState::Disconnected => return Err(InvocationError::NotConnected),
                SessionState::Connecting | SessionState::Handshaking => {}
            }
            match timeout_at(deadline, rx.changed()).await {
                Ok(Ok(())) => {}
                Ok(Err(_)) => return Err(InvocationError::Dropped),
                Err(_) => return Err(InvocationError::Timeout),
            }
        }
    }

    /// One attempt: wait for a connection, send, await the answer.
    async fn call(&self, body: Vec<u8>, request_timeout: Duration) -> Result<Vec<u8>, InvocationError> {
        let deadline = Instant::now() + request_timeout;
        let request_id = self.next_request.fetch_add(1, Ordering::Relaxed);
        let _guard = PendingGuard { table: &self.pending, request_id };

        let (tx, rx) = oneshot::channel();
        let mut tx = tx;
        loop {
            self.wait_connected(deadline).await?;
            match self.transmit(request_id, &body, tx).await {
                Ok(()) => break,
                // The key went away between the state check and packing.
                Err(back) => tx = back,
            }
        }

        match timeout_at(deadline, rx).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(_)) => Err(InvocationError::Dropped),
            Err(_) => Err(InvocationError::Timeout),
        }
    }

    // ─── Incoming ─────────────────────────────────────────────────────────────

    /// Route one decrypted message and everything nested in it. Returns the
    /// ids of requests that must be sent again.
    fn route(&self, msg: DecryptedMessage) -> Vec<i64> {
        let mut resend = Vec::new();
        let mut queue = VecDeque::from([(msg.msg_id, msg.seq_no, msg.body)]);

        while let Some((msg_id, seq_no, body)) = queue.pop_front() {
            if seq_no & 1 == 1 {
                lock(&self.acks).push(msg_id);
            }
            let message = match LogicalMessage::decode(&body) {
                Ok(message) => message,
                Err(e) if is_updates(&body) => {
                    tracing::warn!("[courier] DC{} undecodable updates in {msg_id} ({e}); forcing a difference", self.dc_id);
                    self.push_too_long();
                    continue;
                }
                Err(e) => {
                    tracing::warn!("[courier] DC{} undecodable message {msg_id}: {e}", self.dc_id);
                    continue;
                }
            };

            match message {
                LogicalMessage::Container(items) => {
                    queue.extend(items.into_iter().map(|m| (m.msg_id, m.seqno, m.body)));
                }
                LogicalMessage::Gzip(packed) => match packed.decompress() {
                    // Acknowledged under the outer id already.
                    Ok(unpacked) => queue.push_front((msg_id, 0, unpacked)),
                    Err(e) => tracing::warn!("[courier] DC{} bad gzip payload in {msg_id}: {e}", self.dc_id),
                },
                LogicalMessage::RpcResult { req_msg_id, result } => self.complete_rpc(req_msg_id, result),
                LogicalMessage::Pong(pong) => {
                    let ping_msg_id = pong.msg_id;
                    lock(&self.pending).resolve(ping_msg_id, Ok(pong.to_bytes()));
                }
                LogicalMessage::BadServerSalt(bad) => {
                    tracing::debug!("[courier] DC{} salt corrected; re-sending {}", self.dc_id, bad.bad_msg_id);
                    if let Some(c) = lock(&self.crypto).as_mut() {
                        c.set_salt(bad.new_server_salt);
                    }
                    resend.push(bad.bad_msg_id);
                }
                LogicalMessage::BadMsgNotification(bad) => match bad.error_code {
                    // msg_id too low / too high: adopt the server clock.
                    16 | 17 => {
                        if let Some(c) = lock(&self.crypto).as_mut() {
                            c.correct_time_offset(msg_id);
                        }
                        resend.push(bad.bad_msg_id);
                    }
                    // seqno too low / too high
                    32 | 33 => resend.push(bad.bad_msg_id),
                    code => {
                        tracing::warn!("[courier] DC{} bad_msg_notification {code} for {}", self.dc_id, bad.bad_msg_id);
                        let error = RpcError {
                            code:  400,
                            name:  "BAD_MSG_NOTIFICATION".to_string(),
                            value: u32::try_from(code).ok(),
                        };
                        lock(&self.pending).resolve(bad.bad_msg_id, Err(error.into()));
                    }
                },
                LogicalMessage::NewSessionCreated(created) => {
                    tracing::debug!("[courier] DC{} new server session", self.dc_id);
                    if let Some(c) = lock(&self.crypto).as_mut() {
                        c.set_salt(created.server_salt);
                    }
                    self.push(Push::SessionCreated);
                }
                LogicalMessage::DetailedInfo(info) => {
                    let answer = match info {
                        enums::MsgDetailedInfo::Info(i) => i.answer_msg_id,
                        enums::MsgDetailedInfo::New(i) => i.answer_msg_id,
                    };
                    lock(&self.acks).push(answer);
                }
                LogicalMessage::Ack(_) => {}
                LogicalMessage::Updates(updates) => {
                    *lock(&self.last_push) = Instant::now();
                    self.push(Push::Updates(updates));
                }
            }
        }
        resend
    }

    /// Updates this schema cannot read would be lost; `updatesTooLong` makes
    /// the sequencer fetch them again through the difference.
    fn push_too_long(&self) {
        *lock(&self.last_push) = Instant::now();
        self.push(Push::Updates(types::UpdatesTooLong {}.into()));
    }

    fn complete_rpc(&self, req_msg_id: i64, result: Vec<u8>) {
        let reply = unpack_result(result);
        if let Ok(answer) = &reply {
            if is_updates(answer) {
                match enums::Updates::from_bytes(answer) {
                    Ok(updates) => {
                        *lock(&self.last_push) = Instant::now();
                        self.push(Push::Updates(updates));
                    }
                    Err(e) => {
                        tracing::warn!("[courier] updates in result to {req_msg_id} not decoded ({e}); forcing a difference");
                        self.push_too_long();
                    }
                }
            }
        }
        if !lock(&self.pending).resolve(req_msg_id, reply) {
            tracing::debug!("[courier] DC{} answer to {req_msg_id} dropped: nobody is waiting", self.dc_id);
        }
    }

    // ─── Background ───────────────────────────────────────────────────────────

    async fn ping_loop(self: Arc<Self>) {
        let disconnect_delay = (self.ping_interval.as_secs() * 15 / 5 + 10) as i32;
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => return,
                _ = sleep(self.ping_interval) => {}
            }
            if *self.state.borrow() != SessionState::Connected {
                continue;
            }
            let ping = functions::PingDelayDisconnect { ping_id: random_i64(), disconnect_delay }.to_bytes();
            tokio::select! {
                _ = self.cancel.cancelled() => return,
                result = self.call(ping, self.request_timeout) => {
                    if let Err(e) = result {
                        tracing::debug!("[courier] DC{} ping failed: {e}", self.dc_id);
                    }
                }
            }
        }
    }

    async fn watchdog_loop(self: Arc<Self>, every: Duration) {
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => return,
                _ = sleep(every) => {}
            }
            let idle = lock(&self.last_push).elapsed();
            if idle < every || *self.state.borrow() != SessionState::Connected {
                continue;
            }
            tracing::debug!("[courier] DC{} no updates for {idle:?}; polling state", self.dc_id);
            let body = functions::updates::GetState {}.to_bytes();
            tokio::select! {
                _ = self.cancel.cancelled() => return,
                result = self.call(body, self.request_timeout) => {
                    if let Err(e) = result {
                        tracing::debug!("[courier] DC{} state poll failed: {e}", self.dc_id);
                    }
                }
            }
        }
    }
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

fn peek_id(bytes: &[u8]) -> Option<u32> {
    Cursor::from_slice(bytes).peek_id().ok()
}

fn is_updates(bytes: &[u8]) -> bool {
    peek_id(bytes).is_some_and(|id| UPDATES_IDS.contains(&id))
}

/// Inflate a `gzip_packed` result and turn `rpc_error` into an error.
fn unpack_result(mut result: Vec<u8>) -> Reply {
    if peek_id(&result) == Some(types::GzipPacked::CONSTRUCTOR_ID) {
        result = types::GzipPacked::from_bytes(&result[4..])?.decompress()?;
    }
    if peek_id(&result) == Some(types::RpcError::CONSTRUCTOR_ID) {
        let err = types::RpcError::from_bytes(&result[4..])?;
        return Err(RpcError::from_telegram(err.error_code, &err.error_message).into());
    }
    Ok(result)
}

async fn plain_call<R: RemoteCall>(
    plain:  &mut courier_mtproto::Session,
    reader: &mut FrameReader,
    writer: &mut FrameWriter,
    req:    &R,
) -> Result<R::Return, InvocationError> {
    writer.send(&plain.pack(req).to_plaintext_bytes()).await?;
    let frame = reader.next_frame().await?;
    let msg = Message::from_plaintext_bytes(&frame)
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "expected a plaintext handshake answer"))?;
    Ok(R::Return::from_bytes(&msg.body)?)
}

async fn handshake(reader: &mut FrameReader, writer: &mut FrameWriter) -> Result<Finished, InvocationError> {
    let mut plain = courier_mtproto::Session::new();

    let (req, step1) = authentication::step1()?;
    let res_pq = plain_call(&mut plain, reader, writer, &req).await?;

    let (req, step2) = authentication::step2(step1, res_pq)?;
    let dh_params = plain_call(&mut plain, reader, writer, &req).await?;

    let (mut req, mut step3) = authentication::step3(step2, dh_params)?;
    for _ in 0..=authentication::MAX_DH_RETRIES {
        let answer = plain_call(&mut plain, reader, writer, &req).await?;
        match authentication::finish(step3, answer)? {
            Outcome::Done(done) => return Ok(done),
            Outcome::Retry(retry) => {
                tracing::debug!("[courier] dh_gen_retry (retry_id {})", retry.retry_id());
                (req, step3) = authentication::retry_step3(retry)?;
            }
        }
    }
    Err(authentication::Error::DhGenFail.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rpc_error_results_become_typed_errors() {
        let body = types::RpcError { error_code: 420, error_message: "FLOOD_WAIT_7".into() }.to_bytes();
        match unpack_result(body) {
            Err(InvocationError::Rpc(e)) => {
                assert_eq!(e.code, 420);
                assert_eq!(e.flood_wait_seconds(), Some(7));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn gzipped_results_are_inflated() {
        let inner = types::RpcError { error_code: 400, error_message: "PEER_ID_INVALID".into() }.to_bytes();
        let packed = types::GzipPacked::compress(&inner).to_bytes();
        assert!(matches!(unpack_result(packed), Err(InvocationError::Rpc(e)) if e.is("PEER_ID_INVALID")));

        let plain = true.to_bytes();
        let packed = types::GzipPacked::compress(&plain).to_bytes();
        assert_eq!(unpack_result(packed).unwrap(), plain);
    }

    #[test]
    fn init_request_wraps_init_connection_in_layer() {
        let body = InitParams { api_id: 42, ..InitParams::default() }.request();
        assert_eq!(&body[..4], &0xda9b0d0d_u32.to_le_bytes());
        assert_eq!(&body[4..8], &courier_tl_types::LAYER.to_le_bytes());
        assert_eq!(&body[8..12], &0xc1cd5ea9_u32.to_le_bytes());
        assert_eq!(&body[body.len() - 4..], &0x1fb33026_u32.to_le_bytes());
    }
}
