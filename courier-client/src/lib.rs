//! # courier-client
//!
//! Async MTProto client core built on `courier-mtproto`.
//!
//! ## Features
//! - Encrypted sessions with request multiplexing, acknowledgements,
//!   retransmission, keepalive and reconnect with backoff
//! - `FLOOD_WAIT` auto-retry with configurable policy
//! - Gap-free update delivery: pts/qts/seq checks, difference recovery
//!   for the account and every channel
//! - Typed update events dispatched to grouped, prioritized handlers on a
//!   worker pool
//! - Peer access-hash caching backed by pluggable [`storage`]
//! - DC migration, media sessions for foreign DCs, CDN downloads
//! - Portable session strings

#![deny(unsafe_code)]

pub mod cache;
pub mod dispatcher;
mod errors;
mod pending;
pub mod peers;
mod retry;
pub mod sequence;
pub mod session;
pub mod storage;
pub mod transfer;
pub mod transport;
pub mod update;

pub use courier_mtproto::Framing;
pub use dispatcher::{Handler, HandlerId, HandlerKind};
pub use errors::{HandlerError, InvocationError, RpcError};
pub use peers::{PeerCache, PeerEntry, PeerKind};
pub use retry::{AutoSleep, NoRetries, RetryContext, RetryPolicy};
pub use session::{InvokeOptions, Session, SessionState};
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use transfer::{DownloadIter, UploadedFile};
pub use update::Update;

use std::collections::HashMap;
use std::io;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use courier_crypto::AuthKey;
use courier_tl_types::{Cursor, Deserializable, RemoteCall, enums, functions};
use tokio::io::AsyncRead;
use tokio::sync::{Mutex, Semaphore, mpsc, watch};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use dispatcher::Dispatcher;
use sequence::{DifferenceSource, Sequencer, SequencerConfig};
use session::{InitParams, Push, SessionConfig};
use storage::session_string;
use transfer::SessionPool;
use transport::{BoxFuture, Connector, TcpConnector};

// ─── DC tables ────────────────────────────────────────────────────────────────

/// Production DC addresses.
pub const PRODUCTION_DCS: [(i32, &str); 5] = [
    (1, "149.154.175.53:443"),
    (2, "149.154.167.51:443"),
    (3, "149.154.175.100:443"),
    (4, "149.154.167.91:443"),
    (5, "91.108.56.130:443"),
];

/// Test DC addresses.
pub const TEST_DCS: [(i32, &str); 3] = [
    (1, "149.154.175.10:443"),
    (2, "149.154.167.40:443"),
    (3, "149.154.175.117:443"),
];

/// Built-in address table for production or test DCs.
pub fn default_dc_addresses(test_mode: bool) -> HashMap<i32, String> {
    let table: &[(i32, &str)] = if test_mode { &TEST_DCS } else { &PRODUCTION_DCS };
    table.iter().map(|&(id, addr)| (id, addr.to_string())).collect()
}

const MAX_MIGRATIONS: usize = 3;
const AUTH_IMPORT_ATTEMPTS: usize = 3;
const AUTHORIZATION_ID: u32 = 0x2ea2c0d4;

// ─── Config ───────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct Config {
    pub api_id:                       i32,
    pub api_hash:                     String,
    /// Home DC used when storage holds no authorized session.
    pub dc_id:                        i32,
    pub test_mode:                    bool,
    /// Extra or overriding DC addresses, e.g. for CDN DCs.
    pub dc_addresses:                 HashMap<i32, String>,
    pub framing:                      Framing,
    pub connector:                    Arc<dyn Connector>,
    /// Default: [`MemoryStorage`].
    pub storage:                      Option<Arc<dyn Storage>>,
    /// Imported into storage before connecting.
    pub session_string:               Option<String>,
    pub retry_policy:                 Arc<dyn RetryPolicy>,
    /// Update worker tasks (default: [`dispatcher::default_workers`]).
    pub workers:                      usize,
    pub sleep_threshold:              Duration,
    pub request_timeout:              Duration,
    pub ping_interval:                Duration,
    pub max_reconnect_retries:        u32,
    /// Concurrent uploads and downloads.
    pub max_concurrent_transmissions: usize,
    /// Do not catch up on updates missed while offline.
    pub skip_updates:                 bool,
    /// Do not receive updates at all.
    pub no_updates:                   bool,
    pub watchdog_interval:            Option<Duration>,
    pub message_cache_size:           usize,
    pub device_model:                 String,
    pub system_version:               String,
    pub app_version:                  String,
    pub system_lang_code:             String,
    pub lang_pack:                    String,
    pub lang_code:                    String,
}

impl Default for Config {
    fn default() -> Self {
        let init = InitParams::default();
        Self {
            api_id:                       0,
            api_hash:                     String::new(),
            dc_id:                        2,
            test_mode:                    false,
            dc_addresses:                 HashMap::new(),
            framing:                      Framing::Abridged,
            connector:                    Arc::new(TcpConnector),
            storage:                      None,
            session_string:               None,
            retry_policy:                 Arc::new(AutoSleep),
            workers:                      dispatcher::default_workers(),
            sleep_threshold:              Duration::from_secs(10),
            request_timeout:              Duration::from_secs(15),
            ping_interval:                Duration::from_secs(5),
            max_reconnect_retries:        5,
            max_concurrent_transmissions: 1,
            skip_updates:                 true,
            no_updates:                   false,
            watchdog_interval:            Some(Duration::from_secs(15 * 60)),
            message_cache_size:           1000,
            device_model:                 init.device_model,
            system_version:               init.system_version,
            app_version:                  init.app_version,
            system_lang_code:             init.system_lang_code,
            lang_pack:                    init.lang_pack,
            lang_code:                    init.lang_code,
        }
    }
}

impl Config {
    fn init_params(&self) -> InitParams {
        InitParams {
            api_id:           self.api_id,
            device_model:     self.device_model.clone(),
            system_version:   self.system_version.clone(),
            app_version:      self.app_version.clone(),
            system_lang_code: self.system_lang_code.clone(),
            lang_pack:        self.lang_pack.clone(),
            lang_code:        self.lang_code.clone(),
        }
    }

    fn dc_addr(&self, dc_id: i32) -> Result<String, InvocationError> {
        self.dc_addresses
            .get(&dc_id)
            .cloned()
            .or_else(|| default_dc_addresses(self.test_mode).remove(&dc_id))
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("no address for DC{dc_id}")).into())
    }

    /// Settings shared by every session this client opens.
    fn session_config(&self, dc_id: i32) -> Result<SessionConfig, InvocationError> {
        let mut sc = SessionConfig::new(dc_id, self.dc_addr(dc_id)?);
        sc.framing               = self.framing;
        sc.connector             = Arc::clone(&self.connector);
        sc.init                  = self.init_params();
        sc.ping_interval         = self.ping_interval;
        sc.max_reconnect_retries = self.max_reconnect_retries;
        sc.request_timeout       = self.request_timeout;
        sc.sleep_threshold       = self.sleep_threshold;
        sc.retry_policy          = Arc::clone(&self.retry_policy);
        Ok(sc)
    }
}

// ─── Home session ─────────────────────────────────────────────────────────────

/// The session to the home DC; replaced when the account migrates.
#[derive(Clone)]
struct HomeSession(Arc<RwLock<Session>>);

impl HomeSession {
    fn current(&self) -> Session {
        self.0.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn replace(&self, session: Session) -> Session {
        std::mem::replace(&mut *self.0.write().unwrap_or_else(PoisonError::into_inner), session)
    }
}

impl DifferenceSource for HomeSession {
    async fn get_state(&self) -> Result<enums::updates::State, InvocationError> {
        self.current().get_state().await
    }

    async fn get_difference(
        &self,
        req: functions::updates::GetDifference,
    ) -> Result<enums::updates::Difference, InvocationError> {
        self.current().get_difference(req).await
    }

    async fn get_channel_difference(
        &self,
        req: functions::updates::GetChannelDifference,
    ) -> Result<enums::updates::ChannelDifference, InvocationError> {
        self.current().get_channel_difference(req).await
    }
}

// ─── Client ───────────────────────────────────────────────────────────────────

struct ClientInner {
    config:     Config,
    storage:    Arc<dyn Storage>,
    peers:      Arc<PeerCache>,
    home:       HomeSession,
    /// Serializes migrations.
    migrating:  Mutex<()>,
    media:      Mutex<HashMap<i32, Session>>,
    cdn:        Mutex<HashMap<i32, Session>>,
    dispatcher: Arc<Dispatcher>,
    transfers:  Arc<Semaphore>,
    push_tx:    Option<mpsc::UnboundedSender<Push>>,
    cancel:     CancellationToken,
    tasks:      TaskTracker,
}

/// Cheap to clone; all clones share one set of sessions.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

impl Client {
    // ── Connect ────────────────────────────────────────────────────────────

    /// Open the home session and, unless `no_updates` is set, start the
    /// update pipeline.
    pub async fn connect(config: Config) -> Result<Self, InvocationError> {
        let storage: Arc<dyn Storage> = match &config.storage {
            Some(storage) => Arc::clone(storage),
            None => Arc::new(MemoryStorage::new()),
        };
        if let Some(s) = &config.session_string {
            storage.set_session(&session_string::import(s)?)?;
        }

        let saved = storage.session()?;
        let resumed = saved.dc_id > 0 && saved.auth_key.is_some();
        let dc_id = if resumed { saved.dc_id } else { config.dc_id };
        storage.update_session(&mut |s| {
            s.dc_id     = dc_id;
            s.api_id    = config.api_id;
            s.test_mode = config.test_mode;
        })?;
        let auth_key = saved.auth_key.as_deref().filter(|_| resumed).and_then(AuthKey::from_slice);
        tracing::info!(
            "[courier] connecting to DC{dc_id} ({} storage, {})",
            storage.name(),
            if auth_key.is_some() { "saved key" } else { "new key" },
        );

        let (push_tx, push_rx) = if config.no_updates {
            (None, None)
        } else {
            let (tx, rx) = mpsc::unbounded_channel();
            (Some(tx), Some(rx))
        };

        let mut sc = config.session_config(dc_id)?;
        sc.storage           = Some(Arc::clone(&storage));
        sc.auth_key          = auth_key;
        sc.push_tx           = push_tx.clone();
        sc.watchdog_interval = config.watchdog_interval.filter(|_| push_tx.is_some());
        let session = Session::new(sc);
        session.start().await?;

        let peers = Arc::new(PeerCache::new(Arc::clone(&storage)));
        let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&peers), config.message_cache_size));
        let client = Self {
            inner: Arc::new(ClientInner {
                storage:    Arc::clone(&storage),
                peers:      Arc::clone(&peers),
                home:       HomeSession(Arc::new(RwLock::new(session))),
                migrating:  Mutex::new(()),
                media:      Mutex::new(HashMap::new()),
                cdn:        Mutex::new(HashMap::new()),
                dispatcher: Arc::clone(&dispatcher),
                transfers:  Arc::new(Semaphore::new(config.max_concurrent_transmissions.max(1))),
                push_tx,
                cancel:     CancellationToken::new(),
                tasks:      TaskTracker::new(),
                config,
            }),
        };

        if let Some(rx) = push_rx {
            let inner = &client.inner;
            let (env_tx, env_rx) = mpsc::unbounded_channel();
            dispatcher.start(env_rx, inner.config.workers);

            let seq_config = SequencerConfig { is_bot: saved.is_bot, persist: !inner.config.skip_updates };
            let mut sequencer = Sequencer::new(inner.home.clone(), peers, storage, seq_config, env_tx);
            let cancel = inner.cancel.clone();
            inner.tasks.spawn(async move {
                tokio::select! {
                    _ = cancel.cancelled() => return,
                    _ = sequencer.resume() => {}
                }
                sequencer.run(rx, cancel).await;
            });
        }
        Ok(client)
    }

    /// Stop the update pipeline and every session. In-flight requests fail
    /// with [`InvocationError::Dropped`].
    pub async fn stop(&self) {
        let inner = &self.inner;
        inner.cancel.cancel();
        inner.tasks.close();
        inner.tasks.wait().await;

        // The sequencer is gone, so the dispatcher queue is closed.
        inner.dispatcher.stop().await;

        let media: Vec<Session> = inner.media.lock().await.drain().map(|(_, s)| s).collect();
        let cdn: Vec<Session> = inner.cdn.lock().await.drain().map(|(_, s)| s).collect();
        for session in media.into_iter().chain(cdn) {
            session.stop().await;
        }
        inner.home.current().stop().await;
        tracing::info!("[courier] client stopped");
    }

    // ── Accessors ──────────────────────────────────────────────────────────

    pub fn home_dc_id(&self) -> i32 {
        self.inner.home.current().dc_id()
    }

    /// The session to the home DC as of now.
    pub fn session(&self) -> Session {
        self.inner.home.current()
    }

    pub fn watch_state(&self) -> watch::Receiver<SessionState> {
        self.inner.home.current().watch_state()
    }

    pub fn peers(&self) -> &Arc<PeerCache> {
        &self.inner.peers
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.inner.storage
    }

    /// Pack the stored session into a portable string.
    pub fn export_session_string(&self) -> Result<String, InvocationError> {
        Ok(session_string::export(&self.inner.storage.session()?)?)
    }

    // ── Handlers ───────────────────────────────────────────────────────────

    pub async fn add_handler(&self, group: i32, handler: Handler) -> HandlerId {
        self.inner.dispatcher.add_handler(group, handler).await
    }

    pub async fn remove_handler(&self, id: HandlerId) -> bool {
        self.inner.dispatcher.remove_handler(id).await
    }

    // ── RPC ────────────────────────────────────────────────────────────────

    /// Invoke a TL function on the home DC, following `*_MIGRATE_X`.
    pub async fn invoke<R: RemoteCall>(&self, req: &R) -> Result<R::Return, InvocationError> {
        self.invoke_with(req, &InvokeOptions::default()).await
    }

    pub async fn invoke_with<R: RemoteCall>(
        &self,
        req:  &R,
        opts: &InvokeOptions,
    ) -> Result<R::Return, InvocationError> {
        let mut migrations = 0;
        loop {
            let result = self.inner.home.current().invoke_with(req, opts).await;
            let target = match &result {
                Err(InvocationError::Rpc(e)) if !e.is("FILE_MIGRATE") => e.migrate_dc(),
                _ => None,
            };
            match target {
                Some(dc_id) if migrations < MAX_MIGRATIONS => {
                    migrations += 1;
                    self.migrate(dc_id).await?;
                }
                _ => return result,
            }
        }
    }

    /// Log in as a bot. Returns the bot's user id.
    pub async fn sign_in_bot(&self, token: &str) -> Result<i64, InvocationError> {
        let config = &self.inner.config;
        let req = functions::auth::ImportBotAuthorization {
            flags:          0,
            api_id:         config.api_id,
            api_hash:       config.api_hash.clone(),
            bot_auth_token: token.to_string(),
        };
        let answer = self.invoke(&req).await?;
        let user = authorized_user(&answer.0)?;
        let user_id = match &user {
            enums::User::User(u) => u.id,
            enums::User::Empty(u) => u.id,
        };
        self.inner.peers.upsert_users(std::slice::from_ref(&user))?;
        self.inner.storage.update_session(&mut |s| {
            s.user_id = Some(user_id);
            s.is_bot  = true;
        })?;
        tracing::info!("[courier] signed in as bot {user_id}");
        Ok(user_id)
    }

    // ── DC migration ───────────────────────────────────────────────────────

    async fn migrate(&self, dc_id: i32) -> Result<(), InvocationError> {
        let inner = &self.inner;
        let _guard = inner.migrating.lock().await;
        let old = inner.home.current();
        if old.dc_id() == dc_id {
            return Ok(());
        }
        tracing::info!("[courier] migrating from DC{} to DC{dc_id}", old.dc_id());

        let mut sc = inner.config.session_config(dc_id)?;
        sc.storage           = Some(Arc::clone(&inner.storage));
        sc.push_tx           = inner.push_tx.clone();
        sc.watchdog_interval = inner.config.watchdog_interval.filter(|_| inner.push_tx.is_some());
        let session = Session::new(sc);
        session.start().await?;
        inner.storage.update_session(&mut |s| s.dc_id = dc_id)?;

        let old = inner.home.replace(session);
        old.stop().await;
        Ok(())
    }

    // ── Foreign DCs ────────────────────────────────────────────────────────

    /// A session to `dc_id` carrying the home account's authorization.
    pub async fn media_session(&self, dc_id: i32) -> Result<Session, InvocationError> {
        let home = self.inner.home.current();
        if home.dc_id() == dc_id {
            return Ok(home);
        }
        let mut media = self.inner.media.lock().await;
        if let Some(session) = media.get(&dc_id).filter(|s| s.state() != SessionState::Disconnected) {
            return Ok(session.clone());
        }

        let session = Session::new(self.inner.config.session_config(dc_id)?);
        session.start().await?;
        if let Err(e) = import_authorization(&home, &session).await {
            session.stop().await;
            return Err(e);
        }
        tracing::info!("[courier] media session to DC{dc_id} ready");
        media.insert(dc_id, session.clone());
        Ok(session)
    }

    /// A session to CDN DC `dc_id`. CDN DCs need no authorization.
    pub async fn cdn_session(&self, dc_id: i32) -> Result<Session, InvocationError> {
        let mut cdn = self.inner.cdn.lock().await;
        if let Some(session) = cdn.get(&dc_id).filter(|s| s.state() != SessionState::Disconnected) {
            return Ok(session.clone());
        }
        let session = Session::new(self.inner.config.session_config(dc_id)?);
        session.start().await?;
        cdn.insert(dc_id, session.clone());
        Ok(session)
    }

    // ── Transfers ──────────────────────────────────────────────────────────

    pub fn iter_download(&self, location: enums::InputFileLocation) -> DownloadIter {
        DownloadIter::new(
            self.inner.home.current(),
            Some(Arc::new(self.clone())),
            location,
            Arc::clone(&self.inner.transfers),
        )
    }

    pub async fn download(&self, location: enums::InputFileLocation) -> Result<Vec<u8>, InvocationError> {
        self.iter_download(location).collect().await
    }

    /// Upload `size` bytes from `reader`.
    pub async fn upload_stream<R: AsyncRead + Unpin>(
        &self,
        reader: &mut R,
        size:   u64,
        name:   &str,
    ) -> Result<UploadedFile, InvocationError> {
        let session = self.inner.home.current();
        transfer::upload_stream(&session, &self.inner.transfers, reader, size, name).await
    }

    pub async fn upload_bytes(&self, data: &[u8], name: &str) -> Result<UploadedFile, InvocationError> {
        let session = self.inner.home.current();
        transfer::upload_bytes(&session, &self.inner.transfers, data, name).await
    }
}

impl SessionPool for Client {
    fn media_session(&self, dc_id: i32) -> BoxFuture<'_, Result<Session, InvocationError>> {
        Box::pin(Client::media_session(self, dc_id))
    }

    fn cdn_session(&self, dc_id: i32) -> BoxFuture<'_, Result<Session, InvocationError>> {
        Box::pin(Client::cdn_session(self, dc_id))
    }
}

/// Copy the home authorization into `target`, re-exporting on failure.
async fn import_authorization(home: &Session, target: &Session) -> Result<(), InvocationError> {
    let dc_id = target.dc_id();
    let mut attempt = 0;
    loop {
        attempt += 1;
        let enums::auth::ExportedAuthorization::ExportedAuthorization(exported) =
            home.invoke(&functions::auth::ExportAuthorization { dc_id }).await?;
        let req = functions::auth::ImportAuthorization { id: exported.id, bytes: exported.bytes };
        match target.invoke(&req).await {
            Ok(_) => return Ok(()),
            Err(e) if attempt < AUTH_IMPORT_ATTEMPTS => {
                tracing::warn!("[courier] importing authorization into DC{dc_id} failed ({e}), retrying");
            }
            Err(e) => return Err(e),
        }
    }
}

/// The `user` field of a serialized `auth.authorization`.
fn authorized_user(bytes: &[u8]) -> Result<enums::User, InvocationError> {
    let mut cur = Cursor::from_slice(bytes);
    let id = u32::deserialize(&mut cur)?;
    if id != AUTHORIZATION_ID {
        return Err(io::Error::new(io::ErrorKind::InvalidData, format!("unexpected authorization {id:#010x}")).into());
    }
    let flags = u32::deserialize(&mut cur)?;
    if flags & (1 << 1) != 0 {
        i32::deserialize(&mut cur)?;
    }
    if flags & (1 << 0) != 0 {
        i32::deserialize(&mut cur)?;
    }
    if flags & (1 << 2) != 0 {
        Vec::<u8>::deserialize(&mut cur)?;
    }
    Ok(enums::User::deserialize(&mut cur)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_tl_types::{Serializable, types};

    #[test]
    fn dc_tables_cover_both_networks() {
        assert_eq!(default_dc_addresses(false).len(), 5);
        assert_eq!(default_dc_addresses(true)[&2], "149.154.167.40:443");

        let mut config = Config::default();
        config.dc_addresses.insert(203, "10.0.0.1:443".into());
        assert_eq!(config.dc_addr(203).ok().as_deref(), Some("10.0.0.1:443"));
        assert_eq!(config.dc_addr(4).ok().as_deref(), Some("149.154.167.91:443"));
        assert!(config.dc_addr(9).is_err());
    }

    #[test]
    fn authorization_user_is_extracted() {
        let user = enums::User::from(types::User { id: 42, bot: true, ..Default::default() });
        let mut bytes = Vec::new();
        AUTHORIZATION_ID.serialize(&mut bytes);
        (1u32 << 1).serialize(&mut bytes);
        30i32.serialize(&mut bytes);
        user.serialize(&mut bytes);

        assert_eq!(authorized_user(&bytes).ok(), Some(user));
        assert!(authorized_user(&[0, 0, 0, 0]).is_err());
    }
}
