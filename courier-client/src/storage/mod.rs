//! Persistence boundary for session data, update state and peers.
//!
//! The [`Storage`] trait abstracts over where the client keeps what must
//! survive a restart, so callers can swap in a file, an SQLite database,
//! plain memory, or anything else.
//!
//! Built-in backends:
//! * [`MemoryStorage`]: nothing survives the process.
//! * [`FileStorage`]: one TL-encoded snapshot file, rewritten atomically on
//!   every mutation.
//! * [`SqliteStorage`]: SQLite (requires the `sqlite-session` Cargo feature).

use std::collections::{BTreeMap, HashMap};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use courier_tl_types::{Cursor, Deserializable, Serializable};

use crate::peers::{PeerEntry, PeerKind};

pub mod session_string;
#[cfg(feature = "sqlite-session")]
mod sqlite;

#[cfg(feature = "sqlite-session")]
pub use sqlite::SqliteStorage;

// ─── Data ─────────────────────────────────────────────────────────────────────

/// Everything needed to resume an authorized session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionData {
    pub dc_id:     i32,
    pub api_id:    i32,
    pub test_mode: bool,
    /// 256 raw bytes once the handshake has run.
    pub auth_key:  Option<Vec<u8>>,
    pub user_id:   Option<i64>,
    pub is_bot:    bool,
}

/// Sequencing state of one update scope.
///
/// `scope` is `0` for the global state and the marked channel id otherwise.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UpdateState {
    pub scope: i64,
    pub pts:   i32,
    pub qts:   i32,
    pub date:  i32,
    pub seq:   i32,
}

/// Scope id of the account-wide update state.
pub const GLOBAL_SCOPE: i64 = 0;

// ─── Trait ────────────────────────────────────────────────────────────────────

/// Synchronous key-value persistence used by the session, the update
/// sequencer and the peer cache.
pub trait Storage: Send + Sync {
    fn session(&self) -> io::Result<SessionData>;

    fn set_session(&self, data: &SessionData) -> io::Result<()>;

    /// Read-modify-write of the session record. Backends holding a lock
    /// override this to make it atomic.
    fn update_session(&self, edit: &mut dyn FnMut(&mut SessionData)) -> io::Result<()> {
        let mut data = self.session()?;
        edit(&mut data);
        self.set_session(&data)
    }

    fn auth_key(&self) -> io::Result<Option<Vec<u8>>> {
        Ok(self.session()?.auth_key)
    }

    fn set_auth_key(&self, key: Option<&[u8]>) -> io::Result<()> {
        let key = key.map(<[u8]>::to_vec);
        self.update_session(&mut |s| s.auth_key = key.clone())
    }

    fn dc_id(&self) -> io::Result<i32> {
        Ok(self.session()?.dc_id)
    }

    fn set_dc_id(&self, dc_id: i32) -> io::Result<()> {
        self.update_session(&mut |s| s.dc_id = dc_id)
    }

    fn api_id(&self) -> io::Result<i32> {
        Ok(self.session()?.api_id)
    }

    fn set_api_id(&self, api_id: i32) -> io::Result<()> {
        self.update_session(&mut |s| s.api_id = api_id)
    }

    fn test_mode(&self) -> io::Result<bool> {
        Ok(self.session()?.test_mode)
    }

    fn set_test_mode(&self, test_mode: bool) -> io::Result<()> {
        self.update_session(&mut |s| s.test_mode = test_mode)
    }

    fn user_id(&self) -> io::Result<Option<i64>> {
        Ok(self.session()?.user_id)
    }

    fn set_user_id(&self, user_id: Option<i64>) -> io::Result<()> {
        self.update_session(&mut |s| s.user_id = user_id)
    }

    fn is_bot(&self) -> io::Result<bool> {
        Ok(self.session()?.is_bot)
    }

    fn set_is_bot(&self, is_bot: bool) -> io::Result<()> {
        self.update_session(&mut |s| s.is_bot = is_bot)
    }

    /// Every stored update state, global scope included.
    fn states(&self) -> io::Result<Vec<UpdateState>>;

    fn state(&self, scope: i64) -> io::Result<Option<UpdateState>> {
        Ok(self.states()?.into_iter().find(|s| s.scope == scope))
    }

    fn set_state(&self, state: UpdateState) -> io::Result<()>;

    fn remove_state(&self, scope: i64) -> io::Result<()>;

    /// Insert or replace peers, re-indexing their usernames and phone.
    fn upsert_peers(&self, peers: &[PeerEntry]) -> io::Result<()>;

    fn peer_by_id(&self, id: i64) -> io::Result<Option<PeerEntry>>;

    /// `username` is matched lowercase, without a leading `@`.
    fn peer_by_username(&self, username: &str) -> io::Result<Option<PeerEntry>>;

    fn peer_by_phone(&self, phone: &str) -> io::Result<Option<PeerEntry>>;

    /// Human-readable backend name, for log messages.
    fn name(&self) -> &str;
}

pub(crate) fn normalize_username(name: &str) -> String {
    name.trim_start_matches('@').to_lowercase()
}

pub(crate) fn normalize_phone(phone: &str) -> String {
    phone.chars().filter(char::is_ascii_digit).collect()
}

// ─── Snapshot ─────────────────────────────────────────────────────────────────

/// The whole store as one value. Shared by the memory and file backends.
#[derive(Clone, Debug, Default, PartialEq)]
struct Snapshot {
    session:   SessionData,
    states:    BTreeMap<i64, UpdateState>,
    peers:     HashMap<i64, PeerEntry>,
    usernames: HashMap<String, i64>,
    phones:    HashMap<String, i64>,
}

const SNAPSHOT_MAGIC: u32 = 0x5353_5243; // "CRSS"
const SNAPSHOT_VERSION: i32 = 1;

impl Snapshot {
    fn upsert(&mut self, entry: &PeerEntry) {
        if let Some(old) = self.peers.remove(&entry.id) {
            for name in &old.usernames {
                if self.usernames.get(name) == Some(&old.id) {
                    self.usernames.remove(name);
                }
            }
            if let Some(phone) = &old.phone {
                self.phones.remove(phone);
            }
        }
        for name in &entry.usernames {
            self.usernames.insert(normalize_username(name), entry.id);
        }
        if let Some(phone) = &entry.phone {
            self.phones.insert(normalize_phone(phone), entry.id);
        }
        self.peers.insert(entry.id, entry.clone());
    }

    fn by_username(&self, username: &str) -> Option<PeerEntry> {
        let id = self.usernames.get(&normalize_username(username))?;
        self.peers.get(id).cloned()
    }

    fn by_phone(&self, phone: &str) -> Option<PeerEntry> {
        let id = self.phones.get(&normalize_phone(phone))?;
        self.peers.get(id).cloned()
    }

    fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        SNAPSHOT_MAGIC.serialize(&mut buf);
        SNAPSHOT_VERSION.serialize(&mut buf);

        let s = &self.session;
        s.dc_id.serialize(&mut buf);
        s.api_id.serialize(&mut buf);
        s.test_mode.serialize(&mut buf);
        s.auth_key.clone().unwrap_or_default().serialize(&mut buf);
        s.user_id.is_some().serialize(&mut buf);
        s.user_id.unwrap_or(0).serialize(&mut buf);
        s.is_bot.serialize(&mut buf);

        (self.states.len() as i32).serialize(&mut buf);
        for st in self.states.values() {
            st.scope.serialize(&mut buf);
            st.pts.serialize(&mut buf);
            st.qts.serialize(&mut buf);
            st.date.serialize(&mut buf);
            st.seq.serialize(&mut buf);
        }

        (self.peers.len() as i32).serialize(&mut buf);
        for p in self.peers.values() {
            p.id.serialize(&mut buf);
            p.access_hash.serialize(&mut buf);
            p.kind.as_str().to_string().serialize(&mut buf);
            p.phone.clone().unwrap_or_default().serialize(&mut buf);
            p.usernames.serialize(&mut buf);
        }
        buf
    }

    fn decode(bytes: &[u8]) -> io::Result<Self> {
        Self::decode_tl(&mut Cursor::from_slice(bytes)).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    fn decode_tl(cur: &mut Cursor) -> Result<Self, String> {
        let tl = |e: courier_tl_types::deserialize::Error| e.to_string();
        if u32::deserialize(cur).map_err(tl)? != SNAPSHOT_MAGIC {
            return Err("not a session snapshot".into());
        }
        let version = i32::deserialize(cur).map_err(tl)?;
        if version != SNAPSHOT_VERSION {
            return Err(format!("unsupported snapshot version {version}"));
        }

        let dc_id = i32::deserialize(cur).map_err(tl)?;
        let api_id = i32::deserialize(cur).map_err(tl)?;
        let test_mode = bool::deserialize(cur).map_err(tl)?;
        let key = Vec::<u8>::deserialize(cur).map_err(tl)?;
        let has_user = bool::deserialize(cur).map_err(tl)?;
        let user_id = i64::deserialize(cur).map_err(tl)?;
        let is_bot = bool::deserialize(cur).map_err(tl)?;
        let mut snap = Snapshot {
            session: SessionData {
                dc_id,
                api_id,
                test_mode,
                auth_key: (!key.is_empty()).then_some(key),
                user_id: has_user.then_some(user_id),
                is_bot,
            },
            ..Default::default()
        };

        let n_states = i32::deserialize(cur).map_err(tl)?.max(0);
        for _ in 0..n_states {
            let st = UpdateState {
                scope: i64::deserialize(cur).map_err(tl)?,
                pts:   i32::deserialize(cur).map_err(tl)?,
                qts:   i32::deserialize(cur).map_err(tl)?,
                date:  i32::deserialize(cur).map_err(tl)?,
                seq:   i32::deserialize(cur).map_err(tl)?,
            };
            snap.states.insert(st.scope, st);
        }

        let n_peers = i32::deserialize(cur).map_err(tl)?.max(0);
        for _ in 0..n_peers {
            let id = i64::deserialize(cur).map_err(tl)?;
            let access_hash = i64::deserialize(cur).map_err(tl)?;
            let kind = String::deserialize(cur).map_err(tl)?;
            let kind = PeerKind::parse(&kind).ok_or_else(|| format!("unknown peer kind {kind:?}"))?;
            let phone = String::deserialize(cur).map_err(tl)?;
            let usernames = Vec::<String>::deserialize(cur).map_err(tl)?;
            snap.upsert(&PeerEntry {
                id,
                access_hash,
                kind,
                phone: (!phone.is_empty()).then_some(phone),
                usernames,
            });
        }
        Ok(snap)
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

// ─── MemoryStorage ────────────────────────────────────────────────────────────

/// An ephemeral store that keeps nothing on disk.
///
/// Useful for tests or for bots that should always start fresh.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    data: Mutex<Snapshot>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn session(&self) -> io::Result<SessionData> {
        Ok(lock(&self.data).session.clone())
    }

    fn set_session(&self, data: &SessionData) -> io::Result<()> {
        lock(&self.data).session = data.clone();
        Ok(())
    }

    fn update_session(&self, edit: &mut dyn FnMut(&mut SessionData)) -> io::Result<()> {
        edit(&mut lock(&self.data).session);
        Ok(())
    }

    fn states(&self) -> io::Result<Vec<UpdateState>> {
        Ok(lock(&self.data).states.values().copied().collect())
    }

    fn state(&self, scope: i64) -> io::Result<Option<UpdateState>> {
        Ok(lock(&self.data).states.get(&scope).copied())
    }

    fn set_state(&self, state: UpdateState) -> io::Result<()> {
        lock(&self.data).states.insert(state.scope, state);
        Ok(())
    }

    fn remove_state(&self, scope: i64) -> io::Result<()> {
        lock(&self.data).states.remove(&scope);
        Ok(())
    }

    fn upsert_peers(&self, peers: &[PeerEntry]) -> io::Result<()> {
        let mut data = lock(&self.data);
        for p in peers {
            data.upsert(p);
        }
        Ok(())
    }

    fn peer_by_id(&self, id: i64) -> io::Result<Option<PeerEntry>> {
        Ok(lock(&self.data).peers.get(&id).cloned())
    }

    fn peer_by_username(&self, username: &str) -> io::Result<Option<PeerEntry>> {
        Ok(lock(&self.data).by_username(username))
    }

    fn peer_by_phone(&self, phone: &str) -> io::Result<Option<PeerEntry>> {
        Ok(lock(&self.data).by_phone(phone))
    }

    fn name(&self) -> &str { "memory" }
}

// ─── FileStorage ──────────────────────────────────────────────────────────────

/// Keeps the whole store in memory and rewrites one snapshot file after
/// every mutation.
///
/// The snapshot is written to a sibling temporary file and renamed over the
/// target, so a crash leaves either the old or the new snapshot on disk.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    data: Mutex<Snapshot>,
}

impl FileStorage {
    /// Open `path`, starting empty if the file does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let data = match std::fs::read(&path) {
            Ok(bytes) => Snapshot::decode(&bytes)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Snapshot::default(),
            Err(e) => return Err(e),
        };
        Ok(Self { path, data: Mutex::new(data) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the file and forget everything (e.g. on log out).
    pub fn delete(&self) -> io::Result<()> {
        *lock(&self.data) = Snapshot::default();
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }

    fn mutate<R>(&self, f: impl FnOnce(&mut Snapshot) -> R) -> io::Result<R> {
        let mut data = lock(&self.data);
        let out = f(&mut data);
        let bytes = data.encode();
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(out)
    }
}

impl Storage for FileStorage {
    fn session(&self) -> io::Result<SessionData> {
        Ok(lock(&self.data).session.clone())
    }

    fn set_session(&self, data: &SessionData) -> io::Result<()> {
        self.mutate(|s| s.session = data.clone())
    }

    fn update_session(&self, edit: &mut dyn FnMut(&mut SessionData)) -> io::Result<()> {
        self.mutate(|s| edit(&mut s.session))
    }

    fn states(&self) -> io::Result<Vec<UpdateState>> {
        Ok(lock(&self.data).states.values().copied().collect())
    }

    fn state(&self, scope: i64) -> io::Result<Option<UpdateState>> {
        Ok(lock(&self.data).states.get(&scope).copied())
    }

    fn set_state(&self, state: UpdateState) -> io::Result<()> {
        self.mutate(|s| {
            s.states.insert(state.scope, state);
        })
    }

    fn remove_state(&self, scope: i64) -> io::Result<()> {
        self.mutate(|s| {
            s.states.remove(&scope);
        })
    }

    fn upsert_peers(&self, peers: &[PeerEntry]) -> io::Result<()> {
        if peers.is_empty() {
            return Ok(());
        }
        self.mutate(|s| peers.iter().for_each(|p| s.upsert(p)))
    }

    fn peer_by_id(&self, id: i64) -> io::Result<Option<PeerEntry>> {
        Ok(lock(&self.data).peers.get(&id).cloned())
    }

    fn peer_by_username(&self, username: &str) -> io::Result<Option<PeerEntry>> {
        Ok(lock(&self.data).by_username(username))
    }

    fn peer_by_phone(&self, phone: &str) -> io::Result<Option<PeerEntry>> {
        Ok(lock(&self.data).by_phone(phone))
    }

    fn name(&self) -> &str { "file" }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peer(id: i64, names: &[&str]) -> PeerEntry {
        PeerEntry {
            id,
            access_hash: id * 3,
            kind: PeerKind::User,
            phone: Some(format!("+1555{id}")),
            usernames: names.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn snapshot_encoding_is_stable() {
        let mut snap = Snapshot::default();
        snap.session = SessionData {
            dc_id: 2,
            api_id: 6,
            test_mode: true,
            auth_key: Some(vec![7; 256]),
            user_id: Some(42),
            is_bot: true,
        };
        snap.states.insert(0, UpdateState { scope: 0, pts: 10, qts: 0, date: 5, seq: 3 });
        snap.upsert(&peer(42, &["alice"]));

        let back = Snapshot::decode(&snap.encode()).unwrap();
        assert_eq!(back, snap);
    }

    #[test]
    fn renamed_peer_drops_stale_username() {
        let store = MemoryStorage::new();
        store.upsert_peers(&[peer(1, &["old"])]).unwrap();
        store.upsert_peers(&[peer(1, &["new"])]).unwrap();
        assert_eq!(store.peer_by_username("old").unwrap(), None);
        assert_eq!(store.peer_by_username("@NEW").unwrap().map(|p| p.id), Some(1));
        assert_eq!(store.peer_by_phone("15551").unwrap().map(|p| p.id), Some(1));
    }

    #[test]
    fn garbage_is_invalid_data() {
        let err = Snapshot::decode(&[1, 2, 3, 4, 5, 6, 7, 8]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
