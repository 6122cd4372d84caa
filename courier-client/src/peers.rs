//! Peer/access cache: who a numeric id is, and the access hash needed to
//! address it.
//!
//! Ids are stored *marked*, so the three id spaces cannot collide:
//!
//! | Peer       | Marked id                       |
//! |------------|---------------------------------|
//! | user / bot | `user_id`                       |
//! | basic group| `-chat_id`                      |
//! | channel    | `-1_000_000_000_000 - channel_id` |

use std::collections::HashMap;
use std::io;
use std::sync::{Arc, PoisonError, RwLock};

use courier_tl_types::{enums, types};

use crate::storage::{Storage, normalize_phone, normalize_username};

const CHANNEL_MARK: i64 = -1_000_000_000_000;

// ─── Ids ──────────────────────────────────────────────────────────────────────

pub fn chat_marked(chat_id: i64) -> i64 {
    -chat_id
}

pub fn channel_marked(channel_id: i64) -> i64 {
    CHANNEL_MARK - channel_id
}

/// Marked id of any peer.
pub fn marked_id(peer: &enums::Peer) -> i64 {
    match peer {
        enums::Peer::User(p) => p.user_id,
        enums::Peer::Chat(p) => chat_marked(p.chat_id),
        enums::Peer::Channel(p) => channel_marked(p.channel_id),
    }
}

/// Marked id of a chat record.
pub fn marked_chat_id(chat: &enums::Chat) -> i64 {
    match chat {
        enums::Chat::Channel(c) => channel_marked(c.id),
        enums::Chat::ChannelForbidden(c) => channel_marked(c.id),
        other => chat_marked(other.id()),
    }
}

/// Bare channel id behind a marked id, if it is one.
pub fn channel_id(marked: i64) -> Option<i64> {
    (marked < CHANNEL_MARK).then(|| CHANNEL_MARK - marked)
}

// ─── Entries ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PeerKind {
    User,
    Bot,
    Group,
    Channel,
    Supergroup,
}

impl PeerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User       => "user",
            Self::Bot        => "bot",
            Self::Group      => "group",
            Self::Channel    => "channel",
            Self::Supergroup => "supergroup",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "user"       => Self::User,
            "bot"        => Self::Bot,
            "group"      => Self::Group,
            "channel"    => Self::Channel,
            "supergroup" => Self::Supergroup,
            _ => return None,
        })
    }
}

/// One cached peer.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PeerEntry {
    /// Marked id.
    pub id:          i64,
    /// `0` for basic groups, which need none.
    pub access_hash: i64,
    pub kind:        PeerKind,
    /// Digits only.
    pub phone:       Option<String>,
    /// Lowercase, without `@`.
    pub usernames:   Vec<String>,
}

impl PeerEntry {
    /// The `InputPeer` addressing this entry.
    pub fn input_peer(&self) -> enums::InputPeer {
        match self.kind {
            PeerKind::User | PeerKind::Bot => {
                types::InputPeerUser { user_id: self.id, access_hash: self.access_hash }.into()
            }
            PeerKind::Group => types::InputPeerChat { chat_id: -self.id }.into(),
            PeerKind::Channel | PeerKind::Supergroup => types::InputPeerChannel {
                channel_id:  CHANNEL_MARK - self.id,
                access_hash: self.access_hash,
            }
            .into(),
        }
    }

    /// The `InputChannel` for channels and supergroups.
    pub fn input_channel(&self) -> Option<enums::InputChannel> {
        let channel_id = channel_id(self.id)?;
        Some(types::InputChannel { channel_id, access_hash: self.access_hash }.into())
    }
}

fn collect_usernames(main: Option<&str>, extra: Option<&[enums::Username]>) -> Vec<String> {
    let mut out: Vec<String> = main.into_iter().map(normalize_username).collect();
    for enums::Username::Username(u) in extra.unwrap_or_default() {
        let name = normalize_username(&u.username);
        if u.active && !out.contains(&name) {
            out.push(name);
        }
    }
    out
}

/// Cache entry for a full user record. `min` and empty users yield `None`.
pub fn entry_from_user(user: &enums::User) -> Option<PeerEntry> {
    let enums::User::User(u) = user else { return None };
    if u.min {
        return None;
    }
    Some(PeerEntry {
        id:          u.id,
        access_hash: u.access_hash.unwrap_or(0),
        kind:        if u.bot { PeerKind::Bot } else { PeerKind::User },
        phone:       u.phone.as_deref().map(normalize_phone).filter(|p| !p.is_empty()),
        usernames:   collect_usernames(u.username.as_deref(), u.usernames.as_deref()),
    })
}

/// Cache entry for a full chat record. `min` channels and empty chats yield `None`.
pub fn entry_from_chat(chat: &enums::Chat) -> Option<PeerEntry> {
    let group = |id: i64| PeerEntry {
        id:          chat_marked(id),
        access_hash: 0,
        kind:        PeerKind::Group,
        phone:       None,
        usernames:   Vec::new(),
    };
    let channel_kind = |broadcast: bool| if broadcast { PeerKind::Channel } else { PeerKind::Supergroup };

    match chat {
        enums::Chat::Empty(_) => None,
        enums::Chat::Chat(c) => Some(group(c.id)),
        enums::Chat::Forbidden(c) => Some(group(c.id)),
        enums::Chat::Channel(c) if c.min => None,
        enums::Chat::Channel(c) => Some(PeerEntry {
            id:          channel_marked(c.id),
            access_hash: c.access_hash.unwrap_or(0),
            kind:        channel_kind(c.broadcast),
            phone:       None,
            usernames:   collect_usernames(c.username.as_deref(), c.usernames.as_deref()),
        }),
        enums::Chat::ChannelForbidden(c) => Some(PeerEntry {
            id:          channel_marked(c.id),
            access_hash: c.access_hash,
            kind:        channel_kind(c.broadcast),
            phone:       None,
            usernames:   Vec::new(),
        }),
    }
}

fn is_min_user(user: &enums::User) -> bool {
    matches!(user, enums::User::User(u) if u.min)
}

fn is_min_chat(chat: &enums::Chat) -> bool {
    matches!(chat, enums::Chat::Channel(c) if c.min)
}

// ─── PeerCache ────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Index {
    by_id:       HashMap<i64, PeerEntry>,
    by_username: HashMap<String, i64>,
    by_phone:    HashMap<String, i64>,
}

impl Index {
    fn insert(&mut self, entry: PeerEntry) {
        if let Some(old) = self.by_id.get(&entry.id) {
            for name in &old.usernames {
                self.by_username.remove(name);
            }
            if let Some(phone) = &old.phone {
                self.by_phone.remove(phone);
            }
        }
        for name in &entry.usernames {
            self.by_username.insert(name.clone(), entry.id);
        }
        if let Some(phone) = &entry.phone {
            self.by_phone.insert(phone.clone(), entry.id);
        }
        self.by_id.insert(entry.id, entry);
    }
}

/// In-memory front over a [`Storage`], written through on every upsert.
///
/// Only full records are accepted: `min` users and channels carry access
/// hashes that are not valid for this account and would poison the cache.
pub struct PeerCache {
    storage: Arc<dyn Storage>,
    index:   RwLock<Index>,
}

impl PeerCache {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage, index: RwLock::new(Index::default()) }
    }

    /// Store `entries` in storage and in memory.
    pub fn upsert(&self, entries: Vec<PeerEntry>) -> io::Result<()> {
        if entries.is_empty() {
            return Ok(());
        }
        self.storage.upsert_peers(&entries)?;
        let mut index = self.index.write().unwrap_or_else(PoisonError::into_inner);
        for entry in entries {
            index.insert(entry);
        }
        Ok(())
    }

    /// Upsert every full user. Returns `true` if a `min` record was seen.
    pub fn upsert_users(&self, users: &[enums::User]) -> io::Result<bool> {
        self.upsert(users.iter().filter_map(entry_from_user).collect())?;
        Ok(users.iter().any(is_min_user))
    }

    /// Upsert every full chat. Returns `true` if a `min` record was seen.
    pub fn upsert_chats(&self, chats: &[enums::Chat]) -> io::Result<bool> {
        self.upsert(chats.iter().filter_map(entry_from_chat).collect())?;
        Ok(chats.iter().any(is_min_chat))
    }

    fn remember(&self, entry: Option<PeerEntry>) -> Option<PeerEntry> {
        if let Some(e) = &entry {
            self.index.write().unwrap_or_else(PoisonError::into_inner).insert(e.clone());
        }
        entry
    }

    /// Look up a marked id, falling back to storage on a memory miss.
    pub fn lookup(&self, id: i64) -> Option<PeerEntry> {
        if let Some(e) = self.index.read().unwrap_or_else(PoisonError::into_inner).by_id.get(&id) {
            return Some(e.clone());
        }
        let stored = self.storage.peer_by_id(id).unwrap_or_else(|e| {
            tracing::warn!("[courier] peer lookup {id} failed in {} storage: {e}", self.storage.name());
            None
        });
        self.remember(stored)
    }

    /// Case-insensitive; a leading `@` is ignored.
    pub fn lookup_by_username(&self, username: &str) -> Option<i64> {
        let name = normalize_username(username);
        if let Some(id) = self.index.read().unwrap_or_else(PoisonError::into_inner).by_username.get(&name) {
            return Some(*id);
        }
        let stored = self.storage.peer_by_username(&name).unwrap_or_else(|e| {
            tracing::warn!("[courier] username lookup failed in {} storage: {e}", self.storage.name());
            None
        });
        self.remember(stored).map(|e| e.id)
    }

    pub fn lookup_by_phone(&self, phone: &str) -> Option<i64> {
        let phone = normalize_phone(phone);
        if let Some(id) = self.index.read().unwrap_or_else(PoisonError::into_inner).by_phone.get(&phone) {
            return Some(*id);
        }
        let stored = self.storage.peer_by_phone(&phone).unwrap_or_else(|e| {
            tracing::warn!("[courier] phone lookup failed in {} storage: {e}", self.storage.name());
            None
        });
        self.remember(stored).map(|e| e.id)
    }

    pub fn input_peer(&self, id: i64) -> Option<enums::InputPeer> {
        self.lookup(id).map(|e| e.input_peer())
    }

    /// `InputChannel` for a marked channel id.
    pub fn input_channel(&self, id: i64) -> Option<enums::InputChannel> {
        self.lookup(id)?.input_channel()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn user(id: i64, min: bool) -> enums::User {
        types::User {
            id,
            min,
            access_hash: Some(id * 11),
            username: Some("Alice".into()),
            phone: Some("+44 7700 900".into()),
            ..Default::default()
        }
        .into()
    }

    fn channel(id: i64, broadcast: bool, min: bool) -> enums::Chat {
        types::Channel {
            id,
            broadcast,
            megagroup: !broadcast,
            min,
            access_hash: Some(5),
            title: "t".into(),
            ..Default::default()
        }
        .into()
    }

    #[test]
    fn marked_ids_do_not_collide() {
        assert_eq!(chat_marked(123), -123);
        assert_eq!(channel_marked(123), -1_000_000_000_123);
        assert_eq!(channel_id(-1_000_000_000_123), Some(123));
        assert_eq!(channel_id(-123), None);
        assert_eq!(marked_id(&types::PeerChannel { channel_id: 7 }.into()), -1_000_000_000_007);
    }

    #[test]
    fn min_records_are_skipped() {
        let cache = PeerCache::new(Arc::new(MemoryStorage::new()));
        assert!(cache.upsert_users(&[user(1, true)]).unwrap());
        assert_eq!(cache.lookup(1), None);

        assert!(!cache.upsert_users(&[user(1, false)]).unwrap());
        let e = cache.lookup(1).unwrap();
        assert_eq!(e.access_hash, 11);
        assert_eq!(e.kind, PeerKind::User);
        assert_eq!(e.phone.as_deref(), Some("447700900"));

        assert!(cache.upsert_chats(&[channel(9, true, true)]).unwrap());
        assert_eq!(cache.lookup(channel_marked(9)), None);
    }

    #[test]
    fn channels_and_groups_are_classified() {
        let cache = PeerCache::new(Arc::new(MemoryStorage::new()));
        cache
            .upsert_chats(&[
                channel(9, true, false),
                channel(10, false, false),
                types::Chat { id: 3, title: "g".into(), participants_count: 2, ..Default::default() }.into(),
            ])
            .unwrap();
        assert_eq!(cache.lookup(channel_marked(9)).unwrap().kind, PeerKind::Channel);
        assert_eq!(cache.lookup(channel_marked(10)).unwrap().kind, PeerKind::Supergroup);
        assert_eq!(cache.lookup(-3).unwrap().kind, PeerKind::Group);
        assert_eq!(
            cache.input_channel(channel_marked(9)),
            Some(types::InputChannel { channel_id: 9, access_hash: 5 }.into())
        );
        assert_eq!(cache.input_channel(-3), None);
    }

    #[test]
    fn username_and_phone_lookups_fall_back_to_storage() {
        let storage = Arc::new(MemoryStorage::new());
        PeerCache::new(storage.clone()).upsert_users(&[user(4, false)]).unwrap();

        // A fresh cache over the same storage starts cold.
        let cache = PeerCache::new(storage);
        assert_eq!(cache.lookup_by_username("@ALICE"), Some(4));
        assert_eq!(cache.lookup_by_phone("+447700900"), Some(4));
        assert_eq!(
            cache.input_peer(4),
            Some(types::InputPeerUser { user_id: 4, access_hash: 44 }.into())
        );
    }
}
