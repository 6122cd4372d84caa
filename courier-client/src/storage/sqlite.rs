use std::io;
use std::path::Path;
use std::sync::Mutex;

use rusqlite::{Connection, OptionalExtension, params};

use super::{SessionData, Storage, UpdateState, lock, normalize_phone, normalize_username};
use crate::peers::{PeerEntry, PeerKind};

const SCHEMA_VERSION: i32 = 1;

fn sql(e: rusqlite::Error) -> io::Error {
    io::Error::new(io::ErrorKind::Other, e)
}

/// SQLite-backed store.
///
/// Creates its tables on first open. Enable with the `sqlite-session` Cargo
/// feature:
/// ```toml
/// [dependencies]
/// courier-client = { version = "*", features = ["sqlite-session"] }
/// ```
pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        Self::init(Connection::open(path).map_err(sql)?)
    }

    /// A database that lives only as long as this value.
    pub fn in_memory() -> io::Result<Self> {
        Self::init(Connection::open_in_memory().map_err(sql)?)
    }

    fn init(conn: Connection) -> io::Result<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS session (
                k         INTEGER PRIMARY KEY CHECK (k = 0),
                dc_id     INTEGER NOT NULL,
                api_id    INTEGER NOT NULL,
                test_mode INTEGER NOT NULL,
                auth_key  BLOB,
                user_id   INTEGER,
                is_bot    INTEGER NOT NULL
            );
            CREATE TABLE IF NOT EXISTS update_state (
                id   INTEGER PRIMARY KEY,
                pts  INTEGER NOT NULL,
                qts  INTEGER NOT NULL,
                date INTEGER NOT NULL,
                seq  INTEGER NOT NULL
            );
            CREATE TABLE IF NOT EXISTS peers (
                id           INTEGER PRIMARY KEY,
                access_hash  INTEGER NOT NULL,
                type         TEXT    NOT NULL,
                phone_number TEXT
            );
            CREATE TABLE IF NOT EXISTS usernames (
                id       INTEGER NOT NULL,
                username TEXT    PRIMARY KEY
            );
            CREATE INDEX IF NOT EXISTS idx_peers_phone ON peers (phone_number);
            CREATE INDEX IF NOT EXISTS idx_usernames_id ON usernames (id);
            CREATE TABLE IF NOT EXISTS version (number INTEGER PRIMARY KEY);",
        )
        .map_err(sql)?;
        conn.execute("INSERT OR IGNORE INTO version (number) VALUES (?1)", params![SCHEMA_VERSION])
            .map_err(sql)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn load_peer(conn: &Connection, id: i64) -> io::Result<Option<PeerEntry>> {
        let row = conn
            .query_row(
                "SELECT access_hash, type, phone_number FROM peers WHERE id = ?1",
                params![id],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?, row.get::<_, Option<String>>(2)?)),
            )
            .optional()
            .map_err(sql)?;
        let Some((access_hash, kind, phone)) = row else { return Ok(None) };
        let kind = PeerKind::parse(&kind)
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, format!("unknown peer type {kind:?}")))?;

        let mut stmt = conn.prepare("SELECT username FROM usernames WHERE id = ?1").map_err(sql)?;
        let usernames = stmt
            .query_map(params![id], |row| row.get::<_, String>(0))
            .map_err(sql)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(sql)?;
        Ok(Some(PeerEntry { id, access_hash, kind, phone, usernames }))
    }
}

impl Storage for SqliteStorage {
    fn session(&self) -> io::Result<SessionData> {
        let conn = lock(&self.conn);
        let data = conn
            .query_row(
                "SELECT dc_id, api_id, test_mode, auth_key, user_id, is_bot FROM session WHERE k = 0",
                [],
                |row| {
                    Ok(SessionData {
                        dc_id:     row.get(0)?,
                        api_id:    row.get(1)?,
                        test_mode: row.get(2)?,
                        auth_key:  row.get(3)?,
                        user_id:   row.get(4)?,
                        is_bot:    row.get(5)?,
                    })
                },
            )
            .optional()
            .map_err(sql)?;
        Ok(data.unwrap_or_default())
    }

    fn set_session(&self, data: &SessionData) -> io::Result<()> {
        lock(&self.conn)
            .execute(
                "INSERT OR REPLACE INTO session (k, dc_id, api_id, test_mode, auth_key, user_id, is_bot)
                 VALUES (0, ?1, ?2, ?3, ?4, ?5, ?6)",
                params![data.dc_id, data.api_id, data.test_mode, data.auth_key, data.user_id, data.is_bot],
            )
            .map_err(sql)?;
        Ok(())
    }

    fn states(&self) -> io::Result<Vec<UpdateState>> {
        let conn = lock(&self.conn);
        let mut stmt = conn.prepare("SELECT id, pts, qts, date, seq FROM update_state ORDER BY id").map_err(sql)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(UpdateState {
                    scope: row.get(0)?,
                    pts:   row.get(1)?,
                    qts:   row.get(2)?,
                    date:  row.get(3)?,
                    seq:   row.get(4)?,
                })
            })
            .map_err(sql)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(sql)?;
        Ok(rows)
    }

    fn set_state(&self, state: UpdateState) -> io::Result<()> {
        lock(&self.conn)
            .execute(
                "INSERT OR REPLACE INTO update_state (id, pts, qts, date, seq) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![state.scope, state.pts, state.qts, state.date, state.seq],
            )
            .map_err(sql)?;
        Ok(())
    }

    fn remove_state(&self, scope: i64) -> io::Result<()> {
        lock(&self.conn).execute("DELETE FROM update_state WHERE id = ?1", params![scope]).map_err(sql)?;
        Ok(())
    }

    fn upsert_peers(&self, peers: &[PeerEntry]) -> io::Result<()> {
        let mut conn = lock(&self.conn);
        let tx = conn.transaction().map_err(sql)?;
        for p in peers {
            tx.execute(
                "INSERT OR REPLACE INTO peers (id, access_hash, type, phone_number) VALUES (?1, ?2, ?3, ?4)",
                params![p.id, p.access_hash, p.kind.as_str(), p.phone.as_deref().map(normalize_phone)],
            )
            .map_err(sql)?;
            tx.execute("DELETE FROM usernames WHERE id = ?1", params![p.id]).map_err(sql)?;
            for name in &p.usernames {
                tx.execute(
                    "INSERT OR REPLACE INTO usernames (id, username) VALUES (?1, ?2)",
                    params![p.id, normalize_username(name)],
                )
                .map_err(sql)?;
            }
        }
        tx.commit().map_err(sql)
    }

    fn peer_by_id(&self, id: i64) -> io::Result<Option<PeerEntry>> {
        Self::load_peer(&lock(&self.conn), id)
    }

    fn peer_by_username(&self, username: &str) -> io::Result<Option<PeerEntry>> {
        let conn = lock(&self.conn);
        let id: Option<i64> = conn
            .query_row(
                "SELECT id FROM usernames WHERE username = ?1",
                params![normalize_username(username)],
                |row| row.get(0),
            )
            .optional()
            .map_err(sql)?;
        match id {
            Some(id) => Self::load_peer(&conn, id),
            None => Ok(None),
        }
    }

    fn peer_by_phone(&self, phone: &str) -> io::Result<Option<PeerEntry>> {
        let conn = lock(&self.conn);
        let id: Option<i64> = conn
            .query_row("SELECT id FROM peers WHERE phone_number = ?1", params![normalize_phone(phone)], |row| {
                row.get(0)
            })
            .optional()
            .map_err(sql)?;
        match id {
            Some(id) => Self::load_peer(&conn, id),
            None => Ok(None),
        }
    }

    fn name(&self) -> &str { "sqlite" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_tables() {
        let store = SqliteStorage::in_memory().unwrap();
        assert_eq!(store.session().unwrap(), SessionData::default());

        store.set_dc_id(2).unwrap();
        store.set_auth_key(Some(&[9; 256])).unwrap();
        let s = store.session().unwrap();
        assert_eq!(s.dc_id, 2);
        assert_eq!(s.auth_key.as_deref(), Some(&[9u8; 256][..]));

        store.set_state(UpdateState { scope: -1000000000123, pts: 5, qts: 0, date: 0, seq: 0 }).unwrap();
        assert_eq!(store.state(-1000000000123).unwrap().map(|s| s.pts), Some(5));
        store.remove_state(-1000000000123).unwrap();
        assert!(store.states().unwrap().is_empty());

        let peer = PeerEntry {
            id: 10,
            access_hash: 99,
            kind: PeerKind::Bot,
            phone: None,
            usernames: vec!["some_bot".into()],
        };
        store.upsert_peers(&[peer.clone()]).unwrap();
        assert_eq!(store.peer_by_username("@Some_Bot").unwrap(), Some(peer));
    }
}
