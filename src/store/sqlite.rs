//! SQLite backend.
//!
//! Connection-per-operation: every call opens its own handle inside the
//! runtime's blocking worker pool and releases it on every exit path.
//! Same-key atomicity comes from sqlite's keyed upsert/delete statements.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use rusqlite::{Connection, OpenFlags, OptionalExtension, params};
use tokio::task;

use super::{PlayerLinkStore, StorageError};
use crate::core::{LinkCode, LinkRequest, LinkedPlayer, PlayerId, UnixTime, Username};

const DB_FILE: &str = "playerlink.sqlite";
const BUSY_TIMEOUT_MS: u64 = 5_000;

#[derive(Clone, Debug)]
pub struct SqliteLinkStore {
    db_path: PathBuf,
}

impl SqliteLinkStore {
    /// Open the link database under `data_dir`, creating the file and both
    /// tables when absent. Safe to call on every startup.
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let data_dir = data_dir.as_ref();
        std::fs::create_dir_all(data_dir).map_err(|source| StorageError::Io {
            path: data_dir.to_path_buf(),
            source,
        })?;
        let db_path = data_dir.join(DB_FILE);

        let conn = open_connection(&db_path, true)?;
        initialize_schema(&conn)?;
        drop(conn);

        tracing::info!(path = %db_path.display(), "opened link database");
        Ok(Self { db_path })
    }

    /// Run `f` against a scoped connection on the blocking pool.
    async fn with_conn<T, F>(&self, op: &'static str, f: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StorageError> + Send + 'static,
    {
        let db_path = self.db_path.clone();
        task::spawn_blocking(move || {
            let conn = open_connection(&db_path, false)?;
            f(&conn)
        })
        .await?
        .map_err(|err| {
            tracing::error!(op, "link store operation failed: {err}");
            err
        })
    }
}

#[async_trait]
impl PlayerLinkStore for SqliteLinkStore {
    async fn is_linked(&self, id: PlayerId) -> Result<bool, StorageError> {
        self.with_conn("is_linked", move |conn| {
            let hit: Option<i64> = conn
                .query_row(
                    "SELECT 1 FROM linked_players WHERE secondary_id = ?1 OR primary_id = ?1",
                    params![id.to_bytes().as_slice()],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(hit.is_some())
        })
        .await
    }

    async fn get_link(
        &self,
        secondary_id: PlayerId,
    ) -> Result<Option<LinkedPlayer>, StorageError> {
        self.with_conn("get_link", move |conn| {
            conn.query_row(
                "SELECT primary_id, primary_name FROM linked_players WHERE secondary_id = ?1",
                params![secondary_id.to_bytes().as_slice()],
                |row| Ok((row.get::<_, Vec<u8>>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?
            .map(|(primary_blob, primary_name)| {
                Ok(LinkedPlayer {
                    primary_id: PlayerId::from_bytes(&primary_blob)?,
                    primary_name: Username::parse(primary_name)?,
                    secondary_id,
                })
            })
            .transpose()
        })
        .await
    }

    async fn upsert_link(&self, link: &LinkedPlayer) -> Result<(), StorageError> {
        let link = link.clone();
        self.with_conn("upsert_link", move |conn| {
            conn.execute(
                "INSERT INTO linked_players (secondary_id, primary_id, primary_name) \
                 VALUES (?1, ?2, ?3) \
                 ON CONFLICT(secondary_id) DO UPDATE SET \
                   primary_id = excluded.primary_id, \
                   primary_name = excluded.primary_name",
                params![
                    link.secondary_id.to_bytes().as_slice(),
                    link.primary_id.to_bytes().as_slice(),
                    link.primary_name.as_str(),
                ],
            )?;
            Ok(())
        })
        .await
    }

    async fn remove_link(&self, id: PlayerId) -> Result<(), StorageError> {
        self.with_conn("remove_link", move |conn| {
            conn.execute(
                "DELETE FROM linked_players WHERE secondary_id = ?1 OR primary_id = ?1",
                params![id.to_bytes().as_slice()],
            )?;
            Ok(())
        })
        .await
    }

    async fn put_request(&self, request: &LinkRequest) -> Result<(), StorageError> {
        let request = request.clone();
        self.with_conn("put_request", move |conn| {
            conn.execute(
                "INSERT INTO link_requests \
                   (primary_name, primary_id, link_code, secondary_name, requested_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5) \
                 ON CONFLICT(primary_name) DO UPDATE SET \
                   primary_id = excluded.primary_id, \
                   link_code = excluded.link_code, \
                   secondary_name = excluded.secondary_name, \
                   requested_at = excluded.requested_at",
                params![
                    request.primary_name.as_str(),
                    request.primary_id.to_bytes().as_slice(),
                    request.code.as_str(),
                    request.secondary_name.as_str(),
                    request.requested_at.0 as i64,
                ],
            )?;
            Ok(())
        })
        .await
    }

    async fn get_request(
        &self,
        primary_name: &Username,
    ) -> Result<Option<LinkRequest>, StorageError> {
        let primary_name = primary_name.clone();
        self.with_conn("get_request", move |conn| {
            conn.query_row(
                "SELECT primary_id, link_code, secondary_name, requested_at \
                 FROM link_requests WHERE primary_name = ?1",
                params![primary_name.as_str()],
                |row| {
                    Ok((
                        row.get::<_, Vec<u8>>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, i64>(3)?,
                    ))
                },
            )
            .optional()?
            .map(|(primary_blob, code, secondary_name, requested_at)| {
                Ok(LinkRequest {
                    primary_name: primary_name.clone(),
                    primary_id: PlayerId::from_bytes(&primary_blob)?,
                    code: LinkCode::parse(code)?,
                    secondary_name: Username::parse(secondary_name)?,
                    requested_at: UnixTime(requested_at as u64),
                })
            })
            .transpose()
        })
        .await
    }

    async fn remove_request(&self, primary_name: &Username) -> Result<(), StorageError> {
        let primary_name = primary_name.clone();
        self.with_conn("remove_request", move |conn| {
            conn.execute(
                "DELETE FROM link_requests WHERE primary_name = ?1",
                params![primary_name.as_str()],
            )?;
            Ok(())
        })
        .await
    }

    async fn purge_expired(
        &self,
        now: UnixTime,
        timeout: Duration,
    ) -> Result<u64, StorageError> {
        self.with_conn("purge_expired", move |conn| {
            let cutoff = now.saturating_sub(timeout);
            let removed = conn.execute(
                "DELETE FROM link_requests WHERE requested_at < ?1",
                params![cutoff.0 as i64],
            )?;
            Ok(removed as u64)
        })
        .await
    }
}

fn open_connection(path: &Path, create: bool) -> Result<Connection, StorageError> {
    let mut flags = OpenFlags::SQLITE_OPEN_READ_WRITE;
    if create {
        flags |= OpenFlags::SQLITE_OPEN_CREATE;
    }
    let conn = Connection::open_with_flags(path, flags)?;
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.busy_timeout(Duration::from_millis(BUSY_TIMEOUT_MS))?;
    Ok(conn)
}

fn initialize_schema(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS linked_players (
           secondary_id BLOB PRIMARY KEY,
           primary_id BLOB NOT NULL,
           primary_name TEXT NOT NULL
         );
         CREATE INDEX IF NOT EXISTS linked_players_by_identity
           ON linked_players (secondary_id, primary_id);
         CREATE TABLE IF NOT EXISTS link_requests (
           primary_name TEXT PRIMARY KEY,
           primary_id BLOB NOT NULL,
           link_code TEXT NOT NULL,
           secondary_name TEXT NOT NULL,
           requested_at INTEGER NOT NULL
         );
         CREATE INDEX IF NOT EXISTS link_requests_by_age
           ON link_requests (requested_at);",
    )?;
    Ok(())
}
