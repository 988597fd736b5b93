//! Player link storage capability.
//!
//! `PlayerLinkStore` is the seam between the link protocol and a concrete
//! backend: keyed upserts and deletes the backend must make atomic, plus
//! the timestamp-bounded purge the janitor drives. The protocol layer never
//! sees SQL.

pub mod memory;
pub mod sqlite;

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::core::{CoreError, LinkRequest, LinkedPlayer, PlayerId, UnixTime, Username};

/// Fault from a backing store. Protocol outcomes are never errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("io error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A stored row failed to decode back into domain types.
    #[error("corrupt row: {0}")]
    CorruptRow(#[from] CoreError),
    #[error("storage worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Capability interface over the two durable tables.
///
/// Implementations make the keyed upsert/delete primitives atomic; callers
/// get no application-level lock across operations on the same key, so a
/// verification racing a concurrent `put_request` may see either row, never
/// a torn one.
#[async_trait]
pub trait PlayerLinkStore: Send + Sync {
    /// True when `id` appears on either side of any confirmed link.
    async fn is_linked(&self, id: PlayerId) -> Result<bool, StorageError>;

    /// Confirmed link for a secondary identity, if any.
    async fn get_link(
        &self,
        secondary_id: PlayerId,
    ) -> Result<Option<LinkedPlayer>, StorageError>;

    /// Create-or-replace keyed on the secondary identity.
    async fn upsert_link(&self, link: &LinkedPlayer) -> Result<(), StorageError>;

    /// Delete any link naming `id` on either side. Absent rows are a no-op.
    async fn remove_link(&self, id: PlayerId) -> Result<(), StorageError>;

    /// Create-or-replace keyed on the primary username.
    async fn put_request(&self, request: &LinkRequest) -> Result<(), StorageError>;

    async fn get_request(
        &self,
        primary_name: &Username,
    ) -> Result<Option<LinkRequest>, StorageError>;

    /// Delete by key. Absent rows are a no-op.
    async fn remove_request(&self, primary_name: &Username) -> Result<(), StorageError>;

    /// Delete every request with `requested_at < now - timeout`. Returns the
    /// number of rows removed.
    async fn purge_expired(
        &self,
        now: UnixTime,
        timeout: Duration,
    ) -> Result<u64, StorageError>;
}
