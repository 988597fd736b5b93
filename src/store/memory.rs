//! In-memory backend.
//!
//! Same contract as the sqlite backend without durability: protocol tests
//! and embedded callers that don't want a database on disk.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{PlayerLinkStore, StorageError};
use crate::core::{LinkRequest, LinkedPlayer, PlayerId, UnixTime, Username};

#[derive(Debug, Default)]
pub struct MemoryLinkStore {
    links: Mutex<HashMap<PlayerId, LinkedPlayer>>,
    requests: Mutex<HashMap<Username, LinkRequest>>,
}

impl MemoryLinkStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PlayerLinkStore for MemoryLinkStore {
    async fn is_linked(&self, id: PlayerId) -> Result<bool, StorageError> {
        let links = self.links.lock().expect("link table lock poisoned");
        Ok(links
            .values()
            .any(|link| link.secondary_id == id || link.primary_id == id))
    }

    async fn get_link(
        &self,
        secondary_id: PlayerId,
    ) -> Result<Option<LinkedPlayer>, StorageError> {
        let links = self.links.lock().expect("link table lock poisoned");
        Ok(links.get(&secondary_id).cloned())
    }

    async fn upsert_link(&self, link: &LinkedPlayer) -> Result<(), StorageError> {
        let mut links = self.links.lock().expect("link table lock poisoned");
        links.insert(link.secondary_id, link.clone());
        Ok(())
    }

    async fn remove_link(&self, id: PlayerId) -> Result<(), StorageError> {
        let mut links = self.links.lock().expect("link table lock poisoned");
        links.retain(|_, link| link.secondary_id != id && link.primary_id != id);
        Ok(())
    }

    async fn put_request(&self, request: &LinkRequest) -> Result<(), StorageError> {
        let mut requests = self.requests.lock().expect("request table lock poisoned");
        requests.insert(request.primary_name.clone(), request.clone());
        Ok(())
    }

    async fn get_request(
        &self,
        primary_name: &Username,
    ) -> Result<Option<LinkRequest>, StorageError> {
        let requests = self.requests.lock().expect("request table lock poisoned");
        Ok(requests.get(primary_name).cloned())
    }

    async fn remove_request(&self, primary_name: &Username) -> Result<(), StorageError> {
        let mut requests = self.requests.lock().expect("request table lock poisoned");
        requests.remove(primary_name);
        Ok(())
    }

    async fn purge_expired(
        &self,
        now: UnixTime,
        timeout: Duration,
    ) -> Result<u64, StorageError> {
        let cutoff = now.saturating_sub(timeout);
        let mut requests = self.requests.lock().expect("request table lock poisoned");
        let before = requests.len();
        requests.retain(|_, request| request.requested_at >= cutoff);
        Ok((before - requests.len()) as u64)
    }
}
