//! Link service: the public contract over a `PlayerLinkStore`.
//!
//! Owns the request handshake - code generation, the verification state
//! machine, and what each outcome does to the staged row. The only
//! component that touches both tables.

use std::sync::Arc;
use std::time::Duration;

use crate::config::LinkingConfig;
use crate::core::{
    LinkCode, LinkRequest, LinkRequestResult, LinkedPlayer, PlayerId, UnixTime, Username,
};
use crate::store::{PlayerLinkStore, StorageError};

#[derive(Clone)]
pub struct LinkService {
    store: Arc<dyn PlayerLinkStore>,
    verify_timeout: Duration,
    code_len: usize,
}

impl LinkService {
    pub fn new(store: Arc<dyn PlayerLinkStore>, verify_timeout: Duration, code_len: usize) -> Self {
        Self {
            store,
            verify_timeout,
            code_len,
        }
    }

    pub fn from_config(store: Arc<dyn PlayerLinkStore>, config: &LinkingConfig) -> Self {
        Self::new(store, config.verify_timeout(), config.code_len)
    }

    pub fn verify_timeout(&self) -> Duration {
        self.verify_timeout
    }

    /// True when `id` appears on either side of any confirmed link.
    pub async fn is_linked(&self, id: PlayerId) -> Result<bool, StorageError> {
        self.store.is_linked(id).await
    }

    /// Confirmed link for a secondary identity, if any.
    pub async fn get_link(
        &self,
        secondary_id: PlayerId,
    ) -> Result<Option<LinkedPlayer>, StorageError> {
        self.store.get_link(secondary_id).await
    }

    /// Create or replace the confirmed link for `secondary_id`.
    pub async fn link_player(
        &self,
        secondary_id: PlayerId,
        primary_id: PlayerId,
        primary_name: Username,
    ) -> Result<(), StorageError> {
        self.store
            .upsert_link(&LinkedPlayer {
                primary_id,
                primary_name,
                secondary_id,
            })
            .await
    }

    /// Remove any link naming `id` on either side.
    pub async fn unlink_player(&self, id: PlayerId) -> Result<(), StorageError> {
        self.store.remove_link(id).await
    }

    /// Stage a request and hand back the code for out-of-band delivery.
    ///
    /// One request per primary username: a second call replaces the first.
    pub async fn create_link_request(
        &self,
        primary_id: PlayerId,
        primary_name: Username,
        secondary_name: Username,
    ) -> Result<LinkCode, StorageError> {
        let code = LinkCode::generate(self.code_len);
        let request = LinkRequest {
            primary_name,
            primary_id,
            code: code.clone(),
            secondary_name,
            requested_at: UnixTime::now(),
        };
        self.store.put_request(&request).await?;
        Ok(code)
    }

    /// Run one verification attempt against the staged request.
    pub async fn verify_link_request(
        &self,
        secondary_id: PlayerId,
        primary_name: &Username,
        secondary_name: &Username,
        code: &str,
    ) -> Result<LinkRequestResult, StorageError> {
        self.verify_at(secondary_id, primary_name, secondary_name, code, UnixTime::now())
            .await
    }

    /// Verification with an explicit `now`.
    ///
    /// Every outcome past the code check consumes the request; an invalid
    /// code leaves it in place so the player can retry.
    pub async fn verify_at(
        &self,
        secondary_id: PlayerId,
        primary_name: &Username,
        secondary_name: &Username,
        code: &str,
        now: UnixTime,
    ) -> Result<LinkRequestResult, StorageError> {
        let Some(request) = self.store.get_request(primary_name).await? else {
            return Ok(LinkRequestResult::NoLinkRequested);
        };

        // The code only redeems the pairing it was issued for.
        if request.secondary_name != *secondary_name {
            return Ok(LinkRequestResult::NoLinkRequested);
        }

        if request.code.as_str() != code {
            return Ok(LinkRequestResult::InvalidCode);
        }

        // Adjudicated - the row goes away whether or not it expired. A
        // failed delete doesn't fail the attempt; the janitor retires
        // leftovers.
        if let Err(err) = self.store.remove_request(primary_name).await {
            tracing::warn!(primary_name = %primary_name, "failed to consume link request: {err}");
        }

        if request.is_expired(self.verify_timeout, now) {
            return Ok(LinkRequestResult::RequestExpired);
        }

        self.store
            .upsert_link(&LinkedPlayer {
                primary_id: request.primary_id,
                primary_name: request.primary_name,
                secondary_id,
            })
            .await?;
        Ok(LinkRequestResult::LinkCompleted)
    }

    /// Drop every request older than the verify timeout. Janitor entry
    /// point; also callable directly.
    pub async fn clean_expired_requests(&self) -> Result<u64, StorageError> {
        self.store
            .purge_expired(UnixTime::now(), self.verify_timeout)
            .await
    }
}
