#![allow(dead_code)]

//! Shared helpers for integration tests.

use std::sync::Arc;
use std::time::Duration;

use playerlink::{
    LinkCode, LinkRequest, LinkService, MemoryLinkStore, PlayerId, PlayerLinkStore,
    SqliteLinkStore, UnixTime, Username,
};
use tempfile::TempDir;

pub const VERIFY_TIMEOUT: Duration = Duration::from_secs(300);
pub const CODE_LEN: usize = 6;

/// One backend under test: the service plus direct store access for staging
/// rows.
pub struct Harness {
    pub name: &'static str,
    pub service: LinkService,
    pub store: Arc<dyn PlayerLinkStore>,
    _dir: Option<TempDir>,
}

pub fn memory_harness() -> Harness {
    let store: Arc<dyn PlayerLinkStore> = Arc::new(MemoryLinkStore::new());
    Harness {
        name: "memory",
        service: LinkService::new(store.clone(), VERIFY_TIMEOUT, CODE_LEN),
        store,
        _dir: None,
    }
}

pub fn sqlite_harness() -> Harness {
    let dir = TempDir::new().expect("temp dir");
    let store: Arc<dyn PlayerLinkStore> =
        Arc::new(SqliteLinkStore::open(dir.path()).expect("open link store"));
    Harness {
        name: "sqlite",
        service: LinkService::new(store.clone(), VERIFY_TIMEOUT, CODE_LEN),
        store,
        _dir: Some(dir),
    }
}

/// Both backends; protocol behavior must not differ between them.
pub fn harnesses() -> Vec<Harness> {
    vec![memory_harness(), sqlite_harness()]
}

pub fn player_id(n: u64) -> PlayerId {
    PlayerId::from_halves(n, n.wrapping_mul(0x9e37_79b9_7f4a_7c15))
}

pub fn username(s: &str) -> Username {
    Username::parse(s).expect("test username")
}

pub fn link_code(s: &str) -> LinkCode {
    LinkCode::parse(s).expect("test link code")
}

/// Stage a request directly in the store with a chosen timestamp.
pub async fn stage_request(
    store: &Arc<dyn PlayerLinkStore>,
    primary_name: &str,
    primary_id: PlayerId,
    code: &str,
    secondary_name: &str,
    requested_at: UnixTime,
) -> LinkRequest {
    let request = LinkRequest {
        primary_name: username(primary_name),
        primary_id,
        code: link_code(code),
        secondary_name: username(secondary_name),
        requested_at,
    };
    store.put_request(&request).await.expect("stage request");
    request
}
