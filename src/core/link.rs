//! Link records: the durable pairing and the staged request.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::identity::{LinkCode, PlayerId, Username};
use super::time::UnixTime;

/// Durable confirmed link, keyed by the secondary identity.
///
/// At most one row per secondary id; a fresh link replaces the previous
/// pairing for that id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedPlayer {
    pub primary_id: PlayerId,
    pub primary_name: Username,
    pub secondary_id: PlayerId,
}

/// Staged link request, keyed by the primary username.
///
/// Existence means a link is in flight. Re-creating one for the same
/// username overwrites it - last writer wins, no stacking.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRequest {
    pub primary_name: Username,
    pub primary_id: PlayerId,
    pub code: LinkCode,
    /// Claimed counterpart. Not identity-verified until the handshake
    /// completes.
    pub secondary_name: Username,
    pub requested_at: UnixTime,
}

impl LinkRequest {
    /// A request strictly older than `timeout` at `now` can no longer
    /// complete.
    pub fn is_expired(&self, timeout: Duration, now: UnixTime) -> bool {
        now.since(self.requested_at) > timeout
    }
}

/// Outcome of one verification attempt.
///
/// These are normal results, not faults; each is terminal for the attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkRequestResult {
    /// No pending request for that username, or it names another
    /// counterpart.
    NoLinkRequested,
    /// Wrong code. The request survives for a retry.
    InvalidCode,
    /// Correct code, too late. The request was consumed.
    RequestExpired,
    /// Link written. The request was consumed.
    LinkCompleted,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(requested_at: u64) -> LinkRequest {
        LinkRequest {
            primary_name: Username::parse("Alice").unwrap(),
            primary_id: PlayerId::from_halves(1, 2),
            code: LinkCode::parse("XyZ123").unwrap(),
            secondary_name: Username::parse("AliceBE").unwrap(),
            requested_at: UnixTime(requested_at),
        }
    }

    #[test]
    fn expiry_is_strictly_greater_than_timeout() {
        let timeout = Duration::from_secs(300);
        let req = request(1_000);
        assert!(!req.is_expired(timeout, UnixTime(1_300)));
        assert!(req.is_expired(timeout, UnixTime(1_301)));
    }

    #[test]
    fn backwards_clock_never_expires() {
        let req = request(1_000);
        assert!(!req.is_expired(Duration::from_secs(300), UnixTime(500)));
    }
}
