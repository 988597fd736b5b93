//! Identity atoms.
//!
//! PlayerId: 128-bit platform identity with a canonical 16-byte blob form.
//! Username: edition username; the primary username keys the request table.
//! LinkCode: short one-time code relayed to the player out of band.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{CoreError, InvalidCode, InvalidIdentity, InvalidName};

/// Column width for usernames and link codes in the backing store.
pub const MAX_NAME_LEN: usize = 16;

/// Code alphabet - Base58 style, no `0OIl`, safe to relay by hand.
const CODE_ALPHABET: &[u8] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// 128-bit player identity.
///
/// The blob form is the storage key: high 64 bits then low 64 bits, both
/// big-endian. Stable across processes; equality goes through it.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(Uuid);

impl PlayerId {
    pub fn new(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Rebuild from the (high, low) 64-bit halves.
    pub fn from_halves(hi: u64, lo: u64) -> Self {
        Self(Uuid::from_u64_pair(hi, lo))
    }

    pub fn halves(self) -> (u64, u64) {
        self.0.as_u64_pair()
    }

    /// Canonical 16-byte big-endian form, high half first.
    pub fn to_bytes(self) -> [u8; 16] {
        *self.0.as_bytes()
    }

    /// Decode the canonical blob form. Anything but 16 bytes is corrupt.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CoreError> {
        let bytes: [u8; 16] = bytes
            .try_into()
            .map_err(|_| InvalidIdentity { len: bytes.len() })?;
        Ok(Self(Uuid::from_bytes(bytes)))
    }

    pub fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl fmt::Debug for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PlayerId({})", self.0)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Edition username - non-empty after trimming, at most 16 chars.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    pub fn parse(s: impl Into<String>) -> Result<Self, CoreError> {
        let s = s.into();
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(InvalidName {
                raw: s.clone(),
                reason: "empty".into(),
            }
            .into());
        }
        if trimmed.chars().count() > MAX_NAME_LEN {
            return Err(InvalidName {
                raw: s.clone(),
                reason: format!("longer than {MAX_NAME_LEN} chars"),
            }
            .into());
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Username({:?})", self.0)
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One-time link code. Comparison is exact and case-sensitive.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkCode(String);

impl LinkCode {
    pub fn parse(s: impl Into<String>) -> Result<Self, CoreError> {
        let s = s.into();
        if s.is_empty() {
            return Err(InvalidCode {
                raw: s.clone(),
                reason: "empty".into(),
            }
            .into());
        }
        if s.chars().count() > MAX_NAME_LEN {
            return Err(InvalidCode {
                raw: s.clone(),
                reason: format!("longer than {MAX_NAME_LEN} chars"),
            }
            .into());
        }
        Ok(Self(s))
    }

    /// Fresh random code from the unambiguous alphabet.
    ///
    /// `len` is clamped to the storage bound.
    pub fn generate(len: usize) -> Self {
        let len = len.clamp(1, MAX_NAME_LEN);
        let mut rng = rand::thread_rng();
        let code = (0..len)
            .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
            .collect();
        Self(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for LinkCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LinkCode({:?})", self.0)
    }
}

impl fmt::Display for LinkCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
