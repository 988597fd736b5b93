#![forbid(unsafe_code)]

//! Durable cross-edition player account links: a confirmed-link table plus a
//! short-lived, code-verified request handshake that promotes an
//! unauthenticated claim into a link record.

pub mod config;
pub mod core;
pub mod error;
pub mod janitor;
pub mod service;
pub mod store;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;

// Re-export the working surface at the crate root for convenience.
pub use crate::config::{Config, DatabaseConfig, LinkingConfig};
pub use crate::core::{
    LinkCode, LinkRequest, LinkRequestResult, LinkedPlayer, PlayerId, UnixTime, Username,
};
pub use crate::service::LinkService;
pub use crate::store::memory::MemoryLinkStore;
pub use crate::store::sqlite::SqliteLinkStore;
pub use crate::store::{PlayerLinkStore, StorageError};
