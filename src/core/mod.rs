//! Core domain types.
//!
//! Identity atoms, wall-clock time, and the two link record shapes. No I/O
//! here; everything is validated on the way in.

mod error;
mod identity;
mod link;
mod time;

pub use error::{CoreError, InvalidCode, InvalidIdentity, InvalidName};
pub use identity::{LinkCode, MAX_NAME_LEN, PlayerId, Username};
pub use link::{LinkRequest, LinkRequestResult, LinkedPlayer};
pub use time::UnixTime;
