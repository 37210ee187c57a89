//! The content-addressed cache store (spec §2 component C, §4.C).
//!
//! Maps a [`zr_fingerprint::Fingerprint`] to a committed [`CacheRecord`] on
//! the local filesystem, with an at-most-one-concurrent-build guarantee per
//! fingerprint (spec §3 invariant: "no two concurrent executions of the same
//! task with the same fingerprint occur"). See [`CacheStore`] for the full
//! contract.

mod error;
mod lock;
mod record;
mod store;

pub use error::{Error, Result};
pub use lock::{ReserveToken, Reservation};
pub use record::CacheRecord;
pub use store::{Admission, CacheStats, CacheStore, CACHE_DIR_ENV};
