//! Transform cache.
//!
//! Normalizing an image is the most expensive step of a run. The cache keeps
//! recent [`NormalizedImage`]s so a repeated run over the same directory (or a
//! retry within the TTL) can skip decode, resize and encode.
//!
//! The cache is purely an optimization: output is identical whether an entry
//! is present, expired or the cache is disabled. Entries are keyed by file
//! identity *and* scale, so an edited file or a different scale never returns
//! a stale payload.

pub mod clock;
pub mod ttl;

use std::path::PathBuf;
use std::time::SystemTime;

pub use clock::{Clock, ManualClock, SystemClock};
pub use ttl::{CacheStatistics, TtlCache};

use crate::io::reader::FileFingerprint;
use crate::raster::{NormalizedImage, Scale};

/// Cache of normalized images shared across a run.
pub type TransformCache = TtlCache<CacheKey, NormalizedImage>;

/// Identity of one image transform.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Absolute path of the source image.
    pub path: PathBuf,
    /// File size in bytes when it was read.
    pub len: u64,
    /// Modification time when it was read, if the platform reports one.
    pub modified: Option<SystemTime>,
    /// Scale the image was normalized at.
    pub scale: Scale,
}

impl CacheKey {
    /// Build a key from a file fingerprint and scale.
    pub fn new(path: PathBuf, fingerprint: FileFingerprint, scale: Scale) -> Self {
        Self {
            path,
            len: fingerprint.len,
            modified: fingerprint.modified,
            scale,
        }
    }
}
