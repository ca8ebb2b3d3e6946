//! PresetCache - TTL'd in-memory key-value cache
//!
//! Maps a deterministic request signature to a previously computed result so
//! repeated identical requests are served without re-invoking the generation
//! backend. Entries expire after a per-entry TTL; expired entries are dropped
//! lazily on read or eagerly via [`TtlCache::purge_expired`].
//!
//! # Example
//!
//! ```ignore
//! use presetcache::TtlCache;
//!
//! let cache: TtlCache<String> = TtlCache::new(Duration::from_secs(3600));
//! cache.insert("sig-abc".into(), "result".into()).await;
//! let hit = cache.get("sig-abc").await;
//! ```

mod store;

pub use store::TtlCache;

use std::time::Duration;

/// Default entry lifetime (1 hour)
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);
