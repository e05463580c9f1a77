//! In-process result cache.
//!
//! A single TTL-based memoization layer shared by the snapshot index and the
//! insight gateway. The cache is an explicitly constructed handle passed to
//! whichever component needs it; there is no module-level instance.
//!
//! - Lazy expiry on access, plus an explicit `cleanup()` sweep
//! - Optional size bound with oldest-first eviction
//! - Namespaced SHA-256 keys; two-sided keys are order-independent

pub mod clock;
pub mod keys;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use keys::{compute_cache_key, generate_key, snapshots_key, timeline_key};
pub use store::{CacheEntry, CacheStats, DEFAULT_TTL, ResultCache};
