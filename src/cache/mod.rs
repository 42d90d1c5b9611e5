//! Cache Module
//!
//! In-memory JSON cache with TTL expiration, namespace invalidation and a
//! read-through helper for request handlers.

mod clock;
mod entry;
mod namespace;
mod read_through;
mod stats;
mod store;


use std::sync::Arc;

use tokio::sync::RwLock;

// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::{CacheEntry, KeyInfo};
pub use namespace::Namespace;
pub use read_through::{invalidate, read_through};
pub use stats::CacheStats;
pub use store::CacheStore;

/// Store handle shared by every handler and the sweep task.
pub type SharedCache = Arc<RwLock<CacheStore>>;

// == Public Constants ==
/// TTL in seconds applied when a caller does not pass one
pub const DEFAULT_TTL_SECS: u64 = 300;
