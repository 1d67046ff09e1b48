//! Rate-limit window storage trait.

use crate::StoreError;
use fluzio_types::{MissionId, RateLimitKey};

/// Append-only submission counts partitioned by `(key, mission, day)`.
///
/// Windows reset implicitly when the day index changes; backends may expire
/// old windows but never reset a live one.
pub trait RateLimitStore {
    /// Atomically add one submission and return the new count.
    fn increment_window(&self, key: &RateLimitKey, mission: &MissionId, day: u64) -> Result<u32, StoreError>;

    fn window_count(&self, key: &RateLimitKey, mission: &MissionId, day: u64) -> Result<u32, StoreError>;
}
