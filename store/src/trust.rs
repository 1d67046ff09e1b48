//! Trust record storage trait.

use crate::StoreError;
use fluzio_types::{Timestamp, TrustRecord, UserId};

pub trait TrustStore {
    fn get_trust(&self, user: &UserId) -> Result<Option<TrustRecord>, StoreError>;
    fn put_trust(&self, record: &TrustRecord) -> Result<(), StoreError>;

    /// Read-modify-write of one user's record as a single atomic step.
    ///
    /// A missing record starts as `TrustRecord::new(user, now)`. Returns the
    /// record as written.
    fn update_trust(
        &self,
        user: &UserId,
        now: Timestamp,
        f: &mut dyn FnMut(&mut TrustRecord),
    ) -> Result<TrustRecord, StoreError>;
}
