//! Business review queue.
//!
//! Entry: a participation flagged by the decision engine. Exit: the owning
//! business's decision. The queue also carries alerts the business should
//! act on but the engine never enforces by itself.

use fluzio_types::{
    BusinessId, MissionId, ParticipationId, ReasonCode, ReviewPriority, RewardPoints, Timestamp,
    UserId,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewItem {
    pub participation_id: ParticipationId,
    pub business_id: BusinessId,
    pub mission_id: MissionId,
    pub user_id: UserId,
    pub priority: ReviewPriority,
    pub reason: ReasonCode,
    pub reward_points: RewardPoints,
    pub flagged_at: Timestamp,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReviewAlert {
    /// The user reached the revocation threshold; suspension is recommended.
    SuspensionRecommended {
        business_id: BusinessId,
        user_id: UserId,
        revocations: u32,
        at: Timestamp,
    },
    FraudReported {
        business_id: BusinessId,
        user_id: UserId,
        participation_id: ParticipationId,
        at: Timestamp,
    },
}

impl ReviewAlert {
    pub fn business_id(&self) -> &BusinessId {
        match self {
            Self::SuspensionRecommended { business_id, .. } | Self::FraudReported { business_id, .. } => {
                business_id
            }
        }
    }
}

#[derive(Default)]
pub struct ReviewQueue {
    items: Mutex<BTreeMap<ParticipationId, ReviewItem>>,
    alerts: Mutex<Vec<ReviewAlert>>,
}

fn guard<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ReviewQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, item: ReviewItem) {
        tracing::info!(
            participation = %item.participation_id,
            business = %item.business_id,
            priority = ?item.priority,
            reason = %item.reason,
            "queued for business review"
        );
        guard(&self.items).insert(item.participation_id, item);
    }

    pub fn remove(&self, participation: ParticipationId) -> Option<ReviewItem> {
        guard(&self.items).remove(&participation)
    }

    pub fn contains(&self, participation: ParticipationId) -> bool {
        guard(&self.items).contains_key(&participation)
    }

    pub fn len(&self) -> usize {
        guard(&self.items).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A business's pending items, highest priority first, oldest first
    /// within a priority.
    pub fn list(&self, business: &BusinessId) -> Vec<ReviewItem> {
        let mut items: Vec<ReviewItem> = guard(&self.items)
            .values()
            .filter(|i| &i.business_id == business)
            .cloned()
            .collect();
        items.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then(a.flagged_at.cmp(&b.flagged_at))
                .then(a.participation_id.cmp(&b.participation_id))
        });
        items
    }

    pub fn alert(&self, alert: ReviewAlert) {
        tracing::warn!(business = %alert.business_id(), alert = ?alert, "review alert raised");
        guard(&self.alerts).push(alert);
    }

    pub fn alerts(&self, business: &BusinessId) -> Vec<ReviewAlert> {
        guard(&self.alerts)
            .iter()
            .filter(|a| a.business_id() == business)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: u64, business: &str, priority: ReviewPriority, at: u64) -> ReviewItem {
        ReviewItem {
            participation_id: ParticipationId::new(id),
            business_id: BusinessId::new(business),
            mission_id: MissionId::new("m1"),
            user_id: UserId::new("u1"),
            priority,
            reason: ReasonCode::ManualReviewRequired,
            reward_points: RewardPoints::new(10),
            flagged_at: Timestamp::new(at),
        }
    }

    #[test]
    fn lists_by_priority_then_age() {
        let q = ReviewQueue::new();
        q.push(item(1, "b1", ReviewPriority::Low, 10));
        q.push(item(2, "b1", ReviewPriority::High, 30));
        q.push(item(3, "b1", ReviewPriority::Normal, 20));
        q.push(item(4, "b1", ReviewPriority::High, 5));
        q.push(item(5, "b2", ReviewPriority::High, 1));

        let ids: Vec<u64> = q
            .list(&BusinessId::new("b1"))
            .iter()
            .map(|i| i.participation_id.raw())
            .collect();
        assert_eq!(ids, vec![4, 2, 3, 1]);
    }

    #[test]
    fn decision_removes_item() {
        let q = ReviewQueue::new();
        q.push(item(1, "b1", ReviewPriority::Low, 10));
        assert!(q.remove(ParticipationId::new(1)).is_some());
        assert!(q.is_empty());
        assert!(q.remove(ParticipationId::new(1)).is_none());
    }

    #[test]
    fn alerts_are_scoped_to_business() {
        let q = ReviewQueue::new();
        q.alert(ReviewAlert::SuspensionRecommended {
            business_id: BusinessId::new("b1"),
            user_id: UserId::new("u1"),
            revocations: 3,
            at: Timestamp::new(1),
        });
        assert_eq!(q.alerts(&BusinessId::new("b1")).len(), 1);
        assert!(q.alerts(&BusinessId::new("b2")).is_empty());
    }
}
