use fluzio_types::{Participation, Timestamp, UserId};

/// Counts the cap checks run against, derived from committed records.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParticipationCounts {
    /// Participations occupying a slot (pending, flagged, approved, completed).
    pub total_active: u32,
    /// Slot-occupying participations created on the current UTC day.
    pub today: u32,
    /// The user's approved or completed participations.
    pub user_completed: u32,
    /// The user's slot-occupying participations, pending included.
    pub user_active: u32,
    pub last_completion: Option<Timestamp>,
}

impl ParticipationCounts {
    /// Tally one mission's participations from the point of view of `user`.
    pub fn tally(mission_participations: &[Participation], user: &UserId, now: Timestamp) -> Self {
        let today = now.day_index();
        let mut counts = Self::default();
        for p in mission_participations {
            if !p.status.occupies_slot() {
                continue;
            }
            counts.total_active += 1;
            if p.created_at.day_index() == today {
                counts.today += 1;
            }
            if &p.user_id != user {
                continue;
            }
            counts.user_active += 1;
            if p.status.is_completed() {
                counts.user_completed += 1;
                let at = p.completed_at.unwrap_or(p.created_at);
                counts.last_completion = Some(counts.last_completion.map_or(at, |cur| cur.max(at)));
            }
        }
        counts
    }
}
