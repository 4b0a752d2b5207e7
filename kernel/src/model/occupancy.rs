//! Capacity ledger primitives.
//!
//! Occupancy is never stored. It is always the sum of `players` over the
//! confirmed reservations of a slot, so a cancellation can never be counted
//! twice.

use crate::model::{id::TurfId, reservation::Reservation, slot::TimeSlot};
use chrono::NaiveDate;
use derive_new::new;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, new)]
pub struct SlotKey {
    pub turf_id: TurfId,
    pub date: NaiveDate,
    pub slot: TimeSlot,
}

impl SlotKey {
    /// Stable name of the slot, used to serialize admissions for it
    /// (PostgreSQL hashes it into an advisory lock id).
    pub fn lock_name(&self) -> String {
        format!("{}:{}:{:02}", self.turf_id, self.date, self.slot.start_hour())
    }
}

/// Sum of players of the confirmed reservations matching `key`.
pub fn occupancy_of<'a>(
    reservations: impl IntoIterator<Item = &'a Reservation>,
    key: &SlotKey,
) -> i32 {
    reservations
        .into_iter()
        .filter(|r| r.is_confirmed() && r.slot_key() == *key)
        .map(|r| r.players)
        .sum()
}

/// Occupancy of every slot of one turf and date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotOccupancy(BTreeMap<TimeSlot, i32>);

impl SlotOccupancy {
    /// Aggregates confirmed reservations per slot; the caller passes the
    /// reservations of a single turf and date.
    pub fn from_reservations<'a>(reservations: impl IntoIterator<Item = &'a Reservation>) -> Self {
        let mut map = BTreeMap::new();
        for r in reservations.into_iter().filter(|r| r.is_confirmed()) {
            *map.entry(r.slot).or_insert(0) += r.players;
        }
        Self(map)
    }

    pub fn get(&self, slot: TimeSlot) -> i32 {
        self.0.get(&slot).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TimeSlot, i32)> + '_ {
        self.0.iter().map(|(slot, count)| (*slot, *count))
    }
}

impl FromIterator<(TimeSlot, i32)> for SlotOccupancy {
    fn from_iter<T: IntoIterator<Item = (TimeSlot, i32)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::reservation::{tests::confirmed, ReservationStatus};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn cancelled_reservations_do_not_count() {
        let turf_id = TurfId::new();
        let mut cancelled = confirmed(turf_id, date(), 18, 5);
        cancelled.status = ReservationStatus::Cancelled;
        let reservations = vec![
            confirmed(turf_id, date(), 18, 12),
            confirmed(turf_id, date(), 18, 8),
            cancelled,
            confirmed(turf_id, date(), 19, 3),
            confirmed(TurfId::new(), date(), 18, 9),
        ];

        let key = SlotKey::new(turf_id, date(), TimeSlot::starting_at(18).unwrap());
        assert_eq!(occupancy_of(&reservations, &key), 20);
    }

    #[test]
    fn groups_confirmed_players_by_slot() {
        let turf_id = TurfId::new();
        let mut cancelled = confirmed(turf_id, date(), 6, 4);
        cancelled.status = ReservationStatus::Cancelled;
        let reservations = vec![
            confirmed(turf_id, date(), 18, 12),
            confirmed(turf_id, date(), 18, 8),
            confirmed(turf_id, date(), 7, 2),
            cancelled,
        ];

        let by_slot = SlotOccupancy::from_reservations(&reservations);
        assert_eq!(by_slot.get(TimeSlot::starting_at(18).unwrap()), 20);
        assert_eq!(by_slot.get(TimeSlot::starting_at(7).unwrap()), 2);
        assert_eq!(by_slot.get(TimeSlot::starting_at(6).unwrap()), 0);
        assert_eq!(by_slot.iter().count(), 2);
    }

    #[test]
    fn lock_name_is_stable_and_slot_specific() {
        let turf_id = TurfId::new();
        let a = SlotKey::new(turf_id, date(), TimeSlot::starting_at(18).unwrap());
        let b = SlotKey::new(turf_id, date(), TimeSlot::starting_at(19).unwrap());
        let c = SlotKey::new(turf_id, date().succ_opt().unwrap(), a.slot);
        assert_eq!(a.lock_name(), a.lock_name());
        assert_eq!(a.lock_name(), format!("{turf_id}:2024-06-01:18"));
        assert_ne!(a.lock_name(), b.lock_name());
        assert_ne!(a.lock_name(), c.lock_name());
    }
}
