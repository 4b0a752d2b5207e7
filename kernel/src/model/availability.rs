//! Traffic-light classification of slot fullness for the booking grid.
//!
//! The view is advisory. Admission re-checks capacity when it writes.

use crate::model::{id::TurfId, occupancy::SlotOccupancy, slot::TimeSlot, turf::Turf};
use chrono::NaiveDate;
use serde::Serialize;
use shared::config::BookingConfig;

// 並び順は「空いている」→「埋まっている」の順
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotBand {
    Open,
    Filling,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandPolicy {
    filling_percent: u32,
    closing_percent: u32,
}

impl BandPolicy {
    pub fn new(filling_percent: u32, closing_percent: u32) -> Self {
        let closing_percent = closing_percent.min(100);
        Self {
            filling_percent: filling_percent.min(closing_percent),
            closing_percent,
        }
    }

    /// Classifies a slot. A slot at or above capacity is always `Closed`.
    pub fn classify(&self, occupancy: i32, capacity: i32) -> SlotBand {
        if capacity <= 0 || occupancy >= capacity {
            return SlotBand::Closed;
        }
        let occupied = i64::from(occupancy.max(0)) * 100;
        let capacity = i64::from(capacity);
        if occupied >= capacity * i64::from(self.closing_percent) {
            SlotBand::Closed
        } else if occupied >= capacity * i64::from(self.filling_percent) {
            SlotBand::Filling
        } else {
            SlotBand::Open
        }
    }
}

impl Default for BandPolicy {
    fn default() -> Self {
        BandPolicy::from(&BookingConfig::default())
    }
}

impl From<&BookingConfig> for BandPolicy {
    fn from(value: &BookingConfig) -> Self {
        Self::new(value.filling_percent, value.closing_percent)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotAvailability {
    pub slot: TimeSlot,
    pub occupancy: i32,
    pub capacity: i32,
    pub remaining: i32,
    pub band: SlotBand,
    pub selectable: bool,
}

impl SlotAvailability {
    pub fn new(slot: TimeSlot, occupancy: i32, capacity: i32, policy: &BandPolicy) -> Self {
        Self {
            slot,
            occupancy,
            capacity,
            remaining: (capacity - occupancy).max(0),
            band: policy.classify(occupancy, capacity),
            selectable: occupancy < capacity,
        }
    }
}

/// Availability of every slot of a turf on one date.
#[derive(Debug, Clone)]
pub struct DayAvailability {
    pub turf_id: TurfId,
    pub date: NaiveDate,
    pub capacity: i32,
    pub slots: Vec<SlotAvailability>,
}

impl DayAvailability {
    pub fn build(turf: &Turf, date: NaiveDate, occupancy: &SlotOccupancy, policy: &BandPolicy) -> Self {
        let slots = TimeSlot::all()
            .map(|slot| SlotAvailability::new(slot, occupancy.get(slot), turf.capacity, policy))
            .collect();
        Self {
            turf_id: turf.turf_id,
            date,
            capacity: turf.capacity,
            slots,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    // 既定値は容量 22 のときに 11 人で黄色、19 人で赤になる
    #[rstest]
    #[case(0, SlotBand::Open)]
    #[case(10, SlotBand::Open)]
    #[case(11, SlotBand::Filling)]
    #[case(18, SlotBand::Filling)]
    #[case(19, SlotBand::Closed)]
    #[case(22, SlotBand::Closed)]
    #[case(25, SlotBand::Closed)]
    fn default_policy_bands_for_capacity_22(#[case] occupancy: i32, #[case] expected: SlotBand) {
        assert_eq!(BandPolicy::default().classify(occupancy, 22), expected);
    }

    #[rstest]
    #[case(1)]
    #[case(7)]
    #[case(22)]
    #[case(100)]
    fn band_never_regresses_as_occupancy_grows(#[case] capacity: i32) {
        let policy = BandPolicy::default();
        let bands: Vec<SlotBand> = (0..=capacity + 2)
            .map(|occupancy| policy.classify(occupancy, capacity))
            .collect();
        assert!(bands.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(policy.classify(capacity, capacity), SlotBand::Closed);
    }

    #[test]
    fn full_slot_is_not_selectable_but_red_slot_with_room_is() {
        let policy = BandPolicy::default();
        let slot = TimeSlot::starting_at(18).unwrap();

        let full = SlotAvailability::new(slot, 22, 22, &policy);
        assert!(!full.selectable);
        assert_eq!(full.remaining, 0);

        let nearly = SlotAvailability::new(slot, 20, 22, &policy);
        assert_eq!(nearly.band, SlotBand::Closed);
        assert!(nearly.selectable);
        assert_eq!(nearly.remaining, 2);
    }

    #[test]
    fn day_availability_lists_every_slot() {
        let turf = crate::model::turf::tests::turf_named("Arena", 22);
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let slot = TimeSlot::starting_at(18).unwrap();
        let occupancy: SlotOccupancy = [(slot, 20)].into_iter().collect();

        let day = DayAvailability::build(&turf, date, &occupancy, &BandPolicy::default());
        assert_eq!(day.slots.len(), TimeSlot::COUNT);
        let evening = day.slots.iter().find(|s| s.slot == slot).unwrap();
        assert_eq!(evening.occupancy, 20);
        assert!(day.slots.iter().filter(|s| s.slot != slot).all(|s| s.occupancy == 0));
    }
}
