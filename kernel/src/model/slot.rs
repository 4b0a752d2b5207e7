//! Hourly booking slots of an operating day.
//!
//! Slots are a fixed configuration shared by admission and display, not a
//! stored entity. They run from 06:00 to 20:00, one hour each, and order by
//! start time.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use shared::error::AppError;
use std::{fmt, str::FromStr};

pub const FIRST_SLOT_HOUR: u8 = 6;
pub const LAST_SLOT_HOUR: u8 = 19;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeSlot {
    start_hour: u8,
}

impl TimeSlot {
    pub const COUNT: usize = (LAST_SLOT_HOUR - FIRST_SLOT_HOUR + 1) as usize;

    pub fn starting_at(hour: u8) -> Option<Self> {
        (FIRST_SLOT_HOUR..=LAST_SLOT_HOUR)
            .contains(&hour)
            .then_some(Self { start_hour: hour })
    }

    /// Every slot of the day in chronological order.
    pub fn all() -> impl Iterator<Item = TimeSlot> {
        (FIRST_SLOT_HOUR..=LAST_SLOT_HOUR).map(|start_hour| TimeSlot { start_hour })
    }

    pub fn start_hour(self) -> u8 {
        self.start_hour
    }

    pub fn end_hour(self) -> u8 {
        self.start_hour + 1
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:00 - {:02}:00", self.start_hour, self.end_hour())
    }
}

impl FromStr for TimeSlot {
    type Err = AppError;

    // "18:00 - 19:00" の他に "18:00–19:00" のような表記も受け付ける
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AppError::InvalidRequest(format!("unknown time slot: {s:?}"));

        let (start, end) = s.split_once(['-', '–']).ok_or_else(invalid)?;
        let start = parse_full_hour(start.trim()).ok_or_else(invalid)?;
        let end = parse_full_hour(end.trim()).ok_or_else(invalid)?;
        if end != start + 1 {
            return Err(invalid());
        }
        TimeSlot::starting_at(start).ok_or_else(invalid)
    }
}

fn parse_full_hour(s: &str) -> Option<u8> {
    let (hour, minute) = s.split_once(':')?;
    if minute != "00" || hour.len() != 2 {
        return None;
    }
    hour.parse().ok()
}

impl TryFrom<String> for TimeSlot {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl Serialize for TimeSlot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeSlot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_has_fourteen_ordered_slots() {
        let slots: Vec<TimeSlot> = TimeSlot::all().collect();
        assert_eq!(slots.len(), TimeSlot::COUNT);
        assert_eq!(slots.first().unwrap().to_string(), "06:00 - 07:00");
        assert_eq!(slots.last().unwrap().to_string(), "19:00 - 20:00");
        assert!(slots.windows(2).all(|w| w[0] < w[1] && w[0].end_hour() == w[1].start_hour()));
    }

    #[test]
    fn parses_label_variants() {
        let expected = TimeSlot::starting_at(18).unwrap();
        assert_eq!("18:00 - 19:00".parse::<TimeSlot>().unwrap(), expected);
        assert_eq!("18:00–19:00".parse::<TimeSlot>().unwrap(), expected);
        assert_eq!("18:00-19:00".parse::<TimeSlot>().unwrap(), expected);
    }

    #[test]
    fn rejects_slots_outside_the_schedule() {
        for label in ["05:00 - 06:00", "20:00 - 21:00", "18:30 - 19:30", "18:00 - 20:00", "", "evening"] {
            assert!(label.parse::<TimeSlot>().is_err(), "{label} should be rejected");
        }
    }
}
