//! Owner-facing monthly occupancy matrix (turf × date × slot).

use crate::model::{
    id::TurfId,
    reservation::ReservationWithBooker,
    slot::TimeSlot,
    turf::Turf,
};
use chrono::{Datelike, NaiveDate};
use shared::error::AppError;
use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    str::FromStr,
};

/// A calendar month, written `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(self) -> i32 {
        self.year
    }

    pub fn month(self) -> u32 {
        self.month
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    // 月の範囲は [first_day, next_first_day) の半開区間で扱う
    pub fn next_first_day(self) -> Option<NaiveDate> {
        if self.month == 12 {
            NaiveDate::from_ymd_opt(self.year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(self.year, self.month + 1, 1)
        }
    }
}

impl FromStr for YearMonth {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AppError::InvalidRequest(format!("month must be YYYY-MM: {s:?}"));
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year = year.parse().map_err(|_| invalid())?;
        let month = month.parse().map_err(|_| invalid())?;
        YearMonth::new(year, month).ok_or_else(invalid)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlotCell {
    pub occupancy: i32,
    pub reservations: Vec<ReservationWithBooker>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TurfMonth {
    pub turf_id: TurfId,
    pub turf_name: String,
    pub capacity: i32,
    pub dates: BTreeMap<NaiveDate, BTreeMap<TimeSlot, SlotCell>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OwnerMonthMatrix {
    pub month: YearMonth,
    pub turfs: Vec<TurfMonth>,
}

impl OwnerMonthMatrix {
    /// Builds the matrix from the owner's live turfs and candidate
    /// reservations.
    ///
    /// Reservations whose turf is not in `turfs` (orphans), outside `month`,
    /// or not confirmed are dropped. Only turfs with at least one occupied
    /// cell appear, ordered by name.
    pub fn build<R: Into<ReservationWithBooker>>(
        month: YearMonth,
        turfs: &[Turf],
        reservations: impl IntoIterator<Item = R>,
    ) -> Self {
        let by_id: HashMap<TurfId, &Turf> = turfs.iter().map(|t| (t.turf_id, t)).collect();
        let mut cells: BTreeMap<TurfId, BTreeMap<NaiveDate, BTreeMap<TimeSlot, SlotCell>>> =
            BTreeMap::new();

        for entry in reservations {
            let entry: ReservationWithBooker = entry.into();
            let r = &entry.reservation;
            if !by_id.contains_key(&r.turf_id) || !month.contains(r.date) || !r.is_confirmed() {
                continue;
            }
            let cell = cells
                .entry(r.turf_id)
                .or_default()
                .entry(r.date)
                .or_default()
                .entry(r.slot)
                .or_default();
            cell.occupancy += r.players;
            cell.reservations.push(entry);
        }

        let mut turfs: Vec<TurfMonth> = cells
            .into_iter()
            .filter_map(|(turf_id, dates)| {
                by_id.get(&turf_id).map(|turf| TurfMonth {
                    turf_id,
                    turf_name: turf.name.clone(),
                    capacity: turf.capacity,
                    dates,
                })
            })
            .collect();
        turfs.sort_by(|a, b| a.turf_name.cmp(&b.turf_name).then(a.turf_id.cmp(&b.turf_id)));

        Self { month, turfs }
    }
}
