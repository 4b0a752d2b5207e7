use chrono::NaiveDate;
use kernel::model::{
    availability::{DayAvailability, SlotAvailability, SlotBand},
    id::TurfId,
    slot::TimeSlot,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub date: NaiveDate,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotAvailabilityResponse {
    pub slot: TimeSlot,
    pub occupancy: i32,
    pub capacity: i32,
    pub remaining: i32,
    pub band: SlotBand,
    pub selectable: bool,
}

impl From<SlotAvailability> for SlotAvailabilityResponse {
    fn from(value: SlotAvailability) -> Self {
        let SlotAvailability {
            slot,
            occupancy,
            capacity,
            remaining,
            band,
            selectable,
        } = value;
        Self {
            slot,
            occupancy,
            capacity,
            remaining,
            band,
            selectable,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayAvailabilityResponse {
    pub turf_id: TurfId,
    pub date: NaiveDate,
    pub capacity: i32,
    pub slots: Vec<SlotAvailabilityResponse>,
}

impl From<DayAvailability> for DayAvailabilityResponse {
    fn from(value: DayAvailability) -> Self {
        let DayAvailability {
            turf_id,
            date,
            capacity,
            slots,
        } = value;
        Self {
            turf_id,
            date,
            capacity,
            slots: slots
                .into_iter()
                .map(SlotAvailabilityResponse::from)
                .collect(),
        }
    }
}
