use chrono::{DateTime, NaiveDate, Utc};
use kernel::model::{
    aggregation::{OwnerMonthMatrix, SlotCell, TurfMonth},
    id::{ReservationId, TurfId, UserId},
    reservation::ReservationWithBooker,
    slot::TimeSlot,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct OwnerBookingsQuery {
    // YYYY-MM。省略時は今月
    pub month: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerBookingsResponse {
    pub month: String,
    pub turfs: Vec<TurfBookingsResponse>,
}

impl From<OwnerMonthMatrix> for OwnerBookingsResponse {
    fn from(value: OwnerMonthMatrix) -> Self {
        Self {
            month: value.month.to_string(),
            turfs: value
                .turfs
                .into_iter()
                .map(TurfBookingsResponse::from)
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurfBookingsResponse {
    pub turf_id: TurfId,
    pub turf_name: String,
    pub capacity: i32,
    pub dates: Vec<DateBookingsResponse>,
}

impl From<TurfMonth> for TurfBookingsResponse {
    fn from(value: TurfMonth) -> Self {
        let TurfMonth {
            turf_id,
            turf_name,
            capacity,
            dates,
        } = value;
        Self {
            turf_id,
            turf_name,
            capacity,
            dates: dates
                .into_iter()
                .map(|(date, slots)| DateBookingsResponse {
                    date,
                    slots: slots
                        .into_iter()
                        .map(|(slot, cell)| SlotBookingsResponse::new(slot, cell))
                        .collect(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateBookingsResponse {
    pub date: NaiveDate,
    pub slots: Vec<SlotBookingsResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotBookingsResponse {
    pub slot: TimeSlot,
    pub occupancy: i32,
    pub reservations: Vec<BookingEntryResponse>,
}

impl SlotBookingsResponse {
    fn new(slot: TimeSlot, cell: SlotCell) -> Self {
        Self {
            slot,
            occupancy: cell.occupancy,
            reservations: cell
                .reservations
                .into_iter()
                .map(BookingEntryResponse::from)
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingEntryResponse {
    pub reservation_id: ReservationId,
    pub user_id: UserId,
    pub user_name: Option<String>,
    pub players: i32,
    pub total_amount: i64,
    pub created_at: DateTime<Utc>,
}

impl From<ReservationWithBooker> for BookingEntryResponse {
    fn from(value: ReservationWithBooker) -> Self {
        let ReservationWithBooker {
            reservation,
            booker_name,
        } = value;
        Self {
            reservation_id: reservation.reservation_id,
            user_id: reservation.user_id,
            user_name: booker_name,
            players: reservation.players,
            total_amount: reservation.total_amount,
            created_at: reservation.created_at,
        }
    }
}
