use chrono::{DateTime, NaiveDate, Utc};
use derive_new::new;
use garde::Validate;
use kernel::model::{
    id::{ReservationId, TurfId, UserId},
    reservation::{
        event::CreateReservation, Reservation, ReservationStatus, ReservationTurf,
        ReservationWithTurf,
    },
    slot::TimeSlot,
};
use serde::{Deserialize, Serialize};
use shared::error::AppError;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationRequest {
    // YYYY-MM-DD
    #[garde(length(min = 1))]
    pub date: String,
    // "18:00 - 19:00" 形式のスロット表記
    #[garde(length(min = 1))]
    pub slot: String,
    #[garde(range(min = 1))]
    pub players: i32,
}

#[derive(new)]
pub struct CreateReservationRequestWithIds(TurfId, UserId, DateTime<Utc>, CreateReservationRequest);
impl TryFrom<CreateReservationRequestWithIds> for CreateReservation {
    type Error = AppError;

    fn try_from(value: CreateReservationRequestWithIds) -> Result<Self, Self::Error> {
        let CreateReservationRequestWithIds(
            turf_id,
            reserved_by,
            reserved_at,
            CreateReservationRequest {
                date,
                slot,
                players,
            },
        ) = value;
        let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
            .map_err(|_| AppError::InvalidRequest(format!("date must be YYYY-MM-DD: {date:?}")))?;
        let slot: TimeSlot = slot.parse()?;
        Ok(CreateReservation::new(
            turf_id,
            reserved_by,
            date,
            slot,
            players,
            reserved_at,
        ))
    }
}

// 予約完了画面に表示する内容
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedReservationResponse {
    pub reservation_id: ReservationId,
    pub turf_id: TurfId,
    pub date: NaiveDate,
    pub slot: TimeSlot,
    pub players: i32,
    pub total_amount: i64,
    pub status: ReservationStatus,
}

impl From<Reservation> for CreatedReservationResponse {
    fn from(value: Reservation) -> Self {
        Self {
            reservation_id: value.reservation_id,
            turf_id: value.turf_id,
            date: value.date,
            slot: value.slot,
            players: value.players,
            total_amount: value.total_amount,
            status: value.status,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationTurfResponse {
    pub turf_id: TurfId,
    pub name: String,
    pub city: String,
    pub cover_image: String,
}

impl From<ReservationTurf> for ReservationTurfResponse {
    fn from(value: ReservationTurf) -> Self {
        let ReservationTurf {
            turf_id,
            name,
            city,
            cover_image,
        } = value;
        Self {
            turf_id,
            name,
            city,
            cover_image,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationResponse {
    pub reservation_id: ReservationId,
    pub user_id: UserId,
    pub owner_id: UserId,
    pub date: NaiveDate,
    pub slot: TimeSlot,
    pub players: i32,
    pub price_per_player: i64,
    pub total_amount: i64,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
    pub cancelled_by: Option<UserId>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub turf: ReservationTurfResponse,
}

impl From<ReservationWithTurf> for ReservationResponse {
    fn from(value: ReservationWithTurf) -> Self {
        let ReservationWithTurf { reservation, turf } = value;
        let Reservation {
            reservation_id,
            turf_id: _,
            owner_id,
            user_id,
            date,
            slot,
            players,
            price_per_player,
            total_amount,
            status,
            created_at,
            cancelled_by,
            cancelled_at,
        } = reservation;
        Self {
            reservation_id,
            user_id,
            owner_id,
            date,
            slot,
            players,
            price_per_player,
            total_amount,
            status,
            created_at,
            cancelled_by,
            cancelled_at,
            turf: turf.into(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationsResponse {
    pub items: Vec<ReservationResponse>,
}

impl From<Vec<ReservationWithTurf>> for ReservationsResponse {
    fn from(value: Vec<ReservationWithTurf>) -> Self {
        Self {
            items: value.into_iter().map(ReservationResponse::from).collect(),
        }
    }
}
