use crate::model::{
    id::{ReservationId, TurfId, UserId},
    occupancy::SlotKey,
    slot::TimeSlot,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, AppResult};
use strum::{AsRefStr, EnumString};

pub mod admission;
pub mod event;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumString, AsRefStr, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Confirmed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reservation {
    pub reservation_id: ReservationId,
    pub turf_id: TurfId,
    pub owner_id: UserId,
    pub user_id: UserId,
    pub date: NaiveDate,
    pub slot: TimeSlot,
    pub players: i32,
    pub price_per_player: i64,
    pub total_amount: i64,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
    pub cancelled_by: Option<UserId>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl Reservation {
    pub fn slot_key(&self) -> SlotKey {
        SlotKey::new(self.turf_id, self.date, self.slot)
    }

    pub fn is_confirmed(&self) -> bool {
        self.status == ReservationStatus::Confirmed
    }

    // 予約者本人か、予約先ターフのオーナーであれば閲覧できる
    pub fn is_visible_to(&self, user_id: &UserId) -> bool {
        self.user_id == *user_id || self.owner_id == *user_id
    }

    /// Moves a confirmed reservation to `cancelled`.
    ///
    /// Only the user who made the reservation may cancel it, and cancellation
    /// is final: a second attempt is rejected rather than treated as a no-op.
    pub fn cancel(&mut self, actor: &UserId, at: DateTime<Utc>) -> AppResult<()> {
        if self.user_id != *actor {
            return Err(AppError::ForbiddenOperation);
        }
        match self.status {
            ReservationStatus::Confirmed => {
                self.status = ReservationStatus::Cancelled;
                self.cancelled_by = Some(actor.clone());
                self.cancelled_at = Some(at);
                Ok(())
            }
            ReservationStatus::Cancelled => Err(AppError::UnprocessableEntity(format!(
                "reservation ({}) is already cancelled",
                self.reservation_id
            ))),
        }
    }
}

// 予約一覧に表示するためのターフ情報
#[derive(Debug, Clone, PartialEq)]
pub struct ReservationTurf {
    pub turf_id: TurfId,
    pub name: String,
    pub city: String,
    pub cover_image: String,
}

/// A reservation joined with its still-existing turf.
#[derive(Debug, Clone, PartialEq)]
pub struct ReservationWithTurf {
    pub reservation: Reservation,
    pub turf: ReservationTurf,
}

/// A reservation with the booking user's display name, for owner views.
/// The name is absent when the user never registered a profile.
#[derive(Debug, Clone, PartialEq)]
pub struct ReservationWithBooker {
    pub reservation: Reservation,
    pub booker_name: Option<String>,
}

impl From<Reservation> for ReservationWithBooker {
    fn from(reservation: Reservation) -> Self {
        Self {
            reservation,
            booker_name: None,
        }
    }
}
