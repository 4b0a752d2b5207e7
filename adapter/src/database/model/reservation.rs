use chrono::{DateTime, NaiveDate, Utc};
use kernel::model::{
    id::{ReservationId, TurfId, UserId},
    reservation::{
        Reservation, ReservationStatus, ReservationTurf, ReservationWithBooker,
        ReservationWithTurf,
    },
    slot::TimeSlot,
};
use shared::error::AppError;
use std::str::FromStr;

// reservations テーブルの 1 レコード
// スロットは開始時刻（時）で保存している
#[derive(sqlx::FromRow)]
pub struct ReservationRow {
    pub reservation_id: ReservationId,
    pub turf_id: TurfId,
    pub owner_id: UserId,
    pub user_id: UserId,
    pub reserved_on: NaiveDate,
    pub slot_start_hour: i16,
    pub players: i32,
    pub price_per_player: i64,
    pub total_amount: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub cancelled_by: Option<UserId>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl TryFrom<ReservationRow> for Reservation {
    type Error = AppError;

    fn try_from(value: ReservationRow) -> Result<Self, Self::Error> {
        let ReservationRow {
            reservation_id,
            turf_id,
            owner_id,
            user_id,
            reserved_on,
            slot_start_hour,
            players,
            price_per_player,
            total_amount,
            status,
            created_at,
            cancelled_by,
            cancelled_at,
        } = value;

        let slot = u8::try_from(slot_start_hour)
            .ok()
            .and_then(TimeSlot::starting_at)
            .ok_or_else(|| {
                AppError::ConversionEntityError(format!("unknown slot hour: {slot_start_hour}"))
            })?;
        let status = ReservationStatus::from_str(&status)
            .map_err(|e| AppError::ConversionEntityError(format!("status {status:?}: {e}")))?;

        Ok(Reservation {
            reservation_id,
            turf_id,
            owner_id,
            user_id,
            date: reserved_on,
            slot,
            players,
            price_per_player,
            total_amount,
            status,
            created_at,
            cancelled_by,
            cancelled_at,
        })
    }
}

// turfs と INNER JOIN して取得する予約一覧用の型
#[derive(sqlx::FromRow)]
pub struct ReservationWithTurfRow {
    #[sqlx(flatten)]
    pub reservation: ReservationRow,
    pub turf_name: String,
    pub turf_city: String,
    pub turf_cover_image: String,
}

impl TryFrom<ReservationWithTurfRow> for ReservationWithTurf {
    type Error = AppError;

    fn try_from(value: ReservationWithTurfRow) -> Result<Self, Self::Error> {
        let ReservationWithTurfRow {
            reservation,
            turf_name,
            turf_city,
            turf_cover_image,
        } = value;
        let reservation = Reservation::try_from(reservation)?;
        Ok(ReservationWithTurf {
            turf: ReservationTurf {
                turf_id: reservation.turf_id,
                name: turf_name,
                city: turf_city,
                cover_image: turf_cover_image,
            },
            reservation,
        })
    }
}

// users と LEFT JOIN して予約者名を付けた型。プロフィール未登録なら名前は NULL
#[derive(sqlx::FromRow)]
pub struct ReservationWithBookerRow {
    #[sqlx(flatten)]
    pub reservation: ReservationRow,
    pub booker_name: Option<String>,
}

impl TryFrom<ReservationWithBookerRow> for ReservationWithBooker {
    type Error = AppError;

    fn try_from(value: ReservationWithBookerRow) -> Result<Self, Self::Error> {
        Ok(ReservationWithBooker {
            reservation: Reservation::try_from(value.reservation)?,
            booker_name: value.booker_name,
        })
    }
}

// 日付ごとのスロット別人数集計に使う型
#[derive(sqlx::FromRow)]
pub struct SlotOccupancyRow {
    pub slot_start_hour: i16,
    pub occupancy: i64,
}
