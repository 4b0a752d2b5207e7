use crate::model::{
    id::{ReservationId, TurfId, UserId},
    occupancy::SlotKey,
    slot::TimeSlot,
};
use chrono::{DateTime, NaiveDate, Utc};
use derive_new::new;
use shared::{
    config::BookingConfig,
    error::{AppError, AppResult},
};

#[derive(Debug, Clone, new)]
pub struct CreateReservation {
    pub turf_id: TurfId,
    pub reserved_by: UserId,
    pub date: NaiveDate,
    pub slot: TimeSlot,
    pub players: i32,
    pub reserved_at: DateTime<Utc>,
}

impl CreateReservation {
    pub fn slot_key(&self) -> SlotKey {
        SlotKey::new(self.turf_id, self.date, self.slot)
    }

    // ストアに問い合わせる前に弾ける入力エラーを検出する
    pub fn validate(&self, config: &BookingConfig) -> AppResult<()> {
        if self.players < 1 || self.players > config.max_players_per_booking {
            return Err(AppError::InvalidRequest(format!(
                "select between 1 and {} players",
                config.max_players_per_booking
            )));
        }
        Ok(())
    }
}

#[derive(Debug, new)]
pub struct CancelReservation {
    pub reservation_id: ReservationId,
    pub requested_user: UserId,
    pub cancelled_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, false)]
    #[case(-3, false)]
    #[case(1, true)]
    #[case(30, true)]
    #[case(31, false)]
    fn player_count_must_be_within_booking_limit(#[case] players: i32, #[case] ok: bool) {
        let event = CreateReservation::new(
            TurfId::new(),
            "player".parse().unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            TimeSlot::starting_at(18).unwrap(),
            players,
            Utc::now(),
        );
        assert_eq!(event.validate(&BookingConfig::default()).is_ok(), ok);
    }
}
