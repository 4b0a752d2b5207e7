use crate::model::{
    aggregation::YearMonth,
    id::{ReservationId, TurfId, UserId},
    occupancy::{SlotKey, SlotOccupancy},
    reservation::{
        event::{CancelReservation, CreateReservation},
        Reservation, ReservationWithBooker, ReservationWithTurf,
    },
};
use async_trait::async_trait;
use chrono::NaiveDate;
use shared::error::AppResult;

#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Admits and persists a reservation in one atomic step.
    ///
    /// The occupancy check and the insert happen under the same per-slot
    /// serialization boundary, so concurrent calls for one slot can never
    /// exceed the turf capacity together. On rejection nothing is written.
    async fn reserve(&self, event: CreateReservation) -> AppResult<Reservation>;
    // 予約をキャンセルする
    async fn cancel(&self, event: CancelReservation) -> AppResult<Reservation>;
    // 確定済み予約の人数合計を返す
    async fn occupancy(&self, key: SlotKey) -> AppResult<i32>;
    // 指定日の全スロットの人数合計を返す
    async fn occupancy_by_date(&self, turf_id: TurfId, date: NaiveDate) -> AppResult<SlotOccupancy>;
    // ターフが削除済みの予約は返さない
    async fn find_by_id(&self, reservation_id: ReservationId) -> AppResult<Option<ReservationWithTurf>>;
    // ユーザーの予約を新しい順に取得する（ターフが削除済みのものは除く）
    async fn find_by_user(&self, user_id: UserId) -> AppResult<Vec<ReservationWithTurf>>;
    // 指定ターフ群の指定月の確定済み予約を、予約者名付きで取得する
    async fn find_by_turfs_in_month(
        &self,
        turf_ids: Vec<TurfId>,
        month: YearMonth,
    ) -> AppResult<Vec<ReservationWithBooker>>;
}
