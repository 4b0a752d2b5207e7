use crate::database::{
    map_store_error,
    model::{
        reservation::{
            ReservationRow, ReservationWithBookerRow, ReservationWithTurfRow, SlotOccupancyRow,
        },
        turf::TurfRow,
    },
    ConnectionPool,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use derive_new::new;
use kernel::model::{
    aggregation::YearMonth,
    id::{ReservationId, TurfId, UserId},
    occupancy::{SlotKey, SlotOccupancy},
    reservation::{
        admission::admit,
        event::{CancelReservation, CreateReservation},
        Reservation, ReservationWithBooker, ReservationWithTurf,
    },
    slot::TimeSlot,
    turf::Turf,
};
use kernel::repository::reservation::ReservationRepository;
use shared::{
    config::BookingConfig,
    error::{AppError, AppResult},
};

#[derive(new)]
pub struct ReservationRepositoryImpl {
    db: ConnectionPool,
    booking: BookingConfig,
}

#[async_trait]
impl ReservationRepository for ReservationRepositoryImpl {
    async fn reserve(&self, event: CreateReservation) -> AppResult<Reservation> {
        let key = event.slot_key();
        let mut tx = self.db.begin().await?;

        // ① 同じスロットへの予約を直列化するため、トランザクション単位のアドバイザリロックを取る
        //    ロック取得後の各 SELECT は、先行する予約のコミット結果を読む
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(key.lock_name())
            .execute(&mut *tx)
            .await
            .map_err(map_store_error)?;

        // ② ターフの存在確認
        //    FOR SHARE で読むので、処理中に削除や定員変更が割り込むことはない
        let turf: Turf = sqlx::query_as::<_, TurfRow>(
            r#"
                SELECT
                    turf_id, owner_id, name, city, price_per_player, capacity,
                    sports, description, cover_image, gallery_images, map_link, created_at
                FROM turfs
                WHERE turf_id = $1
                FOR SHARE
            "#,
        )
        .bind(event.turf_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_store_error)?
        .map(Turf::from)
        .ok_or_else(|| AppError::EntityNotFound(format!("turf ({}) not found", event.turf_id)))?;

        // ③ 現在の予約人数を集計し、定員を超えないか判定する
        let occupancy = slot_occupancy(&mut *tx, &key).await?;
        let reservation = match admit(&turf, occupancy, event, &self.booking) {
            Ok(reservation) => reservation,
            Err(e) => {
                tracing::info!(
                    turf_id = %key.turf_id,
                    date = %key.date,
                    slot = %key.slot,
                    occupancy,
                    capacity = turf.capacity,
                    "reservation rejected: {e}"
                );
                return Err(e);
            }
        };

        // ④ 予約レコードを追加する
        let res = sqlx::query(
            r#"
                INSERT INTO reservations
                (reservation_id, turf_id, owner_id, user_id, reserved_on, slot_start_hour,
                players, price_per_player, total_amount, status, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(reservation.reservation_id)
        .bind(reservation.turf_id)
        .bind(&reservation.owner_id)
        .bind(&reservation.user_id)
        .bind(reservation.date)
        .bind(i16::from(reservation.slot.start_hour()))
        .bind(reservation.players)
        .bind(reservation.price_per_player)
        .bind(reservation.total_amount)
        .bind(reservation.status.as_ref())
        .bind(reservation.created_at)
        .execute(&mut *tx)
        .await
        .map_err(map_store_error)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No reservation record has been created".into(),
            ));
        }

        tx.commit().await.map_err(map_store_error)?;

        tracing::info!(
            reservation_id = %reservation.reservation_id,
            turf_id = %key.turf_id,
            date = %key.date,
            slot = %key.slot,
            players = reservation.players,
            occupancy = occupancy + reservation.players,
            "reservation confirmed"
        );

        Ok(reservation)
    }

    async fn cancel(&self, event: CancelReservation) -> AppResult<Reservation> {
        let mut tx = self.db.begin().await?;

        // ① 対象の予約を行ロック付きで取得する
        //    ターフが削除済みでもキャンセルはできる
        let row = sqlx::query_as::<_, ReservationRow>(
            r#"
                SELECT
                    reservation_id, turf_id, owner_id, user_id, reserved_on, slot_start_hour,
                    players, price_per_player, total_amount, status, created_at,
                    cancelled_by, cancelled_at
                FROM reservations
                WHERE reservation_id = $1
                FOR UPDATE
            "#,
        )
        .bind(event.reservation_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_store_error)?
        .ok_or_else(|| {
            AppError::EntityNotFound(format!(
                "reservation ({}) not found",
                event.reservation_id
            ))
        })?;

        // ② 本人確認と状態遷移
        let mut reservation = Reservation::try_from(row)?;
        reservation.cancel(&event.requested_user, event.cancelled_at)?;

        // ③ 確定中のレコードだけを更新する
        let res = sqlx::query(
            r#"
                UPDATE reservations
                SET status = $2, cancelled_by = $3, cancelled_at = $4
                WHERE reservation_id = $1 AND status = 'confirmed'
            "#,
        )
        .bind(reservation.reservation_id)
        .bind(reservation.status.as_ref())
        .bind(&reservation.cancelled_by)
        .bind(reservation.cancelled_at)
        .execute(&mut *tx)
        .await
        .map_err(map_store_error)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No reservation record has been cancelled".into(),
            ));
        }

        tx.commit().await.map_err(map_store_error)?;

        tracing::info!(
            reservation_id = %reservation.reservation_id,
            turf_id = %reservation.turf_id,
            date = %reservation.date,
            slot = %reservation.slot,
            players = reservation.players,
            "reservation cancelled"
        );

        Ok(reservation)
    }

    async fn occupancy(&self, key: SlotKey) -> AppResult<i32> {
        let mut conn = self.db.inner_ref().acquire().await.map_err(map_store_error)?;
        slot_occupancy(&mut *conn, &key).await
    }

    async fn occupancy_by_date(&self, turf_id: TurfId, date: NaiveDate) -> AppResult<SlotOccupancy> {
        sqlx::query_as::<_, SlotOccupancyRow>(
            r#"
                SELECT slot_start_hour, SUM(players)::BIGINT AS occupancy
                FROM reservations
                WHERE turf_id = $1 AND reserved_on = $2 AND status = 'confirmed'
                GROUP BY slot_start_hour
            "#,
        )
        .bind(turf_id)
        .bind(date)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(map_store_error)?
        .into_iter()
        .map(|row| -> AppResult<(TimeSlot, i32)> {
            let slot = u8::try_from(row.slot_start_hour)
                .ok()
                .and_then(TimeSlot::starting_at)
                .ok_or_else(|| {
                    AppError::ConversionEntityError(format!(
                        "unknown slot hour: {}",
                        row.slot_start_hour
                    ))
                })?;
            Ok((slot, to_count(row.occupancy)?))
        })
        .collect()
    }

    async fn find_by_id(&self, reservation_id: ReservationId) -> AppResult<Option<ReservationWithTurf>> {
        // turfs と INNER JOIN するので、ターフが削除済みの予約は返らない
        sqlx::query_as::<_, ReservationWithTurfRow>(
            r#"
                SELECT
                    r.reservation_id, r.turf_id, r.owner_id, r.user_id, r.reserved_on,
                    r.slot_start_hour, r.players, r.price_per_player, r.total_amount,
                    r.status, r.created_at, r.cancelled_by, r.cancelled_at,
                    t.name AS turf_name,
                    t.city AS turf_city,
                    t.cover_image AS turf_cover_image
                FROM reservations AS r
                INNER JOIN turfs AS t ON r.turf_id = t.turf_id
                WHERE r.reservation_id = $1
            "#,
        )
        .bind(reservation_id)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(map_store_error)?
        .map(ReservationWithTurf::try_from)
        .transpose()
    }

    async fn find_by_user(&self, user_id: UserId) -> AppResult<Vec<ReservationWithTurf>> {
        sqlx::query_as::<_, ReservationWithTurfRow>(
            r#"
                SELECT
                    r.reservation_id, r.turf_id, r.owner_id, r.user_id, r.reserved_on,
                    r.slot_start_hour, r.players, r.price_per_player, r.total_amount,
                    r.status, r.created_at, r.cancelled_by, r.cancelled_at,
                    t.name AS turf_name,
                    t.city AS turf_city,
                    t.cover_image AS turf_cover_image
                FROM reservations AS r
                INNER JOIN turfs AS t ON r.turf_id = t.turf_id
                WHERE r.user_id = $1
                ORDER BY r.created_at DESC
            "#,
        )
        .bind(&user_id)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(map_store_error)?
        .into_iter()
        .map(ReservationWithTurf::try_from)
        .collect()
    }

    async fn find_by_turfs_in_month(
        &self,
        turf_ids: Vec<TurfId>,
        month: YearMonth,
    ) -> AppResult<Vec<ReservationWithBooker>> {
        if turf_ids.is_empty() {
            return Ok(Vec::new());
        }
        let out_of_range = || AppError::InvalidRequest(format!("month out of range: {month}"));
        let from = month.first_day().ok_or_else(out_of_range)?;
        let until = month.next_first_day().ok_or_else(out_of_range)?;
        let turf_ids: Vec<uuid::Uuid> = turf_ids.into_iter().map(TurfId::raw).collect();

        // 集計対象は確定済みの予約のみ
        sqlx::query_as::<_, ReservationWithBookerRow>(
            r#"
                SELECT
                    r.reservation_id, r.turf_id, r.owner_id, r.user_id, r.reserved_on,
                    r.slot_start_hour, r.players, r.price_per_player, r.total_amount,
                    r.status, r.created_at, r.cancelled_by, r.cancelled_at,
                    u.name AS booker_name
                FROM reservations AS r
                LEFT JOIN users AS u ON u.user_id = r.user_id
                WHERE r.turf_id = ANY($1)
                  AND r.reserved_on >= $2 AND r.reserved_on < $3
                  AND r.status = 'confirmed'
                ORDER BY r.reserved_on, r.slot_start_hour, r.created_at
            "#,
        )
        .bind(turf_ids)
        .bind(from)
        .bind(until)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(map_store_error)?
        .into_iter()
        .map(ReservationWithBooker::try_from)
        .collect()
    }
}

// 確定済み予約の人数合計を読む。reserve ではロック取得後のトランザクション内で呼ぶ
async fn slot_occupancy(conn: &mut sqlx::PgConnection, key: &SlotKey) -> AppResult<i32> {
    let total: i64 = sqlx::query_scalar(
        r#"
            SELECT COALESCE(SUM(players), 0)::BIGINT
            FROM reservations
            WHERE turf_id = $1 AND reserved_on = $2 AND slot_start_hour = $3
              AND status = 'confirmed'
        "#,
    )
    .bind(key.turf_id)
    .bind(key.date)
    .bind(i16::from(key.slot.start_hour()))
    .fetch_one(conn)
    .await
    .map_err(map_store_error)?;
    to_count(total)
}

fn to_count(total: i64) -> AppResult<i32> {
    i32::try_from(total)
        .map_err(|_| AppError::ConversionEntityError(format!("occupancy overflow: {total}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{turf::TurfRepositoryImpl, user::UserRepositoryImpl};
    use chrono::Utc;
    use kernel::{
        model::{role::Role, turf::event::CreateTurf, user::event::RegisterUser},
        repository::{turf::TurfRepository, user::UserRepository},
    };
    use std::sync::Arc;

    async fn create_turf(db: &ConnectionPool, capacity: i32) -> anyhow::Result<TurfId> {
        let turf_id = TurfRepositoryImpl::new(db.clone())
            .create(CreateTurf::new(
                "owner-1".parse()?,
                "Arena".into(),
                "Pune".into(),
                100,
                capacity,
                vec![],
                String::new(),
                "cover".into(),
                vec![],
                None,
            ))
            .await?;
        Ok(turf_id)
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn reserve_respects_capacity_and_cancel_frees_seats(
        pool: sqlx::PgPool,
    ) -> anyhow::Result<()> {
        let db = ConnectionPool::new(pool);
        let turfs = TurfRepositoryImpl::new(db.clone());
        let repo = ReservationRepositoryImpl::new(db, BookingConfig::default());
        let owner: UserId = "owner-1".parse()?;
        let player: UserId = "player-1".parse()?;

        let turf_id = turfs
            .create(CreateTurf::new(
                owner,
                "Arena".into(),
                "Pune".into(),
                100,
                22,
                vec![],
                String::new(),
                "cover".into(),
                vec![],
                None,
            ))
            .await?;
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let slot = TimeSlot::starting_at(18).unwrap();
        let request = |players| {
            CreateReservation::new(turf_id, player.clone(), date, slot, players, Utc::now())
        };

        let first = repo.reserve(request(20)).await?;
        assert_eq!(first.total_amount, 2000);
        assert!(matches!(
            repo.reserve(request(3)).await,
            Err(AppError::CapacityExceeded { occupancy: 20, .. })
        ));
        repo.reserve(request(2)).await?;
        assert_eq!(repo.occupancy(SlotKey::new(turf_id, date, slot)).await?, 22);

        repo.cancel(CancelReservation::new(first.reservation_id, player.clone(), Utc::now()))
            .await?;
        let by_slot = repo.occupancy_by_date(turf_id, date).await?;
        assert_eq!(by_slot.get(slot), 2);

        let mine = repo.find_by_user(player.clone()).await?;
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].turf.name, "Arena");

        let entries = repo
            .find_by_turfs_in_month(vec![turf_id], YearMonth::of(date))
            .await?;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].booker_name, None);

        UserRepositoryImpl::new(repo.db.clone())
            .register(RegisterUser::new(player, "Ravi".into(), Role::User))
            .await?;
        let entries = repo
            .find_by_turfs_in_month(vec![turf_id], YearMonth::of(date))
            .await?;
        assert_eq!(entries[0].booker_name.as_deref(), Some("Ravi"));
        Ok(())
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn concurrent_reservations_are_serialized_per_slot(
        pool: sqlx::PgPool,
    ) -> anyhow::Result<()> {
        let db = ConnectionPool::new(pool);
        let turf_id = create_turf(&db, 22).await?;
        let repo = Arc::new(ReservationRepositoryImpl::new(db, BookingConfig::default()));
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let slot = TimeSlot::starting_at(18).unwrap();
        let request = move |n: usize, players| -> anyhow::Result<CreateReservation> {
            Ok(CreateReservation::new(
                turf_id,
                format!("player-{n}").parse()?,
                date,
                slot,
                players,
                Utc::now(),
            ))
        };

        // 12 + 12 を同時に送ると片方だけが入る
        let handles = [
            tokio::spawn({
                let repo = repo.clone();
                let event = request(1, 12)?;
                async move { repo.reserve(event).await }
            }),
            tokio::spawn({
                let repo = repo.clone();
                let event = request(2, 12)?;
                async move { repo.reserve(event).await }
            }),
        ];
        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await?);
        }
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(AppError::CapacityExceeded { .. }))));
        assert_eq!(repo.occupancy(SlotKey::new(turf_id, date, slot)).await?, 12);

        // 残り 10 席に 3 人ずつ 20 件
        let handles = (0..20)
            .map(|n| {
                let repo = repo.clone();
                let event = request(n + 10, 3)?;
                Ok(tokio::spawn(async move { repo.reserve(event).await }))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        let mut admitted = 0;
        for handle in handles {
            match handle.await? {
                Ok(_) => admitted += 1,
                Err(AppError::CapacityExceeded { .. }) => {}
                Err(e) => return Err(e.into()),
            }
        }
        assert_eq!(admitted, 3);
        assert_eq!(repo.occupancy(SlotKey::new(turf_id, date, slot)).await?, 21);
        Ok(())
    }
}
