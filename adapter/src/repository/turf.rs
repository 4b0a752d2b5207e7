use crate::database::{map_store_error, model::turf::TurfRow, ConnectionPool};
use async_trait::async_trait;
use derive_new::new;
use kernel::model::{
    id::{TurfId, UserId},
    turf::{
        event::{CreateTurf, DeleteTurf, UpdateTurf},
        Turf, TurfListFilter,
    },
};
use kernel::repository::turf::TurfRepository;
use shared::error::{AppError, AppResult};

#[derive(new)]
pub struct TurfRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl TurfRepository for TurfRepositoryImpl {
    async fn create(&self, event: CreateTurf) -> AppResult<TurfId> {
        let turf_id = TurfId::new();
        sqlx::query(
            r#"
                INSERT INTO turfs
                (turf_id, owner_id, name, city, price_per_player, capacity,
                sports, description, cover_image, gallery_images, map_link)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(turf_id)
        .bind(&event.owner_id)
        .bind(&event.name)
        .bind(&event.city)
        .bind(event.price_per_player)
        .bind(event.capacity)
        .bind(&event.sports)
        .bind(&event.description)
        .bind(&event.cover_image)
        .bind(&event.gallery_images)
        .bind(&event.map_link)
        .execute(self.db.inner_ref())
        .await
        .map_err(map_store_error)?;

        Ok(turf_id)
    }

    async fn find_all(&self, filter: TurfListFilter) -> AppResult<Vec<Turf>> {
        // city は完全一致、search は名前か都市名の部分一致で絞り込む
        let rows = sqlx::query_as::<_, TurfRow>(
            r#"
                SELECT
                    turf_id, owner_id, name, city, price_per_player, capacity,
                    sports, description, cover_image, gallery_images, map_link, created_at
                FROM turfs
                WHERE ($1::TEXT IS NULL OR LOWER(city) = LOWER($1))
                  AND ($2::TEXT IS NULL
                       OR LOWER(name) LIKE $2 ESCAPE '\'
                       OR LOWER(city) LIKE $2 ESCAPE '\')
                ORDER BY created_at DESC
            "#,
        )
        .bind(filter.city.as_deref())
        .bind(filter.search.as_deref().map(like_pattern))
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(map_store_error)?;

        Ok(rows.into_iter().map(Turf::from).collect())
    }

    async fn find_by_id(&self, turf_id: TurfId) -> AppResult<Option<Turf>> {
        let row = sqlx::query_as::<_, TurfRow>(
            r#"
                SELECT
                    turf_id, owner_id, name, city, price_per_player, capacity,
                    sports, description, cover_image, gallery_images, map_link, created_at
                FROM turfs
                WHERE turf_id = $1
            "#,
        )
        .bind(turf_id)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(map_store_error)?;

        Ok(row.map(Turf::from))
    }

    async fn find_by_owner(&self, owner_id: UserId) -> AppResult<Vec<Turf>> {
        let rows = sqlx::query_as::<_, TurfRow>(
            r#"
                SELECT
                    turf_id, owner_id, name, city, price_per_player, capacity,
                    sports, description, cover_image, gallery_images, map_link, created_at
                FROM turfs
                WHERE owner_id = $1
                ORDER BY created_at DESC
            "#,
        )
        .bind(&owner_id)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(map_store_error)?;

        Ok(rows.into_iter().map(Turf::from).collect())
    }

    async fn update(&self, event: UpdateTurf) -> AppResult<Turf> {
        let mut tx = self.db.begin().await?;

        // ① 更新対象のターフを行ロック付きで取得する
        //    予約処理は FOR SHARE で同じ行を読むため、定員変更と予約は直列化される
        let row = sqlx::query_as::<_, TurfRow>(
            r#"
                SELECT
                    turf_id, owner_id, name, city, price_per_player, capacity,
                    sports, description, cover_image, gallery_images, map_link, created_at
                FROM turfs
                WHERE turf_id = $1
                FOR UPDATE
            "#,
        )
        .bind(event.turf_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_store_error)?
        .ok_or_else(|| AppError::EntityNotFound(format!("turf ({}) not found", event.turf_id)))?;
        let mut turf = Turf::from(row);

        // ② 定員を変える場合は、スロットごとの予約人数の最大値を調べる
        let peak_occupancy = if event.changes_capacity() {
            let peak: i64 = sqlx::query_scalar(
                r#"
                    SELECT COALESCE(MAX(total), 0)::BIGINT
                    FROM (
                        SELECT SUM(players) AS total
                        FROM reservations
                        WHERE turf_id = $1 AND status = 'confirmed'
                        GROUP BY reserved_on, slot_start_hour
                    ) AS per_slot
                "#,
            )
            .bind(event.turf_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_store_error)?;
            i32::try_from(peak)
                .map_err(|_| AppError::ConversionEntityError(format!("occupancy overflow: {peak}")))?
        } else {
            0
        };

        // ③ 所有者と値の検証をしたうえで反映する
        event.apply_to(&mut turf, peak_occupancy)?;

        let res = sqlx::query(
            r#"
                UPDATE turfs
                SET
                    name = $2,
                    city = $3,
                    price_per_player = $4,
                    capacity = $5,
                    sports = $6,
                    description = $7,
                    cover_image = $8,
                    gallery_images = $9,
                    map_link = $10,
                    updated_at = CURRENT_TIMESTAMP
                WHERE turf_id = $1
            "#,
        )
        .bind(turf.turf_id)
        .bind(&turf.name)
        .bind(&turf.city)
        .bind(turf.price_per_player)
        .bind(turf.capacity)
        .bind(&turf.sports)
        .bind(&turf.description)
        .bind(&turf.cover_image)
        .bind(&turf.gallery_images)
        .bind(&turf.map_link)
        .execute(&mut *tx)
        .await
        .map_err(map_store_error)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No turf record has been updated".into(),
            ));
        }

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok(turf)
    }

    async fn delete(&self, event: DeleteTurf) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let owner_id: Option<UserId> = sqlx::query_scalar(
            r#"
                SELECT owner_id FROM turfs WHERE turf_id = $1 FOR UPDATE
            "#,
        )
        .bind(event.turf_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_store_error)?;

        match owner_id {
            None => {
                return Err(AppError::EntityNotFound(format!(
                    "turf ({}) not found",
                    event.turf_id
                )))
            }
            Some(owner_id) if owner_id != event.requested_user => {
                return Err(AppError::ForbiddenOperation)
            }
            Some(_) => {}
        }

        // 予約レコードは削除しない（読み出し時に除外される）
        let res = sqlx::query("DELETE FROM turfs WHERE turf_id = $1")
            .bind(event.turf_id)
            .execute(&mut *tx)
            .await
            .map_err(map_store_error)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No turf record has been deleted".into(),
            ));
        }

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok(())
    }
}

// LIKE のワイルドカードをエスケープして部分一致のパターンにする
fn like_pattern(query: &str) -> String {
    let escaped = query
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("Green"), "%green%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn register_update_and_delete_turf(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = TurfRepositoryImpl::new(ConnectionPool::new(pool));
        let owner: UserId = "owner-1".parse()?;

        let turf_id = repo
            .create(CreateTurf::new(
                owner.clone(),
                "Greenfield".into(),
                "Mumbai".into(),
                120,
                22,
                vec!["Football".into()],
                "Floodlit 7-a-side".into(),
                "https://img.example/cover.jpg".into(),
                vec![],
                None,
            ))
            .await?;

        let found = repo
            .find_all(TurfListFilter {
                city: Some("mumbai".into()),
                search: Some("green".into()),
            })
            .await?;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].turf_id, turf_id);

        let stranger = UpdateTurf {
            name: Some("Taken".into()),
            ..UpdateTurf::new(turf_id, "stranger".parse()?)
        };
        assert!(matches!(
            repo.update(stranger).await,
            Err(AppError::ForbiddenOperation)
        ));

        let updated = repo
            .update(UpdateTurf {
                capacity: Some(14),
                ..UpdateTurf::new(turf_id, owner.clone())
            })
            .await?;
        assert_eq!(updated.capacity, 14);

        repo.delete(DeleteTurf::new(turf_id, owner.clone())).await?;
        assert!(repo.find_by_id(turf_id).await?.is_none());
        assert!(repo.find_by_owner(owner).await?.is_empty());
        Ok(())
    }
}
