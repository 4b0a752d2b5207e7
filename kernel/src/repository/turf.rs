use crate::model::{
    id::{TurfId, UserId},
    turf::{
        event::{CreateTurf, DeleteTurf, UpdateTurf},
        Turf, TurfListFilter,
    },
};
use async_trait::async_trait;
use shared::error::AppResult;

#[async_trait]
pub trait TurfRepository: Send + Sync {
    // ターフを登録する
    async fn create(&self, event: CreateTurf) -> AppResult<TurfId>;
    // 条件に合うターフを新しい順に取得する
    async fn find_all(&self, filter: TurfListFilter) -> AppResult<Vec<Turf>>;
    async fn find_by_id(&self, turf_id: TurfId) -> AppResult<Option<Turf>>;
    // オーナーが所有するターフを取得する
    async fn find_by_owner(&self, owner_id: UserId) -> AppResult<Vec<Turf>>;
    // ターフ情報を更新する。定員は予約済み人数を下回れない
    async fn update(&self, event: UpdateTurf) -> AppResult<Turf>;
    // ターフを削除する。予約レコードは残る
    async fn delete(&self, event: DeleteTurf) -> AppResult<()>;
}
