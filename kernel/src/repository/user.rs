use crate::model::{
    id::UserId,
    user::{event::RegisterUser, User},
};
use async_trait::async_trait;
use shared::error::AppResult;

#[async_trait]
pub trait UserRepository: Send + Sync {
    // 初回登録時のみロールを設定する。登録済みなら名前だけ更新する
    async fn register(&self, event: RegisterUser) -> AppResult<User>;
    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<User>>;
}
