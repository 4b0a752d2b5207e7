use crate::database::{map_store_error, model::user::UserRow, ConnectionPool};
use async_trait::async_trait;
use derive_new::new;
use kernel::model::{
    id::UserId,
    user::{event::RegisterUser, User},
};
use kernel::repository::user::UserRepository;
use shared::error::AppResult;

#[derive(new)]
pub struct UserRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl UserRepository for UserRepositoryImpl {
    async fn register(&self, event: RegisterUser) -> AppResult<User> {
        // 登録済みのユーザーはロールを変更せず、名前のみ更新する
        let row = sqlx::query_as::<_, UserRow>(
            r#"
                INSERT INTO users (user_id, name, role)
                VALUES ($1, $2, $3)
                ON CONFLICT (user_id) DO UPDATE
                SET name = EXCLUDED.name,
                    updated_at = CURRENT_TIMESTAMP
                RETURNING user_id, name, role
            "#,
        )
        .bind(&event.user_id)
        .bind(&event.name)
        .bind(event.role.as_ref())
        .fetch_one(self.db.inner_ref())
        .await
        .map_err(map_store_error)?;

        User::try_from(row)
    }

    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<User>> {
        sqlx::query_as::<_, UserRow>(
            r#"
                SELECT user_id, name, role
                FROM users
                WHERE user_id = $1
            "#,
        )
        .bind(&user_id)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(map_store_error)?
        .map(User::try_from)
        .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel::model::role::Role;

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn register_keeps_first_role(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = UserRepositoryImpl::new(ConnectionPool::new(pool));
        let user_id: UserId = "uid-owner".parse()?;

        let user = repo
            .register(RegisterUser::new(user_id.clone(), "Asha".into(), Role::Owner))
            .await?;
        assert_eq!(user.role, Role::Owner);

        let user = repo
            .register(RegisterUser::new(user_id.clone(), "Asha K".into(), Role::User))
            .await?;
        assert_eq!(user.role, Role::Owner);
        assert_eq!(user.name, "Asha K");

        assert!(repo.find_by_id("unknown".parse()?).await?.is_none());
        Ok(())
    }
}
