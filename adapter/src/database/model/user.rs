use kernel::model::{id::UserId, role::Role, user::User};
use shared::error::AppError;
use std::str::FromStr;

#[derive(sqlx::FromRow)]
pub struct UserRow {
    pub user_id: UserId,
    pub name: String,
    pub role: String,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(value: UserRow) -> Result<Self, Self::Error> {
        let UserRow {
            user_id,
            name,
            role,
        } = value;
        let role = Role::from_str(&role)
            .map_err(|e| AppError::ConversionEntityError(format!("role {role:?}: {e}")))?;
        Ok(User {
            user_id,
            name,
            role,
        })
    }
}
