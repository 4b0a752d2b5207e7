use crate::model::{id::UserId, role::Role};
pub mod event;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub user_id: UserId,
    pub name: String,
    pub role: Role,
}

impl User {
    // 未登録のユーザーは一般ユーザーとして扱う
    pub fn unregistered(user_id: UserId) -> Self {
        Self {
            user_id,
            name: String::new(),
            role: Role::default(),
        }
    }
}
