use crate::model::{id::UserId, role::Role};
use derive_new::new;

#[derive(Debug, new)]
pub struct RegisterUser {
    pub user_id: UserId,
    pub name: String,
    pub role: Role,
}
