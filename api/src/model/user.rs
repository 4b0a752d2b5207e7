use derive_new::new;
use garde::Validate;
use kernel::model::{
    id::UserId,
    role::Role,
    user::{event::RegisterUser, User},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleName {
    Owner,
    User,
}

impl From<Role> for RoleName {
    fn from(value: Role) -> Self {
        match value {
            Role::Owner => Self::Owner,
            Role::User => Self::User,
        }
    }
}

impl From<RoleName> for Role {
    fn from(value: RoleName) -> Self {
        match value {
            RoleName::Owner => Self::Owner,
            RoleName::User => Self::User,
        }
    }
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserRequest {
    #[garde(length(min = 1, max = 100))]
    name: String,
    #[garde(skip)]
    role: RoleName,
}

#[derive(new)]
pub struct RegisterUserRequestWithUserId(UserId, RegisterUserRequest);
impl From<RegisterUserRequestWithUserId> for RegisterUser {
    fn from(value: RegisterUserRequestWithUserId) -> Self {
        let RegisterUserRequestWithUserId(user_id, RegisterUserRequest { name, role }) = value;
        RegisterUser {
            user_id,
            name,
            role: Role::from(role),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub user_id: UserId,
    pub name: String,
    pub role: RoleName,
}

impl From<User> for UserResponse {
    fn from(value: User) -> Self {
        let User {
            user_id,
            name,
            role,
        } = value;
        Self {
            user_id,
            name,
            role: RoleName::from(role),
        }
    }
}
