use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, EnumString, AsRefStr, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    #[default]
    User,
}

impl Role {
    // ターフの登録・編集・予約状況の閲覧ができるのはオーナーのみ
    pub fn can_manage_turfs(self) -> bool {
        match self {
            Role::Owner => true,
            Role::User => false,
        }
    }
}
