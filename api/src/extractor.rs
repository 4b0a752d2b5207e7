use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use kernel::model::{id::UserId, role::Role, user::User};
use registry::AppRegistry;
use shared::error::AppError;

// ゲートウェイが ID プロバイダーの検証結果をヘッダーで渡してくる
pub const USER_ID_HEADER: &str = "x-user-id";
pub const EMAIL_VERIFIED_HEADER: &str = "x-email-verified";

/// The signed-in caller, resolved from the identity headers.
///
/// Users who never registered are treated as plain users.
pub struct AuthorizedUser {
    pub user: User,
    pub email_verified: bool,
}

impl AuthorizedUser {
    pub fn id(&self) -> UserId {
        self.user.user_id.clone()
    }

    pub fn role(&self) -> Role {
        self.user.role
    }

    // 予約の作成・キャンセルはメールアドレス確認済みのユーザーのみ
    pub fn ensure_verified(&self) -> Result<(), AppError> {
        if self.email_verified {
            Ok(())
        } else {
            Err(AppError::UnverifiedEmail)
        }
    }

    pub fn ensure_owner(&self) -> Result<(), AppError> {
        if self.role().can_manage_turfs() {
            Ok(())
        } else {
            Err(AppError::ForbiddenOperation)
        }
    }
}

#[async_trait]
impl FromRequestParts<AppRegistry> for AuthorizedUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        registry: &AppRegistry,
    ) -> Result<Self, Self::Rejection> {
        let user_id: UserId = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or(AppError::UnauthenticatedError)?
            .parse()
            .map_err(|_| AppError::UnauthenticatedError)?;

        let email_verified = parts
            .headers
            .get(EMAIL_VERIFIED_HEADER)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.eq_ignore_ascii_case("true"));

        let user = registry
            .user_repository()
            .find_by_id(user_id.clone())
            .await?
            .unwrap_or_else(|| User::unregistered(user_id));

        Ok(Self {
            user,
            email_verified,
        })
    }
}
