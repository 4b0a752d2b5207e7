use crate::{
    extractor::AuthorizedUser,
    model::user::{RegisterUserRequest, RegisterUserRequestWithUserId, UserResponse},
};
use axum::{extract::State, Json};
use garde::Validate;
use registry::AppRegistry;
use shared::error::AppResult;

// 初回サインアップ時に名前とロールを登録する
pub async fn register_me(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
    Json(req): Json<RegisterUserRequest>,
) -> AppResult<Json<UserResponse>> {
    req.validate(&())?;

    registry
        .user_repository()
        .register(RegisterUserRequestWithUserId::new(user.id(), req).into())
        .await
        .map(UserResponse::from)
        .map(Json)
}

pub async fn get_me(user: AuthorizedUser) -> Json<UserResponse> {
    Json(UserResponse::from(user.user))
}
