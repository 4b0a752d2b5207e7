use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    UnprocessableEntity(String),
    #[error("{0}")]
    EntityNotFound(String),
    #[error("{0}")]
    ValidationError(#[from] garde::Report),
    #[error("{0}")]
    InvalidRequest(String),
    #[error("slot full: {occupancy} of {capacity} players already booked, {requested} requested")]
    CapacityExceeded {
        occupancy: i32,
        requested: i32,
        capacity: i32,
    },
    #[error("トランザクションを実行できませんでした。")]
    TransactionError(#[source] sqlx::Error),
    #[error("データベース処理実行中にエラーが発生しました。")]
    SpecificOperationError(#[source] sqlx::Error),
    #[error("No rows affected: {0}")]
    NoRowsAffectedError(String),
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("{0}")]
    ConvertToUuidError(#[from] uuid::Error),
    #[error("{0}")]
    ConversionEntityError(String),
    #[error("sign in required")]
    UnauthenticatedError,
    #[error("email address is not verified")]
    UnverifiedEmail,
    #[error("operation not permitted")]
    ForbiddenOperation,
}

impl AppError {
    // 呼び出し側で再試行してよいエラーかどうか
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AppError::StoreUnavailable(_) | AppError::TransactionError(_)
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status_code = match self {
            AppError::UnprocessableEntity(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::EntityNotFound(_) => StatusCode::NOT_FOUND,
            AppError::ValidationError(_)
            | AppError::InvalidRequest(_)
            | AppError::ConvertToUuidError(_) => StatusCode::BAD_REQUEST,
            AppError::CapacityExceeded { .. } => StatusCode::CONFLICT,
            AppError::UnauthenticatedError => StatusCode::UNAUTHORIZED,
            AppError::UnverifiedEmail | AppError::ForbiddenOperation => StatusCode::FORBIDDEN,
            AppError::StoreUnavailable(_) | AppError::TransactionError(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::SpecificOperationError(_)
            | AppError::NoRowsAffectedError(_)
            | AppError::ConversionEntityError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // ストア起因のエラーは詳細を返さず、ログにのみ残す
        let message = if status_code.is_server_error() {
            if self.is_retryable() {
                tracing::warn!(
                    error.cause_chain = ?self,
                    error.message = %self,
                    "Store temporarily unavailable"
                );
            } else {
                tracing::error!(
                    error.cause_chain = ?self,
                    error.message = %self,
                    "Unexpected error happened"
                );
            }
            "request failed, try again".to_string()
        } else {
            self.to_string()
        };

        (status_code, Json(serde_json::json!({ "message": message }))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_exceeded_maps_to_conflict() {
        let res = AppError::CapacityExceeded {
            occupancy: 20,
            requested: 3,
            capacity: 22,
        }
        .into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn store_failures_are_retryable_and_unavailable() {
        let err = AppError::StoreUnavailable("serialization failure".into());
        assert!(err.is_retryable());
        assert_eq!(err.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(!AppError::ForbiddenOperation.is_retryable());
    }
}
