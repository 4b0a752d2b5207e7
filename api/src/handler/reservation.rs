use crate::{
    extractor::AuthorizedUser,
    model::reservation::{
        CreateReservationRequest, CreateReservationRequestWithIds, CreatedReservationResponse,
        ReservationResponse, ReservationsResponse,
    },
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use garde::Validate;
use kernel::model::{
    id::{ReservationId, TurfId},
    reservation::event::{CancelReservation, CreateReservation},
};
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

pub async fn reserve_slot(
    user: AuthorizedUser,
    Path(turf_id): Path<TurfId>,
    State(registry): State<AppRegistry>,
    Json(req): Json<CreateReservationRequest>,
) -> AppResult<(StatusCode, Json<CreatedReservationResponse>)> {
    // ① 入力チェック（ストアに問い合わせる前に弾けるもの）
    user.ensure_verified()?;
    req.validate(&())?;
    let event = CreateReservation::try_from(CreateReservationRequestWithIds::new(
        turf_id,
        user.id(),
        Utc::now(),
        req,
    ))?;
    event.validate(registry.booking_config())?;

    // ② 定員の判定と登録はストア側で一括して行う
    let reservation = registry.reservation_repository().reserve(event).await?;

    Ok((StatusCode::CREATED, Json(reservation.into())))
}

pub async fn show_my_reservations(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ReservationsResponse>> {
    registry
        .reservation_repository()
        .find_by_user(user.id())
        .await
        .map(ReservationsResponse::from)
        .map(Json)
}

pub async fn show_reservation(
    user: AuthorizedUser,
    Path(reservation_id): Path<ReservationId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ReservationResponse>> {
    let reservation = registry
        .reservation_repository()
        .find_by_id(reservation_id)
        .await?
        .ok_or_else(|| {
            AppError::EntityNotFound(format!("reservation ({reservation_id}) not found"))
        })?;

    // 予約者本人とターフのオーナー以外には見せない
    if !reservation.reservation.is_visible_to(&user.id()) {
        return Err(AppError::ForbiddenOperation);
    }

    Ok(Json(reservation.into()))
}

pub async fn cancel_reservation(
    user: AuthorizedUser,
    Path(reservation_id): Path<ReservationId>,
    State(registry): State<AppRegistry>,
) -> AppResult<StatusCode> {
    user.ensure_verified()?;

    registry
        .reservation_repository()
        .cancel(CancelReservation::new(reservation_id, user.id(), Utc::now()))
        .await
        .map(|_| StatusCode::OK)
}
