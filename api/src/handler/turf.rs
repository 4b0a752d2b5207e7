use crate::{
    extractor::AuthorizedUser,
    model::{
        availability::{AvailabilityQuery, DayAvailabilityResponse},
        turf::{
            CreateTurfRequest, CreatedTurfResponse, TurfListQuery, TurfResponse, TurfsResponse,
            UpdateTurfRequest, UpdateTurfRequestWithIds,
        },
    },
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use garde::Validate;
use kernel::model::{
    availability::DayAvailability,
    id::TurfId,
    turf::event::DeleteTurf,
};
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

pub async fn register_turf(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
    Json(req): Json<CreateTurfRequest>,
) -> AppResult<(StatusCode, Json<CreatedTurfResponse>)> {
    user.ensure_owner()?;
    req.validate(&())?;

    let event = req.into_event(user.id(), registry.booking_config().default_capacity);
    let turf_id = registry.turf_repository().create(event).await?;
    tracing::info!(turf_id = %turf_id, owner_id = %user.id(), "turf registered");

    Ok((StatusCode::CREATED, Json(CreatedTurfResponse { turf_id })))
}

pub async fn show_turf_list(
    Query(query): Query<TurfListQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<TurfsResponse>> {
    query.validate(&())?;

    registry
        .turf_repository()
        .find_all(query.into())
        .await
        .map(TurfsResponse::from)
        .map(Json)
}

pub async fn show_my_turfs(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<TurfsResponse>> {
    user.ensure_owner()?;

    registry
        .turf_repository()
        .find_by_owner(user.id())
        .await
        .map(TurfsResponse::from)
        .map(Json)
}

pub async fn show_turf(
    Path(turf_id): Path<TurfId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<TurfResponse>> {
    registry
        .turf_repository()
        .find_by_id(turf_id)
        .await
        .and_then(|turf| match turf {
            Some(turf) => Ok(Json(turf.into())),
            None => Err(AppError::EntityNotFound(format!("turf ({turf_id}) not found"))),
        })
}

pub async fn update_turf(
    user: AuthorizedUser,
    Path(turf_id): Path<TurfId>,
    State(registry): State<AppRegistry>,
    Json(req): Json<UpdateTurfRequest>,
) -> AppResult<Json<TurfResponse>> {
    user.ensure_owner()?;
    req.validate(&())?;

    let update_turf = UpdateTurfRequestWithIds::new(turf_id, user.id(), req);
    registry
        .turf_repository()
        .update(update_turf.into())
        .await
        .map(TurfResponse::from)
        .map(Json)
}

pub async fn delete_turf(
    user: AuthorizedUser,
    Path(turf_id): Path<TurfId>,
    State(registry): State<AppRegistry>,
) -> AppResult<StatusCode> {
    user.ensure_owner()?;

    registry
        .turf_repository()
        .delete(DeleteTurf::new(turf_id, user.id()))
        .await
        .map(|_| StatusCode::OK)
}

// 日付ごとの各スロットの空き状況を返す
// 表示用の値であり、予約時には改めて定員を確認する
pub async fn show_availability(
    Path(turf_id): Path<TurfId>,
    Query(query): Query<AvailabilityQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<DayAvailabilityResponse>> {
    let turf = registry
        .turf_repository()
        .find_by_id(turf_id)
        .await?
        .ok_or_else(|| AppError::EntityNotFound(format!("turf ({turf_id}) not found")))?;

    let occupancy = registry
        .reservation_repository()
        .occupancy_by_date(turf_id, query.date)
        .await?;

    let day = DayAvailability::build(&turf, query.date, &occupancy, &registry.band_policy());
    Ok(Json(day.into()))
}
